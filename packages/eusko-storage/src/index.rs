//! HTTP client for the Elasticsearch-compatible document index.

use std::time::Duration;

use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::{Error, Result};

/// Longest upstream body excerpt kept in an error.
const MAX_ERROR_BODY_CHARS: usize = 512;

#[derive(Clone, Debug, PartialEq)]
pub struct IndexHit {
	pub id: String,
	pub score: Option<f64>,
	pub source: Map<String, Value>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct IndexDoc {
	pub id: String,
	pub found: bool,
	pub source: Map<String, Value>,
}

pub struct IndexStore {
	client: Client,
	base_url: String,
	index: String,
}
impl IndexStore {
	pub fn new(cfg: &eusko_config::Index) -> Result<Self> {
		let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;

		Ok(Self {
			client,
			base_url: cfg.url.trim_end_matches('/').to_string(),
			index: cfg.index.clone(),
		})
	}

	pub fn index(&self) -> &str {
		&self.index
	}

	pub async fn search(&self, body: &Value) -> Result<Vec<IndexHit>> {
		let json = self.post("_search", body).await?;

		parse_search_response(json)
	}

	/// Runs `body` and returns the bucket keys of the terms aggregation named `aggregation`.
	pub async fn terms(&self, body: &Value, aggregation: &str) -> Result<Vec<String>> {
		let json = self.post("_search", body).await?;

		parse_terms_response(&json, aggregation)
	}

	/// Fetches documents by id in one round trip. The result has one entry per requested id,
	/// flagged `found: false` when the index does not hold it.
	pub async fn multi_get(&self, ids: &[String]) -> Result<Vec<IndexDoc>> {
		if ids.is_empty() {
			return Ok(Vec::new());
		}

		let body = serde_json::json!({ "ids": ids });
		let json = self.post("_mget", &body).await?;

		parse_mget_response(json)
	}

	pub async fn ping(&self) -> bool {
		match self.client.get(&self.base_url).send().await {
			Ok(res) => res.status().is_success(),
			Err(err) => {
				tracing::warn!(error = %err, "Index ping failed.");

				false
			},
		}
	}

	async fn post(&self, endpoint: &str, body: &Value) -> Result<Value> {
		let url = format!("{}/{}/{}", self.base_url, self.index, endpoint);
		let res = self.client.post(url).json(body).send().await?;

		read_json(res).await
	}
}

async fn read_json(res: Response) -> Result<Value> {
	let status = res.status();

	if !status.is_success() {
		let body = res.text().await.unwrap_or_default();

		return Err(Error::IndexStatus {
			status: status.as_u16(),
			body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
		});
	}

	Ok(res.json().await?)
}

#[derive(Deserialize)]
struct SearchResponse {
	hits: HitsEnvelope,
}

#[derive(Deserialize)]
struct HitsEnvelope {
	#[serde(default)]
	hits: Vec<RawHit>,
}

#[derive(Deserialize)]
struct RawHit {
	#[serde(rename = "_id")]
	id: String,
	#[serde(rename = "_score", default)]
	score: Option<f64>,
	#[serde(rename = "_source", default)]
	source: Map<String, Value>,
}

#[derive(Deserialize)]
struct MgetResponse {
	docs: Vec<RawDoc>,
}

#[derive(Deserialize)]
struct RawDoc {
	#[serde(rename = "_id")]
	id: String,
	#[serde(default)]
	found: bool,
	#[serde(rename = "_source", default)]
	source: Option<Map<String, Value>>,
}

fn parse_search_response(json: Value) -> Result<Vec<IndexHit>> {
	let parsed: SearchResponse = serde_json::from_value(json)
		.map_err(|err| Error::InvalidResponse(format!("Malformed search response: {err}.")))?;

	Ok(parsed
		.hits
		.hits
		.into_iter()
		.map(|hit| IndexHit { id: hit.id, score: hit.score, source: hit.source })
		.collect())
}

fn parse_terms_response(json: &Value, aggregation: &str) -> Result<Vec<String>> {
	let buckets = json
		.get("aggregations")
		.and_then(|aggs| aggs.get(aggregation))
		.and_then(|agg| agg.get("buckets"))
		.and_then(Value::as_array)
		.ok_or_else(|| {
			Error::InvalidResponse(format!("Aggregation {aggregation:?} is missing buckets."))
		})?;

	Ok(buckets
		.iter()
		.filter_map(|bucket| match bucket.get("key")? {
			Value::String(key) => Some(key.clone()),
			Value::Number(key) => Some(key.to_string()),
			_ => None,
		})
		.collect())
}

fn parse_mget_response(json: Value) -> Result<Vec<IndexDoc>> {
	let parsed: MgetResponse = serde_json::from_value(json)
		.map_err(|err| Error::InvalidResponse(format!("Malformed mget response: {err}.")))?;

	Ok(parsed
		.docs
		.into_iter()
		.map(|doc| {
			let found = doc.found && doc.source.is_some();

			IndexDoc { id: doc.id, found, source: doc.source.unwrap_or_default() }
		})
		.collect())
}
