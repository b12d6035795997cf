//! Index query construction for destination search and category facets.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

pub const CATEGORY_FIELD: &str = "categoria";
pub const CATEGORY_AGGREGATION: &str = "categorias";
pub const RESOURCE_TYPE_FIELD: &str = "tipo_recurso";

/// Fields searched by free text. The name field carries a 3x boost over every other field.
pub const TEXT_FIELDS: [&str; 6] =
	["nombre^3", "descripcion", "municipio", "territorio", "categoria", "raw_properties.*"];

/// Exact-match filters accepted by the search endpoint, in the order they are applied.
pub const FILTER_FIELDS: [&str; 5] =
	["municipio", "territorio", "tipo_recurso", "source_dataset", "categoria"];

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SearchQuery {
	pub q: Option<String>,
	pub municipio: Option<String>,
	pub territorio: Option<String>,
	pub tipo_recurso: Option<String>,
	pub source_dataset: Option<String>,
	pub categoria: Option<String>,
	pub size: Option<u32>,
}
impl SearchQuery {
	pub fn text(&self) -> Option<&str> {
		non_blank(self.q.as_deref())
	}

	/// Supplied filters as `(field, value)` pairs. Blank values count as absent.
	pub fn filters(&self) -> Vec<(&'static str, &str)> {
		let values = [
			self.municipio.as_deref(),
			self.territorio.as_deref(),
			self.tipo_recurso.as_deref(),
			self.source_dataset.as_deref(),
			self.categoria.as_deref(),
		];

		FILTER_FIELDS
			.into_iter()
			.zip(values)
			.filter_map(|(field, value)| non_blank(value).map(|value| (field, value)))
			.collect()
	}
}

/// Clamps a requested page size into `1..=max_size`, falling back to `default_size`.
pub fn page_size(requested: Option<u32>, default_size: u32, max_size: u32) -> u32 {
	requested.unwrap_or(default_size).clamp(1, max_size.max(1))
}

pub fn search_body(query: &SearchQuery, size: u32) -> Value {
	json!({ "query": search_clause(query), "size": size })
}

pub fn search_clause(query: &SearchQuery) -> Value {
	let filters = query
		.filters()
		.into_iter()
		.map(|(field, value)| term(field, value))
		.collect::<Vec<_>>();
	let text = query.text();

	match (text, filters.is_empty()) {
		(None, true) => json!({ "match_all": {} }),
		(Some(text), true) => multi_match(text),
		(Some(text), false) => json!({ "bool": { "must": [multi_match(text)], "filter": filters } }),
		(None, false) => json!({ "bool": { "filter": filters } }),
	}
}

pub fn categories_body(resource_type: Option<&str>, buckets: u32) -> Value {
	let query = match non_blank(resource_type) {
		Some(resource_type) =>
			json!({ "bool": { "filter": [term(RESOURCE_TYPE_FIELD, resource_type)] } }),
		None => json!({ "match_all": {} }),
	};
	let mut aggs = Map::new();

	aggs.insert(
		CATEGORY_AGGREGATION.to_string(),
		json!({ "terms": { "field": CATEGORY_FIELD, "size": buckets } }),
	);

	json!({ "size": 0, "query": query, "aggs": aggs })
}

fn multi_match(text: &str) -> Value {
	json!({ "multi_match": { "query": text, "fields": TEXT_FIELDS } })
}

fn term(field: &str, value: &str) -> Value {
	let mut clause = Map::new();

	clause.insert(field.to_string(), Value::String(value.to_string()));

	json!({ "term": clause })
}

fn non_blank(value: Option<&str>) -> Option<&str> {
	value.map(str::trim).filter(|value| !value.is_empty())
}
