use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use crate::Result;

pub const PROVIDER: &str = "Recommender";

/// Forwards a ranking request; the response body is returned as-is.
pub async fn rank(cfg: &eusko_config::RecommenderConfig, user_id: Option<i64>) -> Result<Value> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let mut req = client.get(url);

	if let Some(user_id) = user_id {
		req = req.query(&[("usuarioId", user_id)]);
	}

	let res = req.send().await?;

	crate::read_json(PROVIDER, res).await
}
