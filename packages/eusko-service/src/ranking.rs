use serde::Deserialize;
use serde_json::Value;

use crate::{EuskoService, Result};

#[derive(Clone, Debug, Default, Deserialize)]
pub struct RankQuery {
	#[serde(rename = "usuarioId")]
	pub usuario_id: Option<i64>,
}

impl EuskoService {
	/// Forwards to the recommender and returns its body untouched.
	pub async fn rank(&self, req: &RankQuery) -> Result<Value> {
		let ranked = self
			.providers
			.ranking
			.rank(&self.cfg.providers.recommender, req.usuario_id)
			.await
			.inspect_err(|err| tracing::error!(error = %err, "Recommender call failed."))?;

		Ok(ranked)
	}
}
