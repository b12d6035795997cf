use serde::Deserialize;

use crate::{EuskoService, Result};
use eusko_domain::{
	collation,
	document::Destination,
	query::{self, CATEGORY_AGGREGATION, SearchQuery},
};

#[derive(Clone, Debug, Default, Deserialize)]
pub struct CategoriesQuery {
	pub tipo_recurso: Option<String>,
}

impl EuskoService {
	pub async fn search(&self, req: &SearchQuery) -> Result<Vec<Destination>> {
		let size = query::page_size(req.size, self.cfg.search.default_size, self.cfg.search.max_size);
		let body = query::search_body(req, size);
		let hits = self.index.search(&body).await.inspect_err(|err| {
			tracing::error!(error = %err, "Destination search failed.");
		})?;

		Ok(hits
			.into_iter()
			.map(|hit| Destination::from_source(hit.id, hit.score, hit.source))
			.collect())
	}

	/// Distinct category labels, optionally scoped to one resource type, in collation order.
	pub async fn categories(&self, req: &CategoriesQuery) -> Result<Vec<String>> {
		let body =
			query::categories_body(req.tipo_recurso.as_deref(), self.cfg.search.category_buckets);
		let labels = self.index.terms(&body, CATEGORY_AGGREGATION).await.inspect_err(|err| {
			tracing::error!(error = %err, "Category aggregation failed.");
		})?;

		Ok(collation::sorted_labels(labels))
	}
}
