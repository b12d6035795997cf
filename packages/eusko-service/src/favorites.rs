//! Per-user favorites and their enrichment with index documents.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{EuskoService, Error, Result};
use eusko_domain::document::Destination;
use eusko_storage::{index::IndexDoc, models::Favorite, queries};

#[derive(Clone, Debug, Deserialize)]
pub struct AddFavoriteRequest {
	#[serde(rename = "destinoId", default)]
	pub destino_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FavoriteView {
	pub id: i64,
	pub user_id: i64,
	pub destino_id: String,
	#[serde(with = "crate::time_serde")]
	pub created_at: OffsetDateTime,
}
impl From<Favorite> for FavoriteView {
	fn from(row: Favorite) -> Self {
		Self {
			id: row.id,
			user_id: row.user_id,
			destino_id: row.destino_id,
			created_at: row.created_at,
		}
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AddFavorite {
	Created(FavoriteView),
	AlreadyExists,
}

impl EuskoService {
	pub async fn list_favorites(&self, user_id: i64) -> Result<Vec<FavoriteView>> {
		let rows = queries::list_favorites(&self.db, user_id).await?;

		Ok(rows.into_iter().map(FavoriteView::from).collect())
	}

	pub async fn add_favorite(&self, user_id: i64, req: AddFavoriteRequest) -> Result<AddFavorite> {
		let destino_id = match req.destino_id.as_deref().map(str::trim) {
			Some(id) if !id.is_empty() => id,
			_ => return Err(Error::invalid_request("destinoId is required.")),
		};
		let created = queries::insert_favorite(&self.db, user_id, destino_id).await?;

		Ok(match created {
			Some(row) => AddFavorite::Created(row.into()),
			None => AddFavorite::AlreadyExists,
		})
	}

	/// Deletes one of the caller's favorites. Absent rows are not an error.
	pub async fn remove_favorite(&self, user_id: i64, favorite_id: i64) -> Result<()> {
		let deleted = queries::delete_favorite(&self.db, user_id, favorite_id).await?;

		tracing::debug!(user_id, favorite_id, deleted, "Removed favorite.");

		Ok(())
	}

	/// Favorites joined with their index documents, newest first.
	pub async fn list_favorites_enriched(&self, user_id: i64) -> Result<Vec<Destination>> {
		let rows = queries::list_favorites(&self.db, user_id).await?;

		self.enrich(&rows).await
	}

	pub(crate) async fn enrich(&self, rows: &[Favorite]) -> Result<Vec<Destination>> {
		if rows.is_empty() {
			return Ok(Vec::new());
		}

		let ids = rows.iter().map(|row| row.destino_id.clone()).collect::<Vec<_>>();
		let docs = self.index.multi_get(&ids).await.inspect_err(|err| {
			tracing::error!(error = %err, "Favorite enrichment lookup failed.");
		})?;

		Ok(reconcile(rows, docs))
	}
}

/// Joins favorite rows with looked-up documents by id.
///
/// Output follows `rows`. Rows whose document is missing or reported as not found are dropped.
pub fn reconcile(rows: &[Favorite], docs: Vec<IndexDoc>) -> Vec<Destination> {
	let mut by_id = HashMap::with_capacity(docs.len());

	for doc in docs.into_iter().filter(|doc| doc.found) {
		by_id.entry(doc.id.clone()).or_insert(doc);
	}

	rows.iter()
		.filter_map(|row| {
			let doc = by_id.get(&row.destino_id)?;
			let destination = Destination::from_source(doc.id.clone(), None, doc.source.clone());

			Some(destination.with_favorite(row.id))
		})
		.collect()
}
