use std::sync::Arc;

use eusko_service::EuskoService;
use eusko_storage::{db::Db, index::IndexStore};

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<EuskoService>,
}
impl AppState {
	pub async fn new(config: eusko_config::Config) -> color_eyre::Result<Self> {
		let db = Db::connect(&config.storage.postgres).await?;

		db.ensure_schema().await?;

		let index = IndexStore::new(&config.storage.index)?;
		let service = EuskoService::new(config, db, index)?;

		tracing::info!(index = %service.cfg.storage.index.index, "Gateway state initialized.");

		Ok(Self::from_service(service))
	}

	pub fn from_service(service: EuskoService) -> Self {
		Self { service: Arc::new(service) }
	}
}
