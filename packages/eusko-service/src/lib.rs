pub mod auth;
pub mod credential;
pub mod favorites;
pub mod federation;
pub mod ranking;
pub mod search;
pub mod time_serde;
pub mod token;

mod error;

pub use auth::{AuthResponse, LoginRequest, MeResponse, RegisterRequest};
pub use error::{Error, Result};
pub use favorites::{AddFavorite, AddFavoriteRequest, FavoriteView, reconcile};
pub use federation::{FederationCallback, FederationRedirect, FederationStart};
pub use ranking::RankQuery;
pub use search::CategoriesQuery;
pub use token::{Claims, TokenIssuer};

use std::{future::Future, pin::Pin, sync::Arc};

use serde::Serialize;
use serde_json::Value;

use eusko_config::{Config, GithubConfig, RecommenderConfig};
use eusko_providers::{github, recommender};
use eusko_storage::{
	db::Db,
	index::{IndexDoc, IndexHit, IndexStore},
	models::User,
};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Read side of the document index.
pub trait DocumentIndex
where
	Self: Send + Sync,
{
	fn search<'a>(
		&'a self,
		body: &'a Value,
	) -> BoxFuture<'a, eusko_storage::Result<Vec<IndexHit>>>;

	fn terms<'a>(
		&'a self,
		body: &'a Value,
		aggregation: &'a str,
	) -> BoxFuture<'a, eusko_storage::Result<Vec<String>>>;

	fn multi_get<'a>(
		&'a self,
		ids: &'a [String],
	) -> BoxFuture<'a, eusko_storage::Result<Vec<IndexDoc>>>;

	fn ping(&self) -> BoxFuture<'_, bool>;
}

pub trait IdentityProvider
where
	Self: Send + Sync,
{
	fn exchange_code<'a>(
		&'a self,
		cfg: &'a GithubConfig,
		client_id: &'a str,
		code: &'a str,
	) -> BoxFuture<'a, eusko_providers::Result<String>>;

	fn fetch_profile<'a>(
		&'a self,
		cfg: &'a GithubConfig,
		access_token: &'a str,
	) -> BoxFuture<'a, eusko_providers::Result<Value>>;

	fn fetch_emails<'a>(
		&'a self,
		cfg: &'a GithubConfig,
		access_token: &'a str,
	) -> BoxFuture<'a, eusko_providers::Result<Value>>;
}

pub trait RankingProvider
where
	Self: Send + Sync,
{
	fn rank<'a>(
		&'a self,
		cfg: &'a RecommenderConfig,
		user_id: Option<i64>,
	) -> BoxFuture<'a, eusko_providers::Result<Value>>;
}

#[derive(Clone)]
pub struct Providers {
	pub identity: Arc<dyn IdentityProvider>,
	pub ranking: Arc<dyn RankingProvider>,
}
impl Providers {
	pub fn new(identity: Arc<dyn IdentityProvider>, ranking: Arc<dyn RankingProvider>) -> Self {
		Self { identity, ranking }
	}
}

impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(DefaultProviders);

		Self { identity: provider.clone(), ranking: provider }
	}
}

/// Public view of a user. The credential never leaves the service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UserView {
	pub id: i64,
	pub email: String,
	pub name: Option<String>,
}
impl From<&User> for UserView {
	fn from(user: &User) -> Self {
		Self { id: user.id, email: user.email.clone(), name: user.name.clone() }
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct HealthReport {
	pub db: bool,
	pub index: bool,
}
impl HealthReport {
	pub fn ok(&self) -> bool {
		self.db && self.index
	}
}

pub struct EuskoService {
	pub cfg: Config,
	pub db: Db,
	pub index: Arc<dyn DocumentIndex>,
	pub providers: Providers,
	pub tokens: TokenIssuer,
}
impl EuskoService {
	pub fn new(cfg: Config, db: Db, index: IndexStore) -> Result<Self> {
		Self::with_providers(cfg, db, Arc::new(index), Providers::default())
	}

	pub fn with_providers(
		cfg: Config,
		db: Db,
		index: Arc<dyn DocumentIndex>,
		providers: Providers,
	) -> Result<Self> {
		let tokens = TokenIssuer::from_config(&cfg.security)?;

		Ok(Self { cfg, db, index, providers, tokens })
	}

	pub async fn health(&self) -> HealthReport {
		HealthReport { db: self.db.ping().await, index: self.index.ping().await }
	}

	/// Verifies a bearer token and returns the caller's user id.
	pub fn authenticate(&self, token: &str) -> Result<i64> {
		self.tokens.verify(token)?.user_id()
	}
}

struct DefaultProviders;

impl DocumentIndex for IndexStore {
	fn search<'a>(
		&'a self,
		body: &'a Value,
	) -> BoxFuture<'a, eusko_storage::Result<Vec<IndexHit>>> {
		Box::pin(IndexStore::search(self, body))
	}

	fn terms<'a>(
		&'a self,
		body: &'a Value,
		aggregation: &'a str,
	) -> BoxFuture<'a, eusko_storage::Result<Vec<String>>> {
		Box::pin(IndexStore::terms(self, body, aggregation))
	}

	fn multi_get<'a>(
		&'a self,
		ids: &'a [String],
	) -> BoxFuture<'a, eusko_storage::Result<Vec<IndexDoc>>> {
		Box::pin(IndexStore::multi_get(self, ids))
	}

	fn ping(&self) -> BoxFuture<'_, bool> {
		Box::pin(IndexStore::ping(self))
	}
}

impl IdentityProvider for DefaultProviders {
	fn exchange_code<'a>(
		&'a self,
		cfg: &'a GithubConfig,
		client_id: &'a str,
		code: &'a str,
	) -> BoxFuture<'a, eusko_providers::Result<String>> {
		Box::pin(github::exchange_code(cfg, client_id, code))
	}

	fn fetch_profile<'a>(
		&'a self,
		cfg: &'a GithubConfig,
		access_token: &'a str,
	) -> BoxFuture<'a, eusko_providers::Result<Value>> {
		Box::pin(github::fetch_profile(cfg, access_token))
	}

	fn fetch_emails<'a>(
		&'a self,
		cfg: &'a GithubConfig,
		access_token: &'a str,
	) -> BoxFuture<'a, eusko_providers::Result<Value>> {
		Box::pin(github::fetch_emails(cfg, access_token))
	}
}

impl RankingProvider for DefaultProviders {
	fn rank<'a>(
		&'a self,
		cfg: &'a RecommenderConfig,
		user_id: Option<i64>,
	) -> BoxFuture<'a, eusko_providers::Result<Value>> {
		Box::pin(recommender::rank(cfg, user_id))
	}
}
