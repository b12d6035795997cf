use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	#[serde(default)]
	pub search: Search,
	pub providers: Providers,
	pub security: Security,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
	/// Externally reachable base URL of this gateway, e.g. "https://trips.example.org".
	pub public_url: String,
	/// Front-end origin that receives the token after a federated login.
	pub frontend_url: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
	pub index: Index,
}

#[derive(Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
	#[serde(default = "default_acquire_timeout_ms")]
	pub acquire_timeout_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct Index {
	pub url: String,
	#[serde(default = "default_index_name")]
	pub index: String,
	#[serde(default = "default_timeout_ms")]
	pub timeout_ms: u64,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Search {
	pub default_size: u32,
	pub max_size: u32,
	pub category_buckets: u32,
}
impl Default for Search {
	fn default() -> Self {
		Self { default_size: 20, max_size: 100, category_buckets: 50 }
	}
}

#[derive(Debug, Deserialize)]
pub struct Providers {
	pub recommender: RecommenderConfig,
	pub github: Option<GithubConfig>,
}

#[derive(Debug, Deserialize)]
pub struct RecommenderConfig {
	pub api_base: String,
	#[serde(default = "default_rank_path")]
	pub path: String,
	#[serde(default = "default_timeout_ms")]
	pub timeout_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct GithubConfig {
	pub client_id: Option<String>,
	pub client_secret: String,
	/// Must match the callback registered with the OAuth application.
	pub callback_url: Option<String>,
	#[serde(default = "default_github_scopes")]
	pub scopes: Vec<String>,
	#[serde(default = "default_github_authorize_url")]
	pub authorize_url: String,
	#[serde(default = "default_github_token_url")]
	pub token_url: String,
	#[serde(default = "default_github_api_base")]
	pub api_base: String,
	#[serde(default = "default_user_agent")]
	pub user_agent: String,
	#[serde(default = "default_timeout_ms")]
	pub timeout_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct Security {
	pub token_secret: String,
	#[serde(default = "default_token_ttl_days")]
	pub token_ttl_days: i64,
	#[serde(default = "default_oauth_state_ttl_secs")]
	pub oauth_state_ttl_secs: i64,
}

fn default_acquire_timeout_ms() -> u64 {
	5_000
}

fn default_index_name() -> String {
	"destinos".to_string()
}

fn default_timeout_ms() -> u64 {
	8_000
}

fn default_rank_path() -> String {
	"/rank".to_string()
}

fn default_github_scopes() -> Vec<String> {
	vec!["read:user".to_string(), "user:email".to_string()]
}

fn default_github_authorize_url() -> String {
	"https://github.com/login/oauth/authorize".to_string()
}

fn default_github_token_url() -> String {
	"https://github.com/login/oauth/access_token".to_string()
}

fn default_github_api_base() -> String {
	"https://api.github.com".to_string()
}

fn default_user_agent() -> String {
	"euskotrips-gateway".to_string()
}

fn default_token_ttl_days() -> i64 {
	7
}

fn default_oauth_state_ttl_secs() -> i64 {
	600
}
