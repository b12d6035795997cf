mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, GithubConfig, Index, Postgres, Providers, RecommenderConfig, Search, Security, Service,
	Storage,
};

use std::{fs, path::Path};

pub const MIN_TOKEN_SECRET_LEN: usize = 32;

pub const MAX_TOKEN_TTL_DAYS: i64 = 3_650;

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	parse(&raw).map_err(|err| match err {
		Error::ParseConfig { source, .. } =>
			Error::ParseConfig { path: path.to_path_buf(), source },
		other => other,
	})
}

pub fn parse(raw: &str) -> Result<Config> {
	let mut cfg: Config = toml::from_str(raw)
		.map_err(|err| Error::ParseConfig { path: Default::default(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}

	for (label, url) in [
		("service.public_url", &cfg.service.public_url),
		("service.frontend_url", &cfg.service.frontend_url),
		("storage.index.url", &cfg.storage.index.url),
		("providers.recommender.api_base", &cfg.providers.recommender.api_base),
	] {
		if !is_http_url(url) {
			return Err(Error::Validation {
				message: format!("{label} must be an http or https URL."),
			});
		}
	}

	if cfg.storage.postgres.dsn.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.postgres.dsn must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}
	if cfg.storage.index.index.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.index.index must be non-empty.".to_string(),
		});
	}
	if cfg.search.max_size == 0 {
		return Err(Error::Validation {
			message: "search.max_size must be greater than zero.".to_string(),
		});
	}
	if cfg.search.default_size == 0 || cfg.search.default_size > cfg.search.max_size {
		return Err(Error::Validation {
			message: "search.default_size must be between 1 and search.max_size.".to_string(),
		});
	}
	if cfg.search.category_buckets == 0 {
		return Err(Error::Validation {
			message: "search.category_buckets must be greater than zero.".to_string(),
		});
	}
	if !cfg.providers.recommender.path.starts_with('/') {
		return Err(Error::Validation {
			message: "providers.recommender.path must start with '/'.".to_string(),
		});
	}

	for (label, timeout_ms) in [
		("storage.postgres.acquire_timeout_ms", cfg.storage.postgres.acquire_timeout_ms),
		("storage.index.timeout_ms", cfg.storage.index.timeout_ms),
		("providers.recommender.timeout_ms", cfg.providers.recommender.timeout_ms),
	] {
		if timeout_ms == 0 {
			return Err(Error::Validation { message: format!("{label} must be greater than zero.") });
		}
	}

	if let Some(github) = cfg.providers.github.as_ref() {
		if github.client_id.is_some() && github.client_secret.trim().is_empty() {
			return Err(Error::Validation {
				message: "providers.github.client_secret must be non-empty when client_id is set."
					.to_string(),
			});
		}

		for (label, url) in [
			("providers.github.authorize_url", &github.authorize_url),
			("providers.github.token_url", &github.token_url),
			("providers.github.api_base", &github.api_base),
		] {
			if !is_http_url(url) {
				return Err(Error::Validation {
					message: format!("{label} must be an http or https URL."),
				});
			}
		}

		if let Some(callback_url) = github.callback_url.as_deref()
			&& !is_http_url(callback_url)
		{
			return Err(Error::Validation {
				message: "providers.github.callback_url must be an http or https URL.".to_string(),
			});
		}
		if github.timeout_ms == 0 {
			return Err(Error::Validation {
				message: "providers.github.timeout_ms must be greater than zero.".to_string(),
			});
		}
	}

	if cfg.security.token_secret.trim().is_empty() {
		return Err(Error::Validation {
			message: "security.token_secret must be set.".to_string(),
		});
	}
	if cfg.security.token_secret.len() < MIN_TOKEN_SECRET_LEN {
		return Err(Error::Validation {
			message: format!(
				"security.token_secret must be at least {MIN_TOKEN_SECRET_LEN} bytes long."
			),
		});
	}
	if cfg.security.token_ttl_days <= 0 || cfg.security.token_ttl_days > MAX_TOKEN_TTL_DAYS {
		return Err(Error::Validation {
			message: format!("security.token_ttl_days must be between 1 and {MAX_TOKEN_TTL_DAYS}."),
		});
	}
	if cfg.security.oauth_state_ttl_secs <= 0 {
		return Err(Error::Validation {
			message: "security.oauth_state_ttl_secs must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	cfg.service.public_url = cfg.service.public_url.trim_end_matches('/').to_string();
	cfg.storage.index.url = cfg.storage.index.url.trim_end_matches('/').to_string();
	cfg.providers.recommender.api_base =
		cfg.providers.recommender.api_base.trim_end_matches('/').to_string();

	let public_url = cfg.service.public_url.clone();

	if let Some(github) = cfg.providers.github.as_mut() {
		if github.client_id.as_deref().map(|id| id.trim().is_empty()).unwrap_or(false) {
			github.client_id = None;
		}
		if github.callback_url.as_deref().map(|url| url.trim().is_empty()).unwrap_or(true) {
			github.callback_url = Some(format!("{public_url}/auth/github/callback"));
		}

		github.api_base = github.api_base.trim_end_matches('/').to_string();
	}
}

fn is_http_url(value: &str) -> bool {
	let value = value.trim();

	["http://", "https://"]
		.iter()
		.any(|scheme| value.len() > scheme.len() && value.starts_with(scheme))
}
