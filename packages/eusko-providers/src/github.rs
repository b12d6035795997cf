//! GitHub OAuth authorization-code flow and the two profile endpoints it needs.

use std::time::Duration;

use reqwest::{
	Client, Url,
	header::{ACCEPT, USER_AGENT},
};
use serde_json::Value;

use crate::{Error, Result};

pub const PROVIDER: &str = "GitHub";

const API_ACCEPT: &str = "application/vnd.github+json";

/// Authorization URL the browser is sent to. `state` is echoed back on the callback.
pub fn authorize_url(
	cfg: &eusko_config::GithubConfig,
	client_id: &str,
	state: &str,
) -> Result<String> {
	let mut params = vec![("client_id", client_id.to_string())];

	if let Some(callback_url) = cfg.callback_url.as_deref() {
		params.push(("redirect_uri", callback_url.to_string()));
	}

	params.push(("scope", cfg.scopes.join(" ")));
	params.push(("state", state.to_string()));

	let url = Url::parse_with_params(&cfg.authorize_url, &params).map_err(|err| {
		Error::InvalidResponse { message: format!("Invalid GitHub authorize URL: {err}.") }
	})?;

	Ok(url.into())
}

/// Exchanges an authorization code for an access token.
///
/// GitHub answers token errors with HTTP 200 and an `error` field, so success is decided by the
/// presence of `access_token`. Failures carry the raw response body.
pub async fn exchange_code(
	cfg: &eusko_config::GithubConfig,
	client_id: &str,
	code: &str,
) -> Result<String> {
	let client = client(cfg)?;
	let mut body = serde_json::json!({
		"client_id": client_id,
		"client_secret": cfg.client_secret,
		"code": code,
	});

	if let Some(callback_url) = cfg.callback_url.as_deref() {
		body["redirect_uri"] = Value::String(callback_url.to_string());
	}

	let res = client
		.post(&cfg.token_url)
		.header(ACCEPT, "application/json")
		.header(USER_AGENT, cfg.user_agent.as_str())
		.json(&body)
		.send()
		.await?;
	let status = res.status();
	let raw = res.text().await?;

	parse_access_token(&raw).ok_or_else(|| Error::Status {
		provider: PROVIDER,
		status: status.as_u16(),
		body: crate::excerpt(&raw),
	})
}

pub async fn fetch_profile(cfg: &eusko_config::GithubConfig, access_token: &str) -> Result<Value> {
	get_json(cfg, "/user", access_token).await
}

pub async fn fetch_emails(cfg: &eusko_config::GithubConfig, access_token: &str) -> Result<Value> {
	get_json(cfg, "/user/emails", access_token).await
}

async fn get_json(cfg: &eusko_config::GithubConfig, path: &str, access_token: &str) -> Result<Value> {
	let client = client(cfg)?;
	let url = format!("{}{}", cfg.api_base, path);
	let res = client
		.get(url)
		.headers(crate::bearer_headers(access_token, API_ACCEPT, &cfg.user_agent)?)
		.send()
		.await?;

	crate::read_json(PROVIDER, res).await
}

fn client(cfg: &eusko_config::GithubConfig) -> Result<Client> {
	Ok(Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?)
}

fn parse_access_token(raw: &str) -> Option<String> {
	let json: Value = serde_json::from_str(raw).ok()?;

	json.get("access_token")
		.and_then(Value::as_str)
		.map(str::trim)
		.filter(|token| !token.is_empty())
		.map(str::to_string)
}
