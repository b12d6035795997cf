//! GitHub login: authorization redirect, callback verification, and local identity binding.

use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::{EuskoService, Error, Result, UserView, credential};
use eusko_config::GithubConfig;
use eusko_domain::email;
use eusko_providers::github;
use eusko_storage::{models::User, queries};

#[derive(Clone, Debug)]
pub struct FederationStart {
	pub authorize_url: String,
	/// Nonce the caller must persist and hand back to [`EuskoService::complete_federation`].
	pub state: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct FederationCallback {
	pub code: Option<String>,
	pub state: Option<String>,
}

#[derive(Clone, Debug)]
pub struct FederationRedirect {
	pub location: String,
	pub user: UserView,
}

impl EuskoService {
	pub fn begin_federation(&self) -> Result<FederationStart> {
		let (cfg, client_id) = self.github()?;
		let state = Uuid::new_v4().simple().to_string();
		let authorize_url = github::authorize_url(cfg, client_id, &state)?;

		Ok(FederationStart { authorize_url, state })
	}

	/// Completes a callback. `expected_state` is the nonce issued by [`Self::begin_federation`].
	pub async fn complete_federation(
		&self,
		callback: FederationCallback,
		expected_state: Option<&str>,
	) -> Result<FederationRedirect> {
		let code = match callback.code.as_deref().map(str::trim) {
			Some(code) if !code.is_empty() => code,
			_ => return Err(Error::invalid_request("Missing authorization code.")),
		};

		match (callback.state.as_deref(), expected_state) {
			(Some(state), Some(expected)) if !state.is_empty() && state == expected => {},
			_ => return Err(Error::unauthorized("OAuth state mismatch.")),
		}

		let (cfg, client_id) = self.github()?;
		let access_token = self.providers.identity.exchange_code(cfg, client_id, code).await?;
		let profile = self.providers.identity.fetch_profile(cfg, &access_token).await?;
		let emails = match self.providers.identity.fetch_emails(cfg, &access_token).await {
			Ok(emails) => emails,
			Err(
				err @ (eusko_providers::Error::Status { .. }
				| eusko_providers::Error::InvalidResponse { .. }
				| eusko_providers::Error::SerdeJson(_)),
			) => {
				tracing::warn!(error = %err, "GitHub emails unavailable. Falling back to profile.");

				Value::Null
			},
			Err(err) => return Err(err.into()),
		};
		let Some(address) = email::resolve_provider_email(&profile, &emails) else {
			return Err(Error::Upstream {
				message: "GitHub account has no usable email address.".to_string(),
			});
		};
		let display_name = email::provider_display_name(&profile);
		let user = self.bind_identity(&address, display_name.as_deref()).await?;
		let view = UserView::from(&user);
		let token = self.tokens.issue(&view)?;
		let location = frontend_redirect(&self.cfg.service.frontend_url, &token)?;

		tracing::info!(user_id = view.id, "Completed GitHub login.");

		Ok(FederationRedirect { location, user: view })
	}

	/// Finds or creates the local user for a provider email, backfilling an empty name.
	async fn bind_identity(&self, address: &str, display_name: Option<&str>) -> Result<User> {
		let existing = match queries::find_user_by_email(&self.db, address).await? {
			Some(user) => user,
			None => {
				let hash = credential::unusable_credential()?;

				match queries::insert_user(&self.db, address, display_name, &hash).await {
					Ok(user) => return Ok(user),
					Err(eusko_storage::Error::Conflict(_)) =>
						queries::find_user_by_email(&self.db, address).await?.ok_or_else(|| {
							Error::Storage {
								message: "User vanished after a concurrent insert.".to_string(),
							}
						})?,
					Err(err) => return Err(err.into()),
				}
			},
		};
		let missing_name = existing.name.as_deref().map(str::trim).is_none_or(str::is_empty);

		match display_name {
			Some(name) if missing_name => Ok(queries::update_user_name(&self.db, existing.id, name)
				.await?
				.unwrap_or(existing)),
			_ => Ok(existing),
		}
	}

	fn github(&self) -> Result<(&GithubConfig, &str)> {
		let cfg = self.cfg.providers.github.as_ref();

		cfg.and_then(|cfg| cfg.client_id.as_deref().map(|client_id| (cfg, client_id))).ok_or_else(
			|| Error::Configuration { message: "GitHub login is not configured.".to_string() },
		)
	}
}

fn frontend_redirect(frontend_url: &str, token: &str) -> Result<String> {
	let url = Url::parse_with_params(frontend_url, [("token", token)]).map_err(|err| {
		Error::Configuration { message: format!("Invalid frontend URL: {err}.") }
	})?;

	Ok(url.into())
}
