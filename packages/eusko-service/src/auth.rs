//! Password registration, login, and token introspection.

use serde::{Deserialize, Serialize};

use crate::{EuskoService, Error, Result, UserView, credential};
use eusko_domain::email::is_plausible_email;
use eusko_storage::queries;

const INVALID_CREDENTIALS: &str = "Invalid credentials.";

#[derive(Clone, Debug, Deserialize)]
pub struct RegisterRequest {
	#[serde(default)]
	pub email: Option<String>,
	#[serde(default)]
	pub name: Option<String>,
	#[serde(default)]
	pub password: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct LoginRequest {
	#[serde(default)]
	pub email: Option<String>,
	#[serde(default)]
	pub password: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct AuthResponse {
	pub user: UserView,
	pub token: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct MeResponse {
	pub user: UserView,
}

impl EuskoService {
	pub async fn register(&self, req: RegisterRequest) -> Result<AuthResponse> {
		let email = required(req.email.as_deref(), "email")?.trim();
		let password = required(req.password.as_deref(), "password")?;

		if !is_plausible_email(email) {
			return Err(Error::invalid_request("email is not a valid address."));
		}
		if queries::find_user_by_email(&self.db, email).await?.is_some() {
			return Err(Error::Conflict { message: "Email is already registered.".to_string() });
		}

		let name = req.name.as_deref().map(str::trim).filter(|name| !name.is_empty());
		let hash = credential::hash_password(password)?;
		let user = queries::insert_user(&self.db, email, name, &hash).await.map_err(|err| {
			match err {
				eusko_storage::Error::Conflict(_) =>
					Error::Conflict { message: "Email is already registered.".to_string() },
				err => err.into(),
			}
		})?;

		tracing::info!(user_id = user.id, "Registered user.");

		self.authenticated(UserView::from(&user))
	}

	pub async fn login(&self, req: LoginRequest) -> Result<AuthResponse> {
		let email = required(req.email.as_deref(), "email")?.trim();
		let password = required(req.password.as_deref(), "password")?;
		let Some(user) = queries::find_user_by_email(&self.db, email).await? else {
			return Err(Error::unauthorized(INVALID_CREDENTIALS));
		};

		if !credential::verify_password(password, &user.password_hash) {
			return Err(Error::unauthorized(INVALID_CREDENTIALS));
		}

		self.authenticated(UserView::from(&user))
	}

	/// The user behind a verified token. A token for a user that no longer exists is rejected.
	pub async fn me(&self, token: &str) -> Result<MeResponse> {
		let user_id = self.authenticate(token)?;
		let user = queries::find_user_by_id(&self.db, user_id)
			.await?
			.ok_or_else(|| Error::unauthorized("User not found."))?;

		Ok(MeResponse { user: UserView::from(&user) })
	}

	pub(crate) fn authenticated(&self, user: UserView) -> Result<AuthResponse> {
		let token = self.tokens.issue(&user)?;

		Ok(AuthResponse { user, token })
	}
}

/// Rejects absent and blank values. The value itself is returned untrimmed.
fn required<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str> {
	match value {
		Some(value) if !value.trim().is_empty() => Ok(value),
		_ => Err(Error::invalid_request(format!("{field} is required."))),
	}
}
