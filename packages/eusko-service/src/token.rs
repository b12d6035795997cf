//! Signed bearer tokens (HS256).

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::{Error, Result, UserView};

const INVALID_TOKEN: &str = "Invalid or expired token.";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
	/// Decimal user id.
	pub sub: String,
	pub email: String,
	pub name: Option<String>,
	pub iat: i64,
	pub exp: i64,
}
impl Claims {
	pub fn user_id(&self) -> Result<i64> {
		self.sub.parse().map_err(|_| Error::unauthorized(INVALID_TOKEN))
	}
}

#[derive(Clone)]
pub struct TokenIssuer {
	encoding: EncodingKey,
	decoding: DecodingKey,
	validation: Validation,
	ttl: Duration,
}
impl TokenIssuer {
	pub fn new(secret: &str, ttl: Duration) -> Result<Self> {
		if secret.is_empty() {
			return Err(Error::Configuration { message: "Token secret must be set.".to_string() });
		}
		if ttl <= Duration::ZERO {
			return Err(Error::Configuration {
				message: "Token lifetime must be positive.".to_string(),
			});
		}

		let mut validation = Validation::new(Algorithm::HS256);

		validation.leeway = 0;
		validation.set_required_spec_claims(&["exp", "sub"]);

		Ok(Self {
			encoding: EncodingKey::from_secret(secret.as_bytes()),
			decoding: DecodingKey::from_secret(secret.as_bytes()),
			validation,
			ttl,
		})
	}

	pub fn from_config(cfg: &eusko_config::Security) -> Result<Self> {
		Self::new(&cfg.token_secret, Duration::days(cfg.token_ttl_days))
	}

	pub fn ttl(&self) -> Duration {
		self.ttl
	}

	pub fn issue(&self, user: &UserView) -> Result<String> {
		self.issue_at(user, OffsetDateTime::now_utc())
	}

	pub fn issue_at(&self, user: &UserView, issued_at: OffsetDateTime) -> Result<String> {
		let expires_at = issued_at.checked_add(self.ttl).ok_or_else(|| Error::Configuration {
			message: "Token expiry is out of range.".to_string(),
		})?;
		let claims = Claims {
			sub: user.id.to_string(),
			email: user.email.clone(),
			name: user.name.clone(),
			iat: issued_at.unix_timestamp(),
			exp: expires_at.unix_timestamp(),
		};

		jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(
			|err| Error::Configuration { message: format!("Failed to sign token: {err}.") },
		)
	}

	/// Every failure (signature, structure, algorithm, expiry) is the same `Unauthorized`.
	pub fn verify(&self, token: &str) -> Result<Claims> {
		jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
			.map(|data| data.claims)
			.map_err(|err| {
				tracing::debug!(error = %err, "Rejected bearer token.");

				Error::unauthorized(INVALID_TOKEN)
			})
	}
}
