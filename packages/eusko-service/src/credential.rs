//! Argon2id password credentials stored as PHC strings.

use argon2::{
	Argon2, PasswordHash, PasswordHasher as _, PasswordVerifier as _, password_hash::SaltString,
};
use uuid::Uuid;

use crate::{Error, Result};

pub fn hash_password(password: &str) -> Result<String> {
	let salt = SaltString::encode_b64(Uuid::new_v4().as_bytes()).map_err(|err| {
		Error::Configuration { message: format!("Failed to build credential salt: {err}.") }
	})?;
	let hash = Argon2::default().hash_password(password.as_bytes(), &salt).map_err(|err| {
		Error::Configuration { message: format!("Failed to hash credential: {err}.") }
	})?;

	Ok(hash.to_string())
}

/// False for a wrong password and for a stored value that is not a PHC string.
pub fn verify_password(password: &str, stored: &str) -> bool {
	let Ok(parsed) = PasswordHash::new(stored) else {
		return false;
	};

	Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok()
}

/// Credential for accounts created through federation. The secret is discarded after hashing.
pub fn unusable_credential() -> Result<String> {
	hash_password(&Uuid::new_v4().simple().to_string())
}
