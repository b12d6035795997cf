pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Conflict: {message}")]
	Conflict { message: String },
	#[error("Unauthorized: {message}")]
	Unauthorized { message: String },
	#[error("Upstream error: {message}")]
	Upstream { message: String },
	#[error("Configuration error: {message}")]
	Configuration { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
}
impl Error {
	pub fn invalid_request(message: impl Into<String>) -> Self {
		Self::InvalidRequest { message: message.into() }
	}

	pub fn unauthorized(message: impl Into<String>) -> Self {
		Self::Unauthorized { message: message.into() }
	}
}

impl From<sqlx::Error> for Error {
	fn from(err: sqlx::Error) -> Self {
		Self::Storage { message: err.to_string() }
	}
}

impl From<eusko_storage::Error> for Error {
	fn from(err: eusko_storage::Error) -> Self {
		match err {
			eusko_storage::Error::Sqlx(inner) => Self::Storage { message: inner.to_string() },
			eusko_storage::Error::Conflict(message) => Self::Conflict { message },
			eusko_storage::Error::Http(inner) => Self::Upstream { message: inner.to_string() },
			err @ (eusko_storage::Error::IndexStatus { .. }
			| eusko_storage::Error::InvalidResponse(_)) => Self::Upstream { message: err.to_string() },
		}
	}
}

impl From<eusko_providers::Error> for Error {
	fn from(err: eusko_providers::Error) -> Self {
		Self::Upstream { message: err.to_string() }
	}
}
