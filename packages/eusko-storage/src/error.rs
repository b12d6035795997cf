#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Sqlx(#[from] sqlx::Error),
	#[error("Conflict: {0}")]
	Conflict(String),
	#[error(transparent)]
	Http(#[from] reqwest::Error),
	#[error("Index responded with status {status}: {body}")]
	IndexStatus { status: u16, body: String },
	#[error("Invalid index response: {0}")]
	InvalidResponse(String),
}
