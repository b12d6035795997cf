pub mod github;
pub mod recommender;

mod error;

pub use error::{Error, Result};

use reqwest::{
	Response,
	header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT},
};
use serde_json::Value;

/// Longest upstream body excerpt kept in an error.
const MAX_ERROR_BODY_CHARS: usize = 1_024;

pub fn bearer_headers(access_token: &str, accept: &str, user_agent: &str) -> Result<HeaderMap> {
	let mut headers = HeaderMap::new();

	headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {access_token}"))?);
	headers.insert(ACCEPT, HeaderValue::from_str(accept)?);
	headers.insert(USER_AGENT, HeaderValue::from_str(user_agent)?);

	Ok(headers)
}

pub(crate) async fn read_json(provider: &'static str, res: Response) -> Result<Value> {
	let status = res.status();
	let body = res.text().await?;

	if !status.is_success() {
		return Err(Error::Status { provider, status: status.as_u16(), body: excerpt(&body) });
	}

	serde_json::from_str(&body).map_err(|err| Error::InvalidResponse {
		message: format!("{provider} returned a non-JSON body ({err}): {}", excerpt(&body)),
	})
}

pub(crate) fn excerpt(body: &str) -> String {
	body.chars().take(MAX_ERROR_BODY_CHARS).collect()
}
