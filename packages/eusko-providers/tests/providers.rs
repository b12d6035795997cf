use reqwest::header::{ACCEPT, AUTHORIZATION, USER_AGENT};

#[test]
fn builds_bearer_auth_headers() {
	let headers = eusko_providers::bearer_headers("secret", "application/json", "eusko-test")
		.expect("Failed to build headers.");
	let value = headers.get(AUTHORIZATION).expect("Missing authorization header.");

	assert_eq!(value, "Bearer secret");
	assert_eq!(headers.get(ACCEPT).expect("Missing accept header."), "application/json");
	assert_eq!(headers.get(USER_AGENT).expect("Missing user agent header."), "eusko-test");
}

#[test]
fn rejects_header_injection() {
	assert!(eusko_providers::bearer_headers("bad\ntoken", "application/json", "ua").is_err());
}

#[tokio::test]
async fn unreachable_recommender_is_an_error() {
	let cfg = eusko_config::RecommenderConfig {
		api_base: "http://127.0.0.1:1".to_string(),
		path: "/rank".to_string(),
		timeout_ms: 500,
	};
	let err = eusko_providers::recommender::rank(&cfg, Some(7))
		.await
		.expect_err("Expected connection failure.");

	assert!(matches!(err, eusko_providers::Error::Reqwest(_)), "Unexpected error: {err:?}");
}
