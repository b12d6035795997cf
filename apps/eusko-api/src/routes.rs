use axum::{
	Json, Router,
	extract::{
		FromRequestParts, Path, Query, State,
		rejection::{JsonRejection, PathRejection, QueryRejection},
	},
	http::{
		HeaderMap, HeaderValue, Method, StatusCode,
		header::{AUTHORIZATION, CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE},
		request::Parts,
	},
	response::{Html, IntoResponse, Response},
	routing::{delete, get, post},
};
use cookie::{Cookie, SameSite, time::Duration};
use reqwest::Url;
use serde::Serialize;
use serde_json::{Value, json};
use tower_http::cors::CorsLayer;

use crate::state::AppState;
use eusko_domain::{document::Destination, query::SearchQuery};
use eusko_service::{
	AddFavorite, AddFavoriteRequest, AuthResponse, CategoriesQuery, Error, FavoriteView,
	FederationCallback, LoginRequest, MeResponse, RankQuery, RegisterRequest,
};

pub const OAUTH_STATE_COOKIE: &str = "eusko_oauth_state";

const OAUTH_COOKIE_PATH: &str = "/auth/github";

pub fn router(state: AppState) -> Router {
	let cors = cors_layer(&state.service.cfg.service.frontend_url);

	Router::new()
		.route("/health", get(health))
		.route("/api/auth/register", post(register))
		.route("/api/auth/login", post(login))
		.route("/api/auth/me", get(me))
		.route("/auth/github/login", get(github_login))
		.route("/auth/github/callback", get(github_callback))
		.route("/api/destinos", get(search))
		.route("/api/categorias", get(categories))
		.route("/api/recomendador/rank", get(rank))
		.route("/api/favoritos", get(list_favorites).post(add_favorite))
		.route("/api/favoritos/full", get(list_favorites_enriched))
		.route("/api/favoritos/{id}", delete(remove_favorite))
		.layer(cors)
		.with_state(state)
}

/// Raw bearer token from the `Authorization` header.
pub struct BearerToken(pub String);
impl<S> FromRequestParts<S> for BearerToken
where
	S: Send + Sync,
{
	type Rejection = ApiError;

	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		read_bearer_token(&parts.headers)
			.map(|token| Self(token.to_string()))
			.ok_or_else(|| Error::unauthorized("Missing bearer token.").into())
	}
}

/// Id of the user behind a verified bearer token.
pub struct AuthUser(pub i64);
impl FromRequestParts<AppState> for AuthUser {
	type Rejection = ApiError;

	async fn from_request_parts(
		parts: &mut Parts,
		state: &AppState,
	) -> Result<Self, Self::Rejection> {
		let BearerToken(token) = BearerToken::from_request_parts(parts, state).await?;

		Ok(Self(state.service.authenticate(&token)?))
	}
}

async fn health(State(state): State<AppState>) -> Json<Value> {
	let report = state.service.health().await;

	Json(json!({ "ok": report.ok(), "db": report.db, "index": report.index }))
}

async fn register(
	State(state): State<AppState>,
	payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
	let response = state.service.register(json_body(payload)?).await?;

	Ok((StatusCode::CREATED, Json(response)))
}

async fn login(
	State(state): State<AppState>,
	payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, ApiError> {
	let response = state.service.login(json_body(payload)?).await?;

	Ok(Json(response))
}

async fn me(
	State(state): State<AppState>,
	BearerToken(token): BearerToken,
) -> Result<Json<MeResponse>, ApiError> {
	let response = state.service.me(&token).await?;

	Ok(Json(response))
}

async fn github_login(State(state): State<AppState>) -> Result<Response, ApiError> {
	let start = state.service.begin_federation()?;
	let cfg = &state.service.cfg;
	let cookie = Cookie::build((OAUTH_STATE_COOKIE, start.state))
		.path(OAUTH_COOKIE_PATH)
		.http_only(true)
		.secure(cfg.service.public_url.starts_with("https://"))
		.same_site(SameSite::Lax)
		.max_age(Duration::seconds(cfg.security.oauth_state_ttl_secs))
		.build();

	Ok((
		StatusCode::FOUND,
		[(LOCATION, start.authorize_url), (SET_COOKIE, cookie.to_string())],
	)
		.into_response())
}

async fn github_callback(
	State(state): State<AppState>,
	headers: HeaderMap,
	Query(callback): Query<FederationCallback>,
) -> Response {
	let expected = read_cookie(&headers, OAUTH_STATE_COOKIE);
	let cleared = Cookie::build((OAUTH_STATE_COOKIE, ""))
		.path(OAUTH_COOKIE_PATH)
		.http_only(true)
		.max_age(Duration::ZERO)
		.build()
		.to_string();

	match state.service.complete_federation(callback, expected.as_deref()).await {
		Ok(redirect) =>
			(StatusCode::FOUND, [(LOCATION, redirect.location), (SET_COOKIE, cleared)])
				.into_response(),
		Err(err) => {
			let err = ApiError::from(err);
			let page = error_page(err.status, &err.message);

			(err.status, [(SET_COOKIE, cleared)], Html(page)).into_response()
		},
	}
}

async fn search(
	State(state): State<AppState>,
	query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<Vec<Destination>>, ApiError> {
	let response = state.service.search(&query_params(query)?).await?;

	Ok(Json(response))
}

async fn categories(
	State(state): State<AppState>,
	query: Result<Query<CategoriesQuery>, QueryRejection>,
) -> Result<Json<Vec<String>>, ApiError> {
	let response = state.service.categories(&query_params(query)?).await?;

	Ok(Json(response))
}

async fn rank(
	State(state): State<AppState>,
	query: Result<Query<RankQuery>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
	let response = state.service.rank(&query_params(query)?).await?;

	Ok(Json(response))
}

async fn list_favorites(
	State(state): State<AppState>,
	AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<FavoriteView>>, ApiError> {
	let response = state.service.list_favorites(user_id).await?;

	Ok(Json(response))
}

async fn list_favorites_enriched(
	State(state): State<AppState>,
	AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<Destination>>, ApiError> {
	let response = state.service.list_favorites_enriched(user_id).await?;

	Ok(Json(response))
}

async fn add_favorite(
	State(state): State<AppState>,
	AuthUser(user_id): AuthUser,
	payload: Result<Json<AddFavoriteRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
	let response = match state.service.add_favorite(user_id, json_body(payload)?).await? {
		AddFavorite::Created(row) => (StatusCode::CREATED, Json(row)).into_response(),
		AddFavorite::AlreadyExists =>
			(StatusCode::OK, Json(json!({ "alreadyExists": true }))).into_response(),
	};

	Ok(response)
}

async fn remove_favorite(
	State(state): State<AppState>,
	AuthUser(user_id): AuthUser,
	id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
	let Path(favorite_id) =
		id.map_err(|err| Error::invalid_request(format!("Invalid favorite id: {err}.")))?;

	state.service.remove_favorite(user_id, favorite_id).await?;

	Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	ok: bool,
	error_code: &'static str,
	error: String,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: &'static str,
	message: String,
}
impl ApiError {
	fn new(status: StatusCode, error_code: &'static str, message: impl Into<String>) -> Self {
		Self { status, error_code, message: message.into() }
	}
}

impl From<Error> for ApiError {
	fn from(err: Error) -> Self {
		match err {
			Error::InvalidRequest { message } =>
				ApiError::new(StatusCode::BAD_REQUEST, "INVALID_REQUEST", message),
			Error::Conflict { message } => ApiError::new(StatusCode::CONFLICT, "CONFLICT", message),
			Error::Unauthorized { message } =>
				ApiError::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message),
			Error::Upstream { message } => {
				tracing::error!(error = %message, "Upstream dependency failed.");

				ApiError::new(
					StatusCode::INTERNAL_SERVER_ERROR,
					"UPSTREAM_ERROR",
					"Upstream service error.",
				)
			},
			Error::Configuration { message } => {
				tracing::error!(error = %message, "Gateway is misconfigured.");

				ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "CONFIGURATION_ERROR", message)
			},
			Error::Storage { message } => {
				tracing::error!(error = %message, "Storage request failed.");

				ApiError::new(
					StatusCode::INTERNAL_SERVER_ERROR,
					"STORAGE_ERROR",
					"Internal server error.",
				)
			},
		}
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { ok: false, error_code: self.error_code, error: self.message };

		(self.status, Json(body)).into_response()
	}
}

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
	payload
		.map(|Json(value)| value)
		.map_err(|err| Error::invalid_request(err.body_text()).into())
}

fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, ApiError> {
	query
		.map(|Query(value)| value)
		.map_err(|err| Error::invalid_request(err.body_text()).into())
}

fn read_bearer_token(headers: &HeaderMap) -> Option<&str> {
	let raw = headers.get(AUTHORIZATION)?;
	let value = raw.to_str().ok()?.trim();
	let token = value.strip_prefix("Bearer ")?.trim();

	if token.is_empty() { None } else { Some(token) }
}

fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
	headers
		.get_all(COOKIE)
		.iter()
		.filter_map(|value| value.to_str().ok())
		.flat_map(Cookie::split_parse)
		.filter_map(Result::ok)
		.find(|cookie| cookie.name() == name)
		.map(|cookie| cookie.value().to_string())
		.filter(|value| !value.is_empty())
}

fn cors_layer(frontend_url: &str) -> CorsLayer {
	let origins = frontend_origin(frontend_url)
		.and_then(|origin| HeaderValue::from_str(&origin).ok())
		.into_iter()
		.collect::<Vec<_>>();

	CorsLayer::new()
		.allow_origin(origins)
		.allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
		.allow_headers([AUTHORIZATION, CONTENT_TYPE])
}

/// Serialized origin of `url`, or `None` when it has no tuple origin.
fn frontend_origin(url: &str) -> Option<String> {
	let origin = Url::parse(url).ok()?.origin();

	origin.is_tuple().then(|| origin.ascii_serialization())
}

fn error_page(status: StatusCode, message: &str) -> String {
	format!(
		"<!doctype html>\n<html><head><meta charset=\"utf-8\"><title>Login failed</title></head>\
		 <body><h1>Login failed ({})</h1><p>{}</p></body></html>\n",
		status.as_u16(),
		escape_html(message)
	)
}

fn escape_html(raw: &str) -> String {
	let mut out = String::with_capacity(raw.len());

	for ch in raw.chars() {
		match ch {
			'&' => out.push_str("&amp;"),
			'<' => out.push_str("&lt;"),
			'>' => out.push_str("&gt;"),
			'"' => out.push_str("&quot;"),
			'\'' => out.push_str("&#39;"),
			_ => out.push(ch),
		}
	}

	out
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn frontend_origin_is_scheme_host_and_port() {
		assert_eq!(frontend_origin("http://front.test/app?x=1").as_deref(), Some("http://front.test"));
		assert_eq!(
			frontend_origin("https://euskotrips.eus:8443").as_deref(),
			Some("https://euskotrips.eus:8443")
		);
		assert_eq!(
			frontend_origin("http://user:pw@front.test:8080/app").as_deref(),
			Some("http://front.test:8080")
		);
		assert_eq!(frontend_origin("https://front.test:443/").as_deref(), Some("https://front.test"));
		assert_eq!(frontend_origin("HTTP://Front.Test/").as_deref(), Some("http://front.test"));
	}

	#[test]
	fn frontend_origin_rejects_opaque_urls() {
		assert_eq!(frontend_origin("data:text/plain,hi"), None);
		assert_eq!(frontend_origin("not a url"), None);
	}

	#[test]
	fn bearer_tokens_require_the_scheme_and_a_value() {
		let mut headers = HeaderMap::new();

		assert_eq!(read_bearer_token(&headers), None);

		headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));

		assert_eq!(read_bearer_token(&headers), Some("abc.def"));

		headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));

		assert_eq!(read_bearer_token(&headers), None);

		headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer   "));

		assert_eq!(read_bearer_token(&headers), None);
	}

	#[test]
	fn state_cookie_is_found_among_others() {
		let mut headers = HeaderMap::new();

		headers.insert(
			COOKIE,
			HeaderValue::from_static("theme=dark; eusko_oauth_state=abc123; lang=eu"),
		);

		assert_eq!(read_cookie(&headers, OAUTH_STATE_COOKIE).as_deref(), Some("abc123"));
		assert_eq!(read_cookie(&headers, "missing"), None);
	}

	#[test]
	fn error_pages_escape_messages() {
		let page = error_page(StatusCode::BAD_REQUEST, "<script>");

		assert!(page.contains("Login failed (400)"));
		assert!(page.contains("&lt;script&gt;"));
	}
}
