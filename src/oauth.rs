//! Identity-provider wire facade: request builders, token payloads, and error mapping.
//!
//! Requests are plain [`HttpRequest`] values so any [`TokenHttpClient`](crate::http::TokenHttpClient)
//! can carry them. Responses are parsed with `serde_path_to_error`, so a malformed payload
//! reports the offending field path.

pub use oauth2;

// crates.io
use oauth2::{
	HttpClientError, HttpRequest,
	http::{
		Method, Request,
		header::{ACCEPT, CONTENT_TYPE},
	},
};
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	auth::{TokenSecret, TokenSet},
	error::{ConfigError, ProviderError, ResponseError, TransportError, body_preview},
	http::{RawResponse, ResponseMetadata},
	obs::FlowKind,
	provider::{GrantType, ProviderErrorContext, ProviderStrategy},
};

/// Lifetime assumed when the token endpoint omits `expires_in`.
pub const DEFAULT_EXPIRES_IN: Duration = Duration::seconds(3600);

/// Maps HTTP transport failures into broker [`Error`] values.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Converts an [`HttpClientError`] emitted by the transport into a broker error.
	fn map_transport_error(
		&self,
		flow: FlowKind,
		metadata: Option<&ResponseMetadata>,
		error: HttpClientError<E>,
	) -> Error;
}

/// Mapper for arbitrary transports: every typed transport failure becomes a network error.
#[derive(Clone, Debug, Default)]
pub struct GenericTransportErrorMapper;
impl<E> TransportErrorMapper<E> for GenericTransportErrorMapper
where
	E: 'static + Send + Sync + StdError,
{
	fn map_transport_error(
		&self,
		flow: FlowKind,
		meta: Option<&ResponseMetadata>,
		err: HttpClientError<E>,
	) -> Error {
		match err {
			HttpClientError::Reqwest(inner) => TransportError::Network { flow, source: inner }.into(),
			other => map_untyped_transport_error(flow, meta, other),
		}
	}
}

/// Default mapper for reqwest-backed transports.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
#[cfg(feature = "reqwest")]
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(
		&self,
		flow: FlowKind,
		meta: Option<&ResponseMetadata>,
		err: HttpClientError<ReqwestError>,
	) -> Error {
		match err {
			HttpClientError::Reqwest(inner) => map_reqwest_error(flow, *inner),
			other => map_untyped_transport_error(flow, meta, other),
		}
	}
}

#[cfg(feature = "reqwest")]
fn map_reqwest_error(flow: FlowKind, err: ReqwestError) -> Error {
	if err.is_builder() {
		return ConfigError::from(err).into();
	}
	if err.is_timeout() {
		return TransportError::Timeout { flow }.into();
	}

	TransportError::network(flow, err).into()
}

fn map_untyped_transport_error<E>(
	flow: FlowKind,
	meta: Option<&ResponseMetadata>,
	err: HttpClientError<E>,
) -> Error
where
	E: 'static + Send + Sync + StdError,
{
	match err {
		HttpClientError::Http(inner) => ConfigError::from(inner).into(),
		HttpClientError::Io(inner) => TransportError::Io(inner).into(),
		HttpClientError::Other(message) => TransportError::Other { flow, message }.into(),
		_ => {
			let message = match meta.and_then(|value| value.status) {
				Some(status) => format!("unclassified failure after HTTP {status}"),
				None => "unclassified failure".into(),
			};

			TransportError::Other { flow, message }.into()
		},
	}
}

/// Builds a form-encoded POST (identity endpoints).
pub(crate) fn form_request(url: &Url, form: &BTreeMap<String, String>) -> Result<HttpRequest> {
	let body = url::form_urlencoded::Serializer::new(String::new()).extend_pairs(form.iter()).finish();

	Request::builder()
		.method(Method::POST)
		.uri(url.as_str())
		.header(CONTENT_TYPE, "application/x-www-form-urlencoded")
		.header(ACCEPT, "application/json")
		.body(body.into_bytes())
		.map_err(|e| ConfigError::from(e).into())
}

/// Builds a JSON POST (platform endpoints) with optional extra headers.
pub(crate) fn json_request<T>(
	url: &Url,
	payload: &T,
	headers: &[(&'static str, &str)],
) -> Result<HttpRequest>
where
	T: Serialize,
{
	let body = serde_json::to_vec(payload).map_err(ConfigError::RequestBody)?;
	let mut builder = Request::builder()
		.method(Method::POST)
		.uri(url.as_str())
		.header(CONTENT_TYPE, "application/json")
		.header(ACCEPT, "application/json");

	for (name, value) in headers {
		builder = builder.header(*name, *value);
	}

	builder.body(body).map_err(|e| ConfigError::from(e).into())
}

/// Deserializes a JSON body, reporting the failing field path.
pub(crate) fn parse_json<T>(flow: FlowKind, response: &RawResponse) -> Result<T>
where
	T: DeserializeOwned,
{
	let mut de = serde_json::Deserializer::from_slice(&response.body);

	serde_path_to_error::deserialize(&mut de)
		.map_err(|source| ResponseError::Parse { flow, status: response.status, source }.into())
}

/// Builds the terminal [`ProviderError`] for a non-200 identity response.
///
/// Bodies that are not OAuth error payloads are reported as `unknown` with a truncated preview.
pub(crate) fn provider_error(
	strategy: &dyn ProviderStrategy,
	grant: GrantType,
	response: &RawResponse,
) -> ProviderError {
	let payload = serde_json::from_slice::<OAuthErrorResponse>(&response.body).ok();
	let (error, description, preview) = match payload {
		Some(payload) => (payload.error, payload.error_description, None),
		None => ("unknown".to_owned(), None, Some(body_preview(&response.body))),
	};
	let ctx = ProviderErrorContext::new(grant)
		.with_http_status(response.status)
		.with_oauth_error(error.clone())
		.with_error_description(description.clone());

	ProviderError {
		grant,
		kind: strategy.classify_token_error(&ctx),
		status: response.status,
		error,
		description,
		body_preview: preview,
	}
}

/// `{error, error_description}` payload returned by the identity provider.
#[derive(Clone, Debug, Deserialize)]
pub(crate) struct OAuthErrorResponse {
	pub error: String,
	#[serde(default)]
	pub error_description: Option<String>,
}

/// Device authorization response.
#[derive(Clone, Debug, Deserialize)]
pub(crate) struct DeviceCodeResponse {
	pub device_code: String,
	pub user_code: String,
	#[serde(alias = "verification_url")]
	pub verification_uri: String,
	#[serde(default)]
	pub message: Option<String>,
	#[serde(default, deserialize_with = "deserialize_seconds")]
	pub interval: Option<i64>,
	#[serde(default, deserialize_with = "deserialize_seconds")]
	pub expires_in: Option<i64>,
}

/// Successful token endpoint response.
#[derive(Clone, Debug, Deserialize)]
pub(crate) struct TokenResponse {
	pub access_token: String,
	#[serde(default)]
	pub refresh_token: Option<String>,
	#[serde(default)]
	pub id_token: Option<String>,
	#[serde(default)]
	pub token_type: Option<String>,
	#[serde(default)]
	pub scope: Option<String>,
	#[serde(default, deserialize_with = "deserialize_seconds")]
	pub expires_in: Option<i64>,
}
impl TokenResponse {
	/// Converts the payload into a fresh [`TokenSet`].
	///
	/// Omitted (or empty) optional fields fall back to `previous`, then to `requested_scope` and
	/// `Bearer`. `expires_at` becomes `issued_at + expires_in`.
	pub(crate) fn into_token_set(
		self,
		issued_at: OffsetDateTime,
		previous: Option<&TokenSet>,
		requested_scope: &str,
	) -> Result<TokenSet> {
		let expires_in =
			self.expires_in.map(|secs| Duration::seconds(secs.max(0))).unwrap_or(DEFAULT_EXPIRES_IN);
		let refresh_token = non_empty(self.refresh_token)
			.map(TokenSecret::new)
			.or_else(|| previous.and_then(|set| set.refresh_token.clone()));
		let id_token = non_empty(self.id_token)
			.map(TokenSecret::new)
			.or_else(|| previous.and_then(|set| set.id_token.clone()));
		let token_type = non_empty(self.token_type)
			.or_else(|| previous.map(|set| set.token_type.clone()))
			.unwrap_or_else(|| "Bearer".into());
		let scope = non_empty(self.scope)
			.or_else(|| previous.map(|set| set.scope.clone()).filter(|scope| !scope.is_empty()))
			.unwrap_or_else(|| requested_scope.to_owned());

		TokenSet::builder()
			.access_token(self.access_token)
			.maybe_refresh_token(refresh_token)
			.maybe_id_token(id_token)
			.token_type(token_type)
			.scope(scope)
			.issued_at(issued_at)
			.expires_in(expires_in)
			.build()
			.map_err(|e| ConfigError::from(e).into())
	}
}

fn non_empty(value: Option<String>) -> Option<String> {
	value.filter(|value| !value.trim().is_empty())
}

/// Accepts either a JSON number or a numeric string.
fn deserialize_seconds<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
	D: serde::Deserializer<'de>,
{
	#[derive(Deserialize)]
	#[serde(untagged)]
	enum Seconds {
		Number(i64),
		Text(String),
	}

	Ok(match Option::<Seconds>::deserialize(deserializer)? {
		Some(Seconds::Number(value)) => Some(value),
		Some(Seconds::Text(value)) => value.trim().parse().ok(),
		None => None,
	})
}
