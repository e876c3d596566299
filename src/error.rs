//! Broker-level error types shared across flows, stores, and the platform exchange.

// self
use crate::{
	_prelude::*,
	obs::FlowKind,
	provider::{GrantType, ProviderErrorKind},
	xbl::ExchangeReport,
};

/// Broker-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical broker error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS, timeout).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Upstream answered with a payload the broker could not interpret.
	#[error(transparent)]
	Response(#[from] ResponseError),
	/// Identity provider terminally rejected a device-code or refresh request.
	#[error(transparent)]
	Provider(#[from] ProviderError),

	/// The device-code window elapsed before the user finished signing in.
	#[error("Device code expired before the sign-in was completed.")]
	DeviceCodeExpired,
	/// The device-code poll loop was aborted by an external cancellation signal.
	#[error("Device code login was cancelled.")]
	Cancelled,
	/// Every user-token candidate was rejected.
	#[error(
		"Platform user authentication failed after {} attempts. First attempts: {}.",
		.0.len(),
		.0.digest()
	)]
	ExchangeExhausted(ExchangeReport),
	/// The session-token stage rejected the platform user token.
	#[error("Session token authorization failed with HTTP {status}: {body_preview}.")]
	Authorization {
		/// HTTP status returned by the authorization endpoint.
		status: u16,
		/// Truncated response body.
		body_preview: String,
	},
}

/// Configuration and validation failures raised before any network call.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// Request body could not be serialized.
	#[error("Request body could not be serialized.")]
	RequestBody(#[source] serde_json::Error),
	/// Endpoint URL could not be derived from the configured authority.
	#[error("Endpoint URL is invalid.")]
	InvalidEndpoint {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Provider descriptor failed validation.
	#[error(transparent)]
	Descriptor(#[from] crate::provider::ProviderDescriptorError),
	/// A required setting is absent or blank.
	#[error("Required setting `{name}` is missing.")]
	MissingSetting {
		/// Setting (environment variable) name.
		name: &'static str,
	},
	/// No cache path was supplied and no configuration directory exists.
	#[error("No token cache path configured and no user configuration directory is available.")]
	MissingCacheDirectory,
	/// Captured redirect URL could not be turned into a ticket.
	#[error("Captured redirect URL is unusable: {reason}.")]
	InvalidRedirect {
		/// What was missing.
		reason: &'static str,
	},
	/// Cached token set is missing a refresh token.
	#[error("Cached token set is missing a refresh token.")]
	MissingRefreshToken,
	/// Token set could not be assembled from the provider payload.
	#[error(transparent)]
	TokenSet(#[from] crate::auth::TokenSetBuilderError),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Terminal rejection reported by the identity provider.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error(
	"Identity provider rejected the {grant} request (HTTP {status}): {error}{}.",
	description_suffix(.description)
)]
pub struct ProviderError {
	/// Grant the failing request belonged to.
	pub grant: GrantType,
	/// Strategy classification of the OAuth error code.
	pub kind: ProviderErrorKind,
	/// HTTP status code.
	pub status: u16,
	/// OAuth `error` field, or `unknown` when the body was not an OAuth error payload.
	pub error: String,
	/// OAuth `error_description` field.
	pub description: Option<String>,
	/// Truncated raw body for payloads that were not OAuth errors.
	pub body_preview: Option<String>,
}

/// Malformed or unexpected upstream payloads.
#[derive(Debug, ThisError)]
pub enum ResponseError {
	/// Endpoint responded with JSON that does not match the expected shape.
	#[error("The {flow} endpoint returned malformed JSON (HTTP {status}).")]
	Parse {
		/// Flow that issued the request.
		flow: FlowKind,
		/// HTTP status code.
		status: u16,
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Platform response carried no `xui` display claim.
	#[error("The {flow} response did not include a user hash claim.")]
	MissingUserHash {
		/// Flow that issued the request.
		flow: FlowKind,
	},
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the {flow} endpoint.")]
	Network {
		/// Flow that issued the request.
		flow: FlowKind,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Request exceeded the per-request timeout.
	#[error("Request to the {flow} endpoint timed out.")]
	Timeout {
		/// Flow that issued the request.
		flow: FlowKind,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling an upstream endpoint.")]
	Io(#[from] std::io::Error),
	/// HTTP client reported a failure without a typed source.
	#[error("HTTP client error occurred while calling the {flow} endpoint: {message}.")]
	Other {
		/// Flow that issued the request.
		flow: FlowKind,
		/// Client-supplied description.
		message: String,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(flow: FlowKind, src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { flow, source: Box::new(src) }
	}
}

fn description_suffix(description: &Option<String>) -> String {
	description.as_deref().map(|value| format!(" - {value}")).unwrap_or_default()
}

/// Truncates upstream bodies so diagnostics stay bounded.
pub(crate) fn body_preview(body: &[u8]) -> String {
	const BODY_PREVIEW_LIMIT: usize = 256;

	let text = String::from_utf8_lossy(body);
	let text = text.trim();

	if text.chars().count() <= BODY_PREVIEW_LIMIT {
		return text.replace('\n', "\\n");
	}

	let mut buf: String = text.chars().take(BODY_PREVIEW_LIMIT).collect();

	buf.push('…');

	buf.replace('\n', "\\n")
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn body_preview_truncates_long_bodies() {
		let long = "x".repeat(400);
		let preview = body_preview(long.as_bytes());

		assert_eq!(preview.chars().count(), 257);
		assert!(preview.ends_with('…'));
		assert_eq!(body_preview(b"line one\nline two"), "line one\\nline two");
	}

	#[test]
	fn provider_error_display_includes_description() {
		let err = ProviderError {
			grant: GrantType::RefreshToken,
			kind: ProviderErrorKind::InvalidGrant,
			status: 400,
			error: "invalid_grant".into(),
			description: Some("AADSTS70000: grant expired".into()),
			body_preview: None,
		};

		assert_eq!(
			err.to_string(),
			"Identity provider rejected the refresh_token request (HTTP 400): invalid_grant - AADSTS70000: grant expired."
		);
	}
}
