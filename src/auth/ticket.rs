//! Identity bearer tickets fed into the platform exchange.
//!
//! A ticket pairs the decoded access token with the raw form it arrived in, when the two can
//! differ (a token captured from a redirect fragment may still carry `%XX` escapes).

// self
use crate::{
	_prelude::*,
	auth::{TokenSecret, TokenSet},
	error::ConfigError,
};

/// Future returned by [`InteractiveTokenSource::capture`].
pub type CaptureFuture<'a> = Pin<Box<dyn Future<Output = Result<CapturedRedirect>> + 'a + Send>>;

/// Decoded and (optionally) raw representation of one identity access token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdentityTicket {
	/// Percent-decoded token.
	pub decoded: TokenSecret,
	/// Token exactly as received, possibly still percent-escaped.
	pub raw: Option<TokenSecret>,
}
impl IdentityTicket {
	/// Ticket with only a decoded form.
	pub fn new(decoded: impl Into<String>) -> Self {
		Self { decoded: TokenSecret::new(decoded), raw: None }
	}

	/// Ticket carrying both representations.
	pub fn with_raw(decoded: impl Into<String>, raw: impl Into<String>) -> Self {
		Self { decoded: TokenSecret::new(decoded), raw: Some(TokenSecret::new(raw)) }
	}

	/// Ticket for a token obtained from the token endpoint (no raw form exists).
	pub fn from_token_set(set: &TokenSet) -> Self {
		Self { decoded: set.access_token.clone(), raw: None }
	}
}

/// Token material captured from an interactive browser redirect.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CapturedRedirect {
	/// Access token in both representations.
	pub ticket: IdentityTicket,
	/// Refresh token, if the fragment carried one.
	pub refresh_token: Option<TokenSecret>,
	/// `token_type` fragment value.
	pub token_type: Option<String>,
	/// `expires_in` fragment value, in seconds.
	pub expires_in: Option<i64>,
	/// `scope` fragment value.
	pub scope: Option<String>,
	/// `user_id` fragment value.
	pub user_id: Option<String>,
}
impl CapturedRedirect {
	/// Parses a redirect URL of the form `...#access_token=...&token_type=...`.
	///
	/// Fragment values are percent-decoded without turning `+` into a space, and the raw
	/// `access_token` value is kept verbatim alongside the decoded one.
	pub fn from_redirect_url(url: &str) -> Result<Self> {
		let (_, fragment) = url
			.split_once('#')
			.ok_or(ConfigError::InvalidRedirect { reason: "the URL has no fragment" })?;
		let mut raw = HashMap::new();

		for part in fragment.split('&').filter(|part| !part.is_empty()) {
			let (key, value) = part.split_once('=').unwrap_or((part, ""));

			raw.insert(key, value);
		}

		let raw_access = raw
			.get("access_token")
			.copied()
			.ok_or(ConfigError::InvalidRedirect { reason: "the fragment has no access_token" })?;
		let decoded_access = percent_decode(raw_access);
		let decoded_access = if decoded_access.is_empty() { raw_access.to_owned() } else { decoded_access };
		let value = |key: &str| {
			raw.get(key).map(|raw| percent_decode(raw)).filter(|value| !value.is_empty())
		};

		Ok(Self {
			ticket: IdentityTicket::with_raw(decoded_access, raw_access),
			refresh_token: value("refresh_token").map(TokenSecret::new),
			token_type: value("token_type"),
			expires_in: value("expires_in").and_then(|value| value.trim().parse().ok()),
			scope: value("scope"),
			user_id: value("user_id"),
		})
	}
}

/// Percent-decodes `value`, leaving `+` untouched and replacing invalid UTF-8 lossily.
pub fn percent_decode(value: &str) -> String {
	String::from_utf8_lossy(&urlencoding::decode_binary(value.as_bytes())).into_owned()
}

/// Capability that performs an interactive (browser) login and returns the captured redirect.
///
/// Browser automation lives outside this crate; implementations wrap whatever drives it.
pub trait InteractiveTokenSource: Send + Sync {
	/// Runs the interactive login.
	fn capture(&self) -> CaptureFuture<'_>;
}

/// Token source backed by a redirect URL that was already captured.
#[derive(Clone, Debug)]
pub struct CapturedRedirectUrl(pub String);
impl InteractiveTokenSource for CapturedRedirectUrl {
	fn capture(&self) -> CaptureFuture<'_> {
		Box::pin(async move { CapturedRedirect::from_redirect_url(&self.0) })
	}
}
