//! Provider strategy hooks that customize token exchanges.
//!
//! Implementations decorate outgoing token requests and normalize error mapping
//! without tying flows to any particular HTTP client.

// self
use crate::{_prelude::*, provider::descriptor::GrantType};

/// Strategy hook that allows providers to decorate requests and classify errors.
///
/// Implementors are required to be `Send + Sync`, and the hooks use crate-owned data types so
/// downstream crates never depend on reqwest-specific structures. Override only what you need;
/// `augment_token_request` has a default no-op implementation.
pub trait ProviderStrategy: Send + Sync {
	/// Maps an OAuth error payload into the broker taxonomy for a token request.
	fn classify_token_error(&self, ctx: &ProviderErrorContext) -> ProviderErrorKind;

	/// Gives providers a chance to add custom form parameters before dispatching.
	///
	/// The method works on a plain `BTreeMap` so implementations remain HTTP client agnostic.
	fn augment_token_request(&self, _grant: GrantType, _form: &mut BTreeMap<String, String>) {}
}

/// Canonical provider error categories used by strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProviderErrorKind {
	/// The user has not finished signing in yet; keep polling.
	AuthorizationPending,
	/// Polling too fast; keep polling with a longer interval.
	SlowDown,
	/// The user declined the sign-in request.
	AccessDenied,
	/// The device code expired on the provider side.
	ExpiredToken,
	/// Provider rejected the grant (revoked or stale refresh token, bad device code).
	InvalidGrant,
	/// Client registration is unknown or not allowed to use the grant.
	InvalidClient,
	/// Any other provider error.
	Other,
}
impl ProviderErrorKind {
	/// Returns `true` for the kinds that keep the device-code poll loop running.
	pub fn is_pending(self) -> bool {
		matches!(self, ProviderErrorKind::AuthorizationPending | ProviderErrorKind::SlowDown)
	}
}

/// Context passed to provider strategies when classifying token errors.
///
/// The struct keeps only primitive data (status codes, OAuth fields) so strategies stay
/// decoupled from any HTTP client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderErrorContext {
	/// Grant type associated with the failing request.
	pub grant_type: GrantType,
	/// HTTP status code returned by the provider.
	pub http_status: Option<u16>,
	/// Provider-supplied OAuth `error` field.
	pub oauth_error: Option<String>,
	/// Provider-supplied OAuth `error_description` field.
	pub error_description: Option<String>,
}
impl ProviderErrorContext {
	/// Creates a new context scoped to the provided grant type.
	pub fn new(grant_type: GrantType) -> Self {
		Self { grant_type, http_status: None, oauth_error: None, error_description: None }
	}

	/// Adds an HTTP status code (e.g., 400, 401, 500).
	pub fn with_http_status(mut self, status: u16) -> Self {
		self.http_status = Some(status);

		self
	}

	/// Adds the OAuth error code string returned by the provider.
	pub fn with_oauth_error(mut self, error: impl Into<String>) -> Self {
		self.oauth_error = Some(error.into());

		self
	}

	/// Adds the OAuth `error_description` field.
	pub fn with_error_description(mut self, description: Option<String>) -> Self {
		self.error_description = description;

		self
	}
}

/// Default strategy following RFC 6749 and RFC 8628 error codes.
///
/// Only the structured OAuth `error` field decides the kind. Anything unrecognised is
/// [`ProviderErrorKind::Other`], which flows treat as terminal.
#[derive(Debug, Default)]
pub struct DefaultProviderStrategy;
impl Display for DefaultProviderStrategy {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("default-provider-strategy")
	}
}
impl ProviderStrategy for DefaultProviderStrategy {
	fn classify_token_error(&self, ctx: &ProviderErrorContext) -> ProviderErrorKind {
		ctx.oauth_error.as_deref().map(match_exact_value).unwrap_or(ProviderErrorKind::Other)
	}
}

fn match_exact_value(value: &str) -> ProviderErrorKind {
	let value = value.trim();

	if value.eq_ignore_ascii_case("authorization_pending") {
		ProviderErrorKind::AuthorizationPending
	} else if value.eq_ignore_ascii_case("slow_down") {
		ProviderErrorKind::SlowDown
	} else if value.eq_ignore_ascii_case("access_denied")
		|| value.eq_ignore_ascii_case("authorization_declined")
	{
		ProviderErrorKind::AccessDenied
	} else if value.eq_ignore_ascii_case("expired_token")
		|| value.eq_ignore_ascii_case("code_expired")
	{
		ProviderErrorKind::ExpiredToken
	} else if value.eq_ignore_ascii_case("invalid_grant") || value.eq_ignore_ascii_case("bad_verification_code") {
		ProviderErrorKind::InvalidGrant
	} else if value.eq_ignore_ascii_case("invalid_client")
		|| value.eq_ignore_ascii_case("unauthorized_client")
	{
		ProviderErrorKind::InvalidClient
	} else {
		ProviderErrorKind::Other
	}
}
