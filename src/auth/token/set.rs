//! Immutable identity token sets, validity checks, and builders.

// self
use crate::{
	_prelude::*,
	auth::{IdTokenClaims, token::secret::TokenSecret},
};

/// Errors produced by [`TokenSetBuilder`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum TokenSetBuilderError {
	/// Issued when no access token value was provided.
	#[error("Access token is required.")]
	MissingAccessToken,
	/// Issued when no expiry (absolute or relative) was configured.
	#[error("Expiry must be supplied via expires_at or expires_in.")]
	MissingExpiry,
	/// Expiry cannot be represented as a whole-second Unix timestamp.
	#[error("Expiry is outside the representable range.")]
	ExpiryOutOfRange,
}

/// Identity-provider token set as persisted in the cache.
///
/// `expires_at` is always absolute and truncated to whole seconds, so a set read back from the
/// cache compares equal to the one that was saved. Renewals produce a new set; nothing mutates a
/// set in place.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSet {
	/// Access token; callers must avoid logging it.
	pub access_token: TokenSecret,
	/// Refresh token, if the provider issued one.
	#[serde(default)]
	pub refresh_token: Option<TokenSecret>,
	/// OpenID Connect id token, if the provider issued one.
	#[serde(default)]
	pub id_token: Option<TokenSecret>,
	/// Token type reported by the provider (usually `Bearer`).
	#[serde(default = "default_token_type")]
	pub token_type: String,
	/// Space-delimited scopes granted by the provider.
	#[serde(default)]
	pub scope: String,
	/// Absolute expiry instant, persisted as Unix seconds.
	#[serde(with = "time::serde::timestamp")]
	pub expires_at: OffsetDateTime,
}
impl TokenSet {
	/// Returns a builder for constructing token sets.
	pub fn builder() -> TokenSetBuilder {
		TokenSetBuilder::default()
	}

	/// Remaining lifetime at `now` (negative once expired).
	pub fn remaining_at(&self, now: OffsetDateTime) -> Duration {
		self.expires_at - now
	}

	/// Returns `true` if the access token outlives `now` by more than `margin`.
	pub fn is_valid_at(&self, now: OffsetDateTime, margin: Duration) -> bool {
		!self.access_token.is_empty() && now + margin < self.expires_at
	}

	/// Returns the refresh token when it is present and non-empty.
	pub fn usable_refresh_token(&self) -> Option<&TokenSecret> {
		self.refresh_token.as_ref().filter(|secret| !secret.is_empty())
	}

	/// Best-effort decode of the id token's claims, for display purposes only.
	pub fn id_claims(&self) -> Option<IdTokenClaims> {
		self.id_token.as_ref().and_then(|token| IdTokenClaims::decode_unverified(token.expose()))
	}
}
impl Debug for TokenSet {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenSet")
			.field("access_token", &"<redacted>")
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.field("id_token", &self.id_token.as_ref().map(|_| "<redacted>"))
			.field("token_type", &self.token_type)
			.field("scope", &self.scope)
			.field("expires_at", &self.expires_at)
			.finish()
	}
}

fn default_token_type() -> String {
	"Bearer".into()
}

/// Builder for [`TokenSet`].
#[derive(Clone, Debug, Default)]
pub struct TokenSetBuilder {
	access_token: Option<TokenSecret>,
	refresh_token: Option<TokenSecret>,
	id_token: Option<TokenSecret>,
	token_type: Option<String>,
	scope: Option<String>,
	issued_at: Option<OffsetDateTime>,
	expires_at: Option<OffsetDateTime>,
	expires_in: Option<Duration>,
}
impl TokenSetBuilder {
	/// Provides the access token value.
	pub fn access_token(mut self, token: impl Into<String>) -> Self {
		self.access_token = Some(TokenSecret::new(token));

		self
	}

	/// Provides the refresh token value.
	pub fn refresh_token(mut self, token: impl Into<String>) -> Self {
		self.refresh_token = Some(TokenSecret::new(token));

		self
	}

	/// Provides an optional refresh token value.
	pub fn maybe_refresh_token(mut self, token: Option<TokenSecret>) -> Self {
		self.refresh_token = token;

		self
	}

	/// Provides the id token value.
	pub fn id_token(mut self, token: impl Into<String>) -> Self {
		self.id_token = Some(TokenSecret::new(token));

		self
	}

	/// Provides an optional id token value.
	pub fn maybe_id_token(mut self, token: Option<TokenSecret>) -> Self {
		self.id_token = token;

		self
	}

	/// Sets the token type.
	pub fn token_type(mut self, token_type: impl Into<String>) -> Self {
		self.token_type = Some(token_type.into());

		self
	}

	/// Sets the granted scope string.
	pub fn scope(mut self, scope: impl Into<String>) -> Self {
		self.scope = Some(scope.into());

		self
	}

	/// Sets the instant that `expires_in` is measured from.
	pub fn issued_at(mut self, instant: OffsetDateTime) -> Self {
		self.issued_at = Some(instant);

		self
	}

	/// Sets an absolute expiry instant.
	pub fn expires_at(mut self, instant: OffsetDateTime) -> Self {
		self.expires_at = Some(instant);

		self
	}

	/// Sets a relative expiry duration from the issued instant.
	pub fn expires_in(mut self, duration: Duration) -> Self {
		self.expires_in = Some(duration);

		self
	}

	/// Consumes the builder and produces a [`TokenSet`].
	pub fn build(self) -> Result<TokenSet, TokenSetBuilderError> {
		let access_token = self.access_token.ok_or(TokenSetBuilderError::MissingAccessToken)?;
		let issued_at = self.issued_at.unwrap_or_else(OffsetDateTime::now_utc);
		let expires_at = match (self.expires_at, self.expires_in) {
			(Some(instant), _) => instant,
			(None, Some(delta)) =>
				issued_at.checked_add(delta).ok_or(TokenSetBuilderError::ExpiryOutOfRange)?,
			(None, None) => return Err(TokenSetBuilderError::MissingExpiry),
		};
		let expires_at = OffsetDateTime::from_unix_timestamp(expires_at.unix_timestamp())
			.map_err(|_| TokenSetBuilderError::ExpiryOutOfRange)?;

		Ok(TokenSet {
			access_token,
			refresh_token: self.refresh_token,
			id_token: self.id_token,
			token_type: self.token_type.unwrap_or_else(default_token_type),
			scope: self.scope.unwrap_or_default(),
			expires_at,
		})
	}
}
