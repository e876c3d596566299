//! Credential session: pick the cheapest way to a valid identity token set.
//!
//! Order of preference is the cached set, then a refresh, then an interactive device-code
//! login. A failed refresh is logged and falls through; it never aborts the session.

// self
use crate::{
	_prelude::*,
	auth::TokenSet,
	flows::Broker,
	http::TokenHttpClient,
	oauth::TransportErrorMapper,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};

/// A cached set must outlive `now` by this much to be reused as-is.
pub const VALIDITY_MARGIN: Duration = Duration::seconds(60);

/// How the session obtained its token set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Provenance {
	/// Reused straight from the cache.
	FromCache,
	/// Renewed with the cached refresh token.
	Refreshed,
	/// Obtained through a device-code login.
	Interactive,
}
impl Provenance {
	/// Short label used in logs and CLI output.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::FromCache => "cached_access",
			Self::Refreshed => "refreshed",
			Self::Interactive => "device_login",
		}
	}
}
impl Display for Provenance {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Token set returned by [`Broker::acquire`] together with its provenance.
#[derive(Clone, Debug)]
pub struct AcquiredToken {
	/// Valid identity token set.
	pub token_set: TokenSet,
	/// Path taken to obtain it.
	pub provenance: Provenance,
}

impl<C, M> Broker<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Returns a token set valid for at least [`VALIDITY_MARGIN`].
	pub async fn acquire(&self) -> Result<AcquiredToken> {
		self.acquire_until_cancelled(&CancellationToken::new()).await
	}

	/// Same as [`Broker::acquire`]; `cancel` aborts the interactive fallback.
	pub async fn acquire_until_cancelled(&self, cancel: &CancellationToken) -> Result<AcquiredToken> {
		const KIND: FlowKind = FlowKind::Session;

		let span = FlowSpan::new(KIND, "acquire");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let cached = match self.cache.load().await {
					Ok(cached) => cached,
					Err(err) => {
						tracing::debug!(error = %err, "token cache unreadable, treating as empty");

						None
					},
				};

				if let Some(current) = cached {
					if current.is_valid_at(self.clock.now(), VALIDITY_MARGIN) {
						return Ok(AcquiredToken {
							token_set: current,
							provenance: Provenance::FromCache,
						});
					}
					if current.usable_refresh_token().is_some() {
						match self.refresh(&current).await {
							Ok(renewed) if renewed.is_valid_at(self.clock.now(), VALIDITY_MARGIN) =>
								return Ok(AcquiredToken {
									token_set: renewed,
									provenance: Provenance::Refreshed,
								}),
							Ok(_) => tracing::warn!("refreshed token expires too soon, signing in again"),
							Err(err) => {
								tracing::warn!(error = %err, "token refresh failed, signing in again")
							},
						}
					}
				}

				let token_set = self.device_code_login_until_cancelled(cancel).await?;

				Ok(AcquiredToken { token_set, provenance: Provenance::Interactive })
			})
			.await;

		match &result {
			Ok(acquired) => {
				tracing::debug!(
					provenance = %acquired.provenance,
					remaining_secs =
						acquired.token_set.remaining_at(self.clock.now()).whole_seconds(),
					"identity token acquired"
				);
				obs::record_flow_outcome(KIND, FlowOutcome::Success);
			},
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn provenance_labels_are_stable() {
		assert_eq!(Provenance::FromCache.to_string(), "cached_access");
		assert_eq!(Provenance::Refreshed.as_str(), "refreshed");
		assert_eq!(Provenance::Interactive.as_str(), "device_login");
	}
}
