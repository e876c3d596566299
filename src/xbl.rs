//! Platform token exchange: user token (with candidate search) and session (XSTS) token.
//!
//! The user-token stage accepts an identity bearer whose exact wire form the platform expects
//! is not documented, so it walks an [`ExchangePlan`] (relying party, then contract header,
//! then [`CandidateTicket`]) until one request is accepted. The session stage is a single,
//! well-defined request.

pub mod candidate;
pub mod metrics;
pub mod plan;
pub mod report;

mod session;
mod user;
mod wire;

pub use candidate::*;
pub use metrics::*;
pub use plan::*;
pub use report::*;

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Header carrying the platform contract version.
pub const CONTRACT_VERSION_HEADER: &str = "x-xbl-contract-version";

/// Platform user token produced by the user-token stage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlatformUserToken {
	/// Signed platform user token.
	pub token: TokenSecret,
	/// User hash (`uhs`) claim.
	pub user_hash: String,
}

/// Session token produced by the session authorization stage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionToken {
	/// Signed session token.
	pub token: TokenSecret,
	/// User hash (`uhs`) claim.
	pub user_hash: String,
	/// Platform subject id (`xid`) claim, when returned.
	pub subject_id: Option<String>,
	/// Expiry reported by the platform, when returned.
	pub not_after: Option<OffsetDateTime>,
}

/// Final artifact of the pipeline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct XblAuthorization {
	/// User hash embedded in the header.
	pub user_hash: String,
	/// Session token embedded in the header.
	pub token: TokenSecret,
	/// Platform subject id, when returned.
	pub subject_id: Option<String>,
	/// Session token expiry, when returned.
	pub not_after: Option<OffsetDateTime>,
	/// Relying party the session token is bound to.
	pub relying_party: String,
}
impl XblAuthorization {
	/// Builds the authorization from a session token.
	pub fn new(session: SessionToken, relying_party: impl Into<String>) -> Self {
		Self {
			user_hash: session.user_hash,
			token: session.token,
			subject_id: session.subject_id,
			not_after: session.not_after,
			relying_party: relying_party.into(),
		}
	}

	/// `Authorization` header value: `XBL3.0 x=<uhs>;<token>`.
	///
	/// `<uhs>` is the user hash returned by the session authorization stage, not the one from
	/// the user-token stage. The platform normally reports the same hash for both.
	///
	/// The returned string contains the secret token; never log it.
	pub fn header(&self) -> String {
		format!("XBL3.0 x={};{}", self.user_hash, self.token.expose())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn header_uses_user_hash_and_token() {
		let authorization = XblAuthorization::new(
			SessionToken {
				token: TokenSecret::new("xsts-token"),
				user_hash: "1234".into(),
				subject_id: Some("2535".into()),
				not_after: None,
			},
			"http://xboxlive.com",
		);

		assert_eq!(authorization.header(), "XBL3.0 x=1234;xsts-token");
		assert!(!format!("{authorization:?}").contains("xsts-token"));
	}
}
