//! Platform request and response bodies.

// crates.io
use time::format_description::well_known::Rfc3339;
// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	error::ResponseError,
	obs::FlowKind,
	xbl::{PlatformUserToken, SessionToken},
};

const TOKEN_TYPE_JWT: &str = "JWT";
const AUTH_METHOD_RPS: &str = "RPS";

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct UserAuthenticateRequest<'a> {
	properties: UserProperties<'a>,
	relying_party: &'a str,
	token_type: &'static str,
}
impl<'a> UserAuthenticateRequest<'a> {
	pub(crate) fn new(site_name: &'a str, rps_ticket: &'a str, relying_party: &'a str) -> Self {
		Self {
			properties: UserProperties { auth_method: AUTH_METHOD_RPS, site_name, rps_ticket },
			relying_party,
			token_type: TOKEN_TYPE_JWT,
		}
	}
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct UserProperties<'a> {
	auth_method: &'static str,
	site_name: &'a str,
	rps_ticket: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct SessionAuthorizeRequest<'a> {
	properties: SessionProperties<'a>,
	relying_party: &'a str,
	token_type: &'static str,
}
impl<'a> SessionAuthorizeRequest<'a> {
	pub(crate) fn new(sandbox_id: &'a str, user_token: &'a str, relying_party: &'a str) -> Self {
		Self {
			properties: SessionProperties { sandbox_id, user_tokens: [user_token] },
			relying_party,
			token_type: TOKEN_TYPE_JWT,
		}
	}
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct SessionProperties<'a> {
	sandbox_id: &'a str,
	user_tokens: [&'a str; 1],
}

/// `{Token, DisplayClaims: {xui: [{uhs, xid?}]}, NotAfter?}`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct PlatformTokenResponse {
	token: String,
	#[serde(default)]
	display_claims: DisplayClaims,
	#[serde(default)]
	not_after: Option<String>,
}
impl PlatformTokenResponse {
	pub(crate) fn into_user_token(self, flow: FlowKind) -> Result<PlatformUserToken> {
		let (token, claim, _) = self.split(flow)?;

		Ok(PlatformUserToken { token, user_hash: claim.uhs })
	}

	pub(crate) fn into_session_token(self, flow: FlowKind) -> Result<SessionToken> {
		let (token, claim, not_after) = self.split(flow)?;

		Ok(SessionToken {
			token,
			user_hash: claim.uhs,
			subject_id: claim.xid.filter(|xid| !xid.is_empty()),
			not_after,
		})
	}

	fn split(self, flow: FlowKind) -> Result<(TokenSecret, UserClaim, Option<OffsetDateTime>)> {
		let claim = self
			.display_claims
			.xui
			.into_iter()
			.next()
			.filter(|claim| !claim.uhs.is_empty())
			.ok_or(ResponseError::MissingUserHash { flow })?;
		let not_after =
			self.not_after.and_then(|value| OffsetDateTime::parse(value.trim(), &Rfc3339).ok());

		Ok((TokenSecret::new(self.token), claim, not_after))
	}
}

#[derive(Debug, Default, Deserialize)]
struct DisplayClaims {
	#[serde(default)]
	xui: Vec<UserClaim>,
}

#[derive(Debug, Deserialize)]
struct UserClaim {
	#[serde(default)]
	uhs: String,
	#[serde(default)]
	xid: Option<String>,
}
