//! Best-effort, unverified decoding of OpenID Connect id-token claims.

// crates.io
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
// self
use crate::_prelude::*;

/// Display-oriented subset of id-token claims.
///
/// The signature is never checked, so these values identify which account signed in and must
/// not be used for authorization decisions.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdTokenClaims {
	/// Display name.
	#[serde(default)]
	pub name: Option<String>,
	/// Sign-in name.
	#[serde(default)]
	pub preferred_username: Option<String>,
	/// Email address.
	#[serde(default)]
	pub email: Option<String>,
	/// User principal name.
	#[serde(default)]
	pub upn: Option<String>,
	/// Object id.
	#[serde(default)]
	pub oid: Option<String>,
	/// Tenant id.
	#[serde(default)]
	pub tid: Option<String>,
	/// Subject.
	#[serde(default)]
	pub sub: Option<String>,
	/// Issuer.
	#[serde(default)]
	pub iss: Option<String>,
	/// Audience (string or array).
	#[serde(default)]
	pub aud: Option<serde_json::Value>,
	/// Issued-at, Unix seconds.
	#[serde(default)]
	pub iat: Option<i64>,
	/// Expiry, Unix seconds.
	#[serde(default)]
	pub exp: Option<i64>,
}
impl IdTokenClaims {
	/// Decodes the payload segment of a JWT without verifying it.
	///
	/// Returns `None` for anything that is not a three-part token with a JSON object payload.
	pub fn decode_unverified(token: &str) -> Option<Self> {
		let payload = token.split('.').nth(1)?;
		let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;

		serde_json::from_slice(&bytes).ok()
	}

	/// Account label: `preferred_username`, then `email`, then `upn`.
	pub fn account(&self) -> Option<&str> {
		self.preferred_username
			.as_deref()
			.or(self.email.as_deref())
			.or(self.upn.as_deref())
	}

	/// Audience rendered as text.
	pub fn audience(&self) -> Option<String> {
		match self.aud.as_ref()? {
			serde_json::Value::String(value) => Some(value.clone()),
			other => Some(other.to_string()),
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn jwt(payload: &str) -> String {
		format!("eyJhbGciOiJub25lIn0.{}.sig", URL_SAFE_NO_PAD.encode(payload))
	}

	#[test]
	fn decodes_payload_and_picks_account() {
		let token = jwt(r#"{"name":"Ada","email":"ada@example.com","upn":"ada@corp","tid":"t-1","aud":"client"}"#);
		let claims = IdTokenClaims::decode_unverified(&token).expect("Claims should decode.");

		assert_eq!(claims.account(), Some("ada@example.com"));
		assert_eq!(claims.name.as_deref(), Some("Ada"));
		assert_eq!(claims.audience().as_deref(), Some("client"));
	}

	#[test]
	fn malformed_tokens_yield_none() {
		assert!(IdTokenClaims::decode_unverified("not-a-jwt").is_none());
		assert!(IdTokenClaims::decode_unverified("a.!!!.c").is_none());
		assert!(IdTokenClaims::decode_unverified(&jwt("[1,2]")).is_none());
	}
}
