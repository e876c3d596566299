// self
use crate::_prelude::*;

/// OAuth 2.0 grant types used against the identity provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantType {
	/// Device authorization grant (RFC 8628).
	DeviceCode,
	/// Refresh Token grant for long-lived sessions.
	RefreshToken,
}
impl GrantType {
	/// Returns a short, human-friendly label for the grant.
	pub fn as_str(self) -> &'static str {
		match self {
			GrantType::DeviceCode => "device_code",
			GrantType::RefreshToken => "refresh_token",
		}
	}

	/// Returns the `grant_type` form value sent to the token endpoint.
	pub fn wire_value(self) -> &'static str {
		match self {
			GrantType::DeviceCode => "urn:ietf:params:oauth:grant-type:device_code",
			GrantType::RefreshToken => "refresh_token",
		}
	}
}
impl Display for GrantType {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn device_code_uses_rfc8628_urn() {
		assert_eq!(GrantType::DeviceCode.wire_value(), "urn:ietf:params:oauth:grant-type:device_code");
		assert_eq!(GrantType::DeviceCode.to_string(), "device_code");
		assert_eq!(GrantType::RefreshToken.wire_value(), "refresh_token");
	}
}
