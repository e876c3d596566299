// self
use crate::_prelude::*;

/// Provider-specific quirks that influence how flows shape their requests.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderQuirks {
	/// Scope requested by the device-code and refresh grants.
	pub scope: String,
	/// Relying parties tried by the user-token exchange, most likely first.
	pub user_relying_parties: Vec<String>,
	/// `SiteName` property sent with user-token requests.
	pub site_name: String,
	/// Value of the `x-xbl-contract-version` header.
	pub contract_version: String,
	/// Sandbox designation sent with session authorization requests.
	pub sandbox_id: String,
}
impl ProviderQuirks {
	/// Minimal identity scope requested from the identity provider.
	pub const DEFAULT_SCOPE: &'static str = "openid profile offline_access";
}
impl Default for ProviderQuirks {
	fn default() -> Self {
		Self {
			scope: Self::DEFAULT_SCOPE.into(),
			user_relying_parties: vec![
				"http://auth.xboxlive.com".into(),
				"https://auth.xboxlive.com".into(),
			],
			site_name: "user.auth.xboxlive.com".into(),
			contract_version: "1".into(),
			sandbox_id: "RETAIL".into(),
		}
	}
}
