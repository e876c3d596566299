//! Provider descriptor data structures and helpers shared by all flows.
//!
//! The module exposes validated metadata, supporting builder utilities, and
//! grant-specific helpers so the pipeline can be pointed at production or local test
//! endpoints without touching flow code.

/// Builder API for assembling provider descriptors.
pub mod builder;
/// Grant helpers wired into provider descriptors.
pub mod grant;
/// Provider-specific quirk toggles.
pub mod quirks;

pub use builder::*;
pub use grant::*;
pub use quirks::*;

// self
use crate::_prelude::*;

/// Identity-provider endpoints used by the device-code and refresh grants.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityEndpoints {
	/// Device authorization endpoint (`<authority>/devicecode`).
	pub device_authorization: Url,
	/// Token endpoint used for polling and refreshes (`<authority>/token`).
	pub token: Url,
}

/// Platform endpoints used by the two-stage token exchange.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformEndpoints {
	/// Platform user-token endpoint.
	pub user_authenticate: Url,
	/// Session (XSTS) authorization endpoint.
	pub session_authorize: Url,
}

/// Immutable provider descriptor consumed by flows.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
	/// Identity endpoints.
	pub identity: IdentityEndpoints,
	/// Platform exchange endpoints.
	pub platform: PlatformEndpoints,
	/// Provider-specific quirks.
	pub quirks: ProviderQuirks,
}
impl ProviderDescriptor {
	/// Production user-token endpoint.
	pub const USER_AUTHENTICATE_URL: &'static str =
		"https://user.auth.xboxlive.com/user/authenticate";
	/// Production session authorization endpoint.
	pub const SESSION_AUTHORIZE_URL: &'static str =
		"https://xsts.auth.xboxlive.com/xsts/authorize";

	/// Creates a new, empty builder.
	pub fn builder() -> ProviderDescriptorBuilder {
		ProviderDescriptorBuilder::new()
	}

	/// Production descriptor for the given Microsoft identity tenant
	/// (`consumers`, `common`, `organizations`, or a tenant id).
	pub fn microsoft(tenant: &str) -> Result<Self, ProviderDescriptorError> {
		let authority = format!("https://login.microsoftonline.com/{tenant}/oauth2/v2.0");
		let authority = Url::parse(&authority)
			.map_err(|_| ProviderDescriptorError::InvalidAuthority { authority })?;

		Self::builder().authority(authority).production_platform().build()
	}
}
