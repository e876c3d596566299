// self
use crate::{
	_prelude::*,
	provider::{IdentityEndpoints, PlatformEndpoints, ProviderDescriptor, ProviderQuirks},
};

/// Errors raised while constructing or validating descriptors.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum ProviderDescriptorError {
	/// Device authorization endpoint is required for interactive login.
	#[error("Missing device authorization endpoint.")]
	MissingDeviceAuthorizationEndpoint,
	/// Token endpoint is mandatory for polling and refreshes.
	#[error("Missing token endpoint.")]
	MissingTokenEndpoint,
	/// User-token endpoint is mandatory for the platform exchange.
	#[error("Missing user authenticate endpoint.")]
	MissingUserAuthenticateEndpoint,
	/// Session authorization endpoint is mandatory for the platform exchange.
	#[error("Missing session authorize endpoint.")]
	MissingSessionAuthorizeEndpoint,
	/// Authority could not be extended with the identity endpoint paths.
	#[error("Authority `{authority}` cannot be used to derive identity endpoints.")]
	InvalidAuthority {
		/// Authority that failed to parse or join.
		authority: String,
	},
	/// Endpoints must use HTTPS (loopback hosts are exempt).
	#[error("The {endpoint} endpoint must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// The user-token exchange needs at least one relying party.
	#[error("Descriptor must list at least one user-token relying party.")]
	NoRelyingParties,
	/// The identity grants need a scope.
	#[error("Descriptor scope must not be empty.")]
	EmptyScope,
}

/// Builder for [`ProviderDescriptor`] values.
#[derive(Debug, Default)]
pub struct ProviderDescriptorBuilder {
	/// Authority from which identity endpoints are derived when not set explicitly.
	pub authority: Option<Url>,
	/// Device authorization endpoint.
	pub device_authorization_endpoint: Option<Url>,
	/// Token endpoint used for polling and refreshes.
	pub token_endpoint: Option<Url>,
	/// Platform user-token endpoint.
	pub user_authenticate_endpoint: Option<Url>,
	/// Session authorization endpoint.
	pub session_authorize_endpoint: Option<Url>,
	/// Provider-specific quirks.
	pub quirks: ProviderQuirks,
}
impl ProviderDescriptorBuilder {
	/// Creates a new builder with default quirks and no endpoints.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the authority; `devicecode` and `token` are derived beneath it.
	pub fn authority(mut self, url: Url) -> Self {
		self.authority = Some(url);

		self
	}

	/// Sets the device authorization endpoint explicitly.
	pub fn device_authorization_endpoint(mut self, url: Url) -> Self {
		self.device_authorization_endpoint = Some(url);

		self
	}

	/// Sets the token endpoint explicitly.
	pub fn token_endpoint(mut self, url: Url) -> Self {
		self.token_endpoint = Some(url);

		self
	}

	/// Sets the platform user-token endpoint.
	pub fn user_authenticate_endpoint(mut self, url: Url) -> Self {
		self.user_authenticate_endpoint = Some(url);

		self
	}

	/// Sets the session authorization endpoint.
	pub fn session_authorize_endpoint(mut self, url: Url) -> Self {
		self.session_authorize_endpoint = Some(url);

		self
	}

	/// Points both platform endpoints at the production hosts.
	pub fn production_platform(mut self) -> Self {
		self.user_authenticate_endpoint = Url::parse(ProviderDescriptor::USER_AUTHENTICATE_URL).ok();
		self.session_authorize_endpoint = Url::parse(ProviderDescriptor::SESSION_AUTHORIZE_URL).ok();

		self
	}

	/// Overrides the provider quirks.
	pub fn quirks(mut self, quirks: ProviderQuirks) -> Self {
		self.quirks = quirks;

		self
	}

	/// Consumes the builder and validates the resulting descriptor.
	pub fn build(self) -> Result<ProviderDescriptor, ProviderDescriptorError> {
		let device_authorization = match self.device_authorization_endpoint {
			Some(url) => url,
			None => self
				.authority
				.as_ref()
				.map(|authority| derive_endpoint(authority, "devicecode"))
				.transpose()?
				.ok_or(ProviderDescriptorError::MissingDeviceAuthorizationEndpoint)?,
		};
		let token = match self.token_endpoint {
			Some(url) => url,
			None => self
				.authority
				.as_ref()
				.map(|authority| derive_endpoint(authority, "token"))
				.transpose()?
				.ok_or(ProviderDescriptorError::MissingTokenEndpoint)?,
		};
		let user_authenticate = self
			.user_authenticate_endpoint
			.ok_or(ProviderDescriptorError::MissingUserAuthenticateEndpoint)?;
		let session_authorize = self
			.session_authorize_endpoint
			.ok_or(ProviderDescriptorError::MissingSessionAuthorizeEndpoint)?;
		let descriptor = ProviderDescriptor {
			identity: IdentityEndpoints { device_authorization, token },
			platform: PlatformEndpoints { user_authenticate, session_authorize },
			quirks: self.quirks,
		};

		descriptor.validate()?;

		Ok(descriptor)
	}
}

impl ProviderDescriptor {
	/// Validates invariants for the descriptor.
	fn validate(&self) -> Result<(), ProviderDescriptorError> {
		if self.quirks.user_relying_parties.is_empty() {
			return Err(ProviderDescriptorError::NoRelyingParties);
		}
		if self.quirks.scope.trim().is_empty() {
			return Err(ProviderDescriptorError::EmptyScope);
		}

		validate_endpoint("device authorization", &self.identity.device_authorization)?;
		validate_endpoint("token", &self.identity.token)?;
		validate_endpoint("user authenticate", &self.platform.user_authenticate)?;
		validate_endpoint("session authorize", &self.platform.session_authorize)?;

		Ok(())
	}
}

fn derive_endpoint(authority: &Url, segment: &str) -> Result<Url, ProviderDescriptorError> {
	let joined = format!("{}/{segment}", authority.as_str().trim_end_matches('/'));

	Url::parse(&joined)
		.map_err(|_| ProviderDescriptorError::InvalidAuthority { authority: authority.to_string() })
}

fn validate_endpoint(name: &'static str, url: &Url) -> Result<(), ProviderDescriptorError> {
	let loopback = matches!(url.host_str(), Some("localhost" | "127.0.0.1" | "[::1]"));

	if url.scheme() == "https" || (url.scheme() == "http" && loopback) {
		Ok(())
	} else {
		Err(ProviderDescriptorError::InsecureEndpoint { endpoint: name, url: url.to_string() })
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn url(value: &str) -> Url {
		Url::parse(value).expect("Test URL should parse.")
	}

	#[test]
	fn microsoft_descriptor_derives_identity_endpoints() {
		let descriptor =
			ProviderDescriptor::microsoft("consumers").expect("Production descriptor should build.");

		assert_eq!(
			descriptor.identity.device_authorization.as_str(),
			"https://login.microsoftonline.com/consumers/oauth2/v2.0/devicecode"
		);
		assert_eq!(
			descriptor.identity.token.as_str(),
			"https://login.microsoftonline.com/consumers/oauth2/v2.0/token"
		);
		assert_eq!(
			descriptor.platform.user_authenticate.as_str(),
			ProviderDescriptor::USER_AUTHENTICATE_URL
		);
		assert_eq!(descriptor.quirks.user_relying_parties[0], "http://auth.xboxlive.com");
		assert_eq!(descriptor.quirks.scope, "openid profile offline_access");
	}

	#[test]
	fn trailing_slash_authority_does_not_double_separators() {
		let descriptor = ProviderDescriptor::builder()
			.authority(url("https://login.example.com/tenant/oauth2/v2.0/"))
			.production_platform()
			.build()
			.expect("Descriptor should build.");

		assert_eq!(
			descriptor.identity.token.as_str(),
			"https://login.example.com/tenant/oauth2/v2.0/token"
		);
	}

	#[test]
	fn loopback_http_is_allowed_but_remote_http_is_not() {
		let local = ProviderDescriptor::builder()
			.authority(url("http://127.0.0.1:8080/tenant"))
			.user_authenticate_endpoint(url("http://localhost:8080/user/authenticate"))
			.session_authorize_endpoint(url("http://127.0.0.1:8080/xsts/authorize"))
			.build();

		assert!(local.is_ok());

		let remote = ProviderDescriptor::builder()
			.authority(url("http://login.example.com/tenant"))
			.production_platform()
			.build();

		assert!(matches!(
			remote,
			Err(ProviderDescriptorError::InsecureEndpoint { endpoint: "device authorization", .. })
		));
	}

	#[test]
	fn missing_endpoints_and_empty_relying_parties_are_rejected() {
		assert_eq!(
			ProviderDescriptor::builder().production_platform().build(),
			Err(ProviderDescriptorError::MissingDeviceAuthorizationEndpoint)
		);
		assert_eq!(
			ProviderDescriptor::builder().authority(url("https://login.example.com/t")).build(),
			Err(ProviderDescriptorError::MissingUserAuthenticateEndpoint)
		);

		let quirks = ProviderQuirks { user_relying_parties: Vec::new(), ..Default::default() };

		assert_eq!(
			ProviderDescriptor::builder()
				.authority(url("https://login.example.com/t"))
				.production_platform()
				.quirks(quirks)
				.build(),
			Err(ProviderDescriptorError::NoRelyingParties)
		);
	}
}
