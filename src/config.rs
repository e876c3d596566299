//! Broker configuration, resolved once at the process boundary.
//!
//! Every component receives its settings through [`BrokerConfig`]; nothing reads the
//! environment after [`BrokerConfig::from_env`] returns.

// self
use crate::{_prelude::*, error::ConfigError, provider::ProviderDescriptor};

/// Relying party used for the session token when none is configured.
pub const DEFAULT_SESSION_RELYING_PARTY: &str = "http://xboxlive.com";
/// Tenant used when none is configured.
pub const DEFAULT_TENANT: &str = "consumers";

/// Environment variable holding the OAuth client identifier.
pub const ENV_CLIENT_ID: &str = "MS_CLIENT_ID";
/// Environment variable holding the identity tenant.
pub const ENV_TENANT: &str = "MS_TENANT";
/// Environment variable holding the session relying party.
pub const ENV_RELYING_PARTY: &str = "XSTS_RELYING_PARTY";
/// Environment variable holding the token cache path.
pub const ENV_TOKEN_CACHE: &str = "MS_TOKEN_CACHE";
/// Environment variable toggling debug logging.
pub const ENV_DEBUG: &str = "MS_DEBUG";

/// Explicit configuration for a production broker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BrokerConfig {
	/// OAuth client identifier registered with the identity provider.
	pub client_id: String,
	/// Identity tenant (`consumers` for personal accounts).
	pub tenant: String,
	/// Relying party the session token is scoped to.
	pub session_relying_party: String,
	/// Location of the token cache file.
	pub cache_path: PathBuf,
	/// Enables debug-level logging in the CLI.
	pub debug: bool,
}
impl BrokerConfig {
	/// Configuration with defaults for everything but the client id and cache path.
	pub fn new(client_id: impl Into<String>, cache_path: impl Into<PathBuf>) -> Self {
		Self {
			client_id: client_id.into(),
			tenant: DEFAULT_TENANT.into(),
			session_relying_party: DEFAULT_SESSION_RELYING_PARTY.into(),
			cache_path: cache_path.into(),
			debug: false,
		}
	}

	/// Reads the configuration from the process environment.
	pub fn from_env() -> Result<Self> {
		Self::from_lookup(|name| std::env::var(name).ok())
	}

	/// Reads the configuration through `lookup`, which maps a variable name to its value.
	///
	/// Blank values count as unset. A missing client id is not an error here; it is reported by
	/// [`validate`](Self::validate).
	pub fn from_lookup<F>(lookup: F) -> Result<Self>
	where
		F: Fn(&str) -> Option<String>,
	{
		let read = |name: &str| {
			lookup(name).map(|value| value.trim().to_owned()).filter(|value| !value.is_empty())
		};
		let cache_path = match read(ENV_TOKEN_CACHE) {
			Some(path) => expand_home(&path),
			None => default_cache_path()?,
		};

		Ok(Self {
			client_id: read(ENV_CLIENT_ID).unwrap_or_default(),
			tenant: read(ENV_TENANT).unwrap_or_else(|| DEFAULT_TENANT.into()),
			session_relying_party: read(ENV_RELYING_PARTY)
				.unwrap_or_else(|| DEFAULT_SESSION_RELYING_PARTY.into()),
			cache_path,
			debug: read(ENV_DEBUG).is_some_and(|value| parse_flag(&value)),
		})
	}

	/// Checks that every required setting is present.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.client_id.trim().is_empty() {
			return Err(ConfigError::MissingSetting { name: ENV_CLIENT_ID });
		}
		if self.tenant.trim().is_empty() {
			return Err(ConfigError::MissingSetting { name: ENV_TENANT });
		}
		if self.session_relying_party.trim().is_empty() {
			return Err(ConfigError::MissingSetting { name: ENV_RELYING_PARTY });
		}
		if self.cache_path.as_os_str().is_empty() {
			return Err(ConfigError::MissingSetting { name: ENV_TOKEN_CACHE });
		}

		Ok(())
	}

	/// Production descriptor for the configured tenant.
	pub fn descriptor(&self) -> Result<ProviderDescriptor, ConfigError> {
		ProviderDescriptor::microsoft(&self.tenant).map_err(ConfigError::from)
	}
}

/// `<config dir>/msauth/device_token.json`.
pub fn default_cache_path() -> Result<PathBuf, ConfigError> {
	dirs::config_dir()
		.map(|dir| dir.join("msauth").join("device_token.json"))
		.ok_or(ConfigError::MissingCacheDirectory)
}

fn expand_home(path: &str) -> PathBuf {
	match path.strip_prefix("~/") {
		Some(rest) => dirs::home_dir().map(|home| home.join(rest)).unwrap_or_else(|| path.into()),
		None => path.into(),
	}
}

fn parse_flag(value: &str) -> bool {
	matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "y" | "on")
}
