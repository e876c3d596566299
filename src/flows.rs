//! Flow orchestrators powered by the broker: device-code login, refresh, the credential
//! session that chooses between them, and the end-to-end platform authorization.

pub mod device_code;
pub mod pipeline;
pub mod refresh;
pub mod session;

pub use device_code::*;
pub use session::*;

// self
use crate::{
	_prelude::*,
	auth::{ConsolePrompt, DevicePrompt},
	clock::{Clock, Sleeper, SystemClock, TokioSleeper},
	config::DEFAULT_SESSION_RELYING_PARTY,
	http::TokenHttpClient,
	oauth::TransportErrorMapper,
	provider::{ProviderDescriptor, ProviderStrategy},
	store::TokenCache,
	xbl::ExchangeMetrics,
};
#[cfg(feature = "reqwest")]
use crate::{
	config::BrokerConfig,
	http::ReqwestHttpClient,
	oauth::ReqwestTransportErrorMapper,
	provider::DefaultProviderStrategy,
	store::FileTokenCache,
};

#[cfg(feature = "reqwest")]
/// Broker specialized for the crate's default reqwest transport stack.
pub type ReqwestBroker = Broker<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// Coordinates the identity flows and the platform exchange against one descriptor.
///
/// The broker owns the HTTP client, token cache, provider descriptor, strategy, and the
/// injected time primitives so individual flows can focus on protocol logic. Every
/// collaborator is shared behind an `Arc`, so cloning a broker is cheap.
#[derive(Clone)]
pub struct Broker<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// HTTP client wrapper used for every outbound request.
	pub http_client: Arc<C>,
	/// Mapper applied to transport-layer errors before surfacing them to callers.
	pub transport_mapper: Arc<M>,
	/// Cache holding the current identity token set.
	pub cache: Arc<dyn TokenCache>,
	/// Descriptor that defines endpoints and quirks.
	pub descriptor: ProviderDescriptor,
	/// Strategy responsible for request adjustments and error classification.
	pub strategy: Arc<dyn ProviderStrategy>,
	/// OAuth client identifier used by the identity grants.
	pub client_id: String,
	/// Relying party the session token is scoped to.
	pub session_relying_party: String,
	/// Source of the current instant.
	pub clock: Arc<dyn Clock>,
	/// Sleep primitive used between device-code polls.
	pub sleeper: Arc<dyn Sleeper>,
	/// Receiver of device-code instructions.
	pub prompt: Arc<dyn DevicePrompt>,
	/// Counters for user-token exchange requests.
	pub exchange_metrics: Arc<ExchangeMetrics>,
}
impl<C, M> Broker<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates a broker that reuses the caller-provided transport + mapper pair.
	pub fn with_http_client(
		cache: Arc<dyn TokenCache>,
		descriptor: ProviderDescriptor,
		strategy: Arc<dyn ProviderStrategy>,
		client_id: impl Into<String>,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Self {
		Self {
			http_client: http_client.into(),
			transport_mapper: mapper.into(),
			cache,
			descriptor,
			strategy,
			client_id: client_id.into(),
			session_relying_party: DEFAULT_SESSION_RELYING_PARTY.into(),
			clock: Arc::new(SystemClock),
			sleeper: Arc::new(TokioSleeper),
			prompt: Arc::new(ConsolePrompt),
			exchange_metrics: Default::default(),
		}
	}

	/// Replaces the clock.
	pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
		self.clock = clock;

		self
	}

	/// Replaces the sleeper.
	pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
		self.sleeper = sleeper;

		self
	}

	/// Replaces the device-code prompt.
	pub fn with_prompt(mut self, prompt: Arc<dyn DevicePrompt>) -> Self {
		self.prompt = prompt;

		self
	}

	/// Overrides the relying party used by the session authorization stage.
	pub fn with_session_relying_party(mut self, relying_party: impl Into<String>) -> Self {
		self.session_relying_party = relying_party.into();

		self
	}
}
#[cfg(feature = "reqwest")]
impl Broker<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Creates a new broker for the provided descriptor and client identifier.
	///
	/// The broker provisions its own reqwest-backed transport (with the default request
	/// timeout) so callers do not need to pass HTTP handles explicitly.
	pub fn new(
		cache: Arc<dyn TokenCache>,
		descriptor: ProviderDescriptor,
		strategy: Arc<dyn ProviderStrategy>,
		client_id: impl Into<String>,
	) -> Self {
		Self::with_http_client(
			cache,
			descriptor,
			strategy,
			client_id,
			ReqwestHttpClient::default(),
			Arc::new(ReqwestTransportErrorMapper),
		)
	}

	/// Validates `config` and wires a production broker from it.
	pub fn from_config(config: &BrokerConfig) -> Result<Self> {
		config.validate()?;

		let descriptor = config.descriptor()?;
		let cache = Arc::new(FileTokenCache::new(config.cache_path.clone()));

		Ok(Self::new(cache, descriptor, Arc::new(DefaultProviderStrategy), config.client_id.clone())
			.with_session_relying_party(config.session_relying_party.clone()))
	}
}
impl<C, M> Debug for Broker<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Broker")
			.field("descriptor", &self.descriptor)
			.field("client_id", &self.client_id)
			.field("session_relying_party", &self.session_relying_party)
			.finish()
	}
}

/// Races `fut` against `cancel`, preferring cancellation when both are ready.
pub(crate) async fn until_cancelled<F, T>(cancel: &CancellationToken, fut: F) -> Result<T>
where
	F: Future<Output = Result<T>>,
{
	tokio::select! {
		biased;
		_ = cancel.cancelled() => Err(Error::Cancelled),
		result = fut => result,
	}
}
