#![allow(dead_code)]

// std
use std::sync::atomic::{AtomicUsize, Ordering};
// crates.io
use time::macros;
// self
use xbl_broker::{
	_preludet::*,
	auth::{SilentPrompt, TokenSet},
	clock::ManualClock,
	flows::Broker,
	http::{ResponseMetadata, ResponseMetadataSlot, TokenHttpClient},
	oauth::{
		GenericTransportErrorMapper,
		oauth2::{AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse, http::StatusCode},
	},
	provider::{DefaultProviderStrategy, ProviderDescriptor, ProviderQuirks},
	store::MemoryTokenCache,
};

pub const CLIENT_ID: &str = "client-xbl";
pub const FAKE_BASE: &str = "https://fake.test";
pub const START: OffsetDateTime = macros::datetime!(2025-01-01 00:00 UTC);

pub type ScriptedBroker = Broker<ScriptedHttpClient, GenericTransportErrorMapper>;

/// One request observed by [`ScriptedHttpClient`].
#[derive(Clone, Debug)]
pub struct RecordedRequest {
	pub path: String,
	pub headers: HashMap<String, String>,
	pub body: Vec<u8>,
}
impl RecordedRequest {
	pub fn form(&self) -> HashMap<String, String> {
		url::form_urlencoded::parse(&self.body).into_owned().collect()
	}

	pub fn json(&self) -> serde_json::Value {
		serde_json::from_slice(&self.body).expect("Recorded body should be JSON.")
	}

	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers.get(name).map(String::as_str)
	}
}

type Responder = dyn Fn(&RecordedRequest, usize) -> (u16, String) + Send + Sync;

#[derive(Debug)]
pub enum FakeTransportError {}
impl Display for FakeTransportError {
	fn fmt(&self, _: &mut Formatter) -> FmtResult {
		match *self {}
	}
}
impl StdError for FakeTransportError {}

/// In-process transport answering from a closure and recording every request in order.
///
/// The closure receives the request and its zero-based index among requests to the same path.
#[derive(Clone)]
pub struct ScriptedHttpClient {
	responder: Arc<Responder>,
	requests: Arc<Mutex<Vec<RecordedRequest>>>,
	per_path: Arc<Mutex<HashMap<String, usize>>>,
	total: Arc<AtomicUsize>,
}
impl ScriptedHttpClient {
	pub fn new<F>(responder: F) -> Self
	where
		F: 'static + Fn(&RecordedRequest, usize) -> (u16, String) + Send + Sync,
	{
		Self {
			responder: Arc::new(responder),
			requests: Default::default(),
			per_path: Default::default(),
			total: Default::default(),
		}
	}

	pub fn requests(&self) -> Vec<RecordedRequest> {
		self.requests.lock().clone()
	}

	pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
		self.requests().into_iter().filter(|request| request.path == path).collect()
	}

	pub fn total(&self) -> usize {
		self.total.load(Ordering::SeqCst)
	}
}
impl TokenHttpClient for ScriptedHttpClient {
	type Handle = ScriptedHandle;
	type TransportError = FakeTransportError;

	fn with_metadata(&self, slot: ResponseMetadataSlot) -> Self::Handle {
		ScriptedHandle { client: self.clone(), slot }
	}
}

pub struct ScriptedHandle {
	client: ScriptedHttpClient,
	slot: ResponseMetadataSlot,
}
impl<'a> AsyncHttpClient<'a> for ScriptedHandle {
	type Error = HttpClientError<FakeTransportError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'a + Send + Sync>>;

	fn call(&'a self, request: HttpRequest) -> Self::Future {
		let recorded = RecordedRequest {
			path: request.uri().path().to_owned(),
			headers: request
				.headers()
				.iter()
				.filter_map(|(name, value)| {
					value.to_str().ok().map(|value| (name.as_str().to_owned(), value.to_owned()))
				})
				.collect(),
			body: request.body().clone(),
		};
		let index = {
			let mut per_path = self.client.per_path.lock();
			let counter = per_path.entry(recorded.path.clone()).or_default();
			let index = *counter;

			*counter += 1;

			index
		};
		let (status, body) = (self.client.responder)(&recorded, index);

		self.client.total.fetch_add(1, Ordering::SeqCst);
		self.client.requests.lock().push(recorded);

		let slot = self.slot.clone();

		Box::pin(async move {
			let mut response = HttpResponse::new(body.into_bytes());

			*response.status_mut() =
				StatusCode::from_u16(status).expect("Scripted status should be valid.");
			slot.store(ResponseMetadata { status: Some(status), correlation_id: None });

			Ok(response)
		})
	}
}

pub fn url(value: &str) -> Url {
	Url::parse(value).expect("Test URL should parse.")
}

pub fn descriptor_at(base: &str) -> ProviderDescriptor {
	ProviderDescriptor::builder()
		.device_authorization_endpoint(url(&format!("{base}/devicecode")))
		.token_endpoint(url(&format!("{base}/token")))
		.user_authenticate_endpoint(url(&format!("{base}/user/authenticate")))
		.session_authorize_endpoint(url(&format!("{base}/xsts/authorize")))
		.quirks(ProviderQuirks::default())
		.build()
		.expect("Test descriptor should build.")
}

pub fn scripted_broker(
	client: &ScriptedHttpClient,
	cache: &MemoryTokenCache,
	clock: &ManualClock,
) -> ScriptedBroker {
	Broker::with_http_client(
		Arc::new(cache.clone()),
		descriptor_at(FAKE_BASE),
		Arc::new(DefaultProviderStrategy),
		CLIENT_ID,
		client.clone(),
		GenericTransportErrorMapper,
	)
	.with_clock(Arc::new(clock.clone()))
	.with_sleeper(Arc::new(clock.clone()))
	.with_prompt(Arc::new(SilentPrompt))
}

pub fn token_set(access: &str, refresh: Option<&str>, expires_at: OffsetDateTime) -> TokenSet {
	TokenSet::builder()
		.access_token(access)
		.maybe_refresh_token(refresh.map(xbl_broker::auth::TokenSecret::new))
		.scope(ProviderQuirks::DEFAULT_SCOPE)
		.expires_at(expires_at)
		.build()
		.expect("Token set fixture should build.")
}

pub fn device_code_body(interval: Option<i64>, expires_in: i64) -> String {
	let mut body = serde_json::json!({
		"device_code": "device-123",
		"user_code": "ABCD-EFGH",
		"verification_uri": "https://microsoft.com/devicelogin",
		"expires_in": expires_in,
	});

	if let Some(interval) = interval {
		body["interval"] = interval.into();
	}

	body.to_string()
}

pub fn oauth_error(error: &str) -> String {
	serde_json::json!({ "error": error, "error_description": format!("{error} from fake") })
		.to_string()
}

pub fn token_body(access: &str, refresh: Option<&str>, expires_in: i64) -> String {
	let mut body = serde_json::json!({
		"access_token": access,
		"token_type": "Bearer",
		"expires_in": expires_in,
		"scope": ProviderQuirks::DEFAULT_SCOPE,
	});

	if let Some(refresh) = refresh {
		body["refresh_token"] = refresh.into();
	}

	body.to_string()
}

pub fn platform_body(token: &str, uhs: &str, xid: Option<&str>) -> String {
	let mut claim = serde_json::json!({ "uhs": uhs });

	if let Some(xid) = xid {
		claim["xid"] = xid.into();
	}

	serde_json::json!({
		"IssueInstant": "2025-01-01T00:00:00.0000000Z",
		"NotAfter": "2025-01-01T16:00:00.0000000Z",
		"Token": token,
		"DisplayClaims": { "xui": [claim] },
	})
	.to_string()
}
