mod common;

// self
use common::*;
use xbl_broker::{
	_preludet::*,
	clock::{Clock, ManualClock},
	error::Error,
	provider::{GrantType, ProviderErrorKind},
	store::MemoryTokenCache,
};

#[tokio::test]
async fn pending_forever_expires_within_window() {
	let client = ScriptedHttpClient::new(|request, _| match request.path.as_str() {
		"/devicecode" => (200, device_code_body(Some(5), 20)),
		_ => (400, oauth_error("authorization_pending")),
	});
	let cache = MemoryTokenCache::default();
	let clock = ManualClock::new(START);
	let broker = scripted_broker(&client, &cache, &clock);
	let err = broker.device_code_login().await.expect_err("Login should expire.");

	assert!(matches!(err, Error::DeviceCodeExpired), "unexpected error: {err:?}");

	let polls = client.requests_to("/token").len();
	let elapsed = clock.now() - START;

	assert!(polls <= 4, "expected at most 4 polls, got {polls}");
	assert!(polls >= 1);
	assert!(elapsed >= Duration::seconds(20) && elapsed <= Duration::seconds(25), "{elapsed}");
	assert!(cache.snapshot().is_none());
}

#[tokio::test]
async fn slow_down_widens_every_later_interval() {
	let client = ScriptedHttpClient::new(|request, index| match (request.path.as_str(), index) {
		("/devicecode", _) => (200, device_code_body(Some(5), 900)),
		("/token", 0) => (400, oauth_error("slow_down")),
		("/token", 1) => (400, oauth_error("authorization_pending")),
		("/token", 2) => (400, oauth_error("slow_down")),
		("/token", 3) => (400, oauth_error("authorization_pending")),
		_ => (200, token_body("access-1", Some("refresh-1"), 3600)),
	});
	let cache = MemoryTokenCache::default();
	let clock = ManualClock::new(START);
	let broker = scripted_broker(&client, &cache, &clock);
	let set = broker.device_code_login().await.expect("Login should succeed.");

	assert_eq!(set.access_token.expose(), "access-1");
	assert_eq!(
		clock.sleeps(),
		[5, 10, 10, 15, 15].map(Duration::seconds).to_vec(),
		"slow_down must add 5s permanently"
	);
}

#[tokio::test]
async fn denial_is_terminal_and_carries_provider_payload() {
	let client = ScriptedHttpClient::new(|request, _| match request.path.as_str() {
		"/devicecode" => (200, device_code_body(Some(5), 900)),
		_ => (400, oauth_error("access_denied")),
	});
	let cache = MemoryTokenCache::default();
	let clock = ManualClock::new(START);
	let broker = scripted_broker(&client, &cache, &clock);
	let err = broker.device_code_login().await.expect_err("Login should be denied.");
	let Error::Provider(provider) = err else {
		panic!("expected a provider error, got {err:?}");
	};

	assert_eq!(provider.grant, GrantType::DeviceCode);
	assert_eq!(provider.kind, ProviderErrorKind::AccessDenied);
	assert_eq!(provider.status, 400);
	assert_eq!(provider.error, "access_denied");
	assert_eq!(provider.description.as_deref(), Some("access_denied from fake"));
	assert_eq!(client.requests_to("/token").len(), 1);
	assert!(cache.snapshot().is_none());
}

#[tokio::test]
async fn success_persists_token_set_and_sends_expected_forms() {
	let client = ScriptedHttpClient::new(|request, index| match (request.path.as_str(), index) {
		("/devicecode", _) => (200, device_code_body(None, 900)),
		("/token", 0) => (400, oauth_error("authorization_pending")),
		_ => (200, token_body("access-ok", Some("refresh-ok"), 3600)),
	});
	let cache = MemoryTokenCache::default();
	let clock = ManualClock::new(START);
	let broker = scripted_broker(&client, &cache, &clock);
	let set = broker.device_code_login().await.expect("Login should succeed.");

	assert_eq!(clock.sleeps(), vec![Duration::seconds(5), Duration::seconds(5)]);
	assert_eq!(set.expires_at, START + Duration::seconds(10 + 3600));
	assert_eq!(cache.snapshot(), Some(set));

	let device_form = client.requests_to("/devicecode")[0].form();

	assert_eq!(device_form["client_id"], CLIENT_ID);
	assert_eq!(device_form["scope"], "openid profile offline_access");

	let poll_form = client.requests_to("/token")[0].form();

	assert_eq!(poll_form["grant_type"], "urn:ietf:params:oauth:grant-type:device_code");
	assert_eq!(poll_form["client_id"], CLIENT_ID);
	assert_eq!(poll_form["device_code"], "device-123");
}

#[tokio::test]
async fn cancellation_stops_polling_without_touching_cache() {
	let cancel = CancellationToken::new();
	let trigger = cancel.clone();
	let client = ScriptedHttpClient::new(move |request, _| match request.path.as_str() {
		"/devicecode" => (200, device_code_body(Some(5), 900)),
		_ => {
			trigger.cancel();

			(400, oauth_error("authorization_pending"))
		},
	});
	let cache = MemoryTokenCache::default();
	let clock = ManualClock::new(START);
	let broker = scripted_broker(&client, &cache, &clock);
	let err = broker
		.device_code_login_until_cancelled(&cancel)
		.await
		.expect_err("Login should be cancelled.");

	assert!(matches!(err, Error::Cancelled), "unexpected error: {err:?}");
	assert!(client.requests_to("/token").len() <= 1);
	assert!(cache.snapshot().is_none());
}

#[tokio::test]
async fn device_request_rejection_surfaces_provider_error() {
	let client = ScriptedHttpClient::new(|_, _| (400, oauth_error("invalid_client")));
	let cache = MemoryTokenCache::default();
	let clock = ManualClock::new(START);
	let broker = scripted_broker(&client, &cache, &clock);
	let err = broker.request_device_authorization().await.expect_err("Request should fail.");

	assert!(
		matches!(&err, Error::Provider(provider) if provider.kind == ProviderErrorKind::InvalidClient),
		"unexpected error: {err:?}"
	);
	assert_eq!(client.total(), 1);
}
