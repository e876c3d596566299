#![cfg(feature = "reqwest")]

mod common;

// crates.io
use httpmock::prelude::*;
// self
use common::*;
use xbl_broker::{
	_preludet::*,
	auth::{CapturedRedirectUrl, SilentPrompt},
	clock::ManualClock,
	flows::{Provenance, ReqwestBroker},
	provider::DefaultProviderStrategy,
	store::{FileTokenCache, TokenCache},
	xbl::CONTRACT_VERSION_HEADER,
};

fn build_broker(server: &MockServer, cache: Arc<dyn TokenCache>) -> ReqwestBroker {
	ReqwestBroker::new(
		cache,
		descriptor_at(&server.base_url()),
		Arc::new(DefaultProviderStrategy),
		CLIENT_ID,
	)
	.with_sleeper(Arc::new(ManualClock::new(OffsetDateTime::now_utc())))
	.with_prompt(Arc::new(SilentPrompt))
}

#[tokio::test]
async fn captured_redirect_runs_both_platform_stages() {
	let server = MockServer::start_async().await;
	let user_mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/user/authenticate")
				.header(CONTRACT_VERSION_HEADER, "1")
				.body_includes("\"RpsTicket\":\"EwA/b+c=+x\"")
				.body_includes("\"RelyingParty\":\"http://auth.xboxlive.com\"");
			then.status(200)
				.header("content-type", "application/json")
				.body(platform_body("user-token", "uhs-user", None));
		})
		.await;
	let session_mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/xsts/authorize")
				.header(CONTRACT_VERSION_HEADER, "1")
				.body_includes("\"UserTokens\":[\"user-token\"]");
			then.status(200)
				.header("content-type", "application/json")
				.header("ms-cv", "cv.1")
				.body(platform_body("xsts-token", "uhs-session", Some("2535")));
		})
		.await;
	let broker = build_broker(&server, Arc::new(xbl_broker::store::MemoryTokenCache::default()));
	let source = CapturedRedirectUrl(
		"https://login.live.com/oauth20_desktop.srf#access_token=EwA%2Fb%2Bc%3D+x&token_type=bearer"
			.into(),
	);
	let authorization =
		broker.xbl_authorization_from_source(&source).await.expect("Pipeline should succeed.");

	user_mock.assert_calls_async(1).await;
	session_mock.assert_calls_async(1).await;

	assert_eq!(authorization.header(), "XBL3.0 x=uhs-session;xsts-token");
	assert_eq!(authorization.user_hash, "uhs-session");
}

#[tokio::test]
async fn device_login_persists_to_file_and_next_run_reuses_it() {
	let server = MockServer::start_async().await;
	let dir = tempfile::tempdir().expect("Temp dir should be created.");
	let path = dir.path().join("msauth").join("device_token.json");
	let device_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/devicecode").body_includes("client_id=client-xbl");
			then.status(200)
				.header("content-type", "application/json")
				.body(device_code_body(Some(1), 900));
		})
		.await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token").body_includes("device_code=device-123");
			then.status(200)
				.header("content-type", "application/json")
				.body(token_body("device-access", Some("device-refresh"), 3600));
		})
		.await;
	let first = build_broker(&server, Arc::new(FileTokenCache::new(path.clone())))
		.acquire()
		.await
		.expect("First run should sign in.");

	assert_eq!(first.provenance, Provenance::Interactive);
	assert!(path.exists());

	let second = build_broker(&server, Arc::new(FileTokenCache::new(path.clone())))
		.acquire()
		.await
		.expect("Second run should reuse the cache.");

	assert_eq!(second.provenance, Provenance::FromCache);
	assert_eq!(second.token_set, first.token_set);

	device_mock.assert_calls_async(1).await;
	token_mock.assert_calls_async(1).await;
}
