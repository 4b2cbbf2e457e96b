// std
use std::sync::Arc;
// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
use httpmock::prelude::*;
use time::{Duration, OffsetDateTime};
// self
use oauth2_keeper::{
	config::KeeperConfig,
	error::{Error, TokenFetchError},
	http::ReqwestHttpClient,
	manager::TokenManager,
};

const CLIENT_ID: &str = "keeper-client";
const CLIENT_SECRET: &str = "keeper-secret";

fn insecure_http_client() -> ReqwestHttpClient {
	let client = reqwest::Client::builder()
		.danger_accept_invalid_certs(true)
		.danger_accept_invalid_hostnames(true)
		.build()
		.expect("Failed to build insecure Reqwest client for tests.");

	ReqwestHttpClient::with_client(client)
}

fn build_config(server: &MockServer) -> KeeperConfig {
	KeeperConfig::new(CLIENT_ID, CLIENT_SECRET, &server.url("/token"), &server.url("/orders"))
		.expect("Keeper configuration should be valid for integration tests.")
}

fn build_manager(config: KeeperConfig) -> Arc<TokenManager<ReqwestHttpClient>> {
	Arc::new(TokenManager::with_http_client(config, insecure_http_client()))
}

#[tokio::test]
async fn token_is_cached_after_the_first_exchange() {
	let server = MockServer::start_async().await;
	let manager = build_manager(build_config(&server));
	let credentials = STANDARD.encode(format!("{CLIENT_ID}:{CLIENT_SECRET}"));
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/token")
				.header("authorization", format!("Basic {credentials}"))
				.body("grant_type=client_credentials");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"cached-token\",\"token_type\":\"Bearer\",\"expires_in\":1800}",
			);
		})
		.await;
	let first = manager.valid_token().await.expect("Initial token request should succeed.");
	let second = manager.valid_token().await.expect("Cached token request should succeed.");

	assert_eq!(first.expose(), "cached-token");
	assert_eq!(second.expose(), "cached-token");
	assert!(manager.is_token_valid());

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn unauthorized_exchange_surfaces_the_status() {
	let server = MockServer::start_async().await;
	let manager = build_manager(build_config(&server));
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(401)
				.header("content-type", "application/json")
				.body("{\"error\":\"invalid_client\"}");
		})
		.await;
	let err = manager.valid_token().await.expect_err("HTTP 401 should fail the exchange.");

	assert!(matches!(err, Error::TokenFetch(TokenFetchError::Status { status: 401 })));
	assert!(!manager.token_info().has_token);

	mock.assert_async().await;
}

#[tokio::test]
async fn payload_without_access_token_is_rejected() {
	let server = MockServer::start_async().await;
	let manager = build_manager(build_config(&server));
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"token_type\":\"Bearer\",\"expires_in\":3600}");
		})
		.await;
	let err = manager
		.valid_token()
		.await
		.expect_err("A payload without an access token should be rejected.");

	assert!(matches!(err, Error::TokenFetch(TokenFetchError::MissingAccessToken)));

	mock.assert_async().await;
}

#[tokio::test]
async fn sixth_forced_fetch_exhausts_the_hourly_quota() {
	let server = MockServer::start_async().await;
	let window_opened = OffsetDateTime::now_utc();
	let manager = build_manager(build_config(&server));
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"quota-token\",\"token_type\":\"Bearer\",\"expires_in\":3600}",
			);
		})
		.await;

	for round in 0..5 {
		manager
			.valid_token()
			.await
			.unwrap_or_else(|e| panic!("Fetch {round} should fit the quota: {e}"));
		manager.invalidate_token();
	}

	assert!(!manager.can_make_token_request());

	let err = manager.valid_token().await.expect_err("The sixth fetch must hit the quota.");
	let reset_at = err.quota_reset_at().expect("Quota errors must carry the reset instant.");

	// The reset is the window start plus one hour, and the window opened at
	// manager construction.
	assert!(reset_at >= window_opened + Duration::HOUR);
	assert!(reset_at <= window_opened + Duration::HOUR + Duration::seconds(10));

	let info = manager.token_info();

	assert_eq!(info.requests_used, 5);
	assert_eq!(info.requests_remaining, 0);

	mock.assert_calls_async(5).await;
}

#[tokio::test]
async fn concurrent_cold_callers_may_both_consume_quota() {
	let server = MockServer::start_async().await;
	let manager = build_manager(build_config(&server));
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200)
				.header("content-type", "application/json")
				.body(
					"{\"access_token\":\"race-token\",\"token_type\":\"Bearer\",\"expires_in\":3600}",
				)
				.delay(std::time::Duration::from_millis(250));
		})
		.await;
	let (first, second) =
		tokio::join!(manager.valid_token(), manager.valid_token());

	// The lock is released around the network call, so both cold callers fetch and
	// both burn a quota slot. Intentional behavior, not a bug.
	first.expect("First racing call should succeed.");
	second.expect("Second racing call should succeed.");

	assert_eq!(manager.token_info().requests_used, 2);

	mock.assert_calls_async(2).await;
}

#[tokio::test]
async fn authorization_header_uses_the_issued_token_type() {
	let server = MockServer::start_async().await;
	let manager = build_manager(build_config(&server));
	let _mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"mac-token\",\"token_type\":\"MAC\",\"expires_in\":600}");
		})
		.await;
	let header =
		manager.authorization_header().await.expect("Header derivation should succeed.");

	assert_eq!(header, "MAC mac-token");
}
