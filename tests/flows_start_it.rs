// std
use std::time::Duration;
// crates.io
use httpmock::prelude::*;
// self
use identity_engine_client::{
	_preludet::*,
	auth::InteractionHandle,
	config::Config,
	error::{ConfigError, TransportError},
	idx::{Endpoint, ION_JSON},
};

const CLIENT_ID: &str = "abc";
const CLIENT_SECRET: &str = "xyz";
const ISSUER_PATH: &str = "/oauth2/default";

fn build_client(server: &MockServer) -> ReqwestTestClient {
	build_reqwest_test_client(test_config(
		&server.url(ISSUER_PATH),
		CLIENT_ID,
		CLIENT_SECRET,
		&["openid", "profile"],
	))
}

#[tokio::test]
async fn start_acquires_handle_then_introspects() {
	let server = MockServer::start_async().await;
	let client = build_client(&server);
	let interact = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/oauth2/default/v1/interact")
				.header("content-type", "application/x-www-form-urlencoded")
				.body_includes("client_id=abc")
				.body_includes("client_secret=xyz")
				.body_includes("scope=openid+profile")
				.body_includes("code_challenge_method=S256");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"interaction_handle\":\"h1\"}");
		})
		.await;
	let introspect = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/idp/idx/introspect")
				.header("content-type", ION_JSON)
				.json_body(serde_json::json!({ "interactionHandle": "h1" }));
			then.status(200)
				.header("content-type", ION_JSON)
				.body("{\"version\":\"1.0.0\",\"state\":\"PENDING\",\"intent\":\"LOGIN\"}");
		})
		.await;
	let response = client.start(None).await.expect("Handshake against the mock server should succeed.");

	interact.assert_async().await;
	introspect.assert_async().await;

	assert_eq!(response.interaction_handle.expose(), "h1");
	assert_eq!(response.introspection.state.as_deref(), Some("PENDING"));
	assert_eq!(response.introspection.intent.as_deref(), Some("LOGIN"));
	assert_eq!(response.introspection.raw["version"], "1.0.0");

	let session = response.interaction.expect("A fresh interaction should expose its PKCE session.");

	assert_eq!(session.state.len(), 32);
	assert_eq!(session.code_challenge().len(), 43);
}

#[tokio::test]
async fn supplied_handle_bypasses_interact() {
	let server = MockServer::start_async().await;
	let client = build_client(&server);
	let interact = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth2/default/v1/interact");
			then.status(200).body("{\"interaction_handle\":\"unexpected\"}");
		})
		.await;
	let introspect = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/idp/idx/introspect")
				.json_body(serde_json::json!({ "interactionHandle": "h2" }));
			then.status(200).body("{\"state\":\"PENDING\"}");
		})
		.await;
	let handle = InteractionHandle::new("h2").expect("Handle fixture should be valid.");
	let response = client
		.start(Some(handle))
		.await
		.expect("Introspecting a supplied handle should succeed.");

	interact.assert_calls_async(0).await;
	introspect.assert_async().await;

	assert!(response.interaction.is_none());
	assert_eq!(response.interaction_handle.expose(), "h2");
}

#[tokio::test]
async fn empty_interact_body_never_reaches_introspect() {
	let server = MockServer::start_async().await;
	let client = build_client(&server);
	let interact = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth2/default/v1/interact");
			then.status(200).header("content-type", "application/json").body("{}");
		})
		.await;
	let introspect = server
		.mock_async(|when, then| {
			when.method(POST).path("/idp/idx/introspect");
			then.status(200).body("{\"state\":\"PENDING\"}");
		})
		.await;
	let err = client.start(None).await.expect_err("A handle-less interact response must fail.");

	interact.assert_async().await;
	introspect.assert_calls_async(0).await;

	assert!(matches!(err, Error::MissingInteractionHandle));
}

#[tokio::test]
async fn malformed_introspect_body_is_a_decode_error() {
	let server = MockServer::start_async().await;
	let client = build_client(&server);

	server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth2/default/v1/interact");
			then.status(200).body("{\"interaction_handle\":\"h1\"}");
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(POST).path("/idp/idx/introspect");
			then.status(200).body("<html>maintenance</html>");
		})
		.await;

	let err = client.start(None).await.expect_err("Non-JSON introspect body must fail.");

	assert!(matches!(err, Error::Decode(ref e) if e.endpoint == Endpoint::Introspect && e.status == Some(200)));
}

#[tokio::test]
async fn upstream_rejection_surfaces_status_and_message() {
	let server = MockServer::start_async().await;
	let client = build_client(&server);
	let interact = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth2/default/v1/interact");
			then.status(401)
				.header("content-type", "application/json")
				.body("{\"error\":\"invalid_client\",\"error_description\":\"Client authentication failed.\"}");
		})
		.await;
	let err = client.start(None).await.expect_err("HTTP 401 must fail the handshake.");

	interact.assert_calls_async(1).await;

	match err {
		Error::Rejected { endpoint, status, message } => {
			assert_eq!(endpoint, Endpoint::Interact);
			assert_eq!(status, 401);
			assert_eq!(message, "Client authentication failed.");
		},
		other => panic!("Unexpected error: {other:?}."),
	}
}

fn build_client_with_timeout(server: &MockServer, timeout: Duration) -> ReqwestTestClient {
	build_reqwest_test_client(Config {
		request_timeout: Some(timeout),
		..test_config(&server.url(ISSUER_PATH), CLIENT_ID, CLIENT_SECRET, &["openid"])
	})
}

#[tokio::test]
async fn slow_interact_hits_request_timeout() {
	let server = MockServer::start_async().await;
	let client = build_client_with_timeout(&server, Duration::from_millis(50));
	let introspect = server
		.mock_async(|when, then| {
			when.method(POST).path("/idp/idx/introspect");
			then.status(200).body("{\"state\":\"PENDING\"}");
		})
		.await;

	server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth2/default/v1/interact");
			then.status(200)
				.delay(Duration::from_millis(500))
				.body("{\"interaction_handle\":\"h1\"}");
		})
		.await;

	let err = client.start(None).await.expect_err("The interact call should time out.");

	introspect.assert_calls_async(0).await;

	assert!(
		matches!(err, Error::Transport(TransportError::Timeout { endpoint: Endpoint::Interact, .. })),
		"Unexpected error: {err:?}."
	);
}

#[tokio::test]
async fn slow_introspect_hits_request_timeout() {
	let server = MockServer::start_async().await;
	let client = build_client_with_timeout(&server, Duration::from_millis(50));
	let interact = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth2/default/v1/interact");
			then.status(200).body("{\"interaction_handle\":\"h1\"}");
		})
		.await;

	server
		.mock_async(|when, then| {
			when.method(POST).path("/idp/idx/introspect");
			then.status(200).delay(Duration::from_millis(500)).body("{\"state\":\"PENDING\"}");
		})
		.await;

	let err = client.start(None).await.expect_err("The introspect call should time out.");

	interact.assert_async().await;

	assert!(
		matches!(err, Error::Transport(TransportError::Timeout { endpoint: Endpoint::Introspect, .. })),
		"Unexpected error: {err:?}."
	);
}

#[tokio::test]
async fn plain_http_issuer_outside_loopback_is_rejected() {
	let err = ReqwestTestClient::with_config(Config {
		issuer: Some(Url::parse("http://example.okta.com/oauth2/default").expect("URL should parse.")),
		client_id: Some(CLIENT_ID.into()),
		..Default::default()
	})
	.expect_err("A non-loopback http issuer must be rejected.");

	assert!(matches!(err, Error::Config(ConfigError::InsecureIssuer { .. })));
}
