//! Demonstrates the interact -> introspect handshake against a mock Identity Engine with curl
//! rendering switched on, then resumes the same interaction from its handle.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use url::Url;
// self
use identity_engine_client::{
	auth::ScopeList,
	config::{self, ConfigSetter},
	flows::ReqwestIdxClient,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let interact_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth2/default/v1/interact");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"interaction_handle\":\"demo-handle\"}");
		})
		.await;
	let introspect_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/idp/idx/introspect");
			then.status(200).header("content-type", "application/ion+json; okta-version=1.0.0").body(
				"{\"version\":\"1.0.0\",\"state\":\"PENDING\",\"intent\":\"LOGIN\",\"remediation\":{\"type\":\"array\",\"value\":[{\"name\":\"identify\"}]}}",
			);
		})
		.await;
	// Explicit overrides win over `~/.okta/okta.yaml`, `./.okta.yaml`, and the environment.
	let overrides: Vec<ConfigSetter> = vec![
		config::with_issuer(Url::parse(&server.url("/oauth2/default"))?),
		config::with_client_id("demo-client"),
		config::with_client_secret("demo-secret"),
		config::with_scopes(ScopeList::new(["openid", "profile"])?),
		config::with_debug_requests(true),
	];
	let client = ReqwestIdxClient::new(overrides)?;
	let response = client.start(None).await?;

	println!(
		"Interaction {} is {} with remediations {:?}.",
		response.interaction_handle.expose(),
		response.introspection.state.as_deref().unwrap_or("unknown"),
		response.introspection.remediation_names().collect::<Vec<_>>(),
	);

	let resumed = client.start(Some(response.interaction_handle)).await?;

	println!("Resumed interaction state: {:?}.", resumed.introspection.state);

	interact_mock.assert_async().await;
	introspect_mock.assert_calls_async(2).await;

	Ok(())
}
