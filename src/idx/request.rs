//! Builders for interact and introspect requests.

// crates.io
use oauth2::{
	HttpRequest,
	http::{
		Method, Request,
		header::{ACCEPT, CONTENT_TYPE, USER_AGENT},
	},
};
use url::form_urlencoded::Serializer as FormSerializer;
// self
use crate::{
	_prelude::*,
	auth::{ClientIdentity, InteractionHandle, InteractionSession},
	error::ConfigError,
};

/// Content type the Identity Engine expects on introspect calls.
pub const ION_JSON: &str = "application/ion+json; okta-version=1.0.0";

const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";
const JSON: &str = "application/json";

/// Client name and version advertised through `User-Agent`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientMetadata {
	/// Product token, e.g. `identity-engine-client`.
	pub name: String,
	/// Product version.
	pub version: String,
}
impl ClientMetadata {
	/// Creates metadata for a custom product token.
	pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
		Self { name: name.into(), version: version.into() }
	}

	/// Renders the `User-Agent` header value.
	pub fn user_agent(&self) -> String {
		format!("{}/{}", self.name, self.version)
	}
}
impl Default for ClientMetadata {
	fn default() -> Self {
		Self::new(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
	}
}

/// Form parameters for the interact call.
#[derive(Debug)]
pub struct InteractRequest<'a> {
	/// Identity presented to the endpoint.
	pub identity: &'a ClientIdentity,
	/// PKCE + state material for this interaction.
	pub session: &'a InteractionSession,
}
impl InteractRequest<'_> {
	/// Builds the `application/x-www-form-urlencoded` POST.
	pub fn build(&self, url: &Url, metadata: &ClientMetadata) -> Result<HttpRequest, ConfigError> {
		let mut form = FormSerializer::new(String::new());

		form.append_pair("client_id", &self.identity.client_id);

		if let Some(secret) = &self.identity.client_secret {
			form.append_pair("client_secret", secret.expose());
		}

		form.append_pair("scope", &self.identity.scope());
		form.append_pair("code_challenge", self.session.code_challenge());
		form.append_pair("code_challenge_method", self.session.code_challenge_method().as_str());
		form.append_pair("state", &self.session.state);

		if let Some(redirect) = &self.session.redirect_uri {
			form.append_pair("redirect_uri", redirect.as_str());
		}

		let body = form.finish().into_bytes();

		Ok(Request::builder()
			.method(Method::POST)
			.uri(url.as_str())
			.header(ACCEPT, JSON)
			.header(CONTENT_TYPE, FORM_URLENCODED)
			.header(USER_AGENT, metadata.user_agent())
			.body(body)?)
	}
}

/// JSON body for the introspect call.
#[derive(Debug)]
pub struct IntrospectRequest<'a> {
	/// Handle being introspected.
	pub interaction_handle: &'a InteractionHandle,
}
impl IntrospectRequest<'_> {
	/// Builds the ion+json POST.
	pub fn build(&self, url: &Url, metadata: &ClientMetadata) -> Result<HttpRequest, ConfigError> {
		let body = serde_json::json!({ "interactionHandle": self.interaction_handle.expose() })
			.to_string()
			.into_bytes();

		Ok(Request::builder()
			.method(Method::POST)
			.uri(url.as_str())
			.header(ACCEPT, ION_JSON)
			.header(CONTENT_TYPE, ION_JSON)
			.header(USER_AGENT, metadata.user_agent())
			.body(body)?)
	}
}
