//! Client identity presented to the interact endpoint.

// self
use crate::{
	_prelude::*,
	auth::{ScopeList, Secret},
};

/// Immutable client credentials and scopes sourced from configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientIdentity {
	/// OAuth 2.0 client identifier.
	pub client_id: String,
	/// Client secret for confidential clients.
	pub client_secret: Option<Secret>,
	/// Scopes requested for the interaction, in configured order.
	pub scopes: ScopeList,
}
impl ClientIdentity {
	/// Creates a public-client identity.
	pub fn new(client_id: impl Into<String>, scopes: ScopeList) -> Self {
		Self { client_id: client_id.into(), client_secret: None, scopes }
	}

	/// Attaches a client secret.
	pub fn with_client_secret(mut self, secret: impl Into<Secret>) -> Self {
		self.client_secret = Some(secret.into());

		self
	}

	/// Space-joined scope string transmitted as `scope`.
	pub fn scope(&self) -> String {
		self.scopes.joined()
	}
}
