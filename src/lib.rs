//! Async Identity Engine client: acquire an interaction handle, introspect it, and render every
//! outgoing request as a curl command when debugging.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod config;
pub mod curl;
pub mod error;
pub mod flows;
pub mod http;
pub mod idx;
pub mod obs;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		auth::ScopeList,
		config::Config,
		flows::IdxClient,
		http::ReqwestHttpClient,
		idx::ReqwestTransportErrorMapper,
	};

	/// Client type alias used by reqwest-backed integration tests.
	pub type ReqwestTestClient = IdxClient<ReqwestHttpClient, ReqwestTransportErrorMapper>;

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests, honoring `config.request_timeout` like the default transport.
	pub fn test_reqwest_http_client(config: &Config) -> ReqwestHttpClient {
		let mut builder = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.redirect(reqwest::redirect::Policy::none());

		if let Some(timeout) = config.request_timeout {
			builder = builder.timeout(timeout);
		}

		ReqwestHttpClient::with_client(
			builder.build().expect("Failed to build insecure Reqwest client for tests."),
		)
	}

	/// Builds a validated configuration pointing at `issuer`.
	pub fn test_config(issuer: &str, client_id: &str, client_secret: &str, scopes: &[&str]) -> Config {
		let config = Config {
			issuer: Some(Url::parse(issuer).expect("Test issuer should parse.")),
			client_id: Some(client_id.into()),
			client_secret: Some(client_secret.into()),
			scopes: ScopeList::new(scopes.iter().copied()).expect("Test scopes should be valid."),
			..Config::default()
		};

		config.validate().expect("Test configuration should validate.");

		config
	}

	/// Constructs an [`IdxClient`] over the insecure reqwest transport used across integration
	/// tests.
	pub fn build_reqwest_test_client(config: Config) -> ReqwestTestClient {
		let http_client = test_reqwest_http_client(&config);

		IdxClient::with_http_client(
			config,
			http_client,
			Arc::new(ReqwestTransportErrorMapper),
		)
		.expect("Test client should build from a validated configuration.")
	}
}

mod _prelude {
	pub use std::{
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::Mutex;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::OffsetDateTime;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _};
