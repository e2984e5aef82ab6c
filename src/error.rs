//! Client-level error types shared across configuration, transport, and flows.

// std
use std::path::PathBuf;
// self
use crate::{_prelude::*, idx::Endpoint};

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS, timeout).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Response body could not be decoded.
	#[error(transparent)]
	Decode(#[from] DecodeError),

	/// No interaction handle was supplied and none could be acquired.
	#[error("An interaction handle is required to introspect, but none was supplied or acquired.")]
	MissingInteractionHandle,
	/// Upstream answered with a non-success status.
	#[error("The {endpoint} endpoint rejected the request with HTTP {status}: {message}.")]
	Rejected {
		/// Endpoint that produced the response.
		endpoint: Endpoint,
		/// HTTP status code.
		status: u16,
		/// Upstream- or client-supplied message summarizing the failure.
		message: String,
	},
}

/// Configuration and validation failures raised by the client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// Configuration file exists but could not be read.
	#[error("Configuration file {} could not be read.", path.display())]
	Read {
		/// File that failed to load.
		path: PathBuf,
		/// Underlying IO failure.
		#[source]
		source: std::io::Error,
	},
	/// Configuration file is not valid YAML for the expected shape.
	#[error("Configuration file {} could not be parsed.", path.display())]
	Parse {
		/// File that failed to parse.
		path: PathBuf,
		/// Underlying YAML failure.
		#[source]
		source: serde_yaml::Error,
	},
	/// An environment variable carried a value of the wrong shape.
	#[error("Environment variable `{name}` is invalid: {reason}.")]
	InvalidEnv {
		/// Variable name.
		name: &'static str,
		/// Why the value was rejected.
		reason: String,
	},
	/// A required field was never set.
	#[error("Configuration is missing `{field}`.")]
	MissingField {
		/// Dotted field name.
		field: &'static str,
	},
	/// A configured URL could not be parsed.
	#[error("Configured `{field}` is not a valid URL.")]
	InvalidUrl {
		/// Field holding the URL.
		field: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Issuer must use HTTPS unless it points at a loopback host.
	#[error("The issuer must use HTTPS: {url}.")]
	InsecureIssuer {
		/// Issuer URL that failed validation.
		url: String,
	},
	/// Configured scopes cannot be normalized.
	#[error("Configured scopes are invalid.")]
	InvalidScope(#[from] crate::auth::ScopeValidationError),
	/// Interaction handle failed validation.
	#[error("Interaction handle is invalid.")]
	InvalidHandle(#[from] crate::auth::HandleError),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the {endpoint} endpoint.")]
	Network {
		/// Endpoint being called.
		endpoint: Endpoint,
		/// HTTP status code, when the failure happened after headers arrived.
		status: Option<u16>,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Request exceeded the configured timeout.
	#[error("Request timed out while calling the {endpoint} endpoint.")]
	Timeout {
		/// Endpoint being called.
		endpoint: Endpoint,
		/// Transport-specific timeout error.
		#[source]
		source: BoxError,
	},
	/// Transport failed without a structured error.
	#[error("HTTP client error occurred while calling the {endpoint} endpoint: {message}.")]
	Other {
		/// Endpoint being called.
		endpoint: Endpoint,
		/// Transport-supplied message.
		message: String,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling an Identity Engine endpoint.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(
		endpoint: Endpoint,
		status: Option<u16>,
		src: impl 'static + Send + Sync + std::error::Error,
	) -> Self {
		Self::Network { endpoint, status, source: Box::new(src) }
	}

	/// Wraps a transport-specific timeout error.
	pub fn timeout(endpoint: Endpoint, src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Timeout { endpoint, source: Box::new(src) }
	}
}

/// A response body that is not the JSON the endpoint promises.
#[derive(Debug, ThisError)]
#[error("The {endpoint} endpoint returned malformed JSON.")]
pub struct DecodeError {
	/// Endpoint that produced the body.
	pub endpoint: Endpoint,
	/// HTTP status code, when available.
	pub status: Option<u16>,
	/// Dotted JSON path at which decoding failed, when known.
	pub path: Option<String>,
	/// Underlying JSON failure.
	#[source]
	pub source: serde_json::Error,
}
impl DecodeError {
	/// Wraps a path-aware decoding failure.
	pub fn with_path(
		endpoint: Endpoint,
		status: Option<u16>,
		err: serde_path_to_error::Error<serde_json::Error>,
	) -> Self {
		let path = err.path().to_string();

		Self { endpoint, status, path: Some(path), source: err.into_inner() }
	}

	/// JSON path at which decoding failed (`.` for the document root).
	pub fn path(&self) -> Option<&str> {
		self.path.as_deref()
	}
}
