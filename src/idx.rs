//! Identity Engine wire layer: endpoints, request builders, response decoding, and transport
//! error mapping.

pub mod request;
pub mod response;

pub use oauth2;
pub use request::*;
pub use response::*;

// crates.io
use oauth2::HttpClientError;
// self
use crate::{
	_prelude::*,
	error::{ConfigError, TransportError},
	http::ResponseMetadata,
};

/// The two Identity Engine endpoints this client calls.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
	/// Starts an interaction and returns its handle.
	Interact,
	/// Reports the current state of an interaction.
	Introspect,
}
impl Endpoint {
	/// Returns a stable label suitable for errors, spans, and metrics.
	pub const fn as_str(self) -> &'static str {
		match self {
			Endpoint::Interact => "interact",
			Endpoint::Introspect => "introspect",
		}
	}
}
impl Display for Endpoint {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Endpoint URLs derived from the configured issuer.
///
/// `interact` hangs off the issuer path (`{issuer}/v1/interact`), while `introspect` lives at the
/// issuer's origin (`/idp/idx/introspect`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdxEndpoints {
	/// Interact endpoint.
	pub interact: Url,
	/// Introspect endpoint.
	pub introspect: Url,
}
impl IdxEndpoints {
	/// Derives both endpoints from an issuer URL.
	pub fn from_issuer(issuer: &Url) -> Result<Self, ConfigError> {
		let mut base = issuer.clone();

		base.set_query(None);
		base.set_fragment(None);

		let path = base.path().trim_end_matches('/').to_owned();

		base.set_path(&format!("{path}/"));

		let interact = base
			.join("v1/interact")
			.map_err(|source| ConfigError::InvalidUrl { field: "issuer", source })?;
		let introspect = base
			.join("/idp/idx/introspect")
			.map_err(|source| ConfigError::InvalidUrl { field: "issuer", source })?;

		Ok(Self { interact, introspect })
	}

	/// Returns the URL for `endpoint`.
	pub fn url(&self, endpoint: Endpoint) -> &Url {
		match endpoint {
			Endpoint::Interact => &self.interact,
			Endpoint::Introspect => &self.introspect,
		}
	}
}

/// Maps HTTP transport failures into client [`Error`] values.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Converts an [`HttpClientError`] emitted by the transport into a client error.
	fn map_transport_error(
		&self,
		endpoint: Endpoint,
		metadata: Option<&ResponseMetadata>,
		error: HttpClientError<E>,
	) -> Error;
}

/// Default mapper for reqwest-backed transports.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
#[cfg(feature = "reqwest")]
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(
		&self,
		endpoint: Endpoint,
		meta: Option<&ResponseMetadata>,
		err: HttpClientError<ReqwestError>,
	) -> Error {
		match err {
			HttpClientError::Reqwest(inner) => map_reqwest_error(endpoint, meta, *inner),
			HttpClientError::Http(inner) => ConfigError::from(inner).into(),
			HttpClientError::Io(inner) => TransportError::Io(inner).into(),
			HttpClientError::Other(message) => TransportError::Other { endpoint, message }.into(),
			_ => TransportError::Other { endpoint, message: "unrecognized transport failure".into() }
				.into(),
		}
	}
}

#[cfg(feature = "reqwest")]
fn map_reqwest_error(endpoint: Endpoint, meta: Option<&ResponseMetadata>, err: ReqwestError) -> Error {
	if err.is_builder() {
		return ConfigError::from(err).into();
	}
	if err.is_timeout() {
		return TransportError::timeout(endpoint, err).into();
	}

	let status = meta.and_then(|value| value.status).or_else(|| err.status().map(|s| s.as_u16()));

	TransportError::network(endpoint, status, err).into()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn issuer(raw: &str) -> Url {
		Url::parse(raw).expect("Issuer fixture should parse.")
	}

	#[test]
	fn endpoints_follow_issuer_layout() {
		let endpoints = IdxEndpoints::from_issuer(&issuer("https://example.okta.com/oauth2/default"))
			.expect("Endpoints should derive from a custom authorization server.");

		assert_eq!(endpoints.interact.as_str(), "https://example.okta.com/oauth2/default/v1/interact");
		assert_eq!(endpoints.introspect.as_str(), "https://example.okta.com/idp/idx/introspect");
	}

	#[test]
	fn endpoints_tolerate_trailing_slash_and_org_issuer() {
		let slashed = IdxEndpoints::from_issuer(&issuer("https://example.okta.com/oauth2/default/"))
			.expect("Trailing slash should be tolerated.");
		let org = IdxEndpoints::from_issuer(&issuer("https://example.okta.com"))
			.expect("Org issuer should be supported.");

		assert_eq!(slashed.url(Endpoint::Interact).as_str(), "https://example.okta.com/oauth2/default/v1/interact");
		assert_eq!(org.url(Endpoint::Interact).as_str(), "https://example.okta.com/v1/interact");
		assert_eq!(org.url(Endpoint::Introspect).as_str(), "https://example.okta.com/idp/idx/introspect");
	}

	#[cfg(feature = "reqwest")]
	#[test]
	fn reqwest_mapper_keeps_other_messages() {
		let err = ReqwestTransportErrorMapper.map_transport_error(
			Endpoint::Introspect,
			None,
			HttpClientError::Other("connection reset".into()),
		);

		assert!(matches!(
			err,
			Error::Transport(TransportError::Other { endpoint: Endpoint::Introspect, .. })
		));
	}
}
