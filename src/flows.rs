//! Interaction flow controller.

mod start;

pub use start::*;

// self
use crate::{
	_prelude::*,
	auth::ClientIdentity,
	config::Config,
	http::IdxHttpClient,
	idx::{ClientMetadata, IdxEndpoints, TransportErrorMapper},
};
#[cfg(feature = "reqwest")]
use crate::{config::ConfigSetter, http::ReqwestHttpClient, idx::ReqwestTransportErrorMapper};

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport stack.
pub type ReqwestIdxClient = IdxClient<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// Drives the interact -> introspect handshake against one Identity Engine issuer.
///
/// The client holds only immutable configuration and a shared transport, so it is cheap to
/// clone and safe to use from concurrent tasks. No interaction state survives between calls:
/// every [`IdxClient::start`] works with locally scoped requests and responses.
#[derive(Clone)]
pub struct IdxClient<C, M>
where
	C: ?Sized + IdxHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// HTTP client wrapper used for every outbound call.
	pub http_client: Arc<C>,
	/// Mapper applied to transport-layer errors before surfacing them to callers.
	pub transport_mapper: Arc<M>,
	/// Client credentials and scopes presented to the interact endpoint.
	pub identity: ClientIdentity,
	/// Endpoint URLs derived from the issuer.
	pub endpoints: IdxEndpoints,
	/// Redirect URI sent with interact, when configured.
	pub redirect_uri: Option<Url>,
	/// Product metadata advertised via `User-Agent`.
	pub client_metadata: ClientMetadata,
	/// Render each outgoing request as curl on the diagnostic stream.
	pub debug_requests: bool,
}
impl<C, M> IdxClient<C, M>
where
	C: ?Sized + IdxHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates a client that reuses the caller-provided transport + mapper pair.
	pub fn with_http_client(
		config: Config,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Result<Self> {
		let endpoints = IdxEndpoints::from_issuer(config.issuer()?)?;
		let identity = config.identity()?;

		Ok(Self {
			http_client: http_client.into(),
			transport_mapper: mapper.into(),
			identity,
			endpoints,
			redirect_uri: config.redirect_uri,
			client_metadata: ClientMetadata::default(),
			debug_requests: config.debug_requests,
		})
	}

	/// Replaces the product metadata advertised via `User-Agent`.
	pub fn with_client_metadata(mut self, metadata: ClientMetadata) -> Self {
		self.client_metadata = metadata;

		self
	}
}
#[cfg(feature = "reqwest")]
impl IdxClient<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Loads configuration from files and the environment, applies `overrides` in order, and
	/// provisions the default reqwest transport.
	pub fn new<I>(overrides: I) -> Result<Self>
	where
		I: IntoIterator<Item = ConfigSetter>,
	{
		Self::with_config(Config::load_with(overrides)?)
	}

	/// Builds a client from an explicit configuration with the default reqwest transport.
	pub fn with_config(config: Config) -> Result<Self> {
		let http_client = ReqwestHttpClient::from_config(&config)?;

		Self::with_http_client(config, http_client, Arc::new(ReqwestTransportErrorMapper))
	}
}
impl<C, M> Debug for IdxClient<C, M>
where
	C: ?Sized + IdxHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("IdxClient")
			.field("identity", &self.identity)
			.field("endpoints", &self.endpoints)
			.field("redirect_uri", &self.redirect_uri)
			.field("client_metadata", &self.client_metadata)
			.field("debug_requests", &self.debug_requests)
			.finish()
	}
}
