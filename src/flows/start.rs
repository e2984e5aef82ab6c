//! Interact -> introspect orchestration.
//!
//! [`IdxClient::start`] issues at most two sequential calls. Without a caller-supplied
//! handle it first calls interact and fails with [`Error::MissingInteractionHandle`] if the
//! response carries no usable handle, so introspect never runs without one. Dropping the
//! returned future cancels whichever call is in flight.

// crates.io
use oauth2::{AsyncHttpClient, HttpRequest, HttpResponse};
// self
use crate::{
	_prelude::*,
	auth::{InteractionHandle, InteractionSession},
	curl,
	flows::IdxClient,
	http::{IdxHttpClient, ResponseMetadataSlot},
	idx::{self, Endpoint, InteractRequest, IntrospectRequest, IntrospectionResult, TransportErrorMapper},
	obs::{FlowSpan, FlowStage},
};

/// Outcome of a completed [`IdxClient::start`].
#[derive(Clone, Debug)]
pub struct IdxResponse {
	/// Handle that was introspected, either supplied or freshly acquired.
	pub interaction_handle: InteractionHandle,
	/// PKCE + state material, present only when this call performed interact.
	pub interaction: Option<InteractionSession>,
	/// Decoded introspect payload.
	pub introspection: IntrospectionResult,
}

impl<C, M> IdxClient<C, M>
where
	C: ?Sized + IdxHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Runs the handshake: interact (unless `interaction_handle` is supplied), then introspect.
	pub async fn start(&self, interaction_handle: Option<InteractionHandle>) -> Result<IdxResponse> {
		const STAGE: FlowStage = FlowStage::Start;

		let span = FlowSpan::start(STAGE);
		let result = span
			.instrument(async move {
				let (interaction_handle, interaction) = match interaction_handle {
					Some(handle) => (handle, None),
					None => {
						let (handle, session) = self.interact().await?;

						(handle, Some(session))
					},
				};
				let introspection = self.introspect(&interaction_handle).await?;

				Ok(IdxResponse { interaction_handle, interaction, introspection })
			})
			.await;

		span.finish(result)
	}

	/// Calls interact and returns the acquired handle with the PKCE material that was sent.
	pub async fn interact(&self) -> Result<(InteractionHandle, InteractionSession)> {
		const ENDPOINT: Endpoint = Endpoint::Interact;

		let span = FlowSpan::start(FlowStage::from(ENDPOINT));
		let result = span
			.instrument(async move {
				let session = InteractionSession::generate(self.redirect_uri.clone());
				let request = InteractRequest { identity: &self.identity, session: &session }
					.build(self.endpoints.url(ENDPOINT), &self.client_metadata)?;
				let response = self.send(ENDPOINT, request).await?;
				let handle =
					idx::decode_interact(&response)?.ok_or(Error::MissingInteractionHandle)?;

				Ok((handle, session))
			})
			.await;

		span.finish(result)
	}

	/// Calls introspect for `interaction_handle` and decodes the payload.
	pub async fn introspect(
		&self,
		interaction_handle: &InteractionHandle,
	) -> Result<IntrospectionResult> {
		const ENDPOINT: Endpoint = Endpoint::Introspect;

		let span = FlowSpan::start(FlowStage::from(ENDPOINT));
		let result = span
			.instrument(async move {
				let request = IntrospectRequest { interaction_handle }
					.build(self.endpoints.url(ENDPOINT), &self.client_metadata)?;
				let response = self.send(ENDPOINT, request).await?;

				Ok(idx::decode_introspect(&response)?)
			})
			.await;

		span.finish(result)
	}

	async fn send(&self, endpoint: Endpoint, request: HttpRequest) -> Result<HttpResponse> {
		if self.debug_requests {
			curl::emit(&request);
		}

		let meta = ResponseMetadataSlot::default();
		let handle = self.http_client.with_metadata(meta.clone());
		let response = handle.call(request).await.map_err(|err| {
			self.transport_mapper.map_transport_error(endpoint, meta.take().as_ref(), err)
		})?;

		if !response.status().is_success() {
			return Err(idx::rejection(endpoint, &response));
		}

		Ok(response)
	}
}
