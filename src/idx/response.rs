//! Response decoding for interact and introspect.
//!
//! Bodies are first parsed as generic JSON; only a body that is not JSON at all surfaces as a
//! [`DecodeError`]. Typed views are then filled best-effort, so nothing here panics or fails on
//! well-formed remote input.

// crates.io
use oauth2::HttpResponse;
use serde_json::Value;
use time::format_description::well_known::Rfc3339;
// self
use crate::{_prelude::*, auth::InteractionHandle, error::DecodeError, idx::Endpoint};

const MESSAGE_PREVIEW_LEN: usize = 256;

/// Typed view of an introspect payload.
///
/// Only the commonly used fields are modeled, and all of them are optional because the
/// Identity Engine omits whatever does not apply to the current step. A field whose value has
/// an unexpected shape is left empty rather than failing the call. The complete payload is
/// kept in [`raw`](Self::raw).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IntrospectionResult {
	/// Interaction state (`PENDING`, `SUCCESS`, ...), when the payload carries one.
	pub state: Option<String>,
	/// IDX protocol version.
	pub version: Option<String>,
	/// State handle used by follow-up remediation calls.
	pub state_handle: Option<String>,
	/// Instant at which the interaction expires, when given as RFC 3339.
	pub expires_at: Option<OffsetDateTime>,
	/// Interaction intent, e.g. `LOGIN`.
	pub intent: Option<String>,
	/// Next steps the user may take.
	pub remediations: Vec<Remediation>,
	/// Entire decoded payload.
	pub raw: Value,
}
impl IntrospectionResult {
	/// Names of the offered remediations, in payload order.
	pub fn remediation_names(&self) -> impl Iterator<Item = &str> {
		self.remediations.iter().map(|r| r.name.as_str())
	}

	/// Returns the remediation with the given name.
	pub fn remediation(&self, name: &str) -> Option<&Remediation> {
		self.remediations.iter().find(|r| r.name == name)
	}

	/// Looks up an unmodeled field by JSON pointer, e.g. `/app/value/label`.
	pub fn pointer(&self, pointer: &str) -> Option<&Value> {
		self.raw.pointer(pointer)
	}
}
impl From<Value> for IntrospectionResult {
	fn from(raw: Value) -> Self {
		let text = |name: &str| raw.get(name).and_then(Value::as_str).map(str::to_owned);

		Self {
			state: text("state"),
			version: text("version"),
			state_handle: text("stateHandle"),
			expires_at: raw
				.get("expiresAt")
				.and_then(Value::as_str)
				.and_then(|at| OffsetDateTime::parse(at, &Rfc3339).ok()),
			intent: text("intent"),
			remediations: remediations(raw.get("remediation")),
			raw,
		}
	}
}

/// One remediation option offered by the Identity Engine.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Remediation {
	/// Remediation name, e.g. `identify`.
	pub name: String,
	/// Endpoint that accepts the remediation.
	#[serde(default)]
	pub href: Option<String>,
	/// HTTP method for `href`.
	#[serde(default)]
	pub method: Option<String>,
}

/// Decodes the interact body into a handle.
///
/// An empty body, any JSON value other than an object, and a missing, non-string, empty, or
/// otherwise unusable `interaction_handle` all yield `Ok(None)`; only a body that is not JSON
/// is an error.
pub fn decode_interact(response: &HttpResponse) -> Result<Option<InteractionHandle>, DecodeError> {
	if response.body().iter().all(u8::is_ascii_whitespace) {
		return Ok(None);
	}

	let body = decode(Endpoint::Interact, response)?;

	Ok(body
		.as_object()
		.and_then(|object| object.get("interaction_handle"))
		.and_then(Value::as_str)
		.and_then(|raw| InteractionHandle::new(raw).ok()))
}

/// Decodes the introspect body into an [`IntrospectionResult`].
pub fn decode_introspect(response: &HttpResponse) -> Result<IntrospectionResult, DecodeError> {
	Ok(decode(Endpoint::Introspect, response)?.into())
}

/// Builds the [`Error::Rejected`] value for a non-success response.
pub fn rejection(endpoint: Endpoint, response: &HttpResponse) -> Error {
	let status = response.status();
	let message = serde_json::from_slice::<Value>(response.body())
		.ok()
		.and_then(|body| error_message(&body))
		.unwrap_or_else(|| status.canonical_reason().unwrap_or("Unexpected status").to_owned());

	Error::Rejected { endpoint, status: status.as_u16(), message: truncate(message) }
}

fn decode(endpoint: Endpoint, response: &HttpResponse) -> Result<Value, DecodeError> {
	let status = Some(response.status().as_u16());
	let mut de = serde_json::Deserializer::from_slice(response.body());
	let value = serde_path_to_error::deserialize(&mut de)
		.map_err(|e| DecodeError::with_path(endpoint, status, e))?;

	de.end().map_err(|source| DecodeError { endpoint, status, path: None, source })?;

	Ok(value)
}

fn error_message(body: &Value) -> Option<String> {
	let text = |value: Option<&Value>| value.and_then(Value::as_str).map(str::to_owned);

	text(body.get("error_description"))
		.or_else(|| text(body.get("errorSummary")))
		.or_else(|| text(body.pointer("/messages/value/0/message")))
		.or_else(|| text(body.get("error")))
}

fn truncate(mut message: String) -> String {
	if message.len() > MESSAGE_PREVIEW_LEN {
		let mut cut = MESSAGE_PREVIEW_LEN;

		while !message.is_char_boundary(cut) {
			cut -= 1;
		}

		message.truncate(cut);
	}

	message
}

/// Accepts both the ion collection shape (`{"type":"array","value":[...]}`) and a bare array,
/// skipping entries without a usable `name`.
fn remediations(value: Option<&Value>) -> Vec<Remediation> {
	let entries = match value {
		Some(Value::Array(entries)) => entries,
		Some(Value::Object(collection)) => match collection.get("value") {
			Some(Value::Array(entries)) => entries,
			_ => return Vec::new(),
		},
		_ => return Vec::new(),
	};

	entries.iter().filter_map(|entry| Remediation::deserialize(entry).ok()).collect()
}
