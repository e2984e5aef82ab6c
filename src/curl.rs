//! Curl rendering of outgoing requests for diagnostics.
//!
//! Rendering only borrows the request, so the body the transport sends afterwards is exactly
//! the body that was rendered, no matter how rendering ends.

// std
use std::fmt::Write as _;
// crates.io
use oauth2::HttpRequest;

/// Renders `request` as a single-line curl command.
///
/// Headers appear in the request's own iteration order with repeated values joined by `", "`.
/// The body is emitted as a double-quoted, escaped `-d` argument and omitted when empty.
pub fn render(request: &HttpRequest) -> String {
	let mut command = format!("curl -X {} '{}'", request.method(), request.uri());
	let headers = request.headers();

	for name in headers.keys() {
		let joined = headers
			.get_all(name)
			.iter()
			.map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
			.collect::<Vec<_>>()
			.join(", ");

		let _ = write!(command, " -H '{name}: {joined}'");
	}

	let body = request.body();

	if !body.is_empty() {
		let _ = write!(command, " -d {:?}", String::from_utf8_lossy(body));
	}

	command
}

/// Writes the curl rendering of `request` to the diagnostic stream.
///
/// With the `tracing` feature the command is a `DEBUG` event on the `identity_engine::curl`
/// target; otherwise it goes to stderr.
pub fn emit(request: &HttpRequest) {
	let command = render(request);

	#[cfg(feature = "tracing")]
	{
		tracing::debug!(target: "identity_engine::curl", %command, "Outgoing request.");
	}
	#[cfg(not(feature = "tracing"))]
	{
		eprintln!("cURL Command: {command}");
	}
}
