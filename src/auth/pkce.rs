//! PKCE and `state` generation for interact calls.

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};
// self
use crate::{_prelude::*, auth::Secret};

const STATE_LEN: usize = 32;
const PKCE_VERIFIER_LEN: usize = 64;

/// Supported PKCE challenge methods surfaced via [`InteractionSession`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PkceCodeChallengeMethod {
	/// SHA-256 based PKCE (RFC 7636 S256).
	S256,
}
impl PkceCodeChallengeMethod {
	/// Returns the RFC 7636 identifier for the challenge method.
	pub fn as_str(self) -> &'static str {
		match self {
			PkceCodeChallengeMethod::S256 => "S256",
		}
	}
}

/// PKCE and `state` material generated for one interact call.
///
/// The interact endpoint only receives the challenge; the verifier is handed back to the caller
/// so the eventual interaction-code exchange can prove possession.
#[derive(Clone)]
pub struct InteractionSession {
	/// Opaque state value sent with the interact request.
	pub state: String,
	/// Redirect URI sent with the interact request, when configured.
	pub redirect_uri: Option<Url>,
	code_verifier: Secret,
	code_challenge: String,
	method: PkceCodeChallengeMethod,
}
impl InteractionSession {
	/// Generates a fresh verifier, challenge, and state.
	pub fn generate(redirect_uri: Option<Url>) -> Self {
		let verifier = random_string(PKCE_VERIFIER_LEN);
		let code_challenge = compute_pkce_challenge(&verifier);

		Self {
			state: random_string(STATE_LEN),
			redirect_uri,
			code_verifier: Secret::new(verifier),
			code_challenge,
			method: PkceCodeChallengeMethod::S256,
		}
	}

	/// PKCE code verifier; keep it out of logs.
	pub fn code_verifier(&self) -> &Secret {
		&self.code_verifier
	}

	/// PKCE code challenge derived from the secret verifier.
	pub fn code_challenge(&self) -> &str {
		&self.code_challenge
	}

	/// PKCE challenge method (currently always `S256`).
	pub fn code_challenge_method(&self) -> PkceCodeChallengeMethod {
		self.method
	}
}
impl Debug for InteractionSession {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("InteractionSession")
			.field("state", &self.state)
			.field("redirect_uri", &self.redirect_uri)
			.field("code_verifier", &self.code_verifier)
			.field("code_challenge", &self.code_challenge)
			.field("code_challenge_method", &self.method)
			.finish()
	}
}

fn random_string(len: usize) -> String {
	rand::rng().sample_iter(Alphanumeric).take(len).map(char::from).collect()
}

fn compute_pkce_challenge(verifier: &str) -> String {
	let mut hasher = Sha256::new();
	hasher.update(verifier.as_bytes());
	let digest = hasher.finalize();
	URL_SAFE_NO_PAD.encode(digest)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn challenge_matches_rfc7636_vector() {
		assert_eq!(
			compute_pkce_challenge("dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk"),
			"E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM"
		);
	}

	#[test]
	fn sessions_are_unique_and_redacted() {
		let first = InteractionSession::generate(None);
		let second = InteractionSession::generate(None);

		assert_eq!(first.state.len(), STATE_LEN);
		assert_eq!(first.code_verifier().expose().len(), PKCE_VERIFIER_LEN);
		assert_ne!(first.state, second.state);
		assert_ne!(first.code_challenge(), second.code_challenge());
		assert!(!format!("{first:?}").contains(first.code_verifier().expose()));
	}
}
