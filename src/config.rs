//! Layered client configuration.
//!
//! Values are resolved in this order, later sources overriding earlier ones:
//!
//! 1. `~/.okta/okta.yaml`
//! 2. `./.okta.yaml`
//! 3. `OKTA_CLIENT_IDX_*` environment variables
//! 4. [`ConfigSetter`] overrides passed to [`IdxClient::new`](crate::flows::IdxClient::new)
//!
//! Missing files are skipped; files that exist but cannot be read or parsed are errors.

// std
use std::{
	env, fs,
	io::ErrorKind,
	path::{Path, PathBuf},
	time::Duration as StdDuration,
};
// crates.io
use url::Host;
// self
use crate::{
	_prelude::*,
	auth::{ClientIdentity, ScopeList, Secret},
	error::ConfigError,
};

const ENV_ISSUER: &str = "OKTA_CLIENT_IDX_ISSUER";
const ENV_CLIENT_ID: &str = "OKTA_CLIENT_IDX_CLIENTID";
const ENV_CLIENT_SECRET: &str = "OKTA_CLIENT_IDX_CLIENTSECRET";
const ENV_SCOPES: &str = "OKTA_CLIENT_IDX_SCOPES";
const ENV_REDIRECT_URI: &str = "OKTA_CLIENT_IDX_REDIRECTURI";
const ENV_REQUEST_TIMEOUT_SECS: &str = "OKTA_CLIENT_IDX_REQUESTTIMEOUTSECS";
const ENV_DEBUG_REQUESTS: &str = "OKTA_CLIENT_IDX_DEBUGREQUESTS";

/// Caller-supplied override applied after files and environment variables.
pub type ConfigSetter = Box<dyn FnOnce(&mut Config) + Send>;

/// Resolved client configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Config {
	/// Authorization server issuer, e.g. `https://example.okta.com/oauth2/default`.
	pub issuer: Option<Url>,
	/// OAuth 2.0 client identifier.
	pub client_id: Option<String>,
	/// Client secret for confidential clients.
	pub client_secret: Option<Secret>,
	/// Requested scopes, in order.
	pub scopes: ScopeList,
	/// Redirect URI registered for the client.
	pub redirect_uri: Option<Url>,
	/// Per-request timeout applied by the default transport.
	pub request_timeout: Option<StdDuration>,
	/// Emit a curl rendering of every outgoing request to the diagnostic stream.
	pub debug_requests: bool,
}
impl Config {
	/// Loads configuration from the default files and the process environment.
	pub fn load() -> Result<Self, ConfigError> {
		let mut config = Self::default();

		for path in default_files() {
			config.merge_file(&path)?;
		}

		config.apply_env(|name| env::var(name).ok())?;

		Ok(config)
	}

	/// Loads configuration, then applies each override in order.
	pub fn load_with<I>(overrides: I) -> Result<Self, ConfigError>
	where
		I: IntoIterator<Item = ConfigSetter>,
	{
		let mut config = Self::load()?;

		config.apply(overrides);

		Ok(config)
	}

	/// Applies overrides in order.
	pub fn apply<I>(&mut self, overrides: I)
	where
		I: IntoIterator<Item = ConfigSetter>,
	{
		for setter in overrides {
			setter(self);
		}
	}

	/// Merges a YAML file into the configuration; a missing file is a no-op.
	pub fn merge_file(&mut self, path: &Path) -> Result<(), ConfigError> {
		let raw = match fs::read_to_string(path) {
			Ok(raw) => raw,
			Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
			Err(source) => return Err(ConfigError::Read { path: path.to_owned(), source }),
		};

		self.merge_yaml(&raw, path)
	}

	/// Merges a YAML document; `origin` is only used in error messages.
	pub fn merge_yaml(&mut self, raw: &str, origin: &Path) -> Result<(), ConfigError> {
		if raw.trim().is_empty() {
			return Ok(());
		}

		let file: ConfigFile = serde_yaml::from_str(raw)
			.map_err(|source| ConfigError::Parse { path: origin.to_owned(), source })?;
		let Some(section) = file.okta.and_then(|okta| okta.client).and_then(|client| client.idx)
		else {
			return Ok(());
		};

		if let Some(issuer) = section.issuer {
			self.issuer = Some(parse_url("issuer", &issuer)?);
		}
		if let Some(client_id) = section.client_id {
			self.client_id = Some(client_id);
		}
		if let Some(secret) = section.client_secret {
			self.client_secret = Some(Secret::new(secret));
		}
		if let Some(scopes) = section.scopes {
			self.scopes = scopes;
		}
		if let Some(redirect) = section.redirect_uri {
			self.redirect_uri = Some(parse_url("redirectUri", &redirect)?);
		}
		if let Some(secs) = section.request_timeout_secs {
			self.request_timeout = Some(StdDuration::from_secs(secs));
		}
		if let Some(debug) = section.debug_requests {
			self.debug_requests = debug;
		}

		Ok(())
	}

	/// Applies `OKTA_CLIENT_IDX_*` variables resolved through `lookup`.
	pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let read = |name: &'static str| lookup(name).filter(|value| !value.trim().is_empty());

		if let Some(issuer) = read(ENV_ISSUER) {
			self.issuer = Some(parse_url("issuer", issuer.trim())?);
		}
		if let Some(client_id) = read(ENV_CLIENT_ID) {
			self.client_id = Some(client_id.trim().to_owned());
		}
		if let Some(secret) = read(ENV_CLIENT_SECRET) {
			self.client_secret = Some(Secret::new(secret));
		}
		if let Some(scopes) = read(ENV_SCOPES) {
			self.scopes = ScopeList::from_str(&scopes).map_err(|e| ConfigError::InvalidEnv {
				name: ENV_SCOPES,
				reason: e.to_string(),
			})?;
		}
		if let Some(redirect) = read(ENV_REDIRECT_URI) {
			self.redirect_uri = Some(parse_url("redirectUri", redirect.trim())?);
		}
		if let Some(secs) = read(ENV_REQUEST_TIMEOUT_SECS) {
			let secs = secs.trim().parse::<u64>().map_err(|e| ConfigError::InvalidEnv {
				name: ENV_REQUEST_TIMEOUT_SECS,
				reason: e.to_string(),
			})?;

			self.request_timeout = Some(StdDuration::from_secs(secs));
		}
		if let Some(debug) = read(ENV_DEBUG_REQUESTS) {
			self.debug_requests = parse_bool(ENV_DEBUG_REQUESTS, &debug)?;
		}

		Ok(())
	}

	/// Checks that every required field is present and well-formed.
	pub fn validate(&self) -> Result<(), ConfigError> {
		self.issuer()?;
		self.identity()?;

		Ok(())
	}

	/// Returns the validated issuer.
	pub fn issuer(&self) -> Result<&Url, ConfigError> {
		let issuer = self.issuer.as_ref().ok_or(ConfigError::MissingField { field: "issuer" })?;

		validate_issuer(issuer)?;

		Ok(issuer)
	}

	/// Builds the client identity presented to the interact endpoint.
	pub fn identity(&self) -> Result<ClientIdentity, ConfigError> {
		let client_id = self
			.client_id
			.as_deref()
			.map(str::trim)
			.filter(|id| !id.is_empty())
			.ok_or(ConfigError::MissingField { field: "clientId" })?;

		if self.scopes.is_empty() {
			return Err(ConfigError::MissingField { field: "scopes" });
		}

		let mut identity = ClientIdentity::new(client_id, self.scopes.clone());

		if let Some(secret) = self.client_secret.clone().filter(|s| !s.expose().is_empty()) {
			identity = identity.with_client_secret(secret);
		}

		Ok(identity)
	}
}

/// Overrides the issuer.
pub fn with_issuer(issuer: Url) -> ConfigSetter {
	Box::new(move |config: &mut Config| config.issuer = Some(issuer))
}

/// Overrides the client identifier.
pub fn with_client_id(client_id: impl Into<String>) -> ConfigSetter {
	let client_id = client_id.into();

	Box::new(move |config: &mut Config| config.client_id = Some(client_id))
}

/// Overrides the client secret.
pub fn with_client_secret(secret: impl Into<Secret>) -> ConfigSetter {
	let secret = secret.into();

	Box::new(move |config: &mut Config| config.client_secret = Some(secret))
}

/// Overrides the requested scopes.
pub fn with_scopes(scopes: ScopeList) -> ConfigSetter {
	Box::new(move |config: &mut Config| config.scopes = scopes)
}

/// Overrides the redirect URI.
pub fn with_redirect_uri(redirect_uri: Url) -> ConfigSetter {
	Box::new(move |config: &mut Config| config.redirect_uri = Some(redirect_uri))
}

/// Overrides the per-request timeout.
pub fn with_request_timeout(timeout: StdDuration) -> ConfigSetter {
	Box::new(move |config: &mut Config| config.request_timeout = Some(timeout))
}

/// Toggles curl logging of outgoing requests.
pub fn with_debug_requests(enabled: bool) -> ConfigSetter {
	Box::new(move |config: &mut Config| config.debug_requests = enabled)
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
	okta: Option<OktaSection>,
}

#[derive(Debug, Default, Deserialize)]
struct OktaSection {
	client: Option<ClientSection>,
}

#[derive(Debug, Default, Deserialize)]
struct ClientSection {
	idx: Option<IdxSection>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IdxSection {
	issuer: Option<String>,
	client_id: Option<String>,
	client_secret: Option<String>,
	scopes: Option<ScopeList>,
	redirect_uri: Option<String>,
	request_timeout_secs: Option<u64>,
	debug_requests: Option<bool>,
}

fn default_files() -> Vec<PathBuf> {
	let mut files = Vec::with_capacity(2);

	if let Some(home) = dirs::home_dir() {
		files.push(home.join(".okta").join("okta.yaml"));
	}

	files.push(PathBuf::from(".okta.yaml"));

	files
}

fn parse_url(field: &'static str, raw: &str) -> Result<Url, ConfigError> {
	Url::parse(raw).map_err(|source| ConfigError::InvalidUrl { field, source })
}

fn parse_bool(name: &'static str, raw: &str) -> Result<bool, ConfigError> {
	match raw.trim().to_ascii_lowercase().as_str() {
		"1" | "true" | "yes" | "on" => Ok(true),
		"0" | "false" | "no" | "off" => Ok(false),
		other => Err(ConfigError::InvalidEnv { name, reason: format!("`{other}` is not a boolean") }),
	}
}

fn validate_issuer(url: &Url) -> Result<(), ConfigError> {
	let loopback = match url.host() {
		Some(Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
		Some(Host::Ipv4(ip)) => ip.is_loopback(),
		Some(Host::Ipv6(ip)) => ip.is_loopback(),
		None => false,
	};

	if url.scheme() == "https" || (url.scheme() == "http" && loopback) {
		Ok(())
	} else {
		Err(ConfigError::InsecureIssuer { url: url.to_string() })
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::collections::HashMap;
	// self
	use super::*;

	const YAML: &str = "\
okta:
  client:
    idx:
      issuer: https://example.okta.com/oauth2/default
      clientId: abc
      clientSecret: xyz
      scopes:
        - openid
        - profile
      requestTimeoutSecs: 15
";

	fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
		let map: HashMap<String, String> =
			pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();

		move |name: &str| map.get(name).cloned()
	}

	#[test]
	fn yaml_populates_identity() {
		let mut config = Config::default();

		config.merge_yaml(YAML, Path::new("okta.yaml")).expect("Fixture YAML should merge.");

		let identity = config.identity().expect("Identity should build from fixture.");

		assert_eq!(identity.client_id, "abc");
		assert_eq!(identity.client_secret.as_ref().map(Secret::expose), Some("xyz"));
		assert_eq!(identity.scope(), "openid profile");
		assert_eq!(config.request_timeout, Some(StdDuration::from_secs(15)));
		assert!(config.validate().is_ok());
	}

	#[test]
	fn env_overrides_file_and_setters_override_env() {
		let mut config = Config::default();

		config.merge_yaml(YAML, Path::new("okta.yaml")).expect("Fixture YAML should merge.");
		config
			.apply_env(env(&[
				(ENV_CLIENT_ID, "from-env"),
				(ENV_SCOPES, "openid,email"),
				(ENV_DEBUG_REQUESTS, "true"),
			]))
			.expect("Environment overrides should apply.");

		assert_eq!(config.client_id.as_deref(), Some("from-env"));
		assert_eq!(config.scopes.joined(), "openid email");
		assert!(config.debug_requests);

		config.apply([with_client_id("from-setter"), with_debug_requests(false)]);

		assert_eq!(config.client_id.as_deref(), Some("from-setter"));
		assert!(!config.debug_requests);
	}

	#[test]
	fn invalid_env_values_are_rejected() {
		let err = Config::default()
			.apply_env(env(&[(ENV_REQUEST_TIMEOUT_SECS, "soon")]))
			.expect_err("Non-numeric timeout must fail.");

		assert!(matches!(err, ConfigError::InvalidEnv { name: ENV_REQUEST_TIMEOUT_SECS, .. }));

		let err = Config::default()
			.apply_env(env(&[(ENV_DEBUG_REQUESTS, "maybe")]))
			.expect_err("Unknown boolean must fail.");

		assert!(matches!(err, ConfigError::InvalidEnv { name: ENV_DEBUG_REQUESTS, .. }));
	}

	#[test]
	fn validation_reports_missing_fields() {
		let mut config = Config::default();

		assert!(matches!(config.validate(), Err(ConfigError::MissingField { field: "issuer" })));

		config.apply([with_issuer(
			Url::parse("https://example.okta.com").expect("Issuer fixture should parse."),
		)]);

		assert!(matches!(config.validate(), Err(ConfigError::MissingField { field: "clientId" })));

		config.apply([with_client_id("abc")]);

		assert!(matches!(config.validate(), Err(ConfigError::MissingField { field: "scopes" })));
	}

	#[test]
	fn issuer_must_be_https_unless_loopback() {
		let remote = Url::parse("http://example.okta.com").expect("Fixture should parse.");
		let local = Url::parse("http://127.0.0.1:8080/oauth2/default").expect("Fixture should parse.");

		assert!(matches!(validate_issuer(&remote), Err(ConfigError::InsecureIssuer { .. })));
		assert!(validate_issuer(&local).is_ok());
	}

	#[test]
	fn malformed_yaml_is_a_parse_error() {
		let err = Config::default()
			.merge_yaml("okta: [", Path::new("broken.yaml"))
			.expect_err("Malformed YAML must fail.");

		assert!(matches!(err, ConfigError::Parse { .. }));
	}

	#[test]
	fn missing_file_is_skipped() {
		let mut config = Config::default();

		config
			.merge_file(Path::new("/nonexistent/identity-engine-client/okta.yaml"))
			.expect("Missing files should be ignored.");

		assert_eq!(config, Config::default());
	}
}
