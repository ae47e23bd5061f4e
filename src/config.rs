//! Application credentials and endpoint selection.
//!
//! [`OpenApiConfig`] carries the app id, app secret, signing salt, and callback verification
//! token. [`Endpoints`] selects between the production and sandbox bases; both bases must use
//! HTTPS unless they point at a loopback host.

// self
use crate::{
	_prelude::*,
	auth::{AppId, Secret},
	error::ConfigError,
};

/// Production base for mini-app developer APIs.
pub const PRODUCTION_DEVELOPER_BASE: &str = "https://developer.toutiao.com";
/// Sandbox base for mini-app developer APIs.
pub const SANDBOX_DEVELOPER_BASE: &str = "https://open-sandbox.douyin.com";
/// Base for open-platform APIs (private messaging).
pub const OPEN_PLATFORM_BASE: &str = "https://open.douyin.com";

/// Base URLs that relative endpoint paths are joined onto.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoints {
	/// Base for token, login, payment, settlement, and link APIs.
	pub developer: Url,
	/// Base for open-platform APIs.
	pub open: Url,
}
impl Endpoints {
	/// Creates an endpoint set from explicit bases.
	pub fn new(developer: Url, open: Url) -> Self {
		Self { developer, open }
	}

	/// Production endpoints.
	pub fn production() -> Self {
		Self::from_static(PRODUCTION_DEVELOPER_BASE)
	}

	/// Sandbox endpoints; open-platform calls still target production.
	pub fn sandbox() -> Self {
		Self::from_static(SANDBOX_DEVELOPER_BASE)
	}

	/// Returns `true` when the developer base is the sandbox host.
	pub fn is_sandbox(&self) -> bool {
		self.developer.as_str() == Endpoints::sandbox().developer.as_str()
	}

	/// Joins a developer-API path onto the developer base.
	pub fn developer_url(&self, path: &'static str) -> Result<Url, ConfigError> {
		join(&self.developer, path)
	}

	/// Joins an open-platform path onto the open base.
	pub fn open_url(&self, path: &'static str) -> Result<Url, ConfigError> {
		join(&self.open, path)
	}

	fn from_static(developer: &str) -> Self {
		// Both constants are valid absolute URLs.
		let parse = |raw: &str| Url::parse(raw).unwrap_or_else(|_| unreachable!("{raw}"));

		Self { developer: parse(developer), open: parse(OPEN_PLATFORM_BASE) }
	}

	fn validate(&self) -> Result<(), ConfigError> {
		validate_base("developer", &self.developer)?;
		validate_base("open", &self.open)
	}
}
impl Default for Endpoints {
	fn default() -> Self {
		Self::production()
	}
}

/// Immutable configuration consumed by [`OpenApi`](crate::api::OpenApi).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenApiConfig {
	/// Mini-app identifier.
	pub app_id: AppId,
	/// Mini-app secret used for token exchange, login, and webhook signatures.
	pub app_secret: Secret,
	/// Shared salt appended when signing payment requests.
	pub salt: Secret,
	/// Token used to verify payment-family callback signatures.
	pub token: Secret,
	/// Whether the resolved developer base is the sandbox host.
	pub sandbox: bool,
	/// Base URLs for outbound calls.
	pub endpoints: Endpoints,
}
impl OpenApiConfig {
	/// Creates a new builder for the provided app.
	pub fn builder(app_id: AppId) -> OpenApiConfigBuilder {
		OpenApiConfigBuilder::new(app_id)
	}
}

/// Builder for [`OpenApiConfig`] values.
#[derive(Debug)]
pub struct OpenApiConfigBuilder {
	app_id: AppId,
	app_secret: Secret,
	salt: Secret,
	token: Secret,
	sandbox: bool,
	endpoints: Option<Endpoints>,
}
impl OpenApiConfigBuilder {
	/// Creates a new builder seeded with the provided app id.
	pub fn new(app_id: AppId) -> Self {
		Self {
			app_id,
			app_secret: Secret::default(),
			salt: Secret::default(),
			token: Secret::default(),
			sandbox: false,
			endpoints: None,
		}
	}

	/// Sets the app secret.
	pub fn app_secret(mut self, secret: impl Into<Secret>) -> Self {
		self.app_secret = secret.into();

		self
	}

	/// Sets the signing salt.
	pub fn salt(mut self, salt: impl Into<Secret>) -> Self {
		self.salt = salt.into();

		self
	}

	/// Sets the callback verification token.
	pub fn token(mut self, token: impl Into<Secret>) -> Self {
		self.token = token.into();

		self
	}

	/// Selects sandbox (`true`) or production (`false`) endpoints.
	pub fn sandbox(mut self, sandbox: bool) -> Self {
		self.sandbox = sandbox;

		self
	}

	/// Overrides the base URLs; takes precedence over [`sandbox`](Self::sandbox).
	pub fn endpoints(mut self, endpoints: Endpoints) -> Self {
		self.endpoints = Some(endpoints);

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<OpenApiConfig, ConfigError> {
		if self.app_secret.is_empty() {
			return Err(ConfigError::MissingField { field: "app secret" });
		}

		let endpoints = self.endpoints.unwrap_or_else(|| {
			if self.sandbox { Endpoints::sandbox() } else { Endpoints::production() }
		});

		endpoints.validate()?;

		Ok(OpenApiConfig {
			app_id: self.app_id,
			app_secret: self.app_secret,
			salt: self.salt,
			token: self.token,
			sandbox: endpoints.is_sandbox(),
			endpoints,
		})
	}
}

fn join(base: &Url, path: &'static str) -> Result<Url, ConfigError> {
	base.join(path).map_err(|source| ConfigError::InvalidEndpoint { path, source })
}

fn validate_base(name: &'static str, url: &Url) -> Result<(), ConfigError> {
	let loopback = matches!(url.host_str(), Some("localhost" | "127.0.0.1" | "[::1]"));

	if url.scheme() == "https" || (url.scheme() == "http" && loopback) {
		Ok(())
	} else {
		Err(ConfigError::InsecureEndpoint { endpoint: name, url: url.to_string() })
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn app_id() -> AppId {
		AppId::new("tt-config").expect("App id fixture should be valid.")
	}

	#[test]
	fn sandbox_flag_selects_sandbox_base() {
		let config = OpenApiConfig::builder(app_id())
			.app_secret("secret")
			.sandbox(true)
			.build()
			.expect("Sandbox configuration should build.");

		assert_eq!(config.endpoints.developer.as_str(), "https://open-sandbox.douyin.com/");
		assert_eq!(
			config
				.endpoints
				.developer_url("/api/apps/v2/token")
				.expect("Token path should join.")
				.as_str(),
			"https://open-sandbox.douyin.com/api/apps/v2/token"
		);
		assert_eq!(config.endpoints.open.as_str(), "https://open.douyin.com/");
	}

	#[test]
	fn production_is_the_default() {
		let config = OpenApiConfig::builder(app_id())
			.app_secret("secret")
			.build()
			.expect("Production configuration should build.");

		assert!(!config.sandbox);
		assert_eq!(config.endpoints, Endpoints::production());
	}

	#[test]
	fn sandbox_flag_follows_explicit_endpoints() {
		let config = OpenApiConfig::builder(app_id())
			.app_secret("secret")
			.sandbox(true)
			.endpoints(Endpoints::production())
			.build()
			.expect("Overridden configuration should build.");

		assert!(!config.sandbox);

		let config = OpenApiConfig::builder(app_id())
			.app_secret("secret")
			.endpoints(Endpoints::sandbox())
			.build()
			.expect("Sandbox endpoints should build.");

		assert!(config.sandbox);
	}

	#[test]
	fn rejects_plain_http_outside_loopback() {
		let insecure = Url::parse("http://example.com").expect("Fixture URL should parse.");
		let err = OpenApiConfig::builder(app_id())
			.app_secret("secret")
			.endpoints(Endpoints::new(insecure.clone(), insecure))
			.build()
			.expect_err("Plain HTTP base must be rejected.");

		assert!(matches!(err, ConfigError::InsecureEndpoint { endpoint: "developer", .. }));

		let local = Url::parse("http://127.0.0.1:8080").expect("Loopback URL should parse.");

		OpenApiConfig::builder(app_id())
			.app_secret("secret")
			.endpoints(Endpoints::new(local.clone(), local))
			.build()
			.expect("Loopback HTTP base should be accepted for local mocks.");
	}

	#[test]
	fn requires_app_secret() {
		let err = OpenApiConfig::builder(app_id()).build().expect_err("Missing secret must fail.");

		assert!(matches!(err, ConfigError::MissingField { field: "app secret" }));
	}
}
