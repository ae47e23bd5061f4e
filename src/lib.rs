//! Async bindings for the Douyin mini-app OpenAPI: cached access tokens behind a per-key
//! singleflight guard, salted request signatures for the payment and settlement endpoints, and
//! verified two-stage decoding of payment callbacks and webhooks.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod api;
pub mod auth;
pub mod cache;
pub mod callback;
pub mod config;
pub mod credential;
pub mod error;
pub mod http;
pub mod obs;
pub mod sign;
pub mod webhook;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		api::{OpenApi, ReqwestOpenApi},
		auth::AppId,
		cache::{CredentialCache, MemoryCache},
		config::{Endpoints, OpenApiConfig},
		http::ReqwestHttpClient,
	};

	/// Application identifier shared by integration tests.
	pub const TEST_APP_ID: &str = "tt07e3715e98c9aac0";
	/// Application secret shared by integration tests.
	pub const TEST_APP_SECRET: &str = "app-secret";
	/// Signing salt shared by integration tests.
	pub const TEST_SALT: &str = "salt-value";
	/// Callback verification token shared by integration tests.
	pub const TEST_TOKEN: &str = "callback-token";

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Builds a configuration whose developer and open-platform bases both point at `base_url`.
	pub fn test_config(app_id: &str, base_url: &str) -> OpenApiConfig {
		let base = Url::parse(base_url).expect("Mock server base URL should parse.");

		OpenApiConfig::builder(AppId::new(app_id).expect("Test app id should be valid."))
			.app_secret(TEST_APP_SECRET)
			.salt(TEST_SALT)
			.token(TEST_TOKEN)
			.endpoints(Endpoints::new(base.clone(), base))
			.build()
			.expect("Test configuration should build.")
	}

	/// Constructs an [`OpenApi`] backed by an in-memory cache and the insecure reqwest transport
	/// used across integration tests.
	pub fn build_reqwest_test_api(app_id: &str, base_url: &str) -> (ReqwestOpenApi, Arc<MemoryCache>) {
		let cache_backend = Arc::new(MemoryCache::default());
		let cache: Arc<dyn CredentialCache> = cache_backend.clone();
		let api = OpenApi::with_http_client(test_config(app_id, base_url), test_reqwest_http_client())
			.with_cache(cache);

		(api, cache_backend)
	}
}

mod _prelude {
	pub use std::{
		collections::HashMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize, de::DeserializeOwned};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _, tokio as _};
