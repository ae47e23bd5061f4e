//! Access-token acquisition with caching and per-key singleflight guards.
//!
//! [`DefaultAccessTokenProvider`] serves tokens from the configured [`CredentialCache`] and only
//! contacts the token endpoint when the cached entry is missing. Concurrent callers that miss at
//! the same time queue on a per-cache-key async mutex taken from a [`FlightGuards`] registry, so
//! exactly one of them performs the exchange while the others pick up the freshly cached value.
//! Readers never touch the guard once a live entry exists.

// std
use std::sync::LazyLock;
// self
use crate::{
	_prelude::*,
	api,
	auth::{AccessToken, AppId},
	cache::CredentialCache,
	config::OpenApiConfig,
	http::{self, JsonRequest, OpenApiHttpClient},
	obs::{self, CredentialEvent, Operation},
};

/// Token endpoint relative to the developer base.
pub const TOKEN_PATH: &str = "/api/apps/v2/token";

/// Boxed future returned by [`AccessTokenProvider::access_token`].
pub type TokenFuture<'a> = Pin<Box<dyn Future<Output = Result<AccessToken>> + 'a + Send>>;

/// Source of bearer credentials for the token-gated endpoints.
pub trait AccessTokenProvider
where
	Self: Send + Sync,
{
	/// Key under which the credential is cached.
	fn cache_key(&self) -> &str;

	/// Returns a valid access token, exchanging a new one when needed.
	fn access_token(&self) -> TokenFuture<'_>;
}

/// Default cache key for an application.
pub fn default_cache_key(app_id: &AppId) -> String {
	format!("douyin_openapi_access_token_{app_id}")
}

/// Registry of per-key async guards.
///
/// An entry lives only while some caller holds or waits on its guard; the last holder removes it
/// on the way out, so the registry stays bounded by the number of in-flight exchanges.
#[derive(Debug, Default)]
pub struct FlightGuards(Mutex<HashMap<String, Arc<AsyncMutex<()>>>>);
impl FlightGuards {
	/// Process-wide registry shared by every provider that does not opt out.
	pub fn global() -> Arc<Self> {
		static GLOBAL: LazyLock<Arc<FlightGuards>> = LazyLock::new(Default::default);

		GLOBAL.clone()
	}

	/// Returns (and creates on demand) the guard for `key`.
	pub fn guard(&self, key: &str) -> Arc<AsyncMutex<()>> {
		let mut guards = self.0.lock();

		guards.entry(key.to_owned()).or_insert_with(|| Arc::new(AsyncMutex::new(()))).clone()
	}

	/// Hands back a guard obtained from [`guard`](Self::guard), dropping the entry when no other
	/// caller still references it.
	pub fn release(&self, key: &str, guard: Arc<AsyncMutex<()>>) {
		let mut guards = self.0.lock();

		// Clones are only taken under the registry lock, so the count cannot grow concurrently.
		if guards.get(key).is_some_and(|entry| Arc::ptr_eq(entry, &guard))
			&& Arc::strong_count(&guard) == 2
		{
			guards.remove(key);
		}
	}

	/// Number of keys with a registered guard.
	pub fn len(&self) -> usize {
		self.0.lock().len()
	}

	/// Returns `true` when no guard has been created yet.
	pub fn is_empty(&self) -> bool {
		self.0.lock().is_empty()
	}
}

#[derive(Debug, Serialize)]
struct TokenRequest<'a> {
	appid: &'a str,
	secret: &'a str,
	grant_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
	#[serde(default)]
	err_no: i64,
	#[serde(default)]
	err_tips: String,
	#[serde(default)]
	data: TokenData,
}
api::impl_envelope!(TokenResponse, err_no, err_tips);

#[derive(Debug, Default, Deserialize)]
struct TokenData {
	#[serde(default)]
	access_token: String,
	#[serde(default)]
	expires_in: i64,
}

/// Provider that exchanges the app credentials at the platform token endpoint.
pub struct DefaultAccessTokenProvider<C>
where
	C: ?Sized + OpenApiHttpClient,
{
	http_client: Arc<C>,
	config: Arc<OpenApiConfig>,
	cache: Arc<dyn CredentialCache>,
	guards: Arc<FlightGuards>,
	cache_key: String,
}
impl<C> DefaultAccessTokenProvider<C>
where
	C: ?Sized + OpenApiHttpClient,
{
	/// Creates a provider using the default cache key and the process-wide guard registry.
	pub fn new(
		config: Arc<OpenApiConfig>,
		http_client: Arc<C>,
		cache: Arc<dyn CredentialCache>,
	) -> Self {
		let cache_key = default_cache_key(&config.app_id);

		Self { http_client, config, cache, guards: FlightGuards::global(), cache_key }
	}

	/// Overrides the cache key.
	pub fn with_cache_key(mut self, cache_key: impl Into<String>) -> Self {
		self.cache_key = cache_key.into();

		self
	}

	/// Uses a private guard registry instead of the process-wide one.
	pub fn with_guards(mut self, guards: Arc<FlightGuards>) -> Self {
		self.guards = guards;

		self
	}

	async fn fetch(&self) -> Result<AccessToken> {
		if let Some(value) = self.cache.get(&self.cache_key).await? {
			obs::credential_event(&self.cache_key, CredentialEvent::Hit);

			return Ok(AccessToken::cached(value));
		}

		let guard = self.guards.guard(&self.cache_key);
		let result = self.refresh(&guard).await;

		self.guards.release(&self.cache_key, guard);

		result
	}

	async fn refresh(&self, guard: &AsyncMutex<()>) -> Result<AccessToken> {
		let _singleflight = guard.lock().await;

		// A concurrent holder may have refreshed the entry while we waited.
		if let Some(value) = self.cache.get(&self.cache_key).await? {
			obs::credential_event(&self.cache_key, CredentialEvent::Coalesced);

			return Ok(AccessToken::cached(value));
		}

		obs::credential_event(&self.cache_key, CredentialEvent::Refresh);

		let token = obs::observe(Operation::AccessToken, "exchange", self.exchange()).await?;

		match token.cache_ttl() {
			Some(ttl) => self.cache.set(&self.cache_key, token.expose().to_owned(), ttl).await?,
			None => obs::credential_event(&self.cache_key, CredentialEvent::Uncached),
		}

		Ok(token)
	}

	async fn exchange(&self) -> Result<AccessToken> {
		const OPERATION: Operation = Operation::AccessToken;

		let url = self.config.endpoints.developer_url(TOKEN_PATH)?;
		let body = http::encode_body(
			OPERATION,
			&TokenRequest {
				appid: self.config.app_id.as_ref(),
				secret: self.config.app_secret.expose(),
				grant_type: "client_credential",
			},
		)?;
		let response: TokenResponse =
			http::send_json(self.http_client.as_ref(), OPERATION, JsonRequest::new(url, body))
				.await?;

		api::ensure_success(OPERATION, &response)?;

		let TokenData { access_token, expires_in } = response.data;

		if access_token.is_empty() {
			return Err(Error::InvalidResponse { reason: "access_token is empty".into() });
		}
		if expires_in <= 0 {
			return Err(Error::InvalidResponse {
				reason: format!("expires_in must be positive, got {expires_in}"),
			});
		}

		Ok(AccessToken::issued(access_token, Duration::seconds(expires_in)))
	}
}
impl<C> AccessTokenProvider for DefaultAccessTokenProvider<C>
where
	C: ?Sized + OpenApiHttpClient,
{
	fn cache_key(&self) -> &str {
		&self.cache_key
	}

	fn access_token(&self) -> TokenFuture<'_> {
		Box::pin(self.fetch())
	}
}
impl<C> Debug for DefaultAccessTokenProvider<C>
where
	C: ?Sized + OpenApiHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("DefaultAccessTokenProvider")
			.field("app_id", &self.config.app_id)
			.field("cache_key", &self.cache_key)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn default_cache_key_embeds_app_id() {
		let app_id = AppId::new("tt07e3715e98c9aac0").expect("App id fixture should be valid.");

		assert_eq!(default_cache_key(&app_id), "douyin_openapi_access_token_tt07e3715e98c9aac0");
	}

	#[test]
	fn guards_are_shared_per_key() {
		let guards = FlightGuards::default();
		let first = guards.guard("a");
		let again = guards.guard("a");
		let other = guards.guard("b");

		assert!(Arc::ptr_eq(&first, &again));
		assert!(!Arc::ptr_eq(&first, &other));
		assert_eq!(guards.len(), 2);
		assert!(Arc::ptr_eq(&FlightGuards::global(), &FlightGuards::global()));
	}

	#[test]
	fn last_release_drops_the_entry() {
		let guards = FlightGuards::default();
		let first = guards.guard("a");
		let waiter = guards.guard("a");

		guards.release("a", first);

		assert_eq!(guards.len(), 1, "A waiter still references the guard.");

		guards.release("a", waiter);

		assert!(guards.is_empty());

		let stale = guards.guard("b");

		guards.release("b", Arc::new(AsyncMutex::new(())));

		assert_eq!(guards.len(), 1, "Foreign guards never evict the registered one.");

		guards.release("b", stale);

		assert!(guards.is_empty());
	}
}
