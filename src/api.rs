//! The [`OpenApi`] facade shared by every outbound operation.
//!
//! Each operation follows the same path: build the body, attach `app_id` plus `sign` for the
//! payment family or an access token for the token-gated endpoints, POST it, decode the body,
//! and turn a non-zero platform code into [`Error::Api`]. Operation groups live in the
//! submodules and extend [`OpenApi`] with their own `impl` blocks.

pub mod link;
pub mod login;
pub mod merchant;
pub mod message;
pub mod order;
pub mod payment;
pub mod settlement;

pub use link::*;
pub use login::*;
pub use merchant::*;
pub use message::*;
pub use order::*;
pub use payment::*;
pub use settlement::*;

// self
use crate::{
	_prelude::*,
	auth::AccessToken,
	cache::{CredentialCache, MemoryCache},
	config::OpenApiConfig,
	credential::{AccessTokenProvider, DefaultAccessTokenProvider},
	http::{self, JsonRequest, OpenApiHttpClient},
	obs::{self, Operation},
	sign::{RequestSigner, SignableRequest},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

/// Facade specialized for the crate's default reqwest transport.
#[cfg(feature = "reqwest")]
pub type ReqwestOpenApi = OpenApi<ReqwestHttpClient>;

/// Platform response envelope carrying an error code and message.
pub trait ApiEnvelope {
	/// Platform error code; zero means success.
	fn error_code(&self) -> i64;

	/// Human-readable error message supplied by the platform.
	fn error_message(&self) -> String;
}

/// Implements [`ApiEnvelope`] for a response struct from its code and message fields.
macro_rules! impl_envelope {
	($ty:ty, $code:ident, $message:ident) => {
		impl $crate::api::ApiEnvelope for $ty {
			fn error_code(&self) -> i64 {
				self.$code
			}

			fn error_message(&self) -> String {
				self.$message.clone()
			}
		}
	};
}
pub(crate) use impl_envelope;

/// Turns a non-zero envelope code into [`Error::Api`].
pub(crate) fn ensure_success<E>(operation: Operation, envelope: &E) -> Result<()>
where
	E: ?Sized + ApiEnvelope,
{
	match envelope.error_code() {
		0 => Ok(()),
		code => Err(Error::Api {
			operation: operation.as_str(),
			code,
			message: envelope.error_message(),
		}),
	}
}

#[derive(Serialize)]
struct SignedBody<'a, P> {
	app_id: &'a str,
	#[serde(flatten)]
	params: &'a P,
	sign: String,
}

/// Client for the mini-app OpenAPI.
///
/// The facade is cheap to clone; clones share the configuration, transport, cache, and
/// credential provider.
pub struct OpenApi<C>
where
	C: ?Sized + OpenApiHttpClient,
{
	config: Arc<OpenApiConfig>,
	http_client: Arc<C>,
	signer: RequestSigner,
	cache: Arc<dyn CredentialCache>,
	access_token: Arc<dyn AccessTokenProvider>,
	custom_provider: bool,
}
impl<C> OpenApi<C>
where
	C: ?Sized + OpenApiHttpClient,
{
	/// Creates a facade that reuses the caller-provided transport.
	///
	/// Tokens are cached in a fresh [`MemoryCache`] until [`OpenApi::with_cache`] swaps it.
	pub fn with_http_client(config: OpenApiConfig, http_client: impl Into<Arc<C>>) -> Self {
		let config = Arc::new(config);
		let http_client = http_client.into();
		let cache: Arc<dyn CredentialCache> = Arc::new(MemoryCache::default());
		let access_token = Arc::new(DefaultAccessTokenProvider::new(
			config.clone(),
			http_client.clone(),
			cache.clone(),
		));

		Self {
			signer: RequestSigner::new(config.salt.clone()),
			config,
			http_client,
			cache,
			access_token,
			custom_provider: false,
		}
	}

	/// Replaces the credential cache.
	///
	/// The default provider is rebuilt on top of the new cache; a provider installed through
	/// [`OpenApi::with_access_token_provider`] is left untouched.
	pub fn with_cache(mut self, cache: Arc<dyn CredentialCache>) -> Self {
		if !self.custom_provider {
			self.access_token = Arc::new(DefaultAccessTokenProvider::new(
				self.config.clone(),
				self.http_client.clone(),
				cache.clone(),
			));
		}

		self.cache = cache;

		self
	}

	/// Replaces the access-token provider.
	pub fn with_access_token_provider(mut self, provider: Arc<dyn AccessTokenProvider>) -> Self {
		self.access_token = provider;
		self.custom_provider = true;

		self
	}

	/// Configuration the facade was built with.
	pub fn config(&self) -> &OpenApiConfig {
		&self.config
	}

	/// Credential cache shared with the default provider.
	pub fn cache(&self) -> &Arc<dyn CredentialCache> {
		&self.cache
	}

	/// Signer for the payment-family endpoints.
	pub fn signer(&self) -> &RequestSigner {
		&self.signer
	}

	/// Returns a valid access token from the configured provider.
	pub async fn access_token(&self) -> Result<AccessToken> {
		self.access_token.access_token().await
	}

	/// POSTs `params` to a developer endpoint with `app_id` and `sign` attached.
	pub(crate) async fn signed_post<P, T>(
		&self,
		operation: Operation,
		path: &'static str,
		params: &P,
	) -> Result<T>
	where
		P: Serialize + SignableRequest,
		T: DeserializeOwned + ApiEnvelope,
	{
		let body = SignedBody {
			app_id: self.config.app_id.as_ref(),
			params,
			sign: self.signer.sign_request(params),
		};

		self.developer_post(operation, path, &body).await
	}

	/// POSTs `body` unchanged to a developer endpoint.
	pub(crate) async fn developer_post<B, T>(
		&self,
		operation: Operation,
		path: &'static str,
		body: &B,
	) -> Result<T>
	where
		B: ?Sized + Serialize,
		T: DeserializeOwned + ApiEnvelope,
	{
		let url = self.config.endpoints.developer_url(path)?;
		let body = http::encode_body(operation, body)?;

		self.execute(operation, JsonRequest::new(url, body)).await
	}

	/// Sends a prepared request inside the operation span and checks the envelope.
	pub(crate) async fn execute<T>(&self, operation: Operation, request: JsonRequest) -> Result<T>
	where
		T: DeserializeOwned + ApiEnvelope,
	{
		obs::observe(operation, "request", async move {
			let response: T = http::send_json(self.http_client.as_ref(), operation, request).await?;

			ensure_success(operation, &response)?;

			Ok(response)
		})
		.await
	}
}
#[cfg(feature = "reqwest")]
impl OpenApi<ReqwestHttpClient> {
	/// Creates a facade backed by a default reqwest transport.
	pub fn new(config: OpenApiConfig) -> Self {
		Self::with_http_client(config, ReqwestHttpClient::default())
	}
}
impl<C> Clone for OpenApi<C>
where
	C: ?Sized + OpenApiHttpClient,
{
	fn clone(&self) -> Self {
		Self {
			config: self.config.clone(),
			http_client: self.http_client.clone(),
			signer: self.signer.clone(),
			cache: self.cache.clone(),
			access_token: self.access_token.clone(),
			custom_provider: self.custom_provider,
		}
	}
}
impl<C> Debug for OpenApi<C>
where
	C: ?Sized + OpenApiHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("OpenApi")
			.field("app_id", &self.config.app_id)
			.field("sandbox", &self.config.sandbox)
			.field("cache_key", &self.access_token.cache_key())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[derive(Debug, Deserialize)]
	struct Envelope {
		err_no: i64,
		err_tips: String,
	}
	impl_envelope!(Envelope, err_no, err_tips);

	#[test]
	fn zero_code_is_success() {
		let ok = Envelope { err_no: 0, err_tips: String::new() };

		ensure_success(Operation::QueryOrder, &ok).expect("Zero error code should succeed.");
	}

	#[test]
	fn non_zero_code_maps_to_api_error() {
		let failed = Envelope { err_no: 2008, err_tips: "sign is invalid".into() };
		let err = ensure_success(Operation::CreateOrder, &failed)
			.expect_err("Non-zero error code must fail.");

		assert!(matches!(
			err,
			Error::Api { operation: "create_order", code: 2008, ref message } if message == "sign is invalid"
		));
	}

	#[test]
	fn signed_body_flattens_params_between_app_id_and_sign() {
		#[derive(Serialize)]
		struct Params {
			out_order_no: &'static str,
		}

		let body = SignedBody { app_id: "tt1", params: &Params { out_order_no: "A1" }, sign: "s".into() };
		let value = serde_json::to_value(&body).expect("Signed body should serialize.");

		assert_eq!(value, serde_json::json!({ "app_id": "tt1", "out_order_no": "A1", "sign": "s" }));
	}
}
