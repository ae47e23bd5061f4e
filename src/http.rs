//! Transport primitives for outbound OpenAPI calls.
//!
//! The module exposes [`OpenApiHttpClient`] together with the [`JsonRequest`] and
//! [`JsonResponse`] values it exchanges, so downstream crates can plug in custom HTTP stacks
//! (proxies, mocks, instrumentation) without touching request building or signing. Every
//! platform call is a JSON `POST`; the transport never interprets the body.

// std
use std::ops::Deref;
// self
use crate::{
	_prelude::*,
	error::{ConfigError, TransportError},
	obs::Operation,
};

/// Boxed future returned by [`OpenApiHttpClient::post_json`].
pub type HttpFuture<'a, E> = Pin<Box<dyn Future<Output = Result<JsonResponse, E>> + 'a + Send>>;

/// Abstraction over HTTP transports capable of executing JSON `POST` calls.
///
/// The trait is the crate's only dependency on an HTTP stack. Implementations must be
/// `Send + Sync + 'static` so a single transport can be shared by the facade and the credential
/// provider behind `Arc`. Timeouts and proxies belong to the implementation; the crate itself
/// never retries.
pub trait OpenApiHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// Sends `request` and resolves with the raw status and body.
	///
	/// Non-success statuses are not errors at this layer; the caller decodes the body and
	/// consults the platform envelope.
	fn post_json(&self, request: JsonRequest) -> HttpFuture<'_, Self::TransportError>;
}

/// Fully prepared JSON `POST`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JsonRequest {
	/// Absolute endpoint URL including any query string.
	pub url: Url,
	/// Extra headers beyond `Content-Type: application/json`.
	pub headers: Vec<(&'static str, String)>,
	/// Serialized JSON body.
	pub body: Vec<u8>,
}
impl JsonRequest {
	/// Creates a request without extra headers.
	pub fn new(url: Url, body: Vec<u8>) -> Self {
		Self { url, headers: Vec::new(), body }
	}

	/// Appends a header.
	pub fn with_header(mut self, name: &'static str, value: impl Into<String>) -> Self {
		self.headers.push((name, value.into()));

		self
	}
}

/// Raw response captured by the transport.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct JsonResponse {
	/// HTTP status code.
	pub status: u16,
	/// Response body bytes.
	pub body: Vec<u8>,
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a client whose requests time out after `timeout`.
	pub fn with_timeout(timeout: std::time::Duration) -> Result<Self, ConfigError> {
		ReqwestClient::builder()
			.timeout(timeout)
			.build()
			.map(Self)
			.map_err(ConfigError::http_client_build)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl OpenApiHttpClient for ReqwestHttpClient {
	type TransportError = ReqwestError;

	fn post_json(&self, request: JsonRequest) -> HttpFuture<'_, Self::TransportError> {
		let client = self.0.clone();

		Box::pin(async move {
			let mut builder = client
				.post(request.url)
				.header(reqwest::header::CONTENT_TYPE, "application/json")
				.body(request.body);

			for (name, value) in request.headers {
				builder = builder.header(name, value);
			}

			let response = builder.send().await?;
			let status = response.status().as_u16();
			let body = response.bytes().await?.to_vec();

			Ok(JsonResponse { status, body })
		})
	}
}

/// Serializes a request body for `operation`.
pub(crate) fn encode_body<T>(operation: Operation, body: &T) -> Result<Vec<u8>, ConfigError>
where
	T: ?Sized + Serialize,
{
	serde_json::to_vec(body)
		.map_err(|source| ConfigError::RequestEncode { operation: operation.as_str(), source })
}

/// Sends `request` and decodes the body into `T` regardless of the HTTP status.
pub(crate) async fn send_json<C, T>(
	http_client: &C,
	operation: Operation,
	request: JsonRequest,
) -> Result<T>
where
	C: ?Sized + OpenApiHttpClient,
	T: DeserializeOwned,
{
	let response = http_client
		.post_json(request)
		.await
		.map_err(|e| TransportError::network(operation.as_str(), e))?;

	decode_json(operation.as_str(), Some(response.status), &response.body)
}

/// Decodes `bytes` into `T`, keeping the JSON path of the first failure.
pub(crate) fn decode_json<T>(context: &'static str, status: Option<u16>, bytes: &[u8]) -> Result<T>
where
	T: DeserializeOwned,
{
	let mut deserializer = serde_json::Deserializer::from_slice(bytes);

	serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| Error::decode(context, status, source))
}
