//! Crate-level error types shared across the facade, credential guard, and inbound decoders.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Cache-layer failure.
	#[error("{0}")]
	Cache(
		#[from]
		#[source]
		crate::cache::CacheError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// Response or embedded payload could not be decoded.
	#[error("Failed to decode the {context} payload.")]
	Decode {
		/// Which payload failed to decode.
		context: &'static str,
		/// HTTP status code, when the payload came from an HTTP response.
		status: Option<u16>,
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Platform reported a non-zero error code.
	#[error("{operation} failed: {message} ({code}).")]
	Api {
		/// Operation label that produced the error.
		operation: &'static str,
		/// Platform error code.
		code: i64,
		/// Platform error message.
		message: String,
	},
	/// Inbound signature did not match the locally computed one.
	#[error("The {context} signature does not match: received {received}.")]
	SignatureMismatch {
		/// Which inbound payload failed verification.
		context: &'static str,
		/// Signature supplied by the caller.
		received: String,
	},
	/// Callback type or webhook event is not recognized.
	#[error("Event `{event}` is not supported.")]
	UnsupportedEvent {
		/// Event discriminator taken from the payload.
		event: String,
	},
	/// Response decoded successfully but carries unusable values.
	#[error("Platform returned an invalid response: {reason}.")]
	InvalidResponse {
		/// Description of the violated expectation.
		reason: String,
	},
}
impl Error {
	/// Returns the platform error code for [`Error::Api`] failures.
	pub fn api_code(&self) -> Option<i64> {
		match self {
			Self::Api { code, .. } => Some(*code),
			_ => None,
		}
	}

	pub(crate) fn decode(
		context: &'static str,
		status: Option<u16>,
		source: serde_path_to_error::Error<serde_json::Error>,
	) -> Self {
		Self::Decode { context, status, source }
	}
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Request body could not be serialized.
	#[error("Request body for {operation} could not be serialized.")]
	RequestEncode {
		/// Operation label whose body failed to serialize.
		operation: &'static str,
		/// Underlying serialization failure.
		#[source]
		source: serde_json::Error,
	},
	/// Endpoint path could not be joined onto the configured base.
	#[error("Endpoint `{path}` cannot be joined onto the configured base URL.")]
	InvalidEndpoint {
		/// Relative endpoint path.
		path: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},

	/// Base URL must use HTTPS.
	#[error("The {endpoint} base URL must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// Which base failed validation.
		endpoint: &'static str,
		/// Base URL that failed validation.
		url: String,
	},
	/// Configuration omitted a value required by the platform.
	#[error("Configuration is missing the {field}.")]
	MissingField {
		/// Name of the missing value.
		field: &'static str,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling {operation}.")]
	Network {
		/// Operation label being executed.
		operation: &'static str,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the platform.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(
		operation: &'static str,
		src: impl 'static + Send + Sync + std::error::Error,
	) -> Self {
		Self::Network { operation, source: Box::new(src) }
	}
}
