//! Access-token credential returned by [`AccessTokenProvider`](crate::credential::AccessTokenProvider).

// self
use crate::{_prelude::*, auth::Secret};

/// Seconds subtracted from the platform-declared lifetime before caching a token.
pub const EXPIRY_MARGIN: Duration = Duration::seconds(1500);

/// Bearer credential authorizing the token-gated endpoints.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
	value: Secret,
	expires_in: Option<Duration>,
}
impl AccessToken {
	/// Builds a credential straight from a token exchange with its declared lifetime.
	pub fn issued(value: impl Into<Secret>, expires_in: Duration) -> Self {
		Self { value: value.into(), expires_in: Some(expires_in) }
	}

	/// Builds a credential restored from the cache; its remaining lifetime is unknown.
	pub fn cached(value: impl Into<Secret>) -> Self {
		Self { value: value.into(), expires_in: None }
	}

	/// Returns the raw bearer string. Callers must avoid logging it.
	pub fn expose(&self) -> &str {
		self.value.expose()
	}

	/// Platform-declared lifetime, available only for freshly issued tokens.
	pub fn expires_in(&self) -> Option<Duration> {
		self.expires_in
	}

	/// Returns `true` when the token came from the cache rather than a network exchange.
	pub fn is_cached(&self) -> bool {
		self.expires_in.is_none()
	}

	/// Cache TTL for a freshly issued token: the declared lifetime minus [`EXPIRY_MARGIN`].
	///
	/// Returns `None` for cached tokens and for lifetimes that do not outlast the margin.
	pub fn cache_ttl(&self) -> Option<Duration> {
		self.expires_in
			.and_then(|lifetime| lifetime.checked_sub(EXPIRY_MARGIN))
			.filter(|ttl| ttl.is_positive())
	}
}
impl Debug for AccessToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AccessToken")
			.field("value", &"<redacted>")
			.field("expires_in", &self.expires_in)
			.finish()
	}
}
impl Display for AccessToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}
