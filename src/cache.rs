//! Pluggable credential cache contract plus built-in in-memory and file-backed backends.

pub mod file;
pub mod memory;

pub use file::FileCache;
pub use memory::MemoryCache;

// self
use crate::_prelude::*;

/// Boxed future returned by [`CredentialCache`] operations.
pub type CacheFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, CacheError>> + 'a + Send>>;

/// Minimal key/value contract with per-entry time-to-live.
///
/// Backends must never return an entry whose TTL has elapsed. Expired entries may be evicted
/// lazily on access.
pub trait CredentialCache
where
	Self: Send + Sync,
{
	/// Fetches the live value stored under `key`, if any.
	fn get<'a>(&'a self, key: &'a str) -> CacheFuture<'a, Option<String>>;

	/// Stores `value` under `key`, replacing any previous entry, for the provided TTL.
	fn set<'a>(&'a self, key: &'a str, value: String, ttl: Duration) -> CacheFuture<'a, ()>;

	/// Removes the entry stored under `key`, returning whether a live entry was present.
	fn delete<'a>(&'a self, key: &'a str) -> CacheFuture<'a, bool>;
}

/// Error type produced by [`CredentialCache`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum CacheError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

/// Cached value paired with its absolute expiry instant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
	/// Stored value.
	pub value: String,
	/// Instant after which the entry is considered absent.
	pub expires_at: OffsetDateTime,
}
impl CacheEntry {
	/// Creates an entry that expires `ttl` after `now`.
	pub fn new(value: String, ttl: Duration, now: OffsetDateTime) -> Self {
		Self { value, expires_at: now.saturating_add(ttl) }
	}

	/// Returns `true` once `instant` reaches the expiry.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		instant >= self.expires_at
	}
}
