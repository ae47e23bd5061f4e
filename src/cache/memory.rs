//! Thread-safe in-memory [`CredentialCache`], the default backend.

// self
use crate::{
	_prelude::*,
	cache::{CacheEntry, CacheError, CacheFuture, CredentialCache},
};

type EntryMap = Arc<RwLock<HashMap<String, CacheEntry>>>;

/// Process-local cache keeping entries in a shared map.
#[derive(Clone, Debug, Default)]
pub struct MemoryCache(EntryMap);
impl MemoryCache {
	/// Drops every expired entry and returns how many were removed.
	pub fn purge_expired(&self) -> usize {
		let now = OffsetDateTime::now_utc();
		let mut guard = self.0.write();
		let before = guard.len();

		guard.retain(|_, entry| !entry.is_expired_at(now));

		before - guard.len()
	}

	/// Number of entries currently held, including expired ones not yet evicted.
	pub fn len(&self) -> usize {
		self.0.read().len()
	}

	/// Returns `true` when the cache holds no entries.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}

	fn get_now(map: &EntryMap, key: &str) -> Option<String> {
		let now = OffsetDateTime::now_utc();

		{
			let guard = map.read();

			match guard.get(key) {
				Some(entry) if !entry.is_expired_at(now) => return Some(entry.value.clone()),
				Some(_) => {},
				None => return None,
			}
		}

		let mut guard = map.write();

		// Another writer may have refreshed the entry between the two locks.
		if guard.get(key).is_some_and(|entry| entry.is_expired_at(now)) {
			guard.remove(key);
		}

		guard.get(key).map(|entry| entry.value.clone())
	}

	fn set_now(map: &EntryMap, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
		map.write().insert(key.to_owned(), CacheEntry::new(value, ttl, OffsetDateTime::now_utc()));

		Ok(())
	}

	fn delete_now(map: &EntryMap, key: &str) -> bool {
		let now = OffsetDateTime::now_utc();

		map.write().remove(key).is_some_and(|entry| !entry.is_expired_at(now))
	}
}
impl CredentialCache for MemoryCache {
	fn get<'a>(&'a self, key: &'a str) -> CacheFuture<'a, Option<String>> {
		Box::pin(async move { Ok(Self::get_now(&self.0, key)) })
	}

	fn set<'a>(&'a self, key: &'a str, value: String, ttl: Duration) -> CacheFuture<'a, ()> {
		Box::pin(async move { Self::set_now(&self.0, key, value, ttl) })
	}

	fn delete<'a>(&'a self, key: &'a str) -> CacheFuture<'a, bool> {
		Box::pin(async move { Ok(Self::delete_now(&self.0, key)) })
	}
}
