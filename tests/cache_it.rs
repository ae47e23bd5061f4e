// std
use std::{env, fs, process};
// self
use douyin_openapi::{
	_preludet::*,
	cache::{CacheError, CredentialCache, FileCache, MemoryCache},
};

fn temp_cache_path(label: &str) -> std::path::PathBuf {
	env::temp_dir().join(format!(
		"douyin_openapi_cache_it_{label}_{}_{}.json",
		process::id(),
		OffsetDateTime::now_utc().unix_timestamp_nanos(),
	))
}

#[tokio::test]
async fn memory_cache_is_shared_between_clones() {
	let cache = MemoryCache::default();
	let clone = cache.clone();

	clone
		.set("shared", "value".into(), Duration::minutes(10))
		.await
		.expect("Setting through a clone should succeed.");

	assert_eq!(
		cache.get("shared").await.expect("Fetch should succeed.").as_deref(),
		Some("value")
	);
}

#[tokio::test]
async fn concurrent_writers_leave_one_live_value() {
	let cache = Arc::new(MemoryCache::default());
	let tasks = (0..8)
		.map(|i| {
			let cache = cache.clone();

			tokio::spawn(async move {
				cache
					.set("contended", format!("value-{i}"), Duration::minutes(5))
					.await
					.expect("Concurrent set should succeed.");
			})
		})
		.collect::<Vec<_>>();

	for task in tasks {
		task.await.expect("Writer task should not panic.");
	}

	let value = cache
		.get("contended")
		.await
		.expect("Fetch should succeed.")
		.expect("One of the writers should have won.");

	assert!(value.starts_with("value-"));
	assert_eq!(cache.len(), 1);
}

#[tokio::test]
async fn file_cache_survives_reopen_and_drops_expired_entries() {
	let path = temp_cache_path("reopen");
	let cache = FileCache::open(&path).expect("Opening a fresh file cache should succeed.");

	cache.set("live", "token".into(), Duration::hours(1)).await.expect("Set should succeed.");
	cache.set("dead", "stale".into(), Duration::ZERO).await.expect("Set should succeed.");

	let reopened = FileCache::open(&path).expect("Reopening the file cache should succeed.");

	assert_eq!(
		reopened.get("live").await.expect("Fetch should succeed.").as_deref(),
		Some("token")
	);
	assert_eq!(reopened.get("dead").await.expect("Fetch should succeed."), None);
	assert!(reopened.delete("live").await.expect("Delete should succeed."));

	let emptied = FileCache::open(&path).expect("Reopening after delete should succeed.");

	assert_eq!(emptied.get("live").await.expect("Fetch should succeed."), None);

	fs::remove_file(&path).expect("Temporary cache file should be removable.");
}

#[tokio::test]
async fn corrupt_file_is_reported_as_serialization_error() {
	let path = temp_cache_path("corrupt");

	fs::write(&path, b"not json").expect("Writing the corrupt fixture should succeed.");

	let err = FileCache::open(&path).expect_err("Corrupt snapshot must not load.");

	assert!(matches!(err, CacheError::Serialization { .. }));

	fs::remove_file(&path).expect("Temporary cache file should be removable.");
}
