//! JSON-file [`CredentialCache`] so tokens survive process restarts on a single host.
//!
//! The whole map is rewritten on every mutation: the snapshot goes to a sibling `.tmp` file that
//! is synced and renamed over the target. Expired entries are dropped on load and before each
//! write, so the file never grows past the set of live keys.

// std
use std::{
	fs::{self, File},
	io::Write,
	path::{Path, PathBuf},
};
// self
use crate::{
	_prelude::*,
	cache::{CacheEntry, CacheError, CacheFuture, CredentialCache},
};

type Snapshot = HashMap<String, CacheEntry>;

/// Cache persisted as a JSON object of `key -> {value, expires_at}`.
#[derive(Clone, Debug)]
pub struct FileCache {
	path: PathBuf,
	entries: Arc<RwLock<Snapshot>>,
}
impl FileCache {
	/// Opens the cache at `path`, creating parent directories and loading live entries.
	///
	/// A missing or empty file starts an empty cache; unparsable contents are reported as
	/// [`CacheError::Serialization`] rather than silently discarded.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, CacheError> {
		let path = path.into();

		create_parent(&path)?;

		let mut snapshot = read_snapshot(&path)?;
		let now = OffsetDateTime::now_utc();

		snapshot.retain(|_, entry| !entry.is_expired_at(now));

		Ok(Self { path, entries: Arc::new(RwLock::new(snapshot)) })
	}

	/// Location of the backing JSON file.
	pub fn path(&self) -> &Path {
		&self.path
	}
}
impl CredentialCache for FileCache {
	fn get<'a>(&'a self, key: &'a str) -> CacheFuture<'a, Option<String>> {
		Box::pin(async move {
			let now = OffsetDateTime::now_utc();
			let entries = self.entries.read();

			Ok(entries.get(key).filter(|entry| !entry.is_expired_at(now)).map(|e| e.value.clone()))
		})
	}

	fn set<'a>(&'a self, key: &'a str, value: String, ttl: Duration) -> CacheFuture<'a, ()> {
		Box::pin(async move {
			let now = OffsetDateTime::now_utc();
			let mut entries = self.entries.write();

			entries.retain(|_, entry| !entry.is_expired_at(now));
			entries.insert(key.to_owned(), CacheEntry::new(value, ttl, now));

			write_snapshot(&self.path, &entries)
		})
	}

	fn delete<'a>(&'a self, key: &'a str) -> CacheFuture<'a, bool> {
		Box::pin(async move {
			let mut entries = self.entries.write();
			let Some(entry) = entries.remove(key) else {
				return Ok(false);
			};

			write_snapshot(&self.path, &entries)?;

			Ok(!entry.is_expired_at(OffsetDateTime::now_utc()))
		})
	}
}

fn backend(action: &str, path: &Path, e: impl Display) -> CacheError {
	CacheError::Backend { message: format!("Failed to {action} {}: {e}", path.display()) }
}

fn create_parent(path: &Path) -> Result<(), CacheError> {
	match path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
		Some(parent) => fs::create_dir_all(parent).map_err(|e| backend("create", parent, e)),
		None => Ok(()),
	}
}

fn read_snapshot(path: &Path) -> Result<Snapshot, CacheError> {
	if !path.exists() {
		return Ok(Snapshot::new());
	}

	let bytes = fs::read(path).map_err(|e| backend("read", path, e))?;

	if bytes.iter().all(u8::is_ascii_whitespace) {
		return Ok(Snapshot::new());
	}

	serde_json::from_slice(&bytes).map_err(|e| CacheError::Serialization {
		message: format!("Failed to parse {}: {e}", path.display()),
	})
}

fn write_snapshot(path: &Path, snapshot: &Snapshot) -> Result<(), CacheError> {
	let bytes = serde_json::to_vec(snapshot).map_err(|e| CacheError::Serialization {
		message: format!("Failed to serialize cache snapshot: {e}"),
	})?;
	let tmp = path.with_extension("tmp");
	let mut file = File::create(&tmp).map_err(|e| backend("create", &tmp, e))?;

	file.write_all(&bytes).map_err(|e| backend("write", &tmp, e))?;
	file.sync_all().map_err(|e| backend("sync", &tmp, e))?;
	drop(file);

	fs::rename(&tmp, path).map_err(|e| backend("replace", path, e))
}
