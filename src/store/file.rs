//! File-backed [`TokenCache`] with owner-only permissions and atomic replacement.

// std
use std::{
	fs::{self, OpenOptions},
	io::{ErrorKind, Write},
};
#[cfg(unix)] use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
// self
use crate::{
	_prelude::*,
	auth::TokenSet,
	store::{StoreError, StoreFuture, TokenCache},
};

/// Persists the token set as a single JSON document.
///
/// Writes go to a uniquely named hidden sibling (mode `0600` on unix), are synced, and then
/// renamed over the target, so readers observe either the previous document or the new one.
/// A missing parent directory is created with mode `0700`.
#[derive(Clone, Debug)]
pub struct FileTokenCache {
	path: PathBuf,
}
impl FileTokenCache {
	/// Cache stored at `path`. Nothing is touched until the first load or save.
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	/// Location of the cache document.
	pub fn path(&self) -> &Path {
		&self.path
	}

	fn read_now(path: &Path) -> Option<TokenSet> {
		let bytes = match fs::read(path) {
			Ok(bytes) => bytes,
			Err(e) if e.kind() == ErrorKind::NotFound => return None,
			Err(e) => {
				tracing::debug!(path = %path.display(), error = %e, "token cache unreadable; treating as absent");

				return None;
			},
		};

		match serde_json::from_slice::<TokenSet>(&bytes) {
			Ok(set) => Some(set),
			Err(e) => {
				tracing::debug!(path = %path.display(), error = %e, "token cache malformed; treating as absent");

				None
			},
		}
	}

	fn write_now(path: &Path, set: &TokenSet) -> Result<(), StoreError> {
		let serialized = serde_json::to_vec_pretty(set).map_err(|e| StoreError::Serialization {
			message: format!("Failed to serialize token set: {e}"),
		})?;

		Self::ensure_parent_exists(path)?;

		let tmp_path = Self::temp_sibling(path)?;

		if let Err(e) = Self::write_temp(&tmp_path, &serialized) {
			let _ = fs::remove_file(&tmp_path);

			return Err(e);
		}

		fs::rename(&tmp_path, path).map_err(|e| {
			let _ = fs::remove_file(&tmp_path);

			StoreError::Backend { message: format!("Failed to replace {}: {e}", path.display()) }
		})
	}

	fn write_temp(tmp_path: &Path, serialized: &[u8]) -> Result<(), StoreError> {
		let mut options = OpenOptions::new();

		options.write(true).create_new(true);

		#[cfg(unix)]
		options.mode(0o600);

		let mut file = options.open(tmp_path).map_err(|e| StoreError::Backend {
			message: format!("Failed to create {}: {e}", tmp_path.display()),
		})?;

		// The creation mode is filtered through the umask; pin it explicitly.
		#[cfg(unix)]
		fs::set_permissions(tmp_path, fs::Permissions::from_mode(0o600)).map_err(|e| {
			StoreError::Backend {
				message: format!("Failed to restrict {}: {e}", tmp_path.display()),
			}
		})?;

		file.write_all(serialized).map_err(|e| StoreError::Backend {
			message: format!("Failed to write {}: {e}", tmp_path.display()),
		})?;
		file.sync_all().map_err(|e| StoreError::Backend {
			message: format!("Failed to sync {}: {e}", tmp_path.display()),
		})
	}

	fn temp_sibling(path: &Path) -> Result<PathBuf, StoreError> {
		let name = path.file_name().and_then(|name| name.to_str()).ok_or_else(|| {
			StoreError::Backend {
				message: format!("Cache path {} has no file name", path.display()),
			}
		})?;

		Ok(path.with_file_name(format!(".{name}.{:016x}.tmp", rand::random::<u64>())))
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), StoreError> {
		let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) else {
			return Ok(());
		};

		if parent.exists() {
			return Ok(());
		}

		fs::create_dir_all(parent).map_err(|e| StoreError::Backend {
			message: format!("Failed to create cache directory {}: {e}", parent.display()),
		})?;

		#[cfg(unix)]
		if let Err(e) = fs::set_permissions(parent, fs::Permissions::from_mode(0o700)) {
			tracing::debug!(path = %parent.display(), error = %e, "could not restrict cache directory");
		}

		Ok(())
	}
}
impl TokenCache for FileTokenCache {
	fn load(&self) -> StoreFuture<'_, Option<TokenSet>> {
		Box::pin(async move { Ok(Self::read_now(&self.path)) })
	}

	fn save(&self, set: TokenSet) -> StoreFuture<'_, ()> {
		Box::pin(async move { Self::write_now(&self.path, &set) })
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	fn token_set(access: &str) -> TokenSet {
		TokenSet::builder()
			.access_token(access)
			.refresh_token("refresh")
			.id_token("id")
			.scope("openid profile offline_access")
			.expires_at(macros::datetime!(2030-01-01 00:00 UTC))
			.build()
			.expect("Token set fixture should build.")
	}

	#[tokio::test]
	async fn save_and_load_round_trip() {
		let dir = tempfile::tempdir().expect("Temp dir should be created.");
		let cache = FileTokenCache::new(dir.path().join("msauth").join("device_token.json"));
		let set = token_set("access");

		cache.save(set.clone()).await.expect("Save should succeed.");

		let loaded = cache.load().await.expect("Load should succeed.");

		assert_eq!(loaded, Some(set));
	}

	#[tokio::test]
	async fn missing_and_malformed_files_are_absent() {
		let dir = tempfile::tempdir().expect("Temp dir should be created.");
		let path = dir.path().join("device_token.json");
		let cache = FileTokenCache::new(&path);

		assert_eq!(cache.load().await.expect("Load should succeed."), None);

		fs::write(&path, b"{\"access_token\": ").expect("Fixture should be written.");

		assert_eq!(cache.load().await.expect("Load should succeed."), None);

		fs::write(&path, b"{\"access_token\":\"a\"}").expect("Fixture should be written.");

		assert_eq!(cache.load().await.expect("Load should succeed."), None);
	}

	#[tokio::test]
	async fn stray_temp_file_does_not_disturb_previous_cache() {
		let dir = tempfile::tempdir().expect("Temp dir should be created.");
		let path = dir.path().join("device_token.json");
		let cache = FileTokenCache::new(&path);
		let set = token_set("previous");

		cache.save(set.clone()).await.expect("Save should succeed.");
		// Simulates a crash after the temp write but before the rename.
		fs::write(dir.path().join(".device_token.json.deadbeef.tmp"), b"{\"access_")
			.expect("Stray temp file should be written.");

		assert_eq!(cache.load().await.expect("Load should succeed."), Some(set));

		let replacement = token_set("next");

		cache.save(replacement.clone()).await.expect("Save should succeed.");

		assert_eq!(cache.load().await.expect("Load should succeed."), Some(replacement));
	}

	#[tokio::test]
	async fn save_leaves_no_temp_files_behind() {
		let dir = tempfile::tempdir().expect("Temp dir should be created.");
		let cache = FileTokenCache::new(dir.path().join("device_token.json"));

		cache.save(token_set("a")).await.expect("Save should succeed.");
		cache.save(token_set("b")).await.expect("Save should succeed.");

		let names: Vec<_> = fs::read_dir(dir.path())
			.expect("Dir should be readable.")
			.filter_map(|entry| entry.ok())
			.map(|entry| entry.file_name().to_string_lossy().into_owned())
			.collect();

		assert_eq!(names, vec!["device_token.json".to_owned()]);
	}

	#[cfg(unix)]
	#[tokio::test]
	async fn cache_file_and_new_directory_are_owner_only() {
		let dir = tempfile::tempdir().expect("Temp dir should be created.");
		let parent = dir.path().join("msauth");
		let path = parent.join("device_token.json");
		let cache = FileTokenCache::new(&path);

		cache.save(token_set("a")).await.expect("Save should succeed.");

		let file_mode = fs::metadata(&path).expect("Cache should exist.").permissions().mode();
		let dir_mode = fs::metadata(&parent).expect("Dir should exist.").permissions().mode();

		assert_eq!(file_mode & 0o777, 0o600);
		assert_eq!(dir_mode & 0o777, 0o700);
	}
}
