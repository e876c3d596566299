//! Token cache contract and built-in cache implementations.

pub mod file;
pub mod memory;

pub use file::FileTokenCache;
pub use memory::MemoryTokenCache;

// self
use crate::{_prelude::*, auth::TokenSet};

/// Boxed future returned by [`TokenCache`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Durable home of the current [`TokenSet`].
///
/// `load` never fails for unreadable or corrupt data: implementations report such entries as
/// absent so the pipeline degrades to a fresh login. `save` surfaces failures, because losing
/// persistence silently would force a login on every run.
pub trait TokenCache
where
	Self: Send + Sync,
{
	/// Returns the cached token set, or `None` when nothing usable is stored.
	fn load(&self) -> StoreFuture<'_, Option<TokenSet>>;

	/// Replaces the cached token set.
	fn save(&self, set: TokenSet) -> StoreFuture<'_, ()>;
}

/// Error type produced by [`TokenCache`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Token set could not be serialized.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure (filesystem, permissions).
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}
