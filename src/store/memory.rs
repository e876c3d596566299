//! Thread-safe in-memory [`TokenCache`] for tests and short-lived processes.

// self
use crate::{
	_prelude::*,
	auth::TokenSet,
	store::{StoreFuture, TokenCache},
};

/// Keeps the token set in-process; clones share the same slot.
#[derive(Clone, Debug, Default)]
pub struct MemoryTokenCache(Arc<Mutex<Option<TokenSet>>>);
impl MemoryTokenCache {
	/// Cache pre-populated with `set`.
	pub fn with_token_set(set: TokenSet) -> Self {
		Self(Arc::new(Mutex::new(Some(set))))
	}

	/// Current contents, without going through the async contract.
	pub fn snapshot(&self) -> Option<TokenSet> {
		self.0.lock().clone()
	}
}
impl TokenCache for MemoryTokenCache {
	fn load(&self) -> StoreFuture<'_, Option<TokenSet>> {
		let slot = self.0.clone();

		Box::pin(async move { Ok(slot.lock().clone()) })
	}

	fn save(&self, set: TokenSet) -> StoreFuture<'_, ()> {
		let slot = self.0.clone();

		Box::pin(async move {
			*slot.lock() = Some(set);

			Ok(())
		})
	}
}
