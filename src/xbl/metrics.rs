//! Counters for user-token exchange requests.

// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for user-token exchange requests.
#[derive(Debug, Default)]
pub struct ExchangeMetrics {
	requests: AtomicU64,
	accepted: AtomicU64,
	rejected: AtomicU64,
	exhausted: AtomicU64,
}
impl ExchangeMetrics {
	/// Returns the total number of exchange requests sent.
	pub fn requests(&self) -> u64 {
		self.requests.load(Ordering::Relaxed)
	}

	/// Returns the number of requests answered with HTTP 200.
	pub fn accepted(&self) -> u64 {
		self.accepted.load(Ordering::Relaxed)
	}

	/// Returns the number of requests answered with any other status.
	pub fn rejected(&self) -> u64 {
		self.rejected.load(Ordering::Relaxed)
	}

	/// Returns the number of exchanges that ran out of candidates.
	pub fn exhausted(&self) -> u64 {
		self.exhausted.load(Ordering::Relaxed)
	}

	pub(crate) fn record_request(&self) {
		self.requests.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_accepted(&self) {
		self.accepted.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_rejected(&self) {
		self.rejected.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_exhausted(&self) {
		self.exhausted.fetch_add(1, Ordering::Relaxed);
	}
}
