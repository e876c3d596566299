//! Aggregated diagnostics for a failed user-token exchange.

// self
use crate::{_prelude::*, xbl::plan::attempt_label};

/// Record of one rejected exchange request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExchangeAttempt {
	/// Label of the candidate ticket that was sent.
	pub candidate_label: String,
	/// Relying party that was requested.
	pub relying_party: String,
	/// Whether the contract-version header was present.
	pub contract_header: bool,
	/// HTTP status returned by the platform.
	pub status: u16,
	/// Platform correlation id, when returned.
	pub correlation_id: Option<String>,
	/// Truncated response body.
	pub body_preview: String,
}
impl ExchangeAttempt {
	/// Diagnostic label shared with [`AttemptDescriptor::label`](crate::xbl::AttemptDescriptor::label).
	pub fn label(&self) -> String {
		attempt_label(&self.candidate_label, &self.relying_party, self.contract_header)
	}
}

/// Every rejected attempt, in the order it was made.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExchangeReport {
	attempts: Vec<ExchangeAttempt>,
}
impl ExchangeReport {
	/// Maximum number of attempts rendered by [`digest`](Self::digest).
	pub const DIGEST_LIMIT: usize = 12;

	/// Appends an attempt.
	pub fn push(&mut self, attempt: ExchangeAttempt) {
		self.attempts.push(attempt);
	}

	/// Number of recorded attempts.
	pub fn len(&self) -> usize {
		self.attempts.len()
	}

	/// Returns `true` when no attempt was recorded.
	pub fn is_empty(&self) -> bool {
		self.attempts.is_empty()
	}

	/// Recorded attempts.
	pub fn attempts(&self) -> &[ExchangeAttempt] {
		&self.attempts
	}

	/// `label=status` pairs for the first [`DIGEST_LIMIT`](Self::DIGEST_LIMIT) attempts.
	pub fn digest(&self) -> String {
		if self.attempts.is_empty() {
			return "none".into();
		}

		let mut digest = self
			.attempts
			.iter()
			.take(Self::DIGEST_LIMIT)
			.map(|attempt| format!("{}={}", attempt.label(), attempt.status))
			.collect::<Vec<_>>()
			.join(", ");

		if self.attempts.len() > Self::DIGEST_LIMIT {
			digest.push_str(&format!(" (+{} more)", self.attempts.len() - Self::DIGEST_LIMIT));
		}

		digest
	}
}
