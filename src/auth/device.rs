//! Device authorization state for one interactive login attempt.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Device authorization issued by the identity provider.
///
/// Scoped to a single login attempt and dropped once the poll loop reaches a terminal state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceAuthorization {
	/// Opaque code exchanged at the token endpoint.
	pub device_code: TokenSecret,
	/// Short code the user types at the verification URI.
	pub user_code: String,
	/// Page where the user enters `user_code`.
	pub verification_uri: String,
	/// Provider-supplied instruction text, if any.
	pub message: Option<String>,
	/// Current polling interval.
	pub interval: Duration,
	/// Instant after which the device code is no longer accepted.
	pub expires_at: OffsetDateTime,
}
impl DeviceAuthorization {
	/// Interval used when the provider omits one.
	pub const DEFAULT_INTERVAL: Duration = Duration::seconds(5);
	/// Increment applied to the interval on every `slow_down` response.
	pub const SLOW_DOWN_INCREMENT: Duration = Duration::seconds(5);

	/// Human-readable instruction, falling back to a generated sentence.
	pub fn instructions(&self) -> String {
		self.message.clone().unwrap_or_else(|| {
			format!(
				"To sign in, open {} and enter the code {}.",
				self.verification_uri, self.user_code
			)
		})
	}

	/// Returns `true` once `now` has reached the expiry instant.
	pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
		now >= self.expires_at
	}

	/// Permanently widens the polling interval after a `slow_down` response.
	pub fn slow_down(&mut self) {
		self.interval += Self::SLOW_DOWN_INCREMENT;
	}
}

/// Receives device-code instructions so the user can complete sign-in.
pub trait DevicePrompt: Send + Sync {
	/// Shows the verification instructions.
	fn show(&self, authorization: &DeviceAuthorization);
}

/// Prints the instructions to stdout.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConsolePrompt;
impl DevicePrompt for ConsolePrompt {
	fn show(&self, authorization: &DeviceAuthorization) {
		println!("{}", authorization.instructions());
	}
}

/// Discards the instructions (tests, headless callers that read them from logs).
#[derive(Clone, Copy, Debug, Default)]
pub struct SilentPrompt;
impl DevicePrompt for SilentPrompt {
	fn show(&self, authorization: &DeviceAuthorization) {
		tracing::debug!(user_code = %authorization.user_code, "device code prompt suppressed");
	}
}
