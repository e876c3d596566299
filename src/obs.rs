//! Observability helpers for broker flows.
//!
//! Every flow runs inside a span named `xbl_broker.flow` with `flow` and `stage` fields, and
//! emits `debug` events for each request it sends. Enable the `metrics` feature to increment the
//! `xbl_broker_flow_total` counter for every attempt/success/failure, labeled by `flow` +
//! `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Flow kinds observed by the broker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowKind {
	/// Device authorization grant (initiation and polling).
	DeviceCode,
	/// Refresh token grant.
	Refresh,
	/// Cache-or-renew credential session.
	Session,
	/// Platform user-token exchange.
	UserToken,
	/// Session (XSTS) authorization.
	SessionToken,
}
impl FlowKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowKind::DeviceCode => "device_code",
			FlowKind::Refresh => "refresh",
			FlowKind::Session => "session",
			FlowKind::UserToken => "user_token",
			FlowKind::SessionToken => "session_token",
		}
	}
}
impl Display for FlowKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Entry to a broker helper.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl FlowOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
			FlowOutcome::Success => "success",
			FlowOutcome::Failure => "failure",
		}
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
