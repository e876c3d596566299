//! Provider-facing descriptors (data) and strategies (behavior).
//!
//! `descriptor` exposes validated metadata (`ProviderDescriptor`) covering the identity
//! endpoints (device authorization, token), the platform endpoints (user authenticate, session
//! authorize), and provider quirks (scope, relying parties, contract version, sandbox).
//! `strategy` defines [`ProviderStrategy`], an HTTP-client-agnostic hook used by flows to
//! augment outgoing token requests and map OAuth error payloads into the broker taxonomy.

pub mod descriptor;
pub mod strategy;

pub use descriptor::*;
pub use strategy::*;
