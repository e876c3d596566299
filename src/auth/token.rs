//! Token secrets and the persisted identity token set.

pub mod secret;
pub mod set;
