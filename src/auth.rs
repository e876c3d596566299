//! Identity token models, redacted secrets, id-token claims, and platform tokens.

pub mod claims;
pub mod device;
pub mod ticket;
pub mod token;

pub use claims::*;
pub use device::*;
pub use ticket::*;
pub use token::{secret::*, set::*};
