//! Domain module
//!
//! Money primitives shared by the ledger core and the API surface.

pub mod amount;

pub use amount::{Amount, AmountError, Balance};
