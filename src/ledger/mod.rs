//! Ledger module
//!
//! The money-movement core: deposit, withdraw, transfer and history
//! queries over wallets and the append-only transaction ledger.

pub mod entries;
pub mod reference;
mod service;

pub use service::LedgerService;
