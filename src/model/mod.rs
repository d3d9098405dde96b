//! Model module
//!
//! Persisted entity types: users, wallets and ledger transactions.

pub mod transaction;
pub mod user;
pub mod wallet;

pub use transaction::{LedgerTransaction, NewTransaction, TxKind, TxStatus};
pub use user::{NewUser, User};
pub use wallet::{NewWallet, Wallet};
