//! Store module
//!
//! Persistence gateway over the relational store: a generic per-entity
//! repository, explicit transactional sessions, and the retryable
//! transaction wrapper used by every balance-mutating operation.

mod error;
pub mod query;
mod repository;
mod session;
pub mod transient;
mod tx;

pub use error::StoreError;
pub use query::{Filter, Page, PageMeta, SortOrder, Value};
pub use repository::{Entity, Repository};
pub use session::StoreSession;
pub use tx::{run_in_transaction, RetryPolicy, WorkFuture};
