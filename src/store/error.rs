//! Store errors
//!
//! Raw database failures wrapped with the entity and operation that
//! produced them.

use super::transient;

/// Errors surfaced by the persistence gateway
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A statement failed; carries the entity table and operation name
    #[error("Error in {op} on {entity}: {source}")]
    Query {
        entity: &'static str,
        op: &'static str,
        #[source]
        source: sqlx::Error,
    },

    /// Session lifecycle failure (begin/commit/rollback)
    #[error("Transaction {op} failed: {source}")]
    Session {
        op: &'static str,
        #[source]
        source: sqlx::Error,
    },

    /// A row decoded from the store violated an application invariant
    #[error("Invalid row in {entity}: {reason}")]
    InvalidRow {
        entity: &'static str,
        reason: String,
    },
}

impl StoreError {
    pub(crate) fn query(entity: &'static str, op: &'static str, source: sqlx::Error) -> Self {
        Self::Query { entity, op, source }
    }

    pub(crate) fn session(op: &'static str, source: sqlx::Error) -> Self {
        Self::Session { op, source }
    }

    /// Whether the failure is expected to resolve on retry
    /// (lock contention, serialization failure, connection blip).
    pub fn is_transient(&self) -> bool {
        match self {
            StoreError::Query { source, .. } | StoreError::Session { source, .. } => {
                transient::is_transient(source)
            }
            StoreError::InvalidRow { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_error_carries_context() {
        let err = StoreError::query("wallets", "update_by_id", sqlx::Error::RowNotFound);
        let text = err.to_string();
        assert!(text.contains("wallets"));
        assert!(text.contains("update_by_id"));
    }

    #[test]
    fn test_session_error_transient() {
        let err = StoreError::session("begin", sqlx::Error::PoolTimedOut);
        assert!(err.is_transient());
    }

    #[test]
    fn test_invalid_row_not_transient() {
        let err = StoreError::InvalidRow {
            entity: "transactions",
            reason: "unknown type".to_string(),
        };
        assert!(!err.is_transient());
    }
}
