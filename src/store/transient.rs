//! Transient error classification
//!
//! Decides whether a store failure is worth retrying. Kept as a free
//! function so the classification is unit-testable independently of the
//! ledger logic.

/// SQLSTATE codes that indicate a conflict or connection problem expected
/// to resolve on retry.
const TRANSIENT_SQLSTATE: &[&str] = &[
    "40001", // serialization_failure
    "40P01", // deadlock_detected
    "55P03", // lock_not_available
    "53300", // too_many_connections
    "08000", // connection_exception
    "08003", // connection_does_not_exist
    "08006", // connection_failure
    "08007", // transaction_resolution_unknown
    "57P01", // admin_shutdown
    "57P02", // crash_shutdown
    "57P03", // cannot_connect_now
];

/// Message fragments matched when the driver reports no SQLSTATE.
const TRANSIENT_PATTERNS: &[&str] = &[
    "deadlock",
    "lock timeout",
    "lock wait timeout",
    "could not serialize",
    "serialization failure",
    "connection reset",
    "connection closed",
    "connection refused",
    "terminating connection",
    "too many connections",
    "timed out",
];

/// Classify a sqlx error as transient (retryable) or not.
pub fn is_transient(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Io(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => true,
        sqlx::Error::Database(db) => {
            if let Some(code) = db.code() {
                if TRANSIENT_SQLSTATE.contains(&code.as_ref()) {
                    return true;
                }
            }
            message_is_transient(db.message())
        }
        _ => false,
    }
}

/// Pattern fallback over the raw error message.
pub fn message_is_transient(message: &str) -> bool {
    let message = message.to_lowercase();
    TRANSIENT_PATTERNS.iter().any(|p| message.contains(p))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deadlock_message_transient() {
        assert!(message_is_transient(
            "Deadlock found when trying to get lock; try restarting transaction"
        ));
        assert!(message_is_transient("deadlock detected"));
    }

    #[test]
    fn test_serialization_message_transient() {
        assert!(message_is_transient(
            "could not serialize access due to concurrent update"
        ));
    }

    #[test]
    fn test_connection_messages_transient() {
        assert!(message_is_transient("Connection reset by peer"));
        assert!(message_is_transient("server closed the connection unexpectedly... connection closed"));
        assert!(message_is_transient("canceling statement due to statement timeout: timed out"));
    }

    #[test]
    fn test_constraint_violation_not_transient() {
        assert!(!message_is_transient(
            "duplicate key value violates unique constraint \"users_email_key\""
        ));
        assert!(!message_is_transient(
            "null value in column \"balance\" violates not-null constraint"
        ));
    }

    #[test]
    fn test_pool_errors_transient() {
        assert!(is_transient(&sqlx::Error::PoolTimedOut));
        assert!(is_transient(&sqlx::Error::PoolClosed));
        assert!(is_transient(&sqlx::Error::WorkerCrashed));
    }

    #[test]
    fn test_row_not_found_not_transient() {
        assert!(!is_transient(&sqlx::Error::RowNotFound));
    }

    #[test]
    fn test_sqlstate_list_covers_conflict_codes() {
        assert!(TRANSIENT_SQLSTATE.contains(&"40001"));
        assert!(TRANSIENT_SQLSTATE.contains(&"40P01"));
        assert!(!TRANSIENT_SQLSTATE.contains(&"23505")); // unique_violation stays fatal
    }
}
