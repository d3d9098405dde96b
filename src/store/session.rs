//! Transactional session
//!
//! A thin wrapper over a database transaction. Sessions are acquired only
//! by the retry wrapper and threaded explicitly through gateway calls;
//! every session is released (commit or rollback) before the wrapper
//! returns, on every exit path.

use sqlx::postgres::PgConnection;
use sqlx::{PgPool, Postgres, Transaction};

use super::StoreError;

/// An open transactional scope on the store.
pub struct StoreSession {
    tx: Transaction<'static, Postgres>,
}

impl StoreSession {
    /// Begin a new session from the pool.
    pub(crate) async fn begin(pool: &PgPool) -> Result<Self, StoreError> {
        let tx = pool
            .begin()
            .await
            .map_err(|e| StoreError::session("begin", e))?;
        Ok(Self { tx })
    }

    /// Connection handle for executing statements inside the scope.
    pub(crate) fn conn(&mut self) -> &mut PgConnection {
        &mut self.tx
    }

    /// Commit the scope, consuming the session.
    pub(crate) async fn commit(self) -> Result<(), StoreError> {
        self.tx
            .commit()
            .await
            .map_err(|e| StoreError::session("commit", e))
    }

    /// Roll the scope back, consuming the session.
    pub(crate) async fn rollback(self) -> Result<(), StoreError> {
        self.tx
            .rollback()
            .await
            .map_err(|e| StoreError::session("rollback", e))
    }
}

impl std::fmt::Debug for StoreSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreSession").finish_non_exhaustive()
    }
}
