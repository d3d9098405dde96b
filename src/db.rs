//! Database module
//!
//! Database connection and schema verification utilities.

use sqlx::PgPool;
use uuid::Uuid;

/// Simple connectivity check
pub async fn verify_connection(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;

    Ok(())
}

/// Check if required tables exist
pub async fn check_schema(pool: &PgPool) -> Result<bool, sqlx::Error> {
    let required_tables = vec!["users", "wallets", "transactions"];

    for table in required_tables {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM information_schema.tables
                WHERE table_schema = 'public' AND table_name = $1
            )
            "#,
        )
        .bind(table)
        .fetch_one(pool)
        .await?;

        if !exists {
            tracing::error!("Required table '{}' does not exist", table);
            return Ok(false);
        }
    }

    Ok(true)
}

/// Check that the system account used as default counterparty exists
pub async fn check_system_account(pool: &PgPool, system_account_id: Uuid) -> Result<bool, sqlx::Error> {
    let user_exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
        .bind(system_account_id)
        .fetch_one(pool)
        .await?;

    if !user_exists {
        tracing::error!(
            "Required system account '{}' does not exist. Please run database seed.",
            system_account_id
        );
        return Ok(false);
    }

    tracing::info!("System account verified: {}", system_account_id);
    Ok(true)
}
