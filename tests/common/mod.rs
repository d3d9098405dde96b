//! Common test utilities

use rust_decimal::Decimal;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use credit_ledger::api::AppState;
use credit_ledger::auth::{password, AuthService, TokenService};
use credit_ledger::ledger::LedgerService;
use credit_ledger::store::RetryPolicy;

/// Fixed counterparty for deposits/withdrawals, matching the seed.
pub const SYSTEM_ACCOUNT_ID: &str = "d91481ed-168f-4c31-826b-7db21f98bab6";

/// Password every seeded test user can log in with.
pub const TEST_PASSWORD: &str = "password123";

pub fn system_account_id() -> Uuid {
    SYSTEM_ACCOUNT_ID.parse().unwrap()
}

/// Setup test database - truncate tables and seed the system account
pub async fn setup_test_db() -> PgPool {
    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to DB");

    // Clean up DB for fresh state
    sqlx::query("TRUNCATE TABLE transactions, wallets, users CASCADE")
        .execute(&pool)
        .await
        .expect("Failed to clean up DB");

    // Seed the system account (default counterparty) and its wallet
    sqlx::query(
        r#"
        INSERT INTO users (id, email, password, first_name, last_name, salt)
        VALUES ($1, 'admin@app.com', 'x', 'App', 'Admin', 'x')
        ON CONFLICT (id) DO NOTHING
        "#,
    )
    .bind(system_account_id())
    .execute(&pool)
    .await
    .expect("Failed to seed system user");

    sqlx::query(
        r#"
        INSERT INTO wallets (user_id, email, currency, balance)
        VALUES ($1, 'admin@app.com', 'NGN', 0)
        ON CONFLICT (user_id) DO NOTHING
        "#,
    )
    .bind(system_account_id())
    .execute(&pool)
    .await
    .expect("Failed to seed system wallet");

    pool
}

/// Application state wired for tests: no risk screen, short token lifetime.
pub fn test_state(pool: PgPool) -> AppState {
    AppState {
        ledger: LedgerService::new(pool.clone(), RetryPolicy::default(), system_account_id()),
        auth: AuthService::new(pool.clone(), None),
        tokens: TokenService::new("test-secret".to_string(), 3600),
        secure_cookies: false,
        pool,
    }
}

/// Insert a user with a wallet holding `balance` whole currency units.
/// Returns (user_id, wallet_id).
pub async fn seed_user(
    pool: &PgPool,
    email: &str,
    first_name: &str,
    balance: i64,
) -> (Uuid, Uuid) {
    let salt = password::generate_salt();
    let hash = password::hash_password(TEST_PASSWORD, &salt).unwrap();

    let user_id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO users (email, password, first_name, salt)
        VALUES ($1, $2, $3, $4)
        RETURNING id
        "#,
    )
    .bind(email)
    .bind(hash)
    .bind(first_name)
    .bind(salt.as_str())
    .fetch_one(pool)
    .await
    .expect("Failed to seed user");

    let wallet_id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO wallets (user_id, email, currency, balance)
        VALUES ($1, $2, 'NGN', $3)
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(email)
    .bind(Decimal::from(balance))
    .fetch_one(pool)
    .await
    .expect("Failed to seed wallet");

    (user_id, wallet_id)
}

/// Current wallet balance for a user.
pub async fn balance_of(pool: &PgPool, user_id: Uuid) -> Decimal {
    sqlx::query_scalar("SELECT balance FROM wallets WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await
        .expect("Failed to read balance")
}

/// Number of ledger rows recorded for a user.
pub async fn transaction_count(pool: &PgPool, user_id: Uuid) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM transactions WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await
        .expect("Failed to count transactions")
}
