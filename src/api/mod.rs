//! API module
//!
//! HTTP endpoints, middleware and shared application state.

pub mod middleware;
pub mod pagination;
pub mod response;
pub mod routes;

use sqlx::PgPool;

use crate::auth::{AuthService, DenyPatternScreen, TokenService};
use crate::config::Config;
use crate::ledger::LedgerService;

pub use routes::create_router;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub ledger: LedgerService,
    pub auth: AuthService<DenyPatternScreen>,
    pub tokens: TokenService,
    /// Mark session cookies `Secure` (set in production, where the app is
    /// served over TLS)
    pub secure_cookies: bool,
}

impl AppState {
    pub fn new(pool: PgPool, config: &Config) -> Self {
        let screen = if config.risk_deny_patterns.is_empty() {
            None
        } else {
            Some(DenyPatternScreen::new(config.risk_deny_patterns.clone()))
        };

        Self {
            ledger: LedgerService::new(
                pool.clone(),
                config.retry_policy(),
                config.system_account_id,
            ),
            auth: AuthService::new(pool.clone(), screen),
            tokens: TokenService::new(config.jwt_secret.clone(), config.session_max_age_secs),
            secure_cookies: config.is_production(),
            pool,
        }
    }
}
