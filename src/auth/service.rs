//! Auth service
//!
//! Registration (with optional risk screen and best-effort wallet
//! provisioning) and credential verification.

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::model::{NewUser, NewWallet, User, Wallet};
use crate::store::{Filter, Repository, StoreError};

use super::password;
use super::risk::RiskScreen;

/// Registration payload, already shape-validated by the API surface.
#[derive(Debug, Clone)]
pub struct RegisterData {
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
}

/// Onboarding and login over users and wallets.
#[derive(Debug, Clone)]
pub struct AuthService<R> {
    users: Repository<User>,
    wallets: Repository<Wallet>,
    screen: Option<R>,
}

impl<R: RiskScreen + 'static> AuthService<R> {
    pub fn new(pool: PgPool, screen: Option<R>) -> Self {
        Self {
            users: Repository::new(pool.clone()),
            wallets: Repository::new(pool),
            screen,
        }
    }

    /// Register a new user.
    ///
    /// Wallet provisioning is spawned as a background task whose result and
    /// errors are discarded: at most one attempt, no retry. Its failure
    /// never fails registration, so the returned wallet may be `None`.
    pub async fn register_user(&self, data: RegisterData) -> AppResult<(User, Option<Wallet>)> {
        let existing = self
            .users
            .get_one(&Filter::new().eq("email", data.email.clone()), None)
            .await?;
        if existing.is_some() {
            return Err(AppError::Conflict("User already exists.".to_string()));
        }

        if let Some(screen) = &self.screen {
            let verdict = screen
                .screen(&data.email)
                .await
                .map_err(|e| AppError::Internal(e.to_string()))?;
            if verdict.flagged {
                tracing::info!(
                    email = %data.email,
                    reason = verdict.reason.as_deref().unwrap_or("unspecified"),
                    "registration declined by risk screen"
                );
                return Err(AppError::Forbidden("Registration declined.".to_string()));
            }
        }

        let salt = password::generate_salt();
        let hash = password::hash_password(&data.password, &salt)?;

        let new_user = NewUser {
            email: data.email,
            password: hash,
            salt: salt.as_str().to_string(),
            first_name: data.first_name,
            last_name: data.last_name,
            phone_number: data.phone_number,
        };
        let created = self.users.create(&new_user, None).await?;

        self.spawn_wallet_provisioning(created.id, created.email.clone());

        self.users
            .get_by_id_with::<Wallet>(created.id, "user_id", None)
            .await?
            .ok_or_else(|| AppError::Internal("Failed to create user.".to_string()))
    }

    /// Verify credentials and return the user joined with their wallet.
    ///
    /// Unknown email and wrong password fail identically so login never
    /// leaks account existence.
    pub async fn login_user(&self, email: &str, pass: &str) -> AppResult<(User, Option<Wallet>)> {
        let user = self
            .users
            .get_one(&Filter::new().eq("email", email), None)
            .await?
            .ok_or_else(|| AppError::Forbidden("Invalid login credentials.".to_string()))?;

        if !password::verify_password(&user.password, pass) {
            return Err(AppError::Forbidden("Invalid login credentials.".to_string()));
        }

        self.users
            .get_by_id_with::<Wallet>(user.id, "user_id", None)
            .await?
            .ok_or_else(|| AppError::Forbidden("Invalid login credentials.".to_string()))
    }

    /// Fire-and-forget wallet provisioning.
    fn spawn_wallet_provisioning(&self, user_id: Uuid, email: String) {
        let wallets = self.wallets.clone();
        tokio::spawn(async move {
            if let Err(e) = provision_wallet(&wallets, user_id, email).await {
                tracing::warn!(%user_id, error = %e, "wallet provisioning failed");
            }
        });
    }
}

/// Create the user's wallet. The unique constraint on `user_id` makes the
/// attempt at-most-once.
pub async fn provision_wallet(
    wallets: &Repository<Wallet>,
    user_id: Uuid,
    email: String,
) -> Result<Wallet, StoreError> {
    wallets.create(&NewWallet::empty(user_id, email), None).await
}
