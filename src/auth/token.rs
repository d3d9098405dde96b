//! Session tokens
//!
//! HS256 JWTs issued on register/login and verified by the API
//! middleware.

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

/// JWT claims carried by a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,
    pub email: Option<String>,
    /// Issued at (UTC timestamp)
    pub iat: usize,
    /// Expiration time (UTC timestamp)
    pub exp: usize,
}

/// Issues and verifies session tokens.
#[derive(Clone)]
pub struct TokenService {
    secret: String,
    max_age_secs: i64,
}

impl TokenService {
    pub fn new(secret: String, max_age_secs: i64) -> Self {
        Self {
            secret,
            max_age_secs,
        }
    }

    /// Cookie lifetime matching the token expiry.
    pub fn max_age_secs(&self) -> i64 {
        self.max_age_secs
    }

    /// Sign a token for the given user.
    pub fn issue(&self, user_id: Uuid, email: &str) -> Result<String, AppError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id.to_string(),
            email: Some(email.to_string()),
            iat: now as usize,
            exp: (now + self.max_age_secs) as usize,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("failed to sign session token: {e}")))
    }

    /// Verify a token and return its claims.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|_| {
            AppError::Unauthorized("Unauthorized access: Invalid or missing token".to_string())
        })
    }
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("max_age_secs", &self.max_age_secs)
            .finish_non_exhaustive()
    }
}
