//! User entity
//!
//! Root entity of the data model. Wallets and transactions reference a
//! user by foreign key; the user row itself is immutable after
//! registration.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::query_builder::Separated;
use sqlx::{FromRow, Postgres};
use uuid::Uuid;

use crate::store::Entity;

/// A registered user.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    /// Argon2 hash, never exposed in JSON
    #[serde(skip_serializing)]
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    #[serde(skip_serializing)]
    pub salt: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Name used in transfer narrations; falls back to the email address.
    pub fn short_name(&self) -> &str {
        self.first_name.as_deref().unwrap_or(&self.email)
    }
}

/// Insert payload for a user row.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub salt: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
}

impl Entity for User {
    const TABLE: &'static str = "users";
    const INSERT_COLUMNS: &'static [&'static str] = &[
        "email",
        "password",
        "salt",
        "first_name",
        "last_name",
        "phone_number",
    ];

    type New = NewUser;

    fn bind_new(new: &NewUser, b: &mut Separated<'_, '_, Postgres, &'static str>) {
        b.push_bind(new.email.clone());
        b.push_bind(new.password.clone());
        b.push_bind(new.salt.clone());
        b.push_bind(new.first_name.clone());
        b.push_bind(new.last_name.clone());
        b.push_bind(new.phone_number.clone());
    }
}
