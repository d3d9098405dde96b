//! Wallet entity
//!
//! One wallet per user. The balance must never go negative after a
//! committed operation; the ledger core enforces this before mutating.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::query_builder::Separated;
use sqlx::{FromRow, Postgres};
use uuid::Uuid;

use crate::store::Entity;

/// Default currency for newly provisioned wallets.
pub const DEFAULT_CURRENCY: &str = "NGN";

/// A user's wallet.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    pub id: Uuid,
    pub user_id: Uuid,
    pub email: String,
    pub currency: String,
    pub balance: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for a wallet row.
#[derive(Debug, Clone)]
pub struct NewWallet {
    pub user_id: Uuid,
    pub email: String,
    pub currency: String,
    pub balance: Decimal,
}

impl NewWallet {
    /// An empty wallet in the default currency.
    pub fn empty(user_id: Uuid, email: String) -> Self {
        Self {
            user_id,
            email,
            currency: DEFAULT_CURRENCY.to_string(),
            balance: Decimal::ZERO,
        }
    }
}

impl Entity for Wallet {
    const TABLE: &'static str = "wallets";
    const INSERT_COLUMNS: &'static [&'static str] = &["user_id", "email", "currency", "balance"];

    type New = NewWallet;

    fn bind_new(new: &NewWallet, b: &mut Separated<'_, '_, Postgres, &'static str>) {
        b.push_bind(new.user_id);
        b.push_bind(new.email.clone());
        b.push_bind(new.currency.clone());
        b.push_bind(new.balance);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_wallet_defaults() {
        let user_id = Uuid::new_v4();
        let wallet = NewWallet::empty(user_id, "john@gmail.com".to_string());

        assert_eq!(wallet.user_id, user_id);
        assert_eq!(wallet.currency, "NGN");
        assert_eq!(wallet.balance, Decimal::ZERO);
    }

    #[test]
    fn test_wallet_serializes_camel_case() {
        let wallet = Wallet {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            email: "john@gmail.com".to_string(),
            currency: "NGN".to_string(),
            balance: Decimal::new(100000, 2),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(wallet).unwrap();
        assert!(json.get("userId").is_some());
        assert!(json.get("user_id").is_none());
    }
}
