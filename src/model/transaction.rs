//! Ledger transaction entity
//!
//! Immutable record of one balance change on one wallet. A transfer
//! produces two linked rows (debit leg + credit leg) sharing one public
//! transaction reference.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::query_builder::Separated;
use sqlx::{FromRow, Postgres, Row};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::store::Entity;

/// Direction of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxKind {
    Credit,
    Debit,
}

impl TxKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxKind::Credit => "credit",
            TxKind::Debit => "debit",
        }
    }
}

impl fmt::Display for TxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TxKind {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "credit" => Ok(TxKind::Credit),
            "debit" => Ok(TxKind::Debit),
            other => Err(ParseEnumError {
                field: "type",
                value: other.to_string(),
            }),
        }
    }
}

/// Lifecycle state of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    Pending,
    Successful,
    Failed,
    Cancelled,
}

impl TxStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxStatus::Pending => "pending",
            TxStatus::Successful => "successful",
            TxStatus::Failed => "failed",
            TxStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for TxStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TxStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TxStatus::Pending),
            "successful" => Ok(TxStatus::Successful),
            "failed" => Ok(TxStatus::Failed),
            "cancelled" => Ok(TxStatus::Cancelled),
            other => Err(ParseEnumError {
                field: "status",
                value: other.to_string(),
            }),
        }
    }
}

/// A stored enum column held a value outside its CHECK list.
#[derive(Debug, thiserror::Error)]
#[error("invalid {field} value: {value}")]
pub struct ParseEnumError {
    field: &'static str,
    value: String,
}

/// One ledger entry.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerTransaction {
    pub id: Uuid,
    /// Public reference; a transfer's two legs share one
    pub transaction_reference: String,
    pub user_id: Uuid,
    /// The other party; the system account for deposits/withdrawals
    pub counterparty_id: Uuid,
    pub wallet_id: Uuid,
    #[serde(rename = "type")]
    pub kind: TxKind,
    pub amount: Decimal,
    pub currency: String,
    pub balance_before: Decimal,
    pub balance_after: Decimal,
    pub status: TxStatus,
    pub narration: Option<String>,
    pub category: Option<String>,
    pub related_transaction_id: Option<Uuid>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FromRow<'_, PgRow> for LedgerTransaction {
    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        let kind: String = row.try_get("type")?;
        let kind = kind.parse::<TxKind>().map_err(|e| sqlx::Error::ColumnDecode {
            index: "type".to_string(),
            source: Box::new(e),
        })?;

        let status: String = row.try_get("status")?;
        let status = status
            .parse::<TxStatus>()
            .map_err(|e| sqlx::Error::ColumnDecode {
                index: "status".to_string(),
                source: Box::new(e),
            })?;

        Ok(Self {
            id: row.try_get("id")?,
            transaction_reference: row.try_get("transaction_reference")?,
            user_id: row.try_get("user_id")?,
            counterparty_id: row.try_get("counterparty_id")?,
            wallet_id: row.try_get("wallet_id")?,
            kind,
            amount: row.try_get("amount")?,
            currency: row.try_get("currency")?,
            balance_before: row.try_get("balance_before")?,
            balance_after: row.try_get("balance_after")?,
            status,
            narration: row.try_get("narration")?,
            category: row.try_get("category")?,
            related_transaction_id: row.try_get("related_transaction_id")?,
            metadata: row.try_get("metadata")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Insert payload for a ledger entry.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub transaction_reference: String,
    pub user_id: Uuid,
    pub counterparty_id: Uuid,
    pub wallet_id: Uuid,
    pub kind: TxKind,
    pub amount: Decimal,
    pub currency: String,
    pub balance_before: Decimal,
    pub balance_after: Decimal,
    pub status: TxStatus,
    pub narration: Option<String>,
    pub category: Option<String>,
    pub related_transaction_id: Option<Uuid>,
    pub metadata: Option<serde_json::Value>,
}

impl Entity for LedgerTransaction {
    const TABLE: &'static str = "transactions";
    const INSERT_COLUMNS: &'static [&'static str] = &[
        "transaction_reference",
        "user_id",
        "counterparty_id",
        "wallet_id",
        "type",
        "amount",
        "currency",
        "balance_before",
        "balance_after",
        "status",
        "narration",
        "category",
        "related_transaction_id",
        "metadata",
    ];

    type New = NewTransaction;

    fn bind_new(new: &NewTransaction, b: &mut Separated<'_, '_, Postgres, &'static str>) {
        b.push_bind(new.transaction_reference.clone());
        b.push_bind(new.user_id);
        b.push_bind(new.counterparty_id);
        b.push_bind(new.wallet_id);
        b.push_bind(new.kind.as_str());
        b.push_bind(new.amount);
        b.push_bind(new.currency.clone());
        b.push_bind(new.balance_before);
        b.push_bind(new.balance_after);
        b.push_bind(new.status.as_str());
        b.push_bind(new.narration.clone());
        b.push_bind(new.category.clone());
        b.push_bind(new.related_transaction_id);
        b.push_bind(new.metadata.clone());
    }
}
