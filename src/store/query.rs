//! Query parameters
//!
//! Equality filters, pagination windows and the count-derived pagination
//! metadata returned alongside listings.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

/// A typed bind value for dynamic queries.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Uuid(Uuid),
    Text(String),
    Int(i64),
    Decimal(Decimal),
    Timestamp(DateTime<Utc>),
    Bool(bool),
}

impl Value {
    pub(crate) fn push_bind(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        match self {
            Value::Uuid(v) => qb.push_bind(*v),
            Value::Text(v) => qb.push_bind(v.clone()),
            Value::Int(v) => qb.push_bind(*v),
            Value::Decimal(v) => qb.push_bind(*v),
            Value::Timestamp(v) => qb.push_bind(*v),
            Value::Bool(v) => qb.push_bind(*v),
        };
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Value::Uuid(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<Decimal> for Value {
    fn from(v: Decimal) -> Self {
        Value::Decimal(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Timestamp(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

/// Equality filter: a mapping of column name to expected value, combined
/// with AND.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    terms: Vec<(&'static str, Value)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an equality term.
    pub fn eq(mut self, column: &'static str, value: impl Into<Value>) -> Self {
        self.terms.push((column, value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub(crate) fn terms(&self) -> &[(&'static str, Value)] {
        &self.terms
    }
}

/// Sort direction for listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Pagination window with sort and optional creation-date range.
#[derive(Debug, Clone)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
    pub sort_column: &'static str,
    pub sort_order: SortOrder,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: 50,
            offset: 0,
            sort_column: "created_at",
            sort_order: SortOrder::Desc,
            from: None,
            to: None,
        }
    }
}

impl Page {
    /// 1-based page number implied by the window.
    pub fn number(&self) -> i64 {
        self.offset / self.limit.max(1) + 1
    }

    /// Derive the metadata block for a listing with `total` matching rows.
    pub fn meta(&self, total: i64) -> PageMeta {
        PageMeta::new(total, self.number(), self.limit)
    }
}

/// Count-derived pagination metadata returned with every listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    pub total: i64,
    pub page: i64,
    pub pages: i64,
    pub limit: i64,
}

impl PageMeta {
    pub fn new(total: i64, page: i64, limit: i64) -> Self {
        let pages = if limit > 0 {
            (total + limit - 1) / limit
        } else {
            0
        };
        Self {
            total,
            page,
            pages,
            limit,
        }
    }
}
