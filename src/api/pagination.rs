//! Pagination query parsing
//!
//! Turns `?page&limit&sortBy&sortOrder&startDate&endDate` (plus optional
//! `type`/`status` equality filters) into a store filter and pagination
//! window.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::model::{TxKind, TxStatus};
use crate::store::{Filter, Page, SortOrder};

const DEFAULT_LIMIT: i64 = 10;
const MAX_LIMIT: i64 = 100;

/// Raw pagination/filter query parameters.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub status: Option<String>,
}

impl PageQuery {
    /// Validate and convert into a store filter + pagination window.
    pub fn into_parts(self) -> AppResult<(Filter, Page)> {
        let page_number = parse_positive(self.page.as_deref(), 1)?;
        let limit = parse_positive(self.limit.as_deref(), DEFAULT_LIMIT)?;
        if limit > MAX_LIMIT {
            return Err(AppError::BadRequest(format!(
                "Limit cannot exceed {MAX_LIMIT}"
            )));
        }

        let sort_order = match self.sort_order.as_deref() {
            None => SortOrder::Desc,
            Some(raw) => match raw.to_lowercase().as_str() {
                "asc" => SortOrder::Asc,
                "desc" => SortOrder::Desc,
                _ => {
                    return Err(AppError::BadRequest(
                        "Sort must be either asc or desc".to_string(),
                    ))
                }
            },
        };

        let sort_column = match self.sort_by.as_deref() {
            None | Some("createdAt") => "created_at",
            Some("updatedAt") => "updated_at",
            Some("amount") => "amount",
            Some(other) => {
                return Err(AppError::BadRequest(format!("Cannot sort by {other}")));
            }
        };

        let from = self
            .start_date
            .as_deref()
            .map(|raw| parse_date(raw, "startDate", false))
            .transpose()?;
        let to = self
            .end_date
            .as_deref()
            .map(|raw| parse_date(raw, "endDate", true))
            .transpose()?;

        let mut filter = Filter::new();
        if let Some(raw) = self.kind.as_deref() {
            let kind: TxKind = raw
                .parse()
                .map_err(|_| AppError::BadRequest("type: Must be one of: credit, debit".to_string()))?;
            filter = filter.eq("type", kind.as_str());
        }
        if let Some(raw) = self.status.as_deref() {
            let status: TxStatus = raw.parse().map_err(|_| {
                AppError::BadRequest(
                    "status: Must be one of: pending, successful, failed, cancelled".to_string(),
                )
            })?;
            filter = filter.eq("status", status.as_str());
        }

        let page = Page {
            limit,
            offset: (page_number - 1) * limit,
            sort_column,
            sort_order,
            from,
            to,
        };

        Ok((filter, page))
    }
}

fn parse_positive(raw: Option<&str>, default: i64) -> AppResult<i64> {
    match raw {
        None => Ok(default),
        Some(raw) => match raw.parse::<i64>() {
            Ok(value) if value >= 1 => Ok(value),
            _ => Err(AppError::BadRequest("Invalid page or limit".to_string())),
        },
    }
}

/// Accepts RFC 3339 timestamps or plain dates; plain dates span the whole
/// day (start or end depending on which bound they set).
fn parse_date(raw: &str, field: &str, end_of_day: bool) -> AppResult<DateTime<Utc>> {
    if let Ok(exact) = DateTime::parse_from_rfc3339(raw) {
        return Ok(exact.with_timezone(&Utc));
    }

    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| AppError::BadRequest(format!("{field}: Invalid date")))?;

    let time = if end_of_day {
        date.and_hms_milli_opt(23, 59, 59, 999)
    } else {
        date.and_hms_opt(0, 0, 0)
    }
    .expect("valid wall-clock time");

    Ok(time.and_utc())
}
