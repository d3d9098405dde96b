//! Response envelope
//!
//! Uniform `{ status, message, data, meta? }` shape for successful
//! responses. Errors render through `AppError::into_response`.

use axum::Json;
use serde::Serialize;

use crate::store::PageMeta;

/// Successful response body.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub status: u16,
    pub message: String,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<PageMeta>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(status: u16, message: &str, data: T) -> Self {
        Self {
            status,
            message: message.to_string(),
            data,
            meta: None,
        }
    }

    /// 200 envelope.
    pub fn success(message: &str, data: T) -> Json<Self> {
        Json(Self::new(200, message, data))
    }

    /// 200 envelope with pagination metadata.
    pub fn paginated(message: &str, data: T, meta: PageMeta) -> Json<Self> {
        Json(Self {
            status: 200,
            message: message.to_string(),
            data,
            meta: Some(meta),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_shape() {
        let response = ApiResponse::success("Deposit successful", serde_json::json!({"id": 1}));
        let json = serde_json::to_value(&response.0).unwrap();

        assert_eq!(json["status"], 200);
        assert_eq!(json["message"], "Deposit successful");
        assert_eq!(json["data"]["id"], 1);
        assert!(json.get("meta").is_none());
    }

    #[test]
    fn test_paginated_shape() {
        let meta = PageMeta::new(25, 2, 10);
        let response = ApiResponse::paginated("transactions fetched successfully", vec![1, 2], meta);
        let json = serde_json::to_value(&response.0).unwrap();

        assert_eq!(json["meta"]["total"], 25);
        assert_eq!(json["meta"]["pages"], 3);
        assert_eq!(json["meta"]["page"], 2);
        assert_eq!(json["meta"]["limit"], 10);
    }
}
