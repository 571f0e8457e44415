use http::StatusCode;
use serde::Serialize;

use crate::error::ShopError;

/// Envelope every adapter answers with:
/// `{success, data?, count?, error?, message?}`
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            count: None,
            error: None,
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn from_error(err: &ShopError) -> Self {
        Self {
            success: false,
            data: None,
            count: None,
            error: Some(err.label().to_string()),
            message: Some(err.to_string()),
        }
    }

    /// 200 on success, otherwise the error's own code
    pub fn status_for(result: &Result<T, ShopError>) -> StatusCode {
        match result {
            Ok(_) => StatusCode::OK,
            Err(e) => e.status_code(),
        }
    }
}

impl<T> ApiResponse<Vec<T>> {
    pub fn list(items: Vec<T>) -> Self {
        let count = items.len();
        Self {
            count: Some(count),
            ..Self::success(items)
        }
    }
}

/// Empty object payload for deletions
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct Empty {}

impl ApiResponse<Empty> {
    pub fn deleted() -> Self {
        Self::success(Empty {})
    }
}
