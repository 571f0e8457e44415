//! Subcommands and the envelope printer they share

pub mod customers;
pub mod orders;
pub mod products;

pub use customers::CustomerCommand;
pub use orders::OrderCommand;
pub use products::ProductCommand;

use domain_shop::{ApiResponse, ShopResult, ShopStore};
use serde::Serialize;

/// Print the envelope for `result` and report whether the operation succeeded
pub fn respond<T: Serialize>(result: ShopResult<ApiResponse<T>>) -> eyre::Result<bool> {
    let (envelope, succeeded) = match result {
        Ok(envelope) => (envelope, true),
        Err(e) => {
            tracing::warn!(status = %e.status_code(), error = %e, "Operation failed");
            (ApiResponse::from_error(&e), false)
        }
    };

    println!("{}", serde_json::to_string_pretty(&envelope)?);
    Ok(succeeded)
}

pub async fn health(store: &ShopStore) -> eyre::Result<bool> {
    let status = store.health().await;
    let report = serde_json::json!({
        "database": store.database().name(),
        "responseTimeMs": status.response_time_ms,
    });

    let envelope = if status.healthy {
        ApiResponse::success(report).with_message("MongoDB is reachable")
    } else {
        ApiResponse {
            success: false,
            data: Some(report),
            count: None,
            error: Some("Database unavailable".to_string()),
            message: status.message,
        }
    };

    println!("{}", serde_json::to_string_pretty(&envelope)?);
    Ok(status.healthy)
}
