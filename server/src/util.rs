use reqwest::{Response, StatusCode};

use crate::error::{AppError, AppResult};

/// Passes successful responses through and turns the rest into an [`AppError`],
/// logging the body the remote service sent back.
pub async fn ensure_success(resp: Response, what: &str) -> AppResult<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().await.unwrap_or_default();
    tracing::error!("{} failed with status {}: {}", what, status, body);

    Err(match status {
        StatusCode::NOT_FOUND => AppError::NotFound(format!("{} not found", what)),
        StatusCode::REQUEST_TIMEOUT => AppError::RequestTimeout,
        StatusCode::TOO_MANY_REQUESTS => AppError::TooManyRequests,
        _ => AppError::ExternalService(format!("{} failed with status {}", what, status)),
    })
}
