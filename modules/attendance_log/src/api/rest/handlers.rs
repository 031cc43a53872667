use std::sync::Arc;

use axum::{
    body::Bytes,
    http::{header, HeaderMap, StatusCode, Uri},
    response::IntoResponse,
    Extension,
};
use tracing::{info, warn};

use crate::api::rest::error::map_domain_error;
use crate::api::rest::problem::ProblemResponse;
use crate::contract::model::EventPayload;
use crate::domain::error::DomainError;
use crate::domain::service::Service;

pub const MARKED: &str = "Success: Attendance marked.";
pub const SYNCED: &str = "Success: Offline logs synced.";

fn request_id(headers: &HeaderMap) -> Option<&str> {
    headers.get("x-request-id").and_then(|v| v.to_str().ok())
}

fn reject(e: &DomainError, uri: &Uri, headers: &HeaderMap) -> ProblemResponse {
    if !e.is_retryable() {
        warn!(path = uri.path(), error = %e, "Rejected attendance request");
    }
    map_domain_error(e, uri.path(), request_id(headers))
}

fn utf8_body(body: Bytes) -> Result<String, DomainError> {
    String::from_utf8(body.to_vec())
        .map_err(|_| DomainError::malformed("body is not valid UTF-8 text"))
}

/// Record a single attendance event.
/// The body is decoded as JSON whatever the declared content type, since
/// embedded clients do not always set one.
pub async fn mark_attendance(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, &'static str), ProblemResponse> {
    let payload = utf8_body(body)
        .map(EventPayload::Text)
        .map_err(|e| reject(&e, &uri, &headers))?;

    match svc.submit_event(payload).await {
        Ok(event) => {
            info!("Received UID: {}. Logged entry to file.", event.uid);
            Ok((StatusCode::OK, MARKED))
        }
        Err(e) => Err(reject(&e, &uri, &headers)),
    }
}

/// Append a device's offline buffer in one block.
pub async fn sync_logs(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, &'static str), ProblemResponse> {
    let raw = utf8_body(body).map_err(|e| reject(&e, &uri, &headers))?;

    match svc.submit_batch(&raw).await {
        Ok(lines) => {
            info!("Synced {} offline log lines", lines);
            Ok((StatusCode::OK, SYNCED))
        }
        Err(e) => Err(reject(&e, &uri, &headers)),
    }
}

/// Serve the whole log as plain text.
pub async fn get_attendance(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ProblemResponse> {
    match svc.read_log().await {
        Ok(bytes) => Ok((
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            bytes,
        )),
        Err(e) => Err(reject(&e, &uri, &headers)),
    }
}
