use crate::api::rest::handlers;
use crate::domain::service::Service;
use axum::routing::{get, post};
use axum::{Extension, Router};
use std::sync::Arc;

pub const MARK_ATTENDANCE: &str = "/api/mark-attendance";
pub const SYNC_LOGS: &str = "/api/sync-logs";
pub const GET_ATTENDANCE: &str = "/api/get-attendance";

/// Merge the attendance endpoints into `router`.
pub fn register_routes(router: Router, service: Arc<Service>) -> Router {
    let module = Router::new()
        // POST /api/mark-attendance - single event from an online device
        .route(MARK_ATTENDANCE, post(handlers::mark_attendance))
        // POST /api/sync-logs - offline buffer replay
        .route(SYNC_LOGS, post(handlers::sync_logs))
        // GET /api/get-attendance - full log as text/plain
        .route(GET_ATTENDANCE, get(handlers::get_attendance))
        .layer(Extension(service));

    router.merge(module)
}
