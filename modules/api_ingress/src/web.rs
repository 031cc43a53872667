use axum::response::Json;
use serde_json::{json, Value};

pub const LIVENESS_MESSAGE: &str = "RFID Attendance Server is online and running.";

/// Plain-text liveness check for browsers and devices.
pub async fn liveness() -> &'static str {
    LIVENESS_MESSAGE
}

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}
