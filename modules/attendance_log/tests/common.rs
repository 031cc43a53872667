#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use tempfile::TempDir;
use tower::ServiceExt;

use attendance_log::{
    config::AttendanceLogConfig, infra::storage::FileAttendanceStore, AttendanceLog,
};

/// A router over a file-backed log inside its own temp directory.
pub struct TestApp {
    pub router: Router,
    pub log_path: PathBuf,
    _dir: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("temp dir");
        let log_path = dir.path().join("attendance_log.csv");
        let router = router_for(&log_path);
        Self {
            router,
            log_path,
            _dir: dir,
        }
    }

    /// Current file contents; `None` while the log does not exist.
    pub fn log_contents(&self) -> Option<String> {
        std::fs::read_to_string(&self.log_path).ok()
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Option<String>, String) {
        send(self.router.clone(), request).await
    }
}

pub fn router_for(log_path: &Path) -> Router {
    let cfg = AttendanceLogConfig {
        log_file: log_path.to_string_lossy().to_string(),
        sync_on_append: false,
        ..Default::default()
    };
    router_with_config(log_path, &cfg)
}

pub fn router_with_config(log_path: &Path, cfg: &AttendanceLogConfig) -> Router {
    let store = FileAttendanceStore::new(log_path).with_sync_on_append(false);
    let module = AttendanceLog::with_store(cfg, Arc::new(store)).expect("module init");
    module.register_rest(Router::new())
}

pub async fn send(router: Router, request: Request<Body>) -> (StatusCode, Option<String>, String) {
    let response = router.oneshot(request).await.expect("router is infallible");
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    (
        status,
        content_type,
        String::from_utf8(body.to_vec()).expect("utf-8 body"),
    )
}

pub fn mark(body: impl Into<String>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/mark-attendance")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.into()))
        .expect("request")
}

pub fn sync(body: impl Into<String>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/sync-logs")
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from(body.into()))
        .expect("request")
}

pub fn get_log() -> Request<Body> {
    Request::builder()
        .uri("/api/get-attendance")
        .body(Body::empty())
        .expect("request")
}

pub fn problem_code(body: &str) -> String {
    let json: serde_json::Value = serde_json::from_str(body).expect("problem json");
    json["code"].as_str().unwrap_or_default().to_string()
}
