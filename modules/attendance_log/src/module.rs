use std::sync::Arc;

use tracing::{debug, info};

use crate::api::rest::routes;
use crate::config::AttendanceLogConfig;
use crate::domain::clock::{SystemClock, TimestampRenderer};
use crate::domain::repo::AttendanceStore;
use crate::domain::service::{Service, ServiceConfig};
use crate::infra::storage::FileAttendanceStore;

/// Wires the file-backed store and the ingestion service together and
/// exposes the REST surface.
#[derive(Clone)]
pub struct AttendanceLog {
    service: Arc<Service>,
}

impl AttendanceLog {
    /// Section name under `modules:` in the application config.
    pub const NAME: &'static str = "attendance_log";

    pub fn init(cfg: &AttendanceLogConfig) -> anyhow::Result<Self> {
        info!("Initializing attendance_log module");
        debug!(
            "Loaded attendance_log config: log_file={}, utc_offset_minutes={}, sync_on_append={}",
            cfg.log_file, cfg.utc_offset_minutes, cfg.sync_on_append
        );

        let store = FileAttendanceStore::new(&cfg.log_file).with_sync_on_append(cfg.sync_on_append);
        Self::with_store(cfg, Arc::new(store))
    }

    /// Same as [`AttendanceLog::init`] but with a caller-provided store.
    pub fn with_store(
        cfg: &AttendanceLogConfig,
        store: Arc<dyn AttendanceStore>,
    ) -> anyhow::Result<Self> {
        let renderer = TimestampRenderer::new(cfg.utc_offset_minutes, cfg.timestamp_format.clone())?;
        let service = Service::new(
            store,
            Arc::new(SystemClock),
            renderer,
            ServiceConfig {
                max_batch_bytes: cfg.max_batch_bytes,
            },
        );
        Ok(Self {
            service: Arc::new(service),
        })
    }

    pub fn service(&self) -> Arc<Service> {
        self.service.clone()
    }

    pub fn register_rest(&self, router: axum::Router) -> axum::Router {
        info!("Registering attendance_log REST routes");
        routes::register_routes(router, self.service.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_rejects_invalid_timestamp_settings() {
        let cfg = AttendanceLogConfig {
            utc_offset_minutes: 99_999,
            ..Default::default()
        };
        assert!(AttendanceLog::init(&cfg).is_err());
    }
}
