use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error, info, instrument};

use crate::contract::model::{AttendanceEvent, BatchPayload, EventPayload, NewAttendance};
use crate::domain::clock::{Clock, TimestampRenderer};
use crate::domain::error::DomainError;
use crate::domain::repo::{AttendanceStore, StoreError};

/// Ingestion gateway: validates and normalizes submissions, then appends them.
/// Depends only on the store port, not on infra types.
#[derive(Clone)]
pub struct Service {
    store: Arc<dyn AttendanceStore>,
    clock: Arc<dyn Clock>,
    renderer: TimestampRenderer,
    config: ServiceConfig,
}

/// Configuration for the domain service
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub max_batch_bytes: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            max_batch_bytes: 1024 * 1024,
        }
    }
}

impl Service {
    /// Create a service with dependencies.
    pub fn new(
        store: Arc<dyn AttendanceStore>,
        clock: Arc<dyn Clock>,
        renderer: TimestampRenderer,
        config: ServiceConfig,
    ) -> Self {
        Self {
            store,
            clock,
            renderer,
            config,
        }
    }

    /// Record one attendance event.
    ///
    /// On success the line is on disk and the device may drop its copy.
    /// A missing timestamp is filled with the receipt time.
    #[instrument(name = "attendance_log.service.submit_event", skip(self, payload))]
    pub async fn submit_event(&self, payload: EventPayload) -> Result<AttendanceEvent, DomainError> {
        let raw = decode_payload(payload)?;
        let event = self.validate(raw)?;

        let line = event.to_log_line();
        self.store.append(line.as_bytes()).await.map_err(|e| {
            error!(uid = %event.uid, error = %e, "Failed to append attendance event");
            DomainError::store_failure(e.to_string())
        })?;

        info!(uid = %event.uid, timestamp = %event.timestamp, "Attendance marked");
        Ok(event)
    }

    /// Replay a device's offline buffer as one block.
    ///
    /// Lines are appended as sent, without per-line validation. The whole
    /// block is accepted or rejected; there is no partial acknowledgment.
    /// Returns the number of lines appended.
    #[instrument(
        name = "attendance_log.service.submit_batch",
        skip(self, raw),
        fields(bytes = raw.len())
    )]
    pub async fn submit_batch(&self, raw: &str) -> Result<usize, DomainError> {
        if raw.len() > self.config.max_batch_bytes {
            return Err(DomainError::BatchTooLarge {
                size: raw.len(),
                limit: self.config.max_batch_bytes,
            });
        }

        let batch = BatchPayload::normalize(raw).ok_or(DomainError::EmptyBatch)?;
        let lines = batch.line_count();

        self.store.append(batch.as_bytes()).await.map_err(|e| {
            error!(lines, error = %e, "Failed to append offline batch");
            DomainError::store_failure(e.to_string())
        })?;

        info!(lines, "Offline logs synced");
        Ok(lines)
    }

    /// Full log contents, verbatim.
    #[instrument(name = "attendance_log.service.read_log", skip(self))]
    pub async fn read_log(&self) -> Result<Vec<u8>, DomainError> {
        match self.store.read_all().await {
            Ok(bytes) => {
                debug!(bytes = bytes.len(), "Read attendance log");
                Ok(bytes)
            }
            Err(StoreError::NotFound) => Err(DomainError::NotFound),
            Err(e) => {
                error!(error = %e, "Failed to read attendance log");
                Err(DomainError::store_failure(e.to_string()))
            }
        }
    }

    fn validate(&self, raw: NewAttendance) -> Result<AttendanceEvent, DomainError> {
        let uid = raw
            .uid
            .as_deref()
            .map(str::trim)
            .filter(|uid| !uid.is_empty())
            .ok_or_else(|| DomainError::missing_field("uid"))?;
        if uid.contains([',', '\r', '\n']) {
            return Err(DomainError::malformed(
                "uid must not contain commas or line breaks",
            ));
        }

        let timestamp = match raw.timestamp.as_deref().map(str::trim) {
            Some(ts) if !ts.is_empty() => {
                if ts.contains(['\r', '\n']) {
                    return Err(DomainError::malformed(
                        "timestamp must not contain line breaks",
                    ));
                }
                ts.to_string()
            }
            _ => self.renderer.render(self.clock.now()),
        };

        Ok(AttendanceEvent {
            uid: uid.to_string(),
            timestamp,
        })
    }
}

/// Structured payloads pass through; raw text must decode to a JSON object.
/// Any decode failure is a format error, never a missing field.
fn decode_payload(payload: EventPayload) -> Result<NewAttendance, DomainError> {
    let text = match payload {
        EventPayload::Structured(raw) => return Ok(raw),
        EventPayload::Text(text) => text,
    };

    let value: Value = serde_json::from_str(&text)
        .map_err(|e| DomainError::malformed(format!("body is not valid JSON: {e}")))?;
    if !value.is_object() {
        return Err(DomainError::malformed("body must be a JSON object"));
    }
    serde_json::from_value(value)
        .map_err(|e| DomainError::malformed(format!("unexpected field type: {e}")))
}
