use serde::{Deserialize, Serialize};

use crate::domain::clock::{EN_IN_FORMAT, IST_OFFSET_MINUTES};

/// Configuration for the attendance_log module
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AttendanceLogConfig {
    /// Log file path; relative paths resolve against the working directory.
    #[serde(default = "default_log_file")]
    pub log_file: String,
    /// Offset of the civil timezone used for server-generated timestamps.
    #[serde(default = "default_utc_offset_minutes")]
    pub utc_offset_minutes: i32,
    /// strftime-style format of server-generated timestamps.
    #[serde(default = "default_timestamp_format")]
    pub timestamp_format: String,
    /// Flush appended bytes to disk before acknowledging.
    #[serde(default = "default_sync_on_append")]
    pub sync_on_append: bool,
    #[serde(default = "default_max_batch_bytes")]
    pub max_batch_bytes: usize,
}

impl Default for AttendanceLogConfig {
    fn default() -> Self {
        Self {
            log_file: default_log_file(),
            utc_offset_minutes: default_utc_offset_minutes(),
            timestamp_format: default_timestamp_format(),
            sync_on_append: default_sync_on_append(),
            max_batch_bytes: default_max_batch_bytes(),
        }
    }
}

fn default_log_file() -> String {
    "attendance_log.csv".to_string()
}

fn default_utc_offset_minutes() -> i32 {
    IST_OFFSET_MINUTES
}

fn default_timestamp_format() -> String {
    EN_IN_FORMAT.to_string()
}

fn default_sync_on_append() -> bool {
    true
}

fn default_max_batch_bytes() -> usize {
    1024 * 1024
}
