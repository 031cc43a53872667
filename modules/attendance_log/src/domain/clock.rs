use anyhow::{anyhow, Result};
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, FixedOffset, Utc};

/// India Standard Time, UTC+05:30. IST has no daylight saving, so a fixed
/// offset is exact.
pub const IST_OFFSET_MINUTES: i32 = 5 * 60 + 30;

/// Same shape as the `en-IN` locale rendering: `14/10/2026, 3:45:12 pm`.
pub const EN_IN_FORMAT: &str = "%-d/%-m/%Y, %-I:%M:%S %P";

/// Source of receipt time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Renders receipt times in the single civil timezone of the deployment.
#[derive(Debug, Clone)]
pub struct TimestampRenderer {
    offset: FixedOffset,
    format: String,
}

impl TimestampRenderer {
    pub fn new(utc_offset_minutes: i32, format: impl Into<String>) -> Result<Self> {
        let offset = utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| anyhow!("UTC offset out of range: {utc_offset_minutes} minutes"))?;

        let format = format.into();
        if format.trim().is_empty() {
            return Err(anyhow!("timestamp format must not be empty"));
        }
        // chrono only reports invalid specifiers when the value is displayed,
        // and `to_string` would panic at that point.
        if StrftimeItems::new(&format).any(|item| matches!(item, Item::Error)) {
            return Err(anyhow!("invalid timestamp format: '{format}'"));
        }

        Ok(Self { offset, format })
    }

    pub fn render(&self, at: DateTime<Utc>) -> String {
        at.with_timezone(&self.offset)
            .format(&self.format)
            .to_string()
    }
}
