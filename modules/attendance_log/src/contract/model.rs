use serde::Deserialize;
use std::fmt;

/// An event exactly as a device submitted it, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NewAttendance {
    pub uid: Option<String>,
    pub timestamp: Option<String>,
}

impl NewAttendance {
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: Some(uid.into()),
            timestamp: None,
        }
    }

    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }
}

/// Body of a single-event submission.
///
/// The HTTP handler always passes `Text`, since devices send JSON with or
/// without a content type. `Structured` is for in-process callers that
/// already hold a decoded `NewAttendance` and skip the JSON step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventPayload {
    Structured(NewAttendance),
    Text(String),
}

impl From<NewAttendance> for EventPayload {
    fn from(value: NewAttendance) -> Self {
        Self::Structured(value)
    }
}

/// A validated attendance record; both fields are always populated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceEvent {
    pub uid: String,
    pub timestamp: String,
}

impl AttendanceEvent {
    pub fn to_log_line(&self) -> LogLine {
        LogLine(format!("{},{}\n", self.uid, self.timestamp))
    }
}

/// One serialized record: `uid,timestamp\n`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine(String);

impl LogLine {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Display for LogLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A block of pre-formatted log lines replayed from a device's offline buffer.
///
/// The block is trusted: lines are not parsed or validated individually.
/// Normalization only guarantees that the block neither starts with a blank
/// line nor lacks its final newline, so appending it can never glue onto or
/// leave a gap after existing content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchPayload(String);

impl BatchPayload {
    /// Returns `None` when nothing but whitespace was supplied.
    pub fn normalize(raw: &str) -> Option<Self> {
        let trimmed = raw.trim_end();
        let first_visible = trimmed.find(|c: char| !c.is_whitespace())?;
        // Drop whole blank lines only; the first record keeps its own bytes.
        let start = trimmed[..first_visible].rfind('\n').map_or(0, |i| i + 1);
        let block_text = &trimmed[start..];

        let mut block = String::with_capacity(block_text.len() + 1);
        block.push_str(block_text);
        block.push('\n');
        Some(Self(block))
    }

    pub fn line_count(&self) -> usize {
        self.0.lines().count()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_line_is_comma_joined_and_newline_terminated() {
        let event = AttendanceEvent {
            uid: "04A1B2C3".into(),
            timestamp: "14/10/2026, 9:05:00 am".into(),
        };
        assert_eq!(
            event.to_log_line().as_str(),
            "04A1B2C3,14/10/2026, 9:05:00 am\n"
        );
    }

    #[test]
    fn batch_gets_exactly_one_trailing_newline() {
        let batch = BatchPayload::normalize("A1,t1\nA2,t2\n\n  \r\n").unwrap();
        assert_eq!(batch.as_str(), "A1,t1\nA2,t2\n");
        assert_eq!(batch.line_count(), 2);

        let batch = BatchPayload::normalize("A1,t1\nA2,t2").unwrap();
        assert_eq!(batch.as_str(), "A1,t1\nA2,t2\n");
    }

    #[test]
    fn batch_drops_leading_blank_lines() {
        let batch = BatchPayload::normalize("\r\n\nA1,t1").unwrap();
        assert_eq!(batch.as_str(), "A1,t1\n");

        let batch = BatchPayload::normalize(" \t\n  A1,t1").unwrap();
        assert_eq!(batch.as_str(), "  A1,t1\n");
    }

    #[test]
    fn batch_keeps_inner_lines_untouched() {
        // Lines are trusted: no per-line validation or cleanup.
        let batch = BatchPayload::normalize("A1,t1\n\nnot-a-record\r\nA2,t2").unwrap();
        assert_eq!(batch.as_str(), "A1,t1\n\nnot-a-record\r\nA2,t2\n");
    }

    #[test]
    fn whitespace_only_batch_is_empty() {
        assert!(BatchPayload::normalize("").is_none());
        assert!(BatchPayload::normalize(" \n\t\r\n ").is_none());
    }
}
