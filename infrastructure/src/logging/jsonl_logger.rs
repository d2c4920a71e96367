//! JSONL file writer for initiation diagnostics.
//!
//! Each [`DiagnosticsEvent`] becomes a single JSON line carrying a `type`
//! field and an RFC 3339 `timestamp`. The file is opened in append mode so
//! successive runs accumulate in one log.

use chatlink_application::ports::diagnostics_logger::{DiagnosticsEvent, DiagnosticsLogger};
use serde_json::{Map, Value};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// Diagnostics logger that appends one JSON object per line.
///
/// Thread-safe via `Mutex<BufWriter<File>>`. Flushes after every record and on `Drop`.
pub struct JsonlDiagnosticsLogger {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlDiagnosticsLogger {
    /// Open (or create) the log at `path`, creating parent directories.
    ///
    /// Returns `None` if the file cannot be opened; callers fall back to
    /// `NoDiagnosticsLogger`.
    pub fn open(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!(
                "Could not create diagnostics directory {}: {}",
                parent.display(),
                e
            );
            return None;
        }

        let file = match OpenOptions::new().create(true).append(true).open(path) {
            Ok(f) => f,
            Err(e) => {
                warn!("Could not open diagnostics file {}: {}", path.display(), e);
                return None;
            }
        };

        Some(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn record(event: DiagnosticsEvent) -> Value {
        let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);

        let mut map = match event.payload {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                let mut map = Map::new();
                map.insert("data".to_string(), other);
                map
            }
        };
        map.insert("type".to_string(), Value::String(event.event_type.to_string()));
        map.insert("timestamp".to_string(), Value::String(timestamp));
        Value::Object(map)
    }
}

impl DiagnosticsLogger for JsonlDiagnosticsLogger {
    fn log(&self, event: DiagnosticsEvent) {
        let Ok(line) = serde_json::to_string(&Self::record(event)) else {
            return;
        };

        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", line);
            let _ = writer.flush();
        }
    }
}

impl Drop for JsonlDiagnosticsLogger {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn read_lines(path: &Path) -> Vec<Value> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_writes_one_record_per_event() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("diagnostics.jsonl");
        let logger = JsonlDiagnosticsLogger::open(&path).unwrap();

        logger.log(DiagnosticsEvent::new(
            "initiation_started",
            json!({ "attempt": 1, "contactFlowId": "cf-1", "language": "en_US" }),
        ));
        logger.log(DiagnosticsEvent::new(
            "initiation_failed",
            json!({ "attempt": 1, "phase": "session_open" }),
        ));
        drop(logger);

        let records = read_lines(&path);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["type"], "initiation_started");
        assert_eq!(records[0]["contactFlowId"], "cf-1");
        assert!(records[0]["timestamp"].as_str().unwrap().ends_with('Z'));
        assert_eq!(records[1]["type"], "initiation_failed");
        assert_eq!(records[1]["phase"], "session_open");
    }

    #[test]
    fn test_appends_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("diagnostics.jsonl");

        let first = JsonlDiagnosticsLogger::open(&path).unwrap();
        first.log(DiagnosticsEvent::new("session_reset", Value::Null));
        drop(first);

        let second = JsonlDiagnosticsLogger::open(&path).unwrap();
        second.log(DiagnosticsEvent::new("session_reset", Value::Null));
        drop(second);

        assert_eq!(read_lines(&path).len(), 2);
    }

    #[test]
    fn test_non_object_payload_is_wrapped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("diagnostics.jsonl");
        let logger = JsonlDiagnosticsLogger::open(&path).unwrap();
        assert_eq!(logger.path(), path.as_path());

        logger.log(DiagnosticsEvent::new("initiation_superseded", json!(3)));
        drop(logger);

        let records = read_lines(&path);
        assert_eq!(records[0]["type"], "initiation_superseded");
        assert_eq!(records[0]["data"], 3);
    }

    #[test]
    fn test_open_fails_when_parent_is_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();

        assert!(JsonlDiagnosticsLogger::open(blocker.join("diagnostics.jsonl")).is_none());
    }
}
