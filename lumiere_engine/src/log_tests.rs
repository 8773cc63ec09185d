//! Unit tests for log.rs
//!
//! Tests Logger trait, LogEntry, LogSeverity, DefaultLogger, and the
//! error-building macros.

use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
use std::time::SystemTime;

// ============================================================================
// LOG SEVERITY TESTS
// ============================================================================

#[test]
fn test_log_severity_ordering() {
    // Test PartialOrd implementation
    assert!(LogSeverity::Trace < LogSeverity::Debug);
    assert!(LogSeverity::Debug < LogSeverity::Info);
    assert!(LogSeverity::Info < LogSeverity::Warn);
    assert!(LogSeverity::Warn < LogSeverity::Error);
}

#[test]
fn test_log_severity_equality() {
    // Test PartialEq implementation
    assert_eq!(LogSeverity::Trace, LogSeverity::Trace);
    assert_eq!(LogSeverity::Debug, LogSeverity::Debug);
    assert_eq!(LogSeverity::Info, LogSeverity::Info);
    assert_eq!(LogSeverity::Warn, LogSeverity::Warn);
    assert_eq!(LogSeverity::Error, LogSeverity::Error);

    assert_ne!(LogSeverity::Trace, LogSeverity::Debug);
    assert_ne!(LogSeverity::Info, LogSeverity::Error);
}

#[test]
fn test_log_severity_debug() {
    assert_eq!(format!("{:?}", LogSeverity::Trace), "Trace");
    assert_eq!(format!("{:?}", LogSeverity::Debug), "Debug");
    assert_eq!(format!("{:?}", LogSeverity::Info), "Info");
    assert_eq!(format!("{:?}", LogSeverity::Warn), "Warn");
    assert_eq!(format!("{:?}", LogSeverity::Error), "Error");
}

// ============================================================================
// LOG ENTRY TESTS
// ============================================================================

#[test]
fn test_log_entry_creation_without_file_line() {
    let entry = LogEntry {
        severity: LogSeverity::Info,
        timestamp: SystemTime::now(),
        source: "lumiere::Engine".to_string(),
        message: "Engine initialized".to_string(),
        file: None,
        line: None,
    };

    assert_eq!(entry.severity, LogSeverity::Info);
    assert_eq!(entry.source, "lumiere::Engine");
    assert_eq!(entry.message, "Engine initialized");
    assert!(entry.file.is_none());
    assert!(entry.line.is_none());
}

#[test]
fn test_log_entry_creation_with_file_line() {
    let entry = LogEntry {
        severity: LogSeverity::Error,
        timestamp: SystemTime::now(),
        source: "lumiere::soft".to_string(),
        message: "Rasterizer error".to_string(),
        file: Some("soft.rs"),
        line: Some(42),
    };

    assert_eq!(entry.severity, LogSeverity::Error);
    assert_eq!(entry.source, "lumiere::soft");
    assert_eq!(entry.message, "Rasterizer error");
    assert_eq!(entry.file, Some("soft.rs"));
    assert_eq!(entry.line, Some(42));
}

#[test]
fn test_log_entry_clone() {
    let entry1 = LogEntry {
        severity: LogSeverity::Warn,
        timestamp: SystemTime::now(),
        source: "test".to_string(),
        message: "warning".to_string(),
        file: Some("test.rs"),
        line: Some(10),
    };

    let entry2 = entry1.clone();

    assert_eq!(entry1.severity, entry2.severity);
    assert_eq!(entry1.source, entry2.source);
    assert_eq!(entry1.message, entry2.message);
    assert_eq!(entry1.file, entry2.file);
    assert_eq!(entry1.line, entry2.line);
}

#[test]
fn test_log_entry_debug() {
    let entry = LogEntry {
        severity: LogSeverity::Debug,
        timestamp: SystemTime::now(),
        source: "test".to_string(),
        message: "debug message".to_string(),
        file: None,
        line: None,
    };

    let debug_str = format!("{:?}", entry);
    assert!(debug_str.contains("Debug"));
    assert!(debug_str.contains("test"));
    assert!(debug_str.contains("debug message"));
}

// ============================================================================
// DEFAULT LOGGER TESTS
// ============================================================================

#[test]
fn test_default_logger_error_with_file_line() {
    let logger = DefaultLogger;
    let entry = LogEntry {
        severity: LogSeverity::Error,
        timestamp: SystemTime::now(),
        source: "lumiere::soft".to_string(),
        message: "Critical rasterizer error".to_string(),
        file: Some("soft.rs"),
        line: Some(123),
    };

    // Test the file:line branch
    logger.log(&entry);
}

#[test]
fn test_default_logger_all_severities_without_file_line() {
    let logger = DefaultLogger;
    let timestamp = SystemTime::now();

    for severity in [
        LogSeverity::Trace,
        LogSeverity::Debug,
        LogSeverity::Info,
        LogSeverity::Warn,
        LogSeverity::Error,
    ] {
        let entry = LogEntry {
            severity,
            timestamp,
            source: "test".to_string(),
            message: format!("{:?} message", severity),
            file: None,
            line: None,
        };
        logger.log(&entry);
    }
}

#[test]
fn test_default_logger_all_severities_with_file_line() {
    let logger = DefaultLogger;
    let timestamp = SystemTime::now();

    for severity in [
        LogSeverity::Trace,
        LogSeverity::Debug,
        LogSeverity::Info,
        LogSeverity::Warn,
        LogSeverity::Error,
    ] {
        let entry = LogEntry {
            severity,
            timestamp,
            source: "test".to_string(),
            message: format!("{:?} message with location", severity),
            file: Some("test.rs"),
            line: Some(42),
        };
        logger.log(&entry);
    }
}

// ============================================================================
// LOGGER TRAIT TESTS
// ============================================================================

struct TestLogger {
    logged_count: std::sync::Mutex<usize>,
}

impl TestLogger {
    fn new() -> Self {
        Self {
            logged_count: std::sync::Mutex::new(0),
        }
    }

    fn get_count(&self) -> usize {
        *self.logged_count.lock().unwrap()
    }
}

impl Logger for TestLogger {
    fn log(&self, _entry: &LogEntry) {
        let mut count = self.logged_count.lock().unwrap();
        *count += 1;
    }
}

#[test]
fn test_custom_logger_implementation() {
    let logger = TestLogger::new();
    assert_eq!(logger.get_count(), 0);

    let entry = LogEntry {
        severity: LogSeverity::Info,
        timestamp: SystemTime::now(),
        source: "test".to_string(),
        message: "test".to_string(),
        file: None,
        line: None,
    };

    logger.log(&entry);
    assert_eq!(logger.get_count(), 1);

    logger.log(&entry);
    assert_eq!(logger.get_count(), 2);
}

#[test]
fn test_logger_trait_is_send_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<DefaultLogger>();
}

// ============================================================================
// TIMESTAMP TESTS
// ============================================================================

#[test]
fn test_log_entry_with_different_timestamps() {
    let time1 = SystemTime::now();
    let entry1 = LogEntry {
        severity: LogSeverity::Info,
        timestamp: time1,
        source: "test".to_string(),
        message: "first".to_string(),
        file: None,
        line: None,
    };

    std::thread::sleep(std::time::Duration::from_millis(10));

    let time2 = SystemTime::now();
    let entry2 = LogEntry {
        severity: LogSeverity::Info,
        timestamp: time2,
        source: "test".to_string(),
        message: "second".to_string(),
        file: None,
        line: None,
    };

    // time2 should be after time1
    assert!(entry2.timestamp > entry1.timestamp);
}

// ============================================================================
// ERROR-BUILDING MACRO TESTS
// ============================================================================
//
// These go through the global LOGGER, so they are #[serial] like the
// Engine tests.

use crate::lumiere::{Engine, Error, Result};
use serial_test::serial;
use std::sync::{Arc, Mutex};

/// Captures full entries so severity and source location can be inspected
struct RecordingLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl Logger for RecordingLogger {
    fn log(&self, entry: &LogEntry) {
        self.entries.lock().unwrap().push(entry.clone());
    }
}

fn install_recorder() -> Arc<Mutex<Vec<LogEntry>>> {
    let entries = Arc::new(Mutex::new(Vec::new()));
    Engine::set_logger(RecordingLogger {
        entries: entries.clone(),
    });
    entries
}

#[test]
#[serial]
fn test_engine_err_logs_error_and_builds_backend_error() {
    let entries = install_recorder();

    let error = crate::engine_err!("lumiere::log", "allocation of {} bytes failed", 64);
    match error {
        Error::BackendError(message) => assert_eq!(message, "allocation of 64 bytes failed"),
        other => panic!("expected BackendError, got {:?}", other),
    }

    {
        let entries = entries.lock().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].severity, LogSeverity::Error);
        assert_eq!(entries[0].source, "lumiere::log");
        assert_eq!(entries[0].message, "allocation of 64 bytes failed");
        // ERROR entries carry the call site
        assert!(entries[0].file.is_some());
        assert!(entries[0].line.is_some());
    }

    Engine::reset_logger();
}

#[test]
#[serial]
fn test_engine_err_in_map_err() {
    let entries = install_recorder();

    let result: Result<()> = Err("disk full")
        .map_err(|e| crate::engine_err!("lumiere::log", "save failed: {}", e));
    assert!(matches!(
        result,
        Err(Error::BackendError(ref m)) if m == "save failed: disk full"
    ));
    assert_eq!(entries.lock().unwrap().len(), 1);

    Engine::reset_logger();
}

#[test]
#[serial]
fn test_engine_bail_returns_early() {
    fn checked_width(width: u32) -> Result<u32> {
        if width == 0 {
            crate::engine_bail!("lumiere::log", "width must be non-zero");
        }
        Ok(width)
    }

    let entries = install_recorder();

    assert_eq!(checked_width(8).unwrap(), 8);
    assert_eq!(entries.lock().unwrap().len(), 0);

    match checked_width(0) {
        Err(Error::BackendError(message)) => assert!(message.contains("non-zero")),
        other => panic!("expected BackendError, got {:?}", other.map(|_| ())),
    }
    assert_eq!(entries.lock().unwrap().len(), 1);

    Engine::reset_logger();
}

#[test]
#[serial]
fn test_engine_warn_err_logs_warn_severity() {
    let entries = install_recorder();

    let error = crate::engine_warn_err!("lumiere::log", "uniform '{}' not found", "uColor");
    assert!(matches!(
        error,
        Error::BackendError(ref m) if m == "uniform 'uColor' not found"
    ));

    {
        let entries = entries.lock().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].severity, LogSeverity::Warn);
        // WARN entries do not carry the call site
        assert!(entries[0].file.is_none());
        assert!(entries[0].line.is_none());
    }

    Engine::reset_logger();
}

#[test]
#[serial]
fn test_engine_bail_warn_returns_early() {
    fn acquire(ready: bool) -> Result<()> {
        if !ready {
            crate::engine_bail_warn!("lumiere::log", "swapchain image not ready");
        }
        Ok(())
    }

    let entries = install_recorder();

    assert!(acquire(true).is_ok());
    match acquire(false) {
        Err(Error::BackendError(message)) => assert_eq!(message, "swapchain image not ready"),
        other => panic!("expected BackendError, got {:?}", other),
    }
    assert_eq!(entries.lock().unwrap()[0].severity, LogSeverity::Warn);

    Engine::reset_logger();
}
