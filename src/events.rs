use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

/// Sink for domain events consumed by analytics.
///
/// Implementations must return promptly and must not panic: callers fire
/// events inline and never look at the outcome.
pub trait EventLogger: Send + Sync {
    fn log_event(&self, event_type: &str, data: Value);
}

/// Emits every event as a structured `tracing` record.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventLogger;

impl EventLogger for TracingEventLogger {
    fn log_event(&self, event_type: &str, data: Value) {
        info!(
            target: "evalpro::events",
            event = event_type,
            timestamp = %Utc::now().to_rfc3339(),
            data = %data,
            "Event"
        );
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoggedEvent {
    pub event_type: String,
    pub timestamp: DateTime<Utc>,
    pub data: Value,
}

/// Keeps events in memory so tests can assert on them.
#[derive(Debug, Default)]
pub struct MemoryEventLogger {
    events: Mutex<Vec<LoggedEvent>>,
}

impl MemoryEventLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<LoggedEvent> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn event_types(&self) -> Vec<String> {
        self.events().into_iter().map(|e| e.event_type).collect()
    }

    pub fn count(&self, event_type: &str) -> usize {
        self.events()
            .iter()
            .filter(|e| e.event_type == event_type)
            .count()
    }
}

impl EventLogger for MemoryEventLogger {
    fn log_event(&self, event_type: &str, data: Value) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(LoggedEvent {
                event_type: event_type.to_string(),
                timestamp: Utc::now(),
                data,
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_memory_logger_records_in_order() {
        let logger = MemoryEventLogger::new();
        logger.log_event("course_created", json!({ "title": "Data Structures" }));
        logger.log_event("course_deleted", json!({ "id": 1 }));

        assert_eq!(logger.event_types(), vec!["course_created", "course_deleted"]);
        assert_eq!(logger.count("course_deleted"), 1);
        assert_eq!(logger.events()[0].data["title"], "Data Structures");
    }

    #[test]
    fn test_tracing_logger_is_fire_and_forget() {
        TracingEventLogger.log_event("retry_clicked", json!({ "retryCount": 2 }));
    }
}
