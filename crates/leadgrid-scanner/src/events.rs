//! Events emitted by a scrape run.

use futures::stream::BoxStream;
use leadgrid_store::Record;
use serde::{Deserialize, Serialize};

/// Stream of events for one run, ending after the terminal event.
pub type EventStream = BoxStream<'static, ScrapeEvent>;

/// Which phase a progress event measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressKind {
    /// Grid search over (keyword, point) pairs
    Grid,
    /// Detail lookups over accepted candidates
    Details,
}

/// One message in a run's event sequence.
///
/// Serializes as `{"type": "log" | "progress" | "done" | "error", ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScrapeEvent {
    /// Human-readable status line
    Log {
        /// Message text
        message: String,
    },
    /// Phase progress, 0 to 100
    Progress {
        /// Phase being measured
        subtype: ProgressKind,
        /// Integer percent
        value: u8,
        /// Display label
        label: String,
    },
    /// Successful completion with the full resulting record set
    Done {
        /// Every record in the list after the run
        data: Vec<Record>,
    },
    /// Fatal failure
    Error {
        /// Error description
        message: String,
    },
}

impl ScrapeEvent {
    pub(crate) fn log(message: impl Into<String>) -> Self {
        Self::Log {
            message: message.into(),
        }
    }

    pub(crate) fn progress(subtype: ProgressKind, value: u8, label: impl Into<String>) -> Self {
        Self::Progress {
            subtype,
            value,
            label: label.into(),
        }
    }

    /// Whether this event ends the run.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done { .. } | Self::Error { .. })
    }
}

/// Integer percentage of `done` over `total`, rounded down.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn percent(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    let pct = (done.min(total) as u128 * 100) / total as u128;
    pct as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_wire_format() {
        let event = ScrapeEvent::progress(ProgressKind::Grid, 42, "Area search (5/12)");
        assert_eq!(
            serde_json::to_value(&event).expect("serialize"),
            json!({"type": "progress", "subtype": "grid", "value": 42, "label": "Area search (5/12)"})
        );

        let event = ScrapeEvent::log("hello");
        assert_eq!(
            serde_json::to_value(&event).expect("serialize"),
            json!({"type": "log", "message": "hello"})
        );

        let event = ScrapeEvent::Error {
            message: "boom".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&event).expect("serialize"),
            json!({"type": "error", "message": "boom"})
        );
        assert!(event.is_terminal());
    }

    #[test]
    fn test_done_round_trips() {
        let line = r#"{"type":"done","data":[]}"#;
        let event: ScrapeEvent = serde_json::from_str(line).expect("parse");
        assert_eq!(event, ScrapeEvent::Done { data: Vec::new() });
        assert!(event.is_terminal());
        assert!(!ScrapeEvent::log("x").is_terminal());
    }

    #[test]
    fn test_percent_floors() {
        assert_eq!(percent(0, 3), 0);
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(2, 3), 66);
        assert_eq!(percent(3, 3), 100);
        assert_eq!(percent(199, 200), 99);
        assert_eq!(percent(0, 0), 100);
    }
}
