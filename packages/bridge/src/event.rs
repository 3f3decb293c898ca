//! Event model and wire shape.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed source identifier carried by every bridge message, so the host can
/// tell bridge traffic from unrelated cross-context messages.
pub const BRIDGE_SOURCE: &str = "sandbox-console";

/// What kind of console activity an event describes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum EventKind {
    Log,
    Warn,
    Error,
    /// An uncaught exception or unhandled rejection, as opposed to an
    /// explicit `console.error` call.
    RuntimeError,
}

impl EventKind {
    /// Whether compact rendering collapses this kind to one line.
    pub fn is_error(&self) -> bool {
        matches!(self, EventKind::Error | EventKind::RuntimeError)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EventKind::Log => "log",
            EventKind::Warn => "warn",
            EventKind::Error => "error",
            EventKind::RuntimeError => "runtime-error",
        };
        write!(f, "{}", label)
    }
}

/// A call-site recovered from a stack trace or error report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// One bridge event in wire form:
/// `{"source": "sandbox-console", "type": "log", "args": [...], "loc": ...}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BridgeMessage {
    pub source: String,

    #[serde(rename = "type")]
    pub kind: EventKind,

    /// Already-stringified arguments, in call order.
    pub args: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loc: Option<SourceLocation>,
}

impl BridgeMessage {
    pub fn new(kind: EventKind, args: Vec<String>) -> Self {
        BridgeMessage {
            source: BRIDGE_SOURCE.to_string(),
            kind,
            args,
            loc: None,
        }
    }

    pub fn with_loc(mut self, loc: Option<SourceLocation>) -> Self {
        self.loc = loc;
        self
    }

    pub fn is_from_bridge(&self) -> bool {
        self.source == BRIDGE_SOURCE
    }
}

/// The display form consumed by the console panel.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsoleEvent {
    pub kind: EventKind,
    pub text: String,
    pub loc: Option<SourceLocation>,
}

impl From<BridgeMessage> for ConsoleEvent {
    fn from(message: BridgeMessage) -> Self {
        ConsoleEvent {
            kind: message.kind,
            text: message.args.join(" "),
            loc: message.loc,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_shape_matches_the_contract() {
        let message = BridgeMessage::new(
            EventKind::RuntimeError,
            vec!["boom".to_string()],
        )
        .with_loc(Some(SourceLocation {
            file: "/main.js".to_string(),
            line: 3,
            column: 7,
        }));

        let raw = serde_json::to_string(&message).unwrap();
        assert!(raw.contains("\"source\":\"sandbox-console\""));
        assert!(raw.contains("\"type\":\"runtime-error\""));
        assert!(raw.contains("\"args\":[\"boom\"]"));
        assert!(raw.contains("\"line\":3"));

        let back: BridgeMessage = serde_json::from_str(&raw).unwrap();
        assert_eq!(back, message);
    }

    #[test]
    fn loc_is_omitted_when_absent() {
        let raw =
            serde_json::to_string(&BridgeMessage::new(EventKind::Log, vec!["hi".to_string()]))
                .unwrap();
        assert!(!raw.contains("loc"));
    }

    #[test]
    fn display_form_joins_args() {
        let event: ConsoleEvent = BridgeMessage::new(
            EventKind::Log,
            vec!["count:".to_string(), "3".to_string()],
        )
        .into();
        assert_eq!(event.text, "count: 3");
    }
}
