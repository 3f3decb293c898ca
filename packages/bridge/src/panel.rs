//! The host-side console panel.

use serde_json::Value;

use crate::{BridgeMessage, ConsoleEvent, EventKind, BRIDGE_SOURCE};

/// How the panel renders its log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    /// Errors collapse to a single concise line; logs and warnings render in
    /// full.
    #[default]
    Compact,
    /// Everything renders verbatim, multi-line stacks included.
    Full,
}

/// Ordered, append-only display log of bridge events.
///
/// The panel filters on the bridge source tag, preserves emission order, and
/// is cleared by the host at the start of every run, so stale output from a
/// previous run is never left visible.
#[derive(Debug, Default)]
pub struct ConsolePanel {
    events: Vec<ConsoleEvent>,
    mode: RenderMode,
}

impl ConsolePanel {
    pub fn new(mode: RenderMode) -> Self {
        ConsolePanel {
            events: Vec::new(),
            mode,
        }
    }

    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: RenderMode) {
        self.mode = mode;
    }

    /// Accept one message. Returns whether it was appended; messages not
    /// tagged with the bridge source are ignored.
    pub fn accept(&mut self, message: BridgeMessage) -> bool {
        if !message.is_from_bridge() {
            return false;
        }
        self.events.push(message.into());
        true
    }

    /// Accept one raw cross-context message. Unparseable payloads that are
    /// recognizably the bridge's get a substitute entry rather than crashing
    /// the panel or blocking later events; everything else is ignored.
    pub fn accept_json(&mut self, raw: &str) -> bool {
        match serde_json::from_str::<BridgeMessage>(raw) {
            Ok(message) => self.accept(message),
            Err(error) => {
                let tagged = serde_json::from_str::<Value>(raw)
                    .ok()
                    .and_then(|v| v.get("source").and_then(Value::as_str).map(String::from))
                    .is_some_and(|source| source == BRIDGE_SOURCE);
                if !tagged {
                    return false;
                }
                log::warn!("malformed bridge message: {}", error);
                self.events.push(ConsoleEvent {
                    kind: EventKind::Log,
                    text: "(unreadable console event)".to_string(),
                    loc: None,
                });
                true
            }
        }
    }

    /// Drop everything. Called by the host whenever a new run starts.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn events(&self) -> &[ConsoleEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Index of the newest entry, the anchor a UI scrolls to on update.
    pub fn newest_index(&self) -> Option<usize> {
        self.events.len().checked_sub(1)
    }

    /// Render the log, one string per event, in display order.
    pub fn render(&self) -> Vec<String> {
        self.events
            .iter()
            .map(|event| render_event(event, self.mode))
            .collect()
    }
}

fn render_event(event: &ConsoleEvent, mode: RenderMode) -> String {
    let text = match mode {
        RenderMode::Compact if event.kind.is_error() => compact_error(&event.text),
        _ => event.text.clone(),
    };
    format!("{}: {}", event.kind, text)
}

/// First line only, with one layer of surrounding quotes stripped.
fn compact_error(text: &str) -> String {
    let first_line = text.lines().next().unwrap_or("").trim();
    strip_quote_pair(first_line).to_string()
}

fn strip_quote_pair(s: &str) -> &str {
    let bytes = s.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if first == last && matches!(first, b'"' | b'\'' | b'`') {
            return &s[1..s.len() - 1];
        }
    }
    s
}
