//! The isolated execution context.

use std::collections::VecDeque;
use std::sync::mpsc;

use serde_json::Value;

use sandbench_assemble::AssembledDocument;
use sandbench_bridge::{
    format_args, parse_location, BridgeMessage, ConsoleSink, EventKind, HostMessage,
    RunnerMessage, SandboxReply, SourceLocation,
};
use sandbench_kv::SharedStore;
use sandbench_mockapi::{ApiRequest, ApiResponse, MockBackend};

use crate::Error;

/// One loaded document's isolated context: the sandbox side of the harness.
///
/// Owns the assembled document, the session-scoped mock backend (chaos
/// counters live and die with the context) and the sending half of the
/// bridge. Exercise code drives it through [`fetch`](Self::fetch) and the
/// console surface; the host never reaches in except to reset the mock DB
/// or enqueue protocol commands.
///
/// Dropping the context (a rerun) severs both channels; whatever it had not
/// yet delivered becomes unobservable.
pub struct ExecutionContext {
    document: AssembledDocument,
    backend: MockBackend<SharedStore>,
    console: Box<dyn ConsoleSink>,
    replies: mpsc::Sender<RunnerMessage>,
    commands: VecDeque<HostMessage>,
}

impl ExecutionContext {
    pub fn new(
        document: AssembledDocument,
        backend: MockBackend<SharedStore>,
        console: Box<dyn ConsoleSink>,
        replies: mpsc::Sender<RunnerMessage>,
    ) -> Self {
        ExecutionContext {
            document,
            backend,
            console,
            replies,
            commands: VecDeque::new(),
        }
    }

    pub fn document(&self) -> &AssembledDocument {
        &self.document
    }

    /// Serve one network call from the executing document. `/api/*` requests
    /// hit the mock backend; everything else passes through.
    pub fn fetch(&mut self, request: &ApiRequest) -> ApiResponse {
        self.backend.fetch(request)
    }

    /// Clear the mock DB and chaos counters without tearing this context
    /// down.
    pub fn reset_mock(&mut self) -> Result<(), Error> {
        self.backend.reset()?;
        Ok(())
    }

    /// A `console.log` call. Arguments are stringified safely; the optional
    /// stack recovers a call-site location.
    pub fn console_log(&mut self, args: &[Value], stack: Option<&str>) {
        self.emit(EventKind::Log, args, stack);
    }

    pub fn console_warn(&mut self, args: &[Value], stack: Option<&str>) {
        self.emit(EventKind::Warn, args, stack);
    }

    pub fn console_error(&mut self, args: &[Value], stack: Option<&str>) {
        self.emit(EventKind::Error, args, stack);
    }

    /// An uncaught synchronous error, with the location the error report
    /// carried.
    pub fn report_error(&mut self, message: &str, loc: Option<SourceLocation>) {
        let message = BridgeMessage::new(EventKind::RuntimeError, vec![message.to_string()])
            .with_loc(loc);
        self.console.deliver(message);
    }

    /// An unhandled rejection; the location is recovered from the reason's
    /// stack when one parses.
    pub fn report_rejection(&mut self, reason: &str, stack: Option<&str>) {
        let loc = stack.and_then(parse_location);
        let message =
            BridgeMessage::new(EventKind::RuntimeError, vec![reason.to_string()]).with_loc(loc);
        self.console.deliver(message);
    }

    fn emit(&mut self, kind: EventKind, args: &[Value], stack: Option<&str>) {
        let loc = stack.and_then(parse_location);
        let message = BridgeMessage::new(kind, format_args(args)).with_loc(loc);
        self.console.deliver(message);
    }

    /// Enqueue a host command for the document side to consume.
    pub fn post_command(&mut self, command: HostMessage) {
        self.commands.push_back(command);
    }

    /// Drain pending host commands, in arrival order. Consumed by the
    /// document side of the protocol.
    pub fn take_commands(&mut self) -> Vec<HostMessage> {
        self.commands.drain(..).collect()
    }

    /// Send a protocol reply back to the host. Replies to a replaced
    /// context's host are silently discarded.
    pub fn reply(&mut self, reply: SandboxReply) {
        if self.replies.send(RunnerMessage::new(reply)).is_err() {
            log::debug!("dropping runner reply for a replaced context");
        }
    }
}
