//! Console/error bridge: the instrumentation channel between an executing
//! document and the host.
//!
//! Inside the execution context, every console call and every uncaught
//! error/rejection becomes one [`BridgeMessage`] tagged `sandbox-console`,
//! with safely stringified arguments and a best-effort source location.
//! Messages cross the context boundary in emission order and land in the
//! host's [`ConsolePanel`], which filters on the source tag and renders an
//! append-only log.
//!
//! The executed context is constructed with an explicit [`ConsoleSink`];
//! nothing here replaces ambient globals.

mod event;
mod format;
mod panel;
mod protocol;
mod sink;
mod stack;

pub use event::{BridgeMessage, ConsoleEvent, EventKind, SourceLocation, BRIDGE_SOURCE};
pub use format::{format_arg, format_args};
pub use panel::{ConsolePanel, RenderMode};
pub use protocol::{
    CompletionRule, HostCommand, HostMessage, RunnerMessage, SandboxReply, TestResult, TestSpec,
    HOST_SOURCE, RUNNER_SOURCE,
};
pub use sink::{ChannelSink, ConsoleSink};
pub use stack::parse_location;
