//! Sandbench: a coding-practice preview harness.
//!
//! Takes one exercise's virtual file set, assembles it into a single
//! executable document with console and network instrumentation injected,
//! hosts it in an isolated execution context, serves its `/api/*` calls from
//! a persisted mock backend, and relays its console output back to an
//! ordered host-side panel.
//!
//! This crate is a facade over the workspace: most users want
//! [`host::Session`] and an [`kv::KeyValueStore`] implementation.

pub use sandbench_assemble as assemble;
pub use sandbench_bridge as bridge;
pub use sandbench_files as files;
pub use sandbench_host as host;
pub use sandbench_kv as kv;
pub use sandbench_mockapi as mockapi;

pub use sandbench_assemble::{assemble as build_document, AssembledDocument, Instrumentation};
pub use sandbench_bridge::{ConsoleEvent, ConsolePanel, EventKind, RenderMode};
pub use sandbench_files::{FileRecord, FileSet, VirtualPath};
pub use sandbench_host::{ExecutionContext, ExerciseManifest, Session};
pub use sandbench_kv::{JsonFileStore, KeyValueStore, MemoryStore, SharedStore};
pub use sandbench_mockapi::{ApiRequest, ApiResponse, ChaosConfig, MockBackend, MockDb};
