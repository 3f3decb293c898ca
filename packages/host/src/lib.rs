//! Execution host for sandbench.
//!
//! Ties the harness together: an [`ExerciseManifest`] (the curriculum-side
//! interface) seeds a file set and a mock backend; a [`Session`] assembles
//! the document, owns the isolated [`ExecutionContext`] it loads into, and
//! relays bridge traffic into its console panel. A rerun is a hard reset:
//! fresh document, fresh context, cleared console. The previous context's
//! in-flight messages become unobservable.

mod context;
mod instrument;
mod manifest;
mod session;

pub use context::ExecutionContext;
pub use instrument::instrumentation_for;
pub use manifest::{ExerciseManifest, ManifestFile, MockSection, PanelView, SandboxPrefs};
pub use session::{HostState, Session};

/// Errors raised by host-side operations.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid exercise manifest: {0}")]
    Manifest(#[source] serde_json::Error),

    #[error("file error: {0}")]
    Files(#[from] sandbench_files::Error),

    #[error("mock backend error: {0}")]
    Mock(#[from] sandbench_mockapi::Error),

    #[error("storage error: {0}")]
    Storage(#[from] sandbench_kv::Error),

    #[error("no document is loaded")]
    NotLoaded,
}
