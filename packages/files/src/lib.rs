//! Virtual file set for sandbench exercises.
//!
//! One exercise owns one [`FileSet`]: an ordered mapping from root-relative
//! [`VirtualPath`]s to [`FileRecord`]s. The set is built from the exercise's
//! seed files, overlaid with whatever the learner previously saved
//! ([`EditStore`]), mutated as they type, and reverted to seed on explicit
//! reset. The document assembler reads it; the editor writes it.

mod edits;
mod path;
mod set;

pub use edits::EditStore;
pub use path::{VirtualPath, VirtualPathError};
pub use set::{FileRecord, FileSet};

/// Errors raised by file-set operations.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Path(#[from] VirtualPathError),

    #[error("no file at '{path}'")]
    UnknownFile { path: String },

    #[error("file '{path}' is read-only")]
    ReadOnly { path: String },

    #[error("storage error: {0}")]
    Storage(#[from] sandbench_kv::Error),

    #[error("encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}
