//! Key-value persistence for sandbench harness state.
//!
//! Everything the harness persists (per-exercise file edits and per-exercise
//! mock database snapshots) goes through the [`KeyValueStore`] trait. This
//! keeps the storage medium pluggable: tests and ephemeral sessions use
//! [`MemoryStore`], a deployment uses [`JsonFileStore`] (one file per key
//! under a state directory).
//!
//! Values are opaque strings; the callers own the (JSON) encoding. Writes
//! fully overwrite the previous value, so "last writer wins" is the only
//! concurrency discipline required of implementations.

mod disk;
mod key;
mod memory;
mod shared;
mod store;

pub use disk::JsonFileStore;
pub use key::validate_key;
pub use memory::MemoryStore;
pub use shared::SharedStore;
pub use store::KeyValueStore;

/// Errors raised by key-value stores.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid storage key '{key}': {message}")]
    InvalidKey { key: String, message: String },

    #[error("storage root '{path}' is unusable: {message}")]
    RootUnusable { path: String, message: String },

    #[error("I/O error for key '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("storage lock poisoned")]
    LockPoisoned,
}
