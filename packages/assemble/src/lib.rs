//! Document assembly: turn a virtual file set into one executable document.
//!
//! The assembler takes a [`FileSet`](sandbench_files::FileSet), an entry path
//! and an [`Instrumentation`] bundle, and produces a single self-contained
//! HTML string: referenced scripts and stylesheets are inlined, and the
//! instrumentation blocks (console bridge, bootstrap payload, network mock)
//! are injected so they execute before any exercise code.
//!
//! Tag discovery uses a small span-tracking scanner over the source rather
//! than pattern matching, so attribute order and quoting do not matter.

mod document;
mod scan;

pub use document::{assemble, AssembledDocument, Instrumentation};
pub use scan::{scan_start_tags, ScannedAttribute, ScannedTag};
