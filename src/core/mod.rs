//! Core Types
//!
//! Diagnostics and per-file source loading.

pub mod diagnostics;
pub mod document;

pub use diagnostics::{Diagnostic, DiagnosticKind, Severity};
pub use document::load_source;
