//! Markup Lint
//!
//! A strict batch validator for tag-structured markup files.
//!
//! This library provides:
//! - Position-tracking tokenization and well-formedness checking
//! - An extensible registry of structural rules over the document tree
//! - Per-file verdicts and normal/test-mode run evaluation
//! - File discovery, configuration and report rendering

pub mod config;
pub mod core;
pub mod discovery;
pub mod output;
pub mod parser;
pub mod validation;

// Re-exports for clean public API
pub use config::Config;
pub use crate::core::{Diagnostic, DiagnosticKind};
pub use parser::{tokenize, DocumentNode, Position};
pub use validation::{
    check_well_formed, evaluate_run, lint_file, lint_files, validate_source, FileVerdict,
    RuleRegistry, RunMode, RunOutcome,
};
