//! Report Rendering
//!
//! Turns a run outcome into human-readable text or JSON for CI.

use anyhow::Result;
use std::fmt::Write as _;
use std::path::Path;

use crate::config::OutputFormat;
use crate::validation::{FileVerdict, RunMode, RunOutcome};

/// Render the report in the requested format
pub fn render(
    outcome: &RunOutcome,
    mode: &RunMode,
    root: &Path,
    format: OutputFormat,
) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(outcome, mode, root)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(outcome)?),
    }
}

/// Console report listing each file and its diagnostics
pub fn render_text(outcome: &RunOutcome, mode: &RunMode, root: &Path) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Scanning for markup files in: {}", root.display());
    if outcome.files.is_empty() {
        let _ = writeln!(out, "No markup files found.");
        return out;
    }

    let _ = writeln!(out, "Found {} file(s) to lint:", outcome.files.len());
    for verdict in &outcome.files {
        let _ = writeln!(out, "  - {}", verdict.path.display());
    }
    let _ = writeln!(out);

    for verdict in &outcome.files {
        write_verdict(&mut out, verdict);
    }

    if let RunMode::Test { expected_failures } = mode {
        let _ = writeln!(
            out,
            "Test mode: {} file(s) expected to fail.",
            expected_failures.len()
        );
        for error in &outcome.errors {
            let _ = writeln!(out, "  ❌ {error}");
        }
        if !outcome.errors.is_empty() {
            let _ = writeln!(out);
        }
    }

    if outcome.passed {
        match mode {
            RunMode::Normal => {
                let _ = writeln!(out, "✓ All files passed linting!");
            }
            RunMode::Test { .. } => {
                let _ = writeln!(out, "✓ All files matched their expected results!");
            }
        }
    } else {
        let _ = writeln!(
            out,
            "❌ Linting failed! {} of {} file(s) failed. Please fix the errors above.",
            outcome.failed_files(),
            outcome.files.len()
        );
    }

    out
}

fn write_verdict(out: &mut String, verdict: &FileVerdict) {
    let _ = writeln!(out, "Linting: {}", verdict.path.display());

    if verdict.passed {
        let _ = writeln!(out, "  ✓ PASSED");
    } else {
        let _ = writeln!(
            out,
            "  ❌ FAILED with {} error(s):",
            verdict.diagnostics.len()
        );
        for diagnostic in &verdict.diagnostics {
            let _ = writeln!(out, "    - {diagnostic}");
        }
    }
    let _ = writeln!(out);
}
