//! Validation Engine
//!
//! Per-file pipeline: load, tokenize, check well-formedness, run rules,
//! aggregate.

use std::path::{Path, PathBuf};

use crate::core::{load_source, Diagnostic};
use crate::parser::tokenize;
use crate::validation::{check_well_formed, FileVerdict, RuleRegistry, RuleResult};

/// Diagnostics of both phases for one document's text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub well_formedness: Vec<Diagnostic>,
    /// Empty when the document was not well-formed
    pub rule_results: Vec<RuleResult>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.well_formedness.is_empty()
            && self.rule_results.iter().all(|r| r.diagnostics.is_empty())
    }

    pub fn into_verdict(self, path: PathBuf) -> FileVerdict {
        FileVerdict::aggregate(path, self.well_formedness, self.rule_results)
    }
}

/// Validate markup text. Rules only run on a well-formed tree.
pub fn validate_source(content: &str, rules: &RuleRegistry) -> ValidationResult {
    match check_well_formed(tokenize(content)) {
        Ok(root) => ValidationResult {
            well_formedness: Vec::new(),
            rule_results: rules.run(&root),
        },
        Err(diagnostics) => ValidationResult {
            well_formedness: diagnostics,
            rule_results: Vec::new(),
        },
    }
}

/// Read and validate one file
pub fn lint_file(path: &Path, rules: &RuleRegistry) -> FileVerdict {
    log::debug!("Linting: {}", path.display());

    let verdict = match load_source(path) {
        Ok(content) => validate_source(&content, rules).into_verdict(path.to_path_buf()),
        Err(diagnostic) => FileVerdict::io_failure(path.to_path_buf(), diagnostic),
    };

    if !verdict.passed {
        log::debug!(
            "{} failed with {} diagnostic(s)",
            path.display(),
            verdict.diagnostics.len()
        );
    }
    verdict
}

/// Validate files in order, one verdict per path
pub fn lint_files<P: AsRef<Path>>(paths: &[P], rules: &RuleRegistry) -> Vec<FileVerdict> {
    paths.iter().map(|p| lint_file(p.as_ref(), rules)).collect()
}
