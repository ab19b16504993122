//! Result Aggregation
//!
//! Per-file verdicts and the run-level pass/fail decision for normal and
//! test mode.

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Component, Path, PathBuf};

use crate::core::Diagnostic;
use crate::validation::RuleResult;

/// Outcome for one input file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileVerdict {
    pub path: PathBuf,
    pub passed: bool,
    /// Well-formedness diagnostics first, then rule diagnostics in
    /// registration order
    pub diagnostics: Vec<Diagnostic>,
}

impl FileVerdict {
    /// Merge both phases into one verdict
    pub fn aggregate(
        path: PathBuf,
        well_formedness: Vec<Diagnostic>,
        rule_results: Vec<RuleResult>,
    ) -> Self {
        let mut diagnostics = well_formedness;
        diagnostics.extend(rule_results.into_iter().flat_map(|r| r.diagnostics));

        Self {
            path,
            passed: diagnostics.is_empty(),
            diagnostics,
        }
    }

    /// Verdict for a file that could not be read
    pub fn io_failure(path: PathBuf, diagnostic: Diagnostic) -> Self {
        Self::aggregate(path, vec![diagnostic], Vec::new())
    }
}

/// How file verdicts turn into a run verdict
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RunMode {
    /// Every file must pass
    #[default]
    Normal,
    /// Listed files must fail and every other file must pass
    Test { expected_failures: BTreeSet<PathBuf> },
}

impl RunMode {
    pub fn test<I, P>(expected_failures: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        RunMode::Test {
            expected_failures: expected_failures
                .into_iter()
                .map(|p| normalize(p.as_ref()))
                .collect(),
        }
    }
}

/// A run-level mismatch in test mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum RunError {
    /// Expected to fail, but passed
    UnexpectedPass { path: PathBuf },
    /// Not expected to fail, but failed
    UnexpectedFailure { path: PathBuf },
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunError::UnexpectedPass { path } => {
                write!(f, "{}: expected to fail, but passed", path.display())
            }
            RunError::UnexpectedFailure { path } => {
                write!(f, "{}: unexpected failure", path.display())
            }
        }
    }
}

/// Verdicts of a whole run plus the run-level decision
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunOutcome {
    pub files: Vec<FileVerdict>,
    pub errors: Vec<RunError>,
    pub passed: bool,
}

impl RunOutcome {
    pub fn failed_files(&self) -> usize {
        self.files.iter().filter(|v| !v.passed).count()
    }

    /// Process exit status for this outcome
    pub fn exit_code(&self) -> u8 {
        if self.passed { 0 } else { 1 }
    }
}

/// Decide the run verdict from per-file verdicts
pub fn evaluate_run(files: Vec<FileVerdict>, mode: &RunMode) -> RunOutcome {
    match mode {
        RunMode::Normal => {
            let passed = files.iter().all(|v| v.passed);
            RunOutcome {
                files,
                errors: Vec::new(),
                passed,
            }
        }
        RunMode::Test { expected_failures } => {
            let mut errors = Vec::new();
            let mut seen = BTreeSet::new();

            for verdict in &files {
                let key = normalize(&verdict.path);
                let expected_to_fail = expected_failures.contains(&key);

                match (expected_to_fail, verdict.passed) {
                    (true, true) => errors.push(RunError::UnexpectedPass {
                        path: verdict.path.clone(),
                    }),
                    (false, false) => errors.push(RunError::UnexpectedFailure {
                        path: verdict.path.clone(),
                    }),
                    _ => {}
                }
                seen.insert(key);
            }

            for missing in expected_failures.difference(&seen) {
                log::warn!(
                    "Expected failure {} was not among the linted files",
                    missing.display()
                );
            }

            RunOutcome {
                files,
                passed: errors.is_empty(),
                errors,
            }
        }
    }
}

/// Drop `.` components so `./a/b.html` and `a/b.html` compare equal
fn normalize(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DiagnosticKind;
    use crate::parser::Position;

    fn verdict(path: &str, passed: bool) -> FileVerdict {
        let diagnostics = if passed {
            Vec::new()
        } else {
            vec![Diagnostic::malformed(Position::start(), "broken")]
        };
        FileVerdict::aggregate(PathBuf::from(path), diagnostics, Vec::new())
    }

    #[test]
    fn test_aggregate_orders_phases() {
        let wf = vec![Diagnostic::malformed(Position::new(5, 1, 40), "wf")];
        let rules = vec![
            RuleResult {
                rule: "r1".to_string(),
                diagnostics: vec![Diagnostic::structural(Position::new(1, 1, 0), "r1")],
            },
            RuleResult {
                rule: "r2".to_string(),
                diagnostics: vec![Diagnostic::structural(Position::new(2, 1, 3), "r2")],
            },
        ];

        let v = FileVerdict::aggregate(PathBuf::from("f.html"), wf, rules);

        assert!(!v.passed);
        let messages: Vec<_> = v.diagnostics.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(messages, ["wf", "r1", "r2"]);
    }

    #[test]
    fn test_no_diagnostics_passes() {
        assert!(FileVerdict::aggregate(PathBuf::from("f"), Vec::new(), Vec::new()).passed);
    }

    #[test]
    fn test_io_failure_fails() {
        let v = FileVerdict::io_failure(PathBuf::from("f"), Diagnostic::io_failure("gone"));
        assert!(!v.passed);
        assert_eq!(v.diagnostics[0].kind, DiagnosticKind::IoFailure);
    }

    #[test]
    fn test_normal_mode() {
        let outcome = evaluate_run(vec![verdict("a", true), verdict("b", true)], &RunMode::Normal);
        assert!(outcome.passed);
        assert_eq!(outcome.exit_code(), 0);

        let outcome = evaluate_run(vec![verdict("a", true), verdict("b", false)], &RunMode::Normal);
        assert!(!outcome.passed);
        assert!(outcome.errors.is_empty());
        assert_eq!(outcome.failed_files(), 1);
        assert_eq!(outcome.exit_code(), 1);
    }

    #[test]
    fn test_test_mode_expected_failures_match() {
        let mode = RunMode::test(["f2"]);
        let outcome = evaluate_run(vec![verdict("f1", true), verdict("f2", false)], &mode);

        assert!(outcome.passed);
        assert_eq!(outcome.exit_code(), 0);
    }

    #[test]
    fn test_test_mode_reports_mismatches() {
        let mode = RunMode::test(["f2", "f3"]);
        let outcome = evaluate_run(
            vec![verdict("f1", false), verdict("f2", false), verdict("f3", true)],
            &mode,
        );

        assert!(!outcome.passed);
        assert_eq!(
            outcome.errors,
            [
                RunError::UnexpectedFailure {
                    path: PathBuf::from("f1")
                },
                RunError::UnexpectedPass {
                    path: PathBuf::from("f3")
                },
            ]
        );
        assert_eq!(outcome.errors[0].to_string(), "f1: unexpected failure");
    }

    #[test]
    fn test_test_mode_ignores_leading_dot_components() {
        let mode = RunMode::test(["./dir/bad.html"]);
        let outcome = evaluate_run(vec![verdict("dir/bad.html", false)], &mode);
        assert!(outcome.passed);
    }
}
