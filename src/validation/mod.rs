//! Validation Engine
//!
//! Well-formedness checking, structural rules and result aggregation.

pub mod engine;
pub mod rules;
pub mod verdict;
pub mod wellformed;

pub use engine::{lint_file, lint_files, validate_source, ValidationResult};
pub use rules::{root_only_rule, Rule, RuleFn, RuleRegistry, RuleResult};
pub use verdict::{evaluate_run, FileVerdict, RunError, RunMode, RunOutcome};
pub use wellformed::check_well_formed;
