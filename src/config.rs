//! Configuration management for the markup linter.
//!
//! Handles:
//! - Command-line argument parsing
//! - Environment variables (CI workspace, test mode, expected failures)
//! - Optional `markup-lint.toml` project or user config file

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::validation::RunMode;

/// Project config file looked up in the workspace root
pub const CONFIG_FILE_NAME: &str = "markup-lint.toml";

pub const ENV_WORKSPACE: &str = "GITHUB_WORKSPACE";
pub const ENV_TEST_MODE: &str = "MARKUP_LINT_TEST_MODE";
pub const ENV_EXPECTED_FAILURES: &str = "MARKUP_LINT_EXPECTED_FAILURES";
pub const ENV_ROOT_ONLY: &str = "MARKUP_LINT_ROOT_ONLY";

/// Command-line arguments for the markup linter
#[derive(Debug, Parser)]
#[command(name = "markup-lint")]
#[command(about = "Strict well-formedness and structural linter for markup files")]
#[command(version)]
pub struct Args {
    /// Files or directories to lint
    #[arg(help = "Files or directories to lint (default: $GITHUB_WORKSPACE or '.')")]
    pub paths: Vec<PathBuf>,

    /// Explicit config file
    #[arg(long, help = "Path to a markup-lint.toml config file")]
    pub config: Option<PathBuf>,

    /// Compare results against expected failures instead of requiring all files to pass
    #[arg(long)]
    pub test_mode: bool,

    /// File expected to fail in test mode
    #[arg(long = "expected-failure", value_name = "PATH")]
    pub expected_failures: Vec<PathBuf>,

    /// Element allowed only as the document root
    #[arg(long = "root-only", value_name = "ELEMENT")]
    pub root_only: Vec<String>,

    /// Markup file extension to discover (case-insensitive)
    #[arg(long = "extension", value_name = "EXT")]
    pub extensions: Vec<String>,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Log level for diagnostics on stderr
    #[arg(
        long,
        default_value = "warn",
        help = "Log level (trace, debug, info, warn, error)"
    )]
    pub log_level: String,
}

/// How the report is rendered on stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Contents of a `markup-lint.toml` file
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub extensions: Option<Vec<String>>,
    pub root_only: Vec<String>,
    pub test: TestSection,
}

/// `[test]` table of the config file
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct TestSection {
    pub enabled: Option<bool>,
    pub expected_failures: Vec<PathBuf>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }
}

/// Combined configuration from all sources
#[derive(Debug, Clone)]
pub struct Config {
    /// Workspace root; relative expected-failure paths resolve against it
    pub root: PathBuf,
    /// Inputs handed to discovery
    pub paths: Vec<PathBuf>,
    pub extensions: Vec<String>,
    pub root_only: Vec<String>,
    pub test_mode: bool,
    pub expected_failures: Vec<PathBuf>,
    pub format: OutputFormat,
    pub log_level: String,
    /// Config file that was loaded, if any
    pub config_file: Option<PathBuf>,
}

impl Config {
    /// Create configuration from parsed arguments and the process environment
    pub fn from_args_and_env(args: Args) -> Result<Self> {
        Self::from_args(args, |key| std::env::var(key).ok())
    }

    /// Create configuration from explicit arguments and environment lookup
    /// (useful for testing)
    pub fn from_args<E>(args: Args, env: E) -> Result<Self>
    where
        E: Fn(&str) -> Option<String>,
    {
        let root = env(ENV_WORKSPACE)
            .filter(|w| !w.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        let config_file = match &args.config {
            Some(path) => Some(path.clone()),
            None => default_config_file(&root),
        };
        let file = match &config_file {
            Some(path) => {
                log::debug!("Loading config file {}", path.display());
                FileConfig::load(path)?
            }
            None => FileConfig::default(),
        };

        // Inputs and expected failures share one base so test mode can match them
        let paths = if args.paths.is_empty() {
            vec![root.clone()]
        } else {
            args.paths.into_iter().map(|p| resolve(&root, p)).collect()
        };

        let extensions = if !args.extensions.is_empty() {
            args.extensions
        } else {
            file.extensions
                .unwrap_or_else(|| vec!["html".to_string()])
        };
        let extensions: Vec<String> = extensions
            .into_iter()
            .map(|e| e.trim_start_matches('.').to_string())
            .collect();
        if extensions.iter().any(String::is_empty) {
            bail!("File extensions must not be empty");
        }

        let mut root_only = Vec::new();
        let env_root_only = match env(ENV_ROOT_ONLY) {
            Some(value) => parse_list(ENV_ROOT_ONLY, &value)?,
            None => Vec::new(),
        };
        for element in file.root_only.into_iter().chain(env_root_only).chain(args.root_only) {
            validate_element_name(&element)?;
            if !root_only.contains(&element) {
                root_only.push(element);
            }
        }

        let test_mode = if args.test_mode {
            true
        } else if let Some(value) = env(ENV_TEST_MODE) {
            parse_bool(ENV_TEST_MODE, &value)?
        } else {
            file.test.enabled.unwrap_or(false)
        };

        let env_expected = match env(ENV_EXPECTED_FAILURES) {
            Some(value) => parse_list(ENV_EXPECTED_FAILURES, &value)?,
            None => Vec::new(),
        };
        let mut expected_failures = Vec::new();
        for path in file
            .test
            .expected_failures
            .into_iter()
            .chain(env_expected.into_iter().map(PathBuf::from))
            .chain(args.expected_failures)
        {
            let resolved = resolve(&root, path);
            if !expected_failures.contains(&resolved) {
                expected_failures.push(resolved);
            }
        }

        if !test_mode && !expected_failures.is_empty() {
            log::info!("Expected failures are configured but test mode is off; ignoring them");
        }

        Ok(Config {
            root,
            paths,
            extensions,
            root_only,
            test_mode,
            expected_failures,
            format: args.format,
            log_level: args.log_level,
            config_file,
        })
    }

    /// Run mode derived from the test-mode flag and expected failures
    pub fn run_mode(&self) -> RunMode {
        if self.test_mode {
            RunMode::test(&self.expected_failures)
        } else {
            RunMode::Normal
        }
    }
}

/// Relative paths are taken relative to the workspace root
fn resolve(root: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        root.join(path)
    }
}

/// Project config in the root, else the user config directory
fn default_config_file(root: &Path) -> Option<PathBuf> {
    let project = root.join(CONFIG_FILE_NAME);
    if project.is_file() {
        return Some(project);
    }

    dirs::config_dir()
        .map(|dir| dir.join("markup-lint").join("config.toml"))
        .filter(|path| path.is_file())
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => bail!("Invalid boolean '{}' for {}", other, name),
    }
}

/// Comma-separated list; an empty value is an empty list, empty entries are errors
fn parse_list(name: &str, value: &str) -> Result<Vec<String>> {
    if value.trim().is_empty() {
        return Ok(Vec::new());
    }

    value
        .split(',')
        .map(str::trim)
        .enumerate()
        .map(|(i, item)| {
            if item.is_empty() {
                bail!("Empty entry at position {} in {}", i + 1, name);
            }
            Ok(item.to_string())
        })
        .collect()
}

fn validate_element_name(name: &str) -> Result<()> {
    if name.is_empty() || name.chars().any(|c| c.is_whitespace() || "<>/=\"'".contains(c)) {
        bail!("Invalid root-only element name '{}'", name);
    }
    Ok(())
}
