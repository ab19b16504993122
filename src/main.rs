use anyhow::Result;
use std::process::ExitCode;

use clap::Parser;

use markup_lint::config::{Args, Config};
use markup_lint::discovery::find_markup_files;
use markup_lint::output::render;
use markup_lint::validation::{evaluate_run, lint_files, RuleRegistry};

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    // Logger first so config loading is visible at debug level
    env_logger::Builder::new()
        .parse_filters(&args.log_level)
        .init();

    let config = Config::from_args_and_env(args)?;

    // Everything that can be misconfigured fails here, before any file is read
    let rules = RuleRegistry::from_config(&config.root_only)?;
    let mode = config.run_mode();
    let files = find_markup_files(&config.paths, &config.extensions)?;

    log::info!(
        "Linting {} file(s) with {} structural rule(s)",
        files.len(),
        rules.list_rules().len()
    );

    let verdicts = lint_files(&files, &rules);
    let outcome = evaluate_run(verdicts, &mode);

    println!("{}", render(&outcome, &mode, &config.root, config.format)?);

    log::info!(
        "Run {}: {} of {} file(s) failed, {} run-level error(s)",
        if outcome.passed { "passed" } else { "failed" },
        outcome.failed_files(),
        outcome.files.len(),
        outcome.errors.len()
    );

    Ok(ExitCode::from(outcome.exit_code()))
}
