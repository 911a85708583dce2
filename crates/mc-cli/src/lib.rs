//! # mc-cli
//!
//! The `misra-check` command.
//!
//! ```bash
//! # Check one file, colored text report
//! misra-check src/main.c
//!
//! # Several files, JSON on stdout, only required guidelines fail the run
//! misra-check --json --fail-on required src/*.c
//!
//! # Skip the parser and one rule
//! misra-check --no-ast --disable Review legacy.c
//! ```
//!
//! Exit codes: `0` pass, `1` violations at or above `--fail-on`, `2` usage,
//! file or config errors.

pub mod args;
pub mod logger;
pub mod output;

use std::process::ExitCode;

use tracing::{debug, error};

use mc_core::{CheckReport, Palette};
use mc_rules::Checker;

pub use args::Cli;

/// Exit status of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// No violation at or above the threshold
    Passed,
    /// At least one violation at or above the threshold
    Failed,
    /// Could not complete the check
    Error,
}

impl From<Outcome> for ExitCode {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Passed => ExitCode::SUCCESS,
            Outcome::Failed => ExitCode::from(1),
            Outcome::Error => ExitCode::from(2),
        }
    }
}

/// Run the checker for parsed arguments, printing to stdout and stderr.
pub fn run(cli: &Cli) -> Outcome {
    let palette = if cli.use_color() && !cli.json {
        Palette::ansi()
    } else {
        Palette::plain()
    };

    let config = match cli.resolve_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}Error: {}{}", palette.fail, e, palette.reset);
            return Outcome::Error;
        }
    };
    let threshold = config.fail_on;

    let checker = match Checker::new(config) {
        Ok(checker) => checker,
        Err(e) => {
            eprintln!("{}Error: {}{}", palette.fail, e, palette.reset);
            return Outcome::Error;
        }
    };

    let mut reports: Vec<CheckReport> = Vec::with_capacity(cli.files.len());
    let mut failed_to_read = false;
    for path in &cli.files {
        match checker.check_file(path) {
            Ok(report) => reports.push(report),
            Err(e) => {
                error!(path = %path.display(), "check failed");
                eprintln!("{}Error: {}{}", palette.fail, e, palette.reset);
                failed_to_read = true;
            }
        }
    }

    if cli.json {
        match output::render_json(&reports) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: {}", e);
                return Outcome::Error;
            }
        }
    } else if !reports.is_empty() {
        print!("{}", output::render_text(&reports, &palette));
    }

    let failing = reports.iter().filter(|r| !r.passes(threshold)).count();
    debug!(files = reports.len(), failing, ?threshold, "run finished");

    if failed_to_read {
        Outcome::Error
    } else if failing > 0 {
        Outcome::Failed
    } else {
        Outcome::Passed
    }
}
