//! `misra-check` entry point.

use std::process::ExitCode;

use clap::Parser;
use mc_cli::{logger, run, Cli};

fn main() -> ExitCode {
    let cli = Cli::parse();
    logger::init_cli_logger(cli.verbose);
    run(&cli).into()
}
