//! powderopt CLI - refresh ratio optimizer
//!
//! Command-line interface for running optimizations against a site
//! configuration.

use std::process::ExitCode;

use powderopt::cli::{run_cli, Args};

fn main() -> ExitCode {
    run_cli(Args::parse())
}
