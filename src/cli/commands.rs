//! CLI command handlers.
//!
//! Execution logic for each command, separated from argument parsing
//! and output formatting so each piece stays testable.

use std::path::Path;
use std::process::ExitCode;

use crate::config::{validate_parameters, SiteConfig};
use crate::economics::evaluate_economics;
use crate::markov::PowderAgingModel;
use crate::optimizer::RefreshOptimizer;

use super::output::{
    print_economics_report, print_help, print_machine_catalog, print_optimization_report,
    print_run_parameters, print_validation_messages, print_version,
};
use super::{Args, Command};

/// Main CLI entry point.
///
/// Dispatches to the appropriate command handler based on parsed
/// arguments.
#[must_use]
pub fn run_cli(args: Args) -> ExitCode {
    match args.command {
        Command::Run {
            config_path,
            verbose,
        } => run_site(&config_path, verbose),
        Command::Check { config_path } => check_site(&config_path),
        Command::ListMachines => {
            print_machine_catalog();
            ExitCode::SUCCESS
        }
        Command::Help => {
            print_help();
            ExitCode::SUCCESS
        }
        Command::Version => {
            print_version();
            ExitCode::SUCCESS
        }
    }
}

/// Optimize the refresh ratio for a site and print the full report.
#[must_use]
pub fn run_site(path: &Path, verbose: bool) -> ExitCode {
    let config = match SiteConfig::load(path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {}: {e}", path.display());
            return ExitCode::FAILURE;
        }
    };

    let machine = match config.resolved_machine() {
        Ok(machine) => machine,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let messages = validate_parameters(
        machine.packing_density,
        config.process.quality_threshold,
        config.process.degraded_limit,
    );
    if !messages.is_empty() {
        print_validation_messages(&messages);
        return ExitCode::FAILURE;
    }

    let optimizer_config = config.optimizer_config();
    if verbose {
        print_run_parameters(&machine, &optimizer_config);
    }

    let optimizer = RefreshOptimizer::new(PowderAgingModel::pa12(), optimizer_config);
    let result = match optimizer.optimize(machine.packing_density) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Optimization failed: {e}");
            return ExitCode::FAILURE;
        }
    };

    print_optimization_report(&machine, &optimizer_config, &result);

    let economics = match evaluate_economics(
        machine.chamber_volume_l,
        config.economics.builds_per_year,
        config.economics.powder_cost_per_kg,
        result.optimal_ratio,
    ) {
        Ok(economics) => economics,
        Err(e) => {
            eprintln!("Economics evaluation failed: {e}");
            return ExitCode::FAILURE;
        }
    };

    print_economics_report(&economics);
    ExitCode::SUCCESS
}

/// Check a site configuration's operator inputs against their bounds.
#[must_use]
pub fn check_site(path: &Path) -> ExitCode {
    let config = match SiteConfig::load(path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {}: {e}", path.display());
            return ExitCode::FAILURE;
        }
    };

    let machine = match config.resolved_machine() {
        Ok(machine) => machine,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let messages = validate_parameters(
        machine.packing_density,
        config.process.quality_threshold,
        config.process.degraded_limit,
    );
    if messages.is_empty() {
        println!("Inputs are acceptable.");
        ExitCode::SUCCESS
    } else {
        print_validation_messages(&messages);
        ExitCode::FAILURE
    }
}
