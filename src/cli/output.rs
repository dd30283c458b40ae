//! CLI output formatting.
//!
//! All report printing lives here so the command handlers stay thin
//! and the formatting can be exercised in tests without a terminal.

use crate::config::{ResolvedMachine, MACHINE_PRESETS};
use crate::economics::{EconomicsResult, Savings, StrategyEconomics};
use crate::markov::STATE_LABELS;
use crate::optimizer::{OptimizationResult, OptimizerConfig};

/// Print version information.
pub fn print_version() {
    println!("powderopt {}", env!("CARGO_PKG_VERSION"));
}

/// Print help message.
pub fn print_help() {
    println!(
        r"powderopt - Markov-chain optimizer for SLS powder refresh ratios

USAGE:
    powderopt <COMMAND> [OPTIONS]

COMMANDS:
    run <site.yaml>         Optimize the refresh ratio and report economics
        -v, --verbose       Echo the resolved configuration before the report

    check <site.yaml>       Check the operator inputs against their bounds

    list-machines           List the built-in machine presets

    help                    Show this help message
    version                 Show version information

EXAMPLES:
    powderopt run site.yaml
    powderopt run site.yaml --verbose
    powderopt check site.yaml
    powderopt list-machines
"
    );
}

/// Print the machine preset catalog.
pub fn print_machine_catalog() {
    println!("Built-in machine presets:\n");
    println!(
        "{:<20} {:<26} {:>11} {:>9}  {}",
        "KEY", "NAME", "CHAMBER (L)", "PACKING", "CLASS"
    );
    for preset in &MACHINE_PRESETS {
        println!(
            "{:<20} {:<26} {:>11.2} {:>8.0}%  {}",
            preset.key,
            preset.name,
            preset.chamber_volume_l,
            preset.packing_density * 100.0,
            preset.class
        );
    }
}

/// Print collected validation messages.
pub fn print_validation_messages(messages: &[String]) {
    println!("Input validation failed:");
    for message in messages {
        println!("  - {message}");
    }
}

/// Echo the resolved configuration ahead of a verbose run.
pub fn print_run_parameters(machine: &ResolvedMachine, config: &OptimizerConfig) {
    println!("Machine:            {}", machine.label);
    println!("Chamber volume:     {:.2} L", machine.chamber_volume_l);
    println!(
        "Packing density:    {:.1}%",
        machine.packing_density * 100.0
    );
    println!("Quality threshold:  {:.2}", config.quality_threshold);
    println!(
        "Degraded limit:     {:.1}%",
        config.degraded_limit * 100.0
    );
    println!("Tolerance:          {}", config.tolerance);
    println!("Max iterations:     {}", config.max_iterations);
    println!();
}

/// Print the optimization report.
pub fn print_optimization_report(
    machine: &ResolvedMachine,
    config: &OptimizerConfig,
    result: &OptimizationResult,
) {
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Refresh ratio optimization: {}", machine.label);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");

    println!(
        "Optimal virgin ratio: {:.1}%  ({} iterations)",
        result.optimal_ratio * 100.0,
        result.iterations
    );

    if result.floor_active {
        println!(
            "Sustainability floor active: the packing density ({:.1}%) is the binding bound.",
            machine.packing_density * 100.0
        );
    }
    if !result.converged {
        println!("Warning: iteration cap reached before the tolerance; treat as low confidence.");
    }
    if !result.feasible {
        println!(
            "Warning: no ratio satisfies the constraints; even fully virgin powder falls short."
        );
    }

    println!("\nSteady-state stock distribution:");
    for (label, fraction) in STATE_LABELS.iter().zip(result.distribution.fractions()) {
        println!("  {label:<22} {:>6.2}%", fraction * 100.0);
    }

    let quality_mark = if result.quality_index >= config.quality_threshold {
        "ok"
    } else {
        "VIOLATED"
    };
    let degraded_mark = if result.degraded_fraction <= config.degraded_limit {
        "ok"
    } else {
        "VIOLATED"
    };
    println!(
        "\nQuality index:     {:.3}  (threshold {:.2}, {quality_mark})",
        result.quality_index, config.quality_threshold
    );
    println!(
        "Degraded fraction: {:.1}%  (limit {:.1}%, {degraded_mark})",
        result.degraded_fraction * 100.0,
        config.degraded_limit * 100.0
    );
}

/// Print the three-strategy economics comparison.
pub fn print_economics_report(economics: &EconomicsResult) {
    println!("\nAnnual virgin powder economics:");
    println!(
        "  {:<22} {:>7} {:>14} {:>13} {:>13}",
        "STRATEGY", "RATIO", "PER BUILD (L)", "MASS (kg/yr)", "COST (/yr)"
    );
    print_strategy_row("optimized", &economics.optimized);
    print_strategy_row("vendor 30%", &economics.vendor_reference);
    print_strategy_row("industrial 50%", &economics.industrial_reference);

    print_savings_row("vs vendor 30%", &economics.savings_vs_vendor);
    print_savings_row("vs industrial 50%", &economics.savings_vs_industrial);
}

fn print_strategy_row(label: &str, strategy: &StrategyEconomics) {
    println!(
        "  {:<22} {:>6.1}% {:>14.2} {:>13.1} {:>13.2}",
        label,
        strategy.refresh_ratio * 100.0,
        strategy.virgin_per_build_l,
        strategy.annual_mass_kg,
        strategy.annual_cost
    );
}

fn print_savings_row(label: &str, savings: &Savings) {
    println!(
        "\nSavings {label}: {:.1} kg/yr, {:.2}/yr ({:.1}%)",
        savings.mass_kg, savings.cost, savings.percentage
    );
}
