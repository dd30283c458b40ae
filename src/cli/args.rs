//! CLI argument parsing.
//!
//! Hand-rolled parser kept separate from the command handlers so it
//! can be tested against arbitrary argument lists.

use std::path::PathBuf;

/// CLI arguments container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    /// The command to execute.
    pub command: Command,
}

/// Available CLI commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Optimize the refresh ratio for a site and report economics.
    Run {
        /// Path to the site configuration YAML file.
        config_path: PathBuf,
        /// Enable verbose output.
        verbose: bool,
    },
    /// Check a site configuration's operator inputs against their bounds.
    Check {
        /// Path to the site configuration YAML file.
        config_path: PathBuf,
    },
    /// List the built-in machine presets.
    ListMachines,
    /// Show help.
    Help,
    /// Show version.
    Version,
}

impl Args {
    /// Parse command-line arguments from an iterator.
    ///
    /// Accepts any iterator of strings rather than only
    /// `std::env::args()`, which keeps the parser testable.
    #[must_use]
    pub fn parse_from<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();
        Self::parse_from_vec(&args)
    }

    /// Parse command-line arguments from the environment.
    #[must_use]
    pub fn parse() -> Self {
        Self::parse_from(std::env::args())
    }

    fn parse_from_vec(args: &[String]) -> Self {
        if args.len() < 2 {
            return Self {
                command: Command::Help,
            };
        }

        let command = match args[1].as_str() {
            "run" => Self::parse_run_command(args),
            "check" => Self::parse_check_command(args),
            "list-machines" => Command::ListMachines,
            "-h" | "--help" | "help" => Command::Help,
            "-V" | "--version" | "version" => Command::Version,
            unknown => {
                eprintln!("Unknown command: {unknown}");
                Command::Help
            }
        };

        Self { command }
    }

    /// Parse the 'run' command arguments.
    fn parse_run_command(args: &[String]) -> Command {
        if args.len() < 3 {
            eprintln!("Error: 'run' command requires a site configuration path");
            return Command::Help;
        }

        let mut verbose = false;
        for arg in &args[3..] {
            if arg == "-v" || arg == "--verbose" {
                verbose = true;
            }
        }

        Command::Run {
            config_path: PathBuf::from(&args[2]),
            verbose,
        }
    }

    /// Parse the 'check' command arguments.
    fn parse_check_command(args: &[String]) -> Command {
        if args.len() < 3 {
            eprintln!("Error: 'check' command requires a site configuration path");
            return Command::Help;
        }

        Command::Check {
            config_path: PathBuf::from(&args[2]),
        }
    }
}
