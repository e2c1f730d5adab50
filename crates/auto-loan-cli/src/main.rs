mod commands;
mod config;
mod input;
mod output;
mod telemetry;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::policy::{PolicyCheckArgs, PolicyDigestArgs};
use commands::underwriting::{EvaluateArgs, PaymentArgs, ReevaluateArgs};
use config::TelemetryConfig;

/// Auto-loan underwriting decisions
#[derive(Parser)]
#[command(
    name = "loan",
    version,
    about = "Auto-loan underwriting decisions",
    long_about = "A CLI for underwriting auto-loan applications against a checksummed \
                  policy with decimal precision. Evaluates applications, re-evaluates \
                  edited ones against their stored rejections, prices level monthly \
                  payments, and validates policy files."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log filter when RUST_LOG is unset (e.g. info, debug, auto_loan_core=trace)
    #[arg(long, env = "LOAN_LOG_LEVEL", default_value = "warn", global = true)]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate an application and return the decision
    Evaluate(EvaluateArgs),
    /// Apply an update to a stored application and reconcile its rejections
    Reevaluate(ReevaluateArgs),
    /// Calculate the level monthly payment for a loan
    Payment(PaymentArgs),
    /// Validate a policy and verify its checksum
    PolicyCheck(PolicyCheckArgs),
    /// Print the SHA-256 digest of a policy file
    PolicyDigest(PolicyDigestArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let telemetry = TelemetryConfig {
        log_level: cli.log_level.clone(),
    };
    if let Err(e) = telemetry::init(&telemetry) {
        eprintln!("{}: {}", "error".red().bold(), e);
        process::exit(1);
    }

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Evaluate(args) => commands::underwriting::run_evaluate(args),
        Commands::Reevaluate(args) => commands::underwriting::run_reevaluate(args),
        Commands::Payment(args) => commands::underwriting::run_payment(args),
        Commands::PolicyCheck(args) => commands::policy::run_policy_check(args),
        Commands::PolicyDigest(args) => commands::policy::run_policy_digest(args),
        Commands::Version => {
            println!("loan {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_evaluate_flags() {
        let cli = Cli::try_parse_from([
            "loan",
            "--output",
            "minimal",
            "evaluate",
            "--credit-score",
            "720",
            "--loan-amount",
            "15000.50",
        ])
        .unwrap();
        match cli.command {
            Commands::Evaluate(args) => {
                assert_eq!(args.credit_score, Some(720));
                assert_eq!(args.loan_amount, Some(rust_decimal_macros::dec!(15000.50)));
                assert!(args.monthly_income.is_none());
            }
            _ => panic!("expected evaluate"),
        }
    }
}
