mod commands;
mod input;
mod output;
mod telemetry;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::dsr::{BasisArgs, DsrDtiArgs, LoanRepaymentArgs};

/// DSR/DTI loan serviceability calculations
#[derive(Parser)]
#[command(
    name = "dsr",
    version,
    about = "DSR/DTI loan serviceability calculations",
    long_about = "A CLI for estimating debt-service (DSR) and debt-to-income (DTI) ratios \
                  with decimal precision. Applies stress rates to the new loan and imputed \
                  regulatory maturities to non-amortizing and non-housing loans. Results are \
                  an approximation, not a credit decision."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log filter used when RUST_LOG is not set (e.g. "debug", "loan_dsr_core=debug")
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute DSR and DTI for an applicant's new and existing loans
    DsrDti(DsrDtiArgs),
    /// Annual DSR repayment for a single loan
    LoanRepayment(LoanRepaymentArgs),
    /// Describe the repayment basis applied to a loan type and method
    Basis(BasisArgs),
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
    let cli = Cli::parse();

    if let Err(e) = telemetry::init(&cli.log_level) {
        eprintln!("{}: {}", "warning".yellow().bold(), e);
    }

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::DsrDti(args) => commands::dsr::run_dsr_dti(args),
        Commands::LoanRepayment(args) => commands::dsr::run_loan_repayment(args),
        Commands::Basis(args) => commands::dsr::run_basis(args),
        Commands::Version => {
            println!("dsr {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
