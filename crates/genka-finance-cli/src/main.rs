mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::financials::FinancialsArgs;
use commands::forecast::ForecastArgs;
use commands::impact::ImpactArgs;

/// Fiscal-period and progress-based revenue recognition reports
#[derive(Parser)]
#[command(
    name = "genka",
    version,
    about = "Fiscal-period and progress-based revenue recognition reports",
    long_about = "Runs the percentage-of-completion recognition report, the rolling \
                  12-month cash-flow forecast, and the fiscal-period-change impact \
                  analysis over a JSON dataset snapshot."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Per-project recognition financials and portfolio totals
    Financials(FinancialsArgs),
    /// Rolling 12-month cash-flow forecast
    Forecast(ForecastArgs),
    /// Impact analysis for a fiscal period change
    Impact(ImpactArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Minimal,
}

fn main() {
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Financials(args) => commands::financials::run_financials(args),
        Commands::Forecast(args) => commands::forecast::run_forecast(args),
        Commands::Impact(args) => commands::impact::run_impact(args),
        Commands::Version => {
            println!("genka {}", env!("CARGO_PKG_VERSION"));
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
