use clap::Args;
use serde_json::Value;

use genka_finance_core::fiscal::{analyze_change_impact, current_fiscal_info, FiscalDefinition};

use crate::commands::parse_company;
use crate::input;

/// Arguments for the fiscal-period-change impact analysis
#[derive(Args)]
pub struct ImpactArgs {
    /// Path to a JSON dataset snapshot (defaults to piped stdin)
    #[arg(long)]
    pub data: Option<String>,

    /// Tenant company id (UUID)
    #[arg(long)]
    pub company: String,

    /// Fiscal year after the change
    #[arg(long)]
    pub to_year: i32,

    /// Settlement month after the change
    #[arg(long)]
    pub to_month: u32,

    /// Fiscal year before the change (defaults to the current fiscal info)
    #[arg(long)]
    pub from_year: Option<i32>,

    /// Settlement month before the change (defaults to the current fiscal info)
    #[arg(long)]
    pub from_month: Option<u32>,
}

pub fn run_impact(args: ImpactArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let dataset = input::load_dataset(args.data.as_deref())?;
    let company = parse_company(&args.company)?;

    let from = match (args.from_year, args.from_month) {
        (Some(fiscal_year), Some(settlement_month)) => FiscalDefinition {
            fiscal_year,
            settlement_month,
        },
        _ => current_fiscal_info(&dataset, company)?.definition(),
    };
    let to = FiscalDefinition {
        fiscal_year: args.to_year,
        settlement_month: args.to_month,
    };

    let analysis = analyze_change_impact(&dataset, company, from, to)?;
    Ok(serde_json::to_value(&analysis)?)
}
