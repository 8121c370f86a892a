use clap::Args;
use serde_json::Value;

use genka_finance_core::recognition::company_financial_report;

use crate::commands::parse_company;
use crate::input;

/// Arguments for the recognition report
#[derive(Args)]
pub struct FinancialsArgs {
    /// Path to a JSON dataset snapshot (defaults to piped stdin)
    #[arg(long)]
    pub data: Option<String>,

    /// Tenant company id (UUID)
    #[arg(long)]
    pub company: String,
}

pub fn run_financials(args: FinancialsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let dataset = input::load_dataset(args.data.as_deref())?;
    let company = parse_company(&args.company)?;
    let report = company_financial_report(&dataset, company)?;
    Ok(serde_json::to_value(&report)?)
}
