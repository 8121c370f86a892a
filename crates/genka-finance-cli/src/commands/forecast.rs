use clap::Args;
use serde_json::Value;

use genka_finance_core::forecast::forecast_cash_flow;

use crate::commands::parse_company;
use crate::input;

/// Arguments for the cash-flow forecast
#[derive(Args)]
pub struct ForecastArgs {
    /// Path to a JSON dataset snapshot (defaults to piped stdin)
    #[arg(long)]
    pub data: Option<String>,

    /// Tenant company id (UUID)
    #[arg(long)]
    pub company: String,
}

pub fn run_forecast(args: ForecastArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let dataset = input::load_dataset(args.data.as_deref())?;
    let company = parse_company(&args.company)?;
    let forecast = forecast_cash_flow(&dataset, company)?;
    Ok(serde_json::to_value(&forecast)?)
}
