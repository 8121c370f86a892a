pub mod financials;
pub mod forecast;
pub mod impact;

use genka_finance_core::types::CompanyId;
use uuid::Uuid;

/// Parse the --company flag into a tenant id.
pub fn parse_company(raw: &str) -> Result<CompanyId, Box<dyn std::error::Error>> {
    let id = Uuid::parse_str(raw).map_err(|e| format!("invalid company id '{raw}': {e}"))?;
    Ok(CompanyId(id))
}
