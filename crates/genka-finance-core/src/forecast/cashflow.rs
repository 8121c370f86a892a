use std::collections::{BTreeMap, HashSet};
use std::time::Instant;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::GenkaFinanceError;
use crate::fiscal::calendar::{current_fiscal_info, forecast_window};
use crate::ledger::latest_closing_balance;
use crate::recognition::classify::classify;
use crate::store::{BankBalanceStore, CompanyData, FiscalStore};
use crate::types::{with_metadata, CompanyId, ComputationOutput, Money, ProjectId, YearMonth};
use crate::GenkaFinanceResult;

/// One month of the 12-month forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRow {
    pub year_month: YearMonth,
    /// Scheduled billings of percentage-of-completion projects plus the
    /// recurring subscription charge for the month
    pub projected_inflow: Money,
    /// Cost entries dated in the month
    pub projected_outflow: Money,
    pub running_balance: Money,
}

/// Build the rolling 12-month forecast for a tenant, starting the month
/// after the settlement month of the current fiscal definition.
///
/// Read-only and idempotent: repeated calls over unchanged data return
/// identical rows. A tenant without fiscal info cannot be forecast
/// (`NotFound` is fatal); a tenant without ledger rows starts from zero.
pub fn forecast_cash_flow<S>(
    store: &S,
    company_id: CompanyId,
) -> GenkaFinanceResult<ComputationOutput<Vec<ForecastRow>>>
where
    S: CompanyData + FiscalStore + BankBalanceStore,
{
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let info = current_fiscal_info(store, company_id)?;
    let months = forecast_window(info.definition());

    let opening_balance = match latest_closing_balance(store, company_id) {
        Ok(balance) => balance,
        Err(GenkaFinanceError::NotFound { .. }) => {
            warnings.push(
                "Company has no bank balance history; opening balance assumed 0".to_string(),
            );
            Decimal::ZERO
        }
        Err(e) => return Err(e),
    };

    let projects = store.projects(company_id);
    let known: HashSet<ProjectId> = projects.iter().map(|p| p.id).collect();
    let poc: HashSet<ProjectId> = projects
        .iter()
        .filter(|p| !classify(p).is_subscription())
        .map(|p| p.id)
        .collect();

    let mut billing_by_month: BTreeMap<YearMonth, Money> = BTreeMap::new();
    let mut excluded_billing_rows = 0usize;
    for billing in store.scheduled_billings(company_id) {
        if !known.contains(&billing.project_id) {
            return Err(GenkaFinanceError::CrossTenant {
                entity: "scheduled_billing",
                company_id,
            });
        }
        if !poc.contains(&billing.project_id) {
            excluded_billing_rows += 1;
            continue;
        }
        *billing_by_month.entry(billing.year_month).or_default() += billing.amount;
    }
    if excluded_billing_rows > 0 {
        warnings.push(format!(
            "{excluded_billing_rows} scheduled-billing row(s) belong to subscription-billed \
             projects and were excluded from the forecast"
        ));
    }

    let mut cost_by_month: BTreeMap<YearMonth, Money> = BTreeMap::new();
    for entry in store.cost_entries(company_id) {
        *cost_by_month
            .entry(YearMonth::from_date(entry.incurred_on))
            .or_default() += entry.amount;
    }

    let mut rows = Vec::with_capacity(months.len());
    let mut running_balance = opening_balance;
    for month in months {
        let billed = billing_by_month
            .get(&month)
            .copied()
            .unwrap_or(Decimal::ZERO);
        let subscription = store.subscription_charge(company_id, month);
        let projected_inflow = billed + subscription;
        let projected_outflow = cost_by_month.get(&month).copied().unwrap_or(Decimal::ZERO);
        running_balance = running_balance + projected_inflow - projected_outflow;
        rows.push(ForecastRow {
            year_month: month,
            projected_inflow,
            projected_outflow,
            running_balance,
        });
    }

    tracing::debug!(
        company = %company_id,
        start_month = %rows[0].year_month,
        "cash-flow forecast computed"
    );

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "12-Month Rolling Cash-Flow Forecast from Scheduled and Recurring Billings",
        &serde_json::json!({
            "company_id": company_id,
            "fiscal_year": info.fiscal_year,
            "settlement_month": info.settlement_month,
            "opening_balance": opening_balance,
        }),
        warnings,
        elapsed,
        rows,
    ))
}
