use std::collections::{BTreeSet, HashSet};
use std::time::Instant;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::GenkaFinanceError;
use crate::fiscal::calendar::{forecast_window, validate_settlement_month, FiscalDefinition};
use crate::recognition::classify::classify;
use crate::recognition::progress::latest_progress;
use crate::store::CompanyData;
use crate::types::{
    round_to_minor_unit, with_metadata, CompanyId, ComputationOutput, Money, ProjectId, YearMonth,
};
use crate::GenkaFinanceResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Result of a fiscal-period-change impact analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactSummary {
    /// Distinct projects with amounts in months that differ between windows
    pub project_count: usize,
    /// Amounts entering the forecast window minus amounts leaving it
    pub revenue_impact: Money,
    /// Same windowing applied to dated cost entries
    pub cost_impact: Money,
    pub recommendations: Vec<String>,
}

// ---------------------------------------------------------------------------
// Analysis
// ---------------------------------------------------------------------------

/// Compare the 12-month forecast windows implied by the old and new fiscal
/// definitions and quantify what the change re-windows.
///
/// Revenue amounts are scheduled billings (dated by their `year_month`) plus
/// recognized revenue of percentage-of-completion projects (dated by the
/// month of the latest progress record). Cost amounts are cost entries dated
/// by `incurred_on`. Months in the new window but not the old add; months in
/// the old window but not the new subtract.
///
/// Read-only and deterministic: identical inputs produce an identical
/// `ImpactSummary`.
pub fn analyze_change_impact<D: CompanyData>(
    data: &D,
    company_id: CompanyId,
    from: FiscalDefinition,
    to: FiscalDefinition,
) -> GenkaFinanceResult<ComputationOutput<ImpactSummary>> {
    let start = Instant::now();

    validate_settlement_month(from.settlement_month)?;
    validate_settlement_month(to.settlement_month)?;

    let old_window: BTreeSet<YearMonth> = forecast_window(from).into_iter().collect();
    let new_window: BTreeSet<YearMonth> = forecast_window(to).into_iter().collect();
    let added: BTreeSet<YearMonth> = new_window.difference(&old_window).copied().collect();
    let removed: BTreeSet<YearMonth> = old_window.difference(&new_window).copied().collect();

    let signum = |month: YearMonth| -> i32 {
        if added.contains(&month) {
            1
        } else if removed.contains(&month) {
            -1
        } else {
            0
        }
    };

    let projects = data.projects(company_id);
    let known: HashSet<ProjectId> = projects.iter().map(|p| p.id).collect();
    let poc: HashSet<ProjectId> = projects
        .iter()
        .filter(|p| !classify(p).is_subscription())
        .map(|p| p.id)
        .collect();

    let mut revenue_impact = Decimal::ZERO;
    let mut cost_impact = Decimal::ZERO;
    let mut contributors: HashSet<ProjectId> = HashSet::new();

    for billing in data.scheduled_billings(company_id) {
        if !known.contains(&billing.project_id) {
            return Err(GenkaFinanceError::CrossTenant {
                entity: "scheduled_billing",
                company_id,
            });
        }
        if !poc.contains(&billing.project_id) {
            continue;
        }
        match signum(billing.year_month) {
            1 => revenue_impact += billing.amount,
            -1 => revenue_impact -= billing.amount,
            _ => continue,
        }
        contributors.insert(billing.project_id);
    }

    for project in projects.iter().filter(|p| poc.contains(&p.id)) {
        let records = data.progress_records(project.id);
        let Some(latest) = latest_progress(&records).cloned() else {
            continue;
        };
        let month = YearMonth::from_date(latest.progress_date);
        let recognized = round_to_minor_unit(
            project.contract_amount * latest.progress_rate / Decimal::ONE_HUNDRED,
            &project.currency,
        );
        match signum(month) {
            1 => revenue_impact += recognized,
            -1 => revenue_impact -= recognized,
            _ => continue,
        }
        contributors.insert(project.id);
    }

    for entry in data.cost_entries(company_id) {
        match signum(YearMonth::from_date(entry.incurred_on)) {
            1 => cost_impact += entry.amount,
            -1 => cost_impact -= entry.amount,
            _ => continue,
        }
        contributors.insert(entry.project_id);
    }

    let project_count = contributors.len();
    let mut recommendations = Vec::new();
    if added.is_empty() && removed.is_empty() {
        recommendations
            .push("The forecast window is unchanged; no amounts are re-windowed".to_string());
    }
    if project_count > 0 {
        recommendations.push(format!(
            "{project_count} project(s) have revenue or cost amounts crossing the new period \
             boundary; re-verify revenue recognition for those projects"
        ));
    }
    if revenue_impact != Decimal::ZERO {
        recommendations.push(format!(
            "Projected revenue shifts by {revenue_impact} between the old and new forecast windows"
        ));
    }
    if cost_impact != Decimal::ZERO {
        recommendations.push(format!(
            "Projected cost shifts by {cost_impact} between the old and new forecast windows"
        ));
    }

    let summary = ImpactSummary {
        project_count,
        revenue_impact,
        cost_impact,
        recommendations,
    };

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Fiscal Period Change Impact Analysis (old vs new 12-month forecast windows)",
        &serde_json::json!({
            "company_id": company_id,
            "from": from,
            "to": to,
            "months_added": added.iter().map(|m| m.to_string()).collect::<Vec<_>>(),
            "months_removed": removed.iter().map(|m| m.to_string()).collect::<Vec<_>>(),
        }),
        Vec::new(),
        elapsed,
        summary,
    ))
}
