use std::collections::HashMap;
use std::time::Instant;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::GenkaFinanceError;
use crate::recognition::classify::classify;
use crate::recognition::progress::{current_progress_rate, validate_progress_rate};
use crate::store::CompanyData;
use crate::types::{
    round_to_minor_unit, with_metadata, CompanyId, ComputationOutput, Money, ProgressRecord,
    Project, ProjectId, Rate,
};
use crate::GenkaFinanceResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Progress-based financials for one percentage-of-completion project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectFinancials {
    pub project_id: ProjectId,
    pub business_number: String,
    pub name: String,
    /// Latest progress rate, 0 to 100
    pub progress_rate: Rate,
    /// contract_amount * progress_rate / 100, rounded to the minor unit
    pub recognized_revenue: Money,
    pub total_cost: Money,
    /// recognized_revenue - total_cost
    pub profit: Money,
    /// profit / recognized_revenue * 100; exactly 0 when revenue is 0
    pub profit_margin: Rate,
    /// total_cost / progress_rate * 100, the implied cost at completion;
    /// exactly 0 when progress is 0
    pub cost_efficiency: Money,
}

/// Portfolio report across a tenant's percentage-of-completion projects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyFinancialReport {
    pub company_id: CompanyId,
    pub projects: Vec<ProjectFinancials>,
    /// Subscription-billed projects excluded from recognition
    pub subscription_projects_excluded: usize,
    pub total_recognized_revenue: Money,
    pub total_cost: Money,
    pub total_profit: Money,
    /// Derived from the aggregate sums, never averaged per project
    pub aggregate_profit_margin: Rate,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Safe division: returns Decimal::ZERO when the denominator is zero.
fn safe_div(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator == Decimal::ZERO {
        Decimal::ZERO
    } else {
        numerator / denominator
    }
}

// ---------------------------------------------------------------------------
// Per-project recognition
// ---------------------------------------------------------------------------

/// Compute progress-based financials for a single project. Pure: call once
/// per project per report request.
///
/// Subscription-billed projects are rejected; classify before calling.
/// `progress_records` must be this project's records in insertion order.
pub fn compute_project_financials(
    project: &Project,
    progress_records: &[ProgressRecord],
    total_cost: Money,
) -> GenkaFinanceResult<ProjectFinancials> {
    if classify(project).is_subscription() {
        return Err(GenkaFinanceError::InvalidInput {
            field: "project".to_string(),
            reason: format!(
                "{} is subscription-billed and excluded from percentage-of-completion recognition",
                project.business_number
            ),
        });
    }
    if project.contract_amount < Decimal::ZERO {
        return Err(GenkaFinanceError::InvalidInput {
            field: "contract_amount".to_string(),
            reason: "contract amount cannot be negative".to_string(),
        });
    }
    if let Some(stray) = progress_records
        .iter()
        .find(|record| record.project_id != project.id)
    {
        return Err(GenkaFinanceError::InvalidInput {
            field: "progress_records".to_string(),
            reason: format!(
                "progress record {} belongs to project {}, not {}",
                stray.id, stray.project_id, project.id
            ),
        });
    }

    let progress_rate = current_progress_rate(progress_records);
    validate_progress_rate(progress_rate)?;

    let recognized_revenue = round_to_minor_unit(
        project.contract_amount * progress_rate / Decimal::ONE_HUNDRED,
        &project.currency,
    );
    let profit = recognized_revenue - total_cost;
    let profit_margin = safe_div(profit, recognized_revenue) * Decimal::ONE_HUNDRED;
    let cost_efficiency = safe_div(total_cost, progress_rate) * Decimal::ONE_HUNDRED;

    Ok(ProjectFinancials {
        project_id: project.id,
        business_number: project.business_number.clone(),
        name: project.name.clone(),
        progress_rate,
        recognized_revenue,
        total_cost,
        profit,
        profit_margin,
        cost_efficiency,
    })
}

// ---------------------------------------------------------------------------
// Portfolio report
// ---------------------------------------------------------------------------

/// Recognition report across all of a tenant's projects. Subscription-billed
/// projects are skipped, per-project figures are computed exactly once, and
/// portfolio totals are sums of the per-project results.
pub fn company_financial_report<D: CompanyData>(
    data: &D,
    company_id: CompanyId,
) -> GenkaFinanceResult<ComputationOutput<CompanyFinancialReport>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let projects = data.projects(company_id);
    if projects.is_empty() {
        warnings.push("Company has no projects; report is empty".to_string());
    }

    let mut cost_by_project: HashMap<ProjectId, Money> = HashMap::new();
    for entry in data.cost_entries(company_id) {
        *cost_by_project.entry(entry.project_id).or_default() += entry.amount;
    }

    let mut rows: Vec<ProjectFinancials> = Vec::new();
    let mut subscription_projects_excluded = 0usize;

    for project in &projects {
        if classify(project).is_subscription() {
            subscription_projects_excluded += 1;
            continue;
        }
        let records = data.progress_records(project.id);
        let total_cost = cost_by_project
            .get(&project.id)
            .copied()
            .unwrap_or(Decimal::ZERO);
        rows.push(compute_project_financials(project, &records, total_cost)?);
    }

    let total_recognized_revenue: Money = rows.iter().map(|r| r.recognized_revenue).sum();
    let total_cost: Money = rows.iter().map(|r| r.total_cost).sum();
    let total_profit: Money = rows.iter().map(|r| r.profit).sum();
    let aggregate_profit_margin =
        safe_div(total_profit, total_recognized_revenue) * Decimal::ONE_HUNDRED;

    let report = CompanyFinancialReport {
        company_id,
        projects: rows,
        subscription_projects_excluded,
        total_recognized_revenue,
        total_cost,
        total_profit,
        aggregate_profit_margin,
    };

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Percentage-of-Completion Revenue Recognition (工事進行基準)",
        &serde_json::json!({
            "company_id": company_id,
            "project_count": report.projects.len(),
            "subscription_projects_excluded": report.subscription_projects_excluded,
        }),
        warnings,
        elapsed,
        report,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
