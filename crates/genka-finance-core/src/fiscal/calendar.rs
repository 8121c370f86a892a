use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::GenkaFinanceError;
use crate::fiscal::impact::analyze_change_impact;
use crate::store::{CompanyData, FiscalStore};
use crate::types::{CompanyId, Money, YearMonth};
use crate::GenkaFinanceResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A tenant's fiscal definition. The "current" row for a company is the one
/// with the greatest fiscal year, ties broken by most recent insert.
///
/// State machine: Stable (no mid-period change) becomes Changed on the first
/// `change_fiscal_period`, at which point `original_*` is fixed forever;
/// later changes update `fiscal_year`/`settlement_month` but never touch
/// `original_*` again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiscalInfo {
    pub company_id: CompanyId,
    pub fiscal_year: i32,
    /// Settlement month, 1 to 12
    pub settlement_month: u32,
    /// Ordinal of the current fiscal period, 1-based
    pub current_period: u32,
    /// Admin-entered bank balance snapshot. The forecaster seeds from the
    /// ledger instead; this field is report-only.
    pub bank_balance: Money,
    pub is_mid_period_change: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_fiscal_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_settlement_month: Option<u32>,
}

impl FiscalInfo {
    /// The (fiscal year, settlement month) pair this row currently defines.
    pub fn definition(&self) -> FiscalDefinition {
        FiscalDefinition {
            fiscal_year: self.fiscal_year,
            settlement_month: self.settlement_month,
        }
    }
}

/// The value pair a fiscal period change moves between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiscalDefinition {
    pub fiscal_year: i32,
    pub settlement_month: u32,
}

/// Append-only audit row recording one fiscal period change. Created once
/// per change, never mutated or deleted by normal operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiscalPeriodChange {
    pub company_id: CompanyId,
    pub from_fiscal_year: i32,
    pub from_settlement_month: u32,
    pub to_fiscal_year: i32,
    pub to_settlement_month: u32,
    pub changed_at: DateTime<Utc>,
    pub impact_summary: String,
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

pub fn validate_settlement_month(month: u32) -> GenkaFinanceResult<()> {
    if !(1..=12).contains(&month) {
        return Err(GenkaFinanceError::InvalidInput {
            field: "settlement_month".to_string(),
            reason: format!("settlement month must be between 1 and 12, got {month}"),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Calendar arithmetic
// ---------------------------------------------------------------------------

/// First month of the 12-month forecast window: the month after the
/// settlement month, rolling December into January of the next fiscal year.
pub fn next_forecast_start_month(info: &FiscalInfo) -> YearMonth {
    start_month_of(info.definition())
}

fn start_month_of(def: FiscalDefinition) -> YearMonth {
    if def.settlement_month == 12 {
        YearMonth {
            year: def.fiscal_year + 1,
            month: 1,
        }
    } else {
        YearMonth {
            year: def.fiscal_year,
            month: def.settlement_month + 1,
        }
    }
}

/// The 12 consecutive calendar months starting the month after the
/// settlement month. Shared by the forecaster and the impact analysis.
pub fn forecast_window(def: FiscalDefinition) -> Vec<YearMonth> {
    let mut months = Vec::with_capacity(12);
    let mut current = start_month_of(def);
    for _ in 0..12 {
        months.push(current);
        current = current.succ();
    }
    months
}

// ---------------------------------------------------------------------------
// Fiscal info management
// ---------------------------------------------------------------------------

/// The current fiscal definition for a tenant: the row with the greatest
/// fiscal year, ties broken by most recent insert.
pub fn current_fiscal_info<S: FiscalStore>(
    store: &S,
    company_id: CompanyId,
) -> GenkaFinanceResult<FiscalInfo> {
    store
        .fiscal_rows(company_id)
        .into_iter()
        .enumerate()
        .max_by(|(ia, a), (ib, b)| a.fiscal_year.cmp(&b.fiscal_year).then(ia.cmp(ib)))
        .map(|(_, row)| row)
        .ok_or_else(|| GenkaFinanceError::NotFound {
            entity: "fiscal_info",
            key: company_id.to_string(),
        })
}

/// First-time fiscal setup for a tenant, or an explicit rollover row for a
/// later fiscal year.
pub fn initialize_fiscal_info<S: FiscalStore>(
    store: &mut S,
    row: FiscalInfo,
) -> GenkaFinanceResult<FiscalInfo> {
    validate_settlement_month(row.settlement_month)?;
    if row.current_period < 1 {
        return Err(GenkaFinanceError::InvalidInput {
            field: "current_period".to_string(),
            reason: "current period must be at least 1".to_string(),
        });
    }
    store.insert_fiscal_info(row.clone())?;
    tracing::info!(
        company = %row.company_id,
        fiscal_year = row.fiscal_year,
        settlement_month = row.settlement_month,
        "fiscal info initialized"
    );
    Ok(row)
}

/// Change a tenant's fiscal period. Writes the append-only audit row and
/// updates the fiscal row in place, preserving the first-ever `original_*`
/// values across subsequent changes.
///
/// The update goes through the store's compare-and-swap so two racing
/// changes for the same tenant cannot both land; the loser gets `Conflict`
/// and no audit row is written for it.
pub fn change_fiscal_period<S>(
    store: &mut S,
    company_id: CompanyId,
    new_fiscal_year: i32,
    new_settlement_month: u32,
    reason: &str,
) -> GenkaFinanceResult<FiscalPeriodChange>
where
    S: FiscalStore + CompanyData,
{
    validate_settlement_month(new_settlement_month)?;

    let current = current_fiscal_info(store, company_id)?;
    if current.fiscal_year == new_fiscal_year && current.settlement_month == new_settlement_month {
        return Err(GenkaFinanceError::InvalidInput {
            field: "fiscal_period".to_string(),
            reason: "new fiscal definition is identical to the current one".to_string(),
        });
    }

    let impact = analyze_change_impact(
        store,
        company_id,
        current.definition(),
        FiscalDefinition {
            fiscal_year: new_fiscal_year,
            settlement_month: new_settlement_month,
        },
    )?;
    let summary = format!(
        "{} project(s) affected; revenue impact {}; cost impact {}",
        impact.result.project_count, impact.result.revenue_impact, impact.result.cost_impact
    );

    let mut updated = current.clone();
    updated.fiscal_year = new_fiscal_year;
    updated.settlement_month = new_settlement_month;
    updated.is_mid_period_change = true;
    updated.change_reason = Some(reason.to_string());
    // The original definition is snapshotted once, on the first change.
    updated.original_fiscal_year = current.original_fiscal_year.or(Some(current.fiscal_year));
    updated.original_settlement_month = current
        .original_settlement_month
        .or(Some(current.settlement_month));

    let change = FiscalPeriodChange {
        company_id,
        from_fiscal_year: current.fiscal_year,
        from_settlement_month: current.settlement_month,
        to_fiscal_year: new_fiscal_year,
        to_settlement_month: new_settlement_month,
        changed_at: Utc::now(),
        impact_summary: summary,
    };

    store.replace_fiscal_info(&current, updated)?;
    store.append_period_change(change.clone())?;

    tracing::info!(
        company = %company_id,
        from_year = change.from_fiscal_year,
        from_month = change.from_settlement_month,
        to_year = change.to_fiscal_year,
        to_month = change.to_settlement_month,
        "fiscal period changed"
    );

    Ok(change)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn info(fiscal_year: i32, settlement_month: u32) -> FiscalInfo {
        FiscalInfo {
            company_id: CompanyId::new(),
            fiscal_year,
            settlement_month,
            current_period: 1,
            bank_balance: dec!(0),
            is_mid_period_change: false,
            change_reason: None,
            original_fiscal_year: None,
            original_settlement_month: None,
        }
    }

    #[test]
    fn test_next_start_month_mid_year() {
        // settlement_month = 6 starts the window at month 7, same year
        assert_eq!(
            next_forecast_start_month(&info(2025, 6)),
            YearMonth { year: 2025, month: 7 }
        );
    }

    #[test]
    fn test_next_start_month_december_wraps() {
        assert_eq!(
            next_forecast_start_month(&info(2025, 12)),
            YearMonth { year: 2026, month: 1 }
        );
    }

    #[test]
    fn test_forecast_window_is_consecutive() {
        let window = forecast_window(FiscalDefinition {
            fiscal_year: 2025,
            settlement_month: 9,
        });
        assert_eq!(window.len(), 12);
        assert_eq!(window[0], YearMonth { year: 2025, month: 10 });
        assert_eq!(window[11], YearMonth { year: 2026, month: 9 });
        for pair in window.windows(2) {
            assert_eq!(pair[0].succ(), pair[1]);
        }
    }

    #[test]
    fn test_validate_settlement_month_bounds() {
        assert!(validate_settlement_month(0).is_err());
        assert!(validate_settlement_month(13).is_err());
        assert!(validate_settlement_month(1).is_ok());
        assert!(validate_settlement_month(12).is_ok());
    }
}
