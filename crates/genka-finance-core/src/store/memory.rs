use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::GenkaFinanceError;
use crate::fiscal::calendar::{FiscalInfo, FiscalPeriodChange};
use crate::ledger::bank_balance::BankBalanceHistory;
use crate::recognition::progress::validate_progress_rate;
use crate::store::{BankBalanceStore, BillingStore, CompanyData, FiscalStore};
use crate::types::{
    CompanyId, CostEntry, Money, ProgressRecord, Project, ProjectId, ScheduledBilling,
    SubscriptionCharge, YearMonth,
};
use crate::GenkaFinanceResult;

/// In-memory dataset implementing every store trait. Backs unit and
/// integration tests and fixture-driven tooling; vector order is insertion
/// order, which is the engine's tie-breaking total order.
///
/// Serde-derived so a whole tenant snapshot can be loaded from JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryDataset {
    #[serde(default)]
    pub fiscal_info: Vec<FiscalInfo>,
    #[serde(default)]
    pub fiscal_period_changes: Vec<FiscalPeriodChange>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub progress_records: Vec<ProgressRecord>,
    #[serde(default)]
    pub cost_entries: Vec<CostEntry>,
    #[serde(default)]
    pub scheduled_billing: Vec<ScheduledBilling>,
    #[serde(default)]
    pub subscription_charges: Vec<SubscriptionCharge>,
    #[serde(default)]
    pub bank_balance_history: Vec<BankBalanceHistory>,
}

impl MemoryDataset {
    pub fn new() -> Self {
        Self::default()
    }

    fn project(&self, project_id: ProjectId) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == project_id)
    }

    pub fn add_project(&mut self, project: Project) {
        self.projects.push(project);
    }

    /// Append a progress observation. The project must exist and the rate
    /// must be a valid percentage.
    pub fn add_progress_record(&mut self, record: ProgressRecord) -> GenkaFinanceResult<()> {
        validate_progress_rate(record.progress_rate)?;
        if self.project(record.project_id).is_none() {
            return Err(GenkaFinanceError::NotFound {
                entity: "project",
                key: record.project_id.to_string(),
            });
        }
        self.progress_records.push(record);
        Ok(())
    }

    pub fn add_cost_entry(&mut self, entry: CostEntry) -> GenkaFinanceResult<()> {
        if self.project(entry.project_id).is_none() {
            return Err(GenkaFinanceError::NotFound {
                entity: "project",
                key: entry.project_id.to_string(),
            });
        }
        self.cost_entries.push(entry);
        Ok(())
    }

    /// Set the recurring charge for one month, replacing any existing row
    /// for the same (company, month).
    pub fn set_subscription_charge(&mut self, charge: SubscriptionCharge) {
        if let Some(existing) = self
            .subscription_charges
            .iter_mut()
            .find(|c| c.company_id == charge.company_id && c.year_month == charge.year_month)
        {
            *existing = charge;
        } else {
            self.subscription_charges.push(charge);
        }
    }
}

// ---------------------------------------------------------------------------
// CompanyData
// ---------------------------------------------------------------------------

impl CompanyData for MemoryDataset {
    fn projects(&self, company_id: CompanyId) -> Vec<Project> {
        self.projects
            .iter()
            .filter(|p| p.company_id == company_id)
            .cloned()
            .collect()
    }

    fn progress_records(&self, project_id: ProjectId) -> Vec<ProgressRecord> {
        self.progress_records
            .iter()
            .filter(|r| r.project_id == project_id)
            .cloned()
            .collect()
    }

    fn cost_entries(&self, company_id: CompanyId) -> Vec<CostEntry> {
        self.cost_entries
            .iter()
            .filter(|entry| {
                self.project(entry.project_id)
                    .is_some_and(|p| p.company_id == company_id)
            })
            .cloned()
            .collect()
    }

    fn scheduled_billings(&self, company_id: CompanyId) -> Vec<ScheduledBilling> {
        self.scheduled_billing
            .iter()
            .filter(|b| b.company_id == company_id)
            .cloned()
            .collect()
    }

    fn subscription_charge(&self, company_id: CompanyId, month: YearMonth) -> Money {
        // Most recent insert wins, mirroring set_subscription_charge
        self.subscription_charges
            .iter()
            .rev()
            .find(|c| c.company_id == company_id && c.year_month == month)
            .map(|c| c.amount)
            .unwrap_or(Decimal::ZERO)
    }
}

// ---------------------------------------------------------------------------
// FiscalStore
// ---------------------------------------------------------------------------

impl FiscalStore for MemoryDataset {
    fn fiscal_rows(&self, company_id: CompanyId) -> Vec<FiscalInfo> {
        self.fiscal_info
            .iter()
            .filter(|row| row.company_id == company_id)
            .cloned()
            .collect()
    }

    fn insert_fiscal_info(&mut self, row: FiscalInfo) -> GenkaFinanceResult<()> {
        if self
            .fiscal_info
            .iter()
            .any(|r| r.company_id == row.company_id && r.fiscal_year == row.fiscal_year)
        {
            return Err(GenkaFinanceError::Conflict {
                entity: "fiscal_info",
                key: format!("company {} fiscal year {}", row.company_id, row.fiscal_year),
            });
        }
        self.fiscal_info.push(row);
        Ok(())
    }

    fn replace_fiscal_info(
        &mut self,
        expected: &FiscalInfo,
        updated: FiscalInfo,
    ) -> GenkaFinanceResult<()> {
        if updated.company_id != expected.company_id {
            return Err(GenkaFinanceError::CrossTenant {
                entity: "fiscal_info",
                company_id: expected.company_id,
            });
        }
        let current_index = self
            .fiscal_info
            .iter()
            .enumerate()
            .filter(|(_, row)| row.company_id == expected.company_id)
            .max_by(|(ia, a), (ib, b)| a.fiscal_year.cmp(&b.fiscal_year).then(ia.cmp(ib)))
            .map(|(index, _)| index)
            .ok_or_else(|| GenkaFinanceError::NotFound {
                entity: "fiscal_info",
                key: expected.company_id.to_string(),
            })?;
        if self.fiscal_info[current_index] != *expected {
            return Err(GenkaFinanceError::Conflict {
                entity: "fiscal_info",
                key: format!(
                    "company {} was modified concurrently",
                    expected.company_id
                ),
            });
        }
        self.fiscal_info[current_index] = updated;
        Ok(())
    }

    fn append_period_change(&mut self, change: FiscalPeriodChange) -> GenkaFinanceResult<()> {
        self.fiscal_period_changes.push(change);
        Ok(())
    }

    fn period_changes(&self, company_id: CompanyId) -> Vec<FiscalPeriodChange> {
        self.fiscal_period_changes
            .iter()
            .filter(|change| change.company_id == company_id)
            .cloned()
            .collect()
    }
}

// ---------------------------------------------------------------------------
// BankBalanceStore
// ---------------------------------------------------------------------------

impl BankBalanceStore for MemoryDataset {
    fn balance_rows(&self, company_id: CompanyId) -> Vec<BankBalanceHistory> {
        self.bank_balance_history
            .iter()
            .filter(|row| row.company_id == company_id)
            .cloned()
            .collect()
    }

    fn insert_balance_row(&mut self, row: BankBalanceHistory) -> GenkaFinanceResult<()> {
        if self.bank_balance_history.iter().any(|r| {
            r.company_id == row.company_id
                && r.fiscal_year == row.fiscal_year
                && r.month() == row.month()
        }) {
            return Err(GenkaFinanceError::Conflict {
                entity: "bank_balance_history",
                key: format!(
                    "company {} fiscal year {} month {}",
                    row.company_id,
                    row.fiscal_year,
                    row.month()
                ),
            });
        }
        self.bank_balance_history.push(row);
        Ok(())
    }

    fn replace_balance_row(
        &mut self,
        company_id: CompanyId,
        id: Uuid,
        row: BankBalanceHistory,
    ) -> GenkaFinanceResult<()> {
        let index = self
            .bank_balance_history
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| GenkaFinanceError::NotFound {
                entity: "bank_balance_history",
                key: id.to_string(),
            })?;
        if self.bank_balance_history[index].company_id != company_id
            || row.company_id != company_id
        {
            return Err(GenkaFinanceError::CrossTenant {
                entity: "bank_balance_history",
                company_id,
            });
        }
        // Moving the row to another month must not collide with one that
        // already exists there.
        if self.bank_balance_history.iter().any(|r| {
            r.id != id
                && r.company_id == row.company_id
                && r.fiscal_year == row.fiscal_year
                && r.month() == row.month()
        }) {
            return Err(GenkaFinanceError::Conflict {
                entity: "bank_balance_history",
                key: format!(
                    "company {} fiscal year {} month {}",
                    row.company_id,
                    row.fiscal_year,
                    row.month()
                ),
            });
        }
        self.bank_balance_history[index] = row;
        Ok(())
    }

    fn delete_balance_row(&mut self, company_id: CompanyId, id: Uuid) -> GenkaFinanceResult<()> {
        let index = self
            .bank_balance_history
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| GenkaFinanceError::NotFound {
                entity: "bank_balance_history",
                key: id.to_string(),
            })?;
        if self.bank_balance_history[index].company_id != company_id {
            return Err(GenkaFinanceError::CrossTenant {
                entity: "bank_balance_history",
                company_id,
            });
        }
        self.bank_balance_history.remove(index);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// BillingStore
// ---------------------------------------------------------------------------

impl BillingStore for MemoryDataset {
    fn put_scheduled_billing(
        &mut self,
        billing: ScheduledBilling,
    ) -> GenkaFinanceResult<ScheduledBilling> {
        YearMonth::new(billing.year_month.year, billing.year_month.month)?;
        let project = self
            .project(billing.project_id)
            .ok_or_else(|| GenkaFinanceError::NotFound {
                entity: "project",
                key: billing.project_id.to_string(),
            })?;
        if project.company_id != billing.company_id {
            return Err(GenkaFinanceError::CrossTenant {
                entity: "scheduled_billing",
                company_id: billing.company_id,
            });
        }
        if let Some(existing) = self
            .scheduled_billing
            .iter_mut()
            .find(|b| b.project_id == billing.project_id && b.year_month == billing.year_month)
        {
            *existing = billing.clone();
        } else {
            self.scheduled_billing.push(billing.clone());
        }
        Ok(billing)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Currency, ProjectStatus};
    use rust_decimal_macros::dec;

    fn project(company_id: CompanyId) -> Project {
        Project {
            id: ProjectId::new(),
            company_id,
            business_number: "K-2025-010".to_string(),
            name: "橋梁補修工事".to_string(),
            contract_amount: dec!(5_000_000),
            status: ProjectStatus::Active,
            currency: Currency::JPY,
        }
    }

    fn fiscal(company_id: CompanyId, fiscal_year: i32) -> FiscalInfo {
        FiscalInfo {
            company_id,
            fiscal_year,
            settlement_month: 3,
            current_period: 1,
            bank_balance: dec!(0),
            is_mid_period_change: false,
            change_reason: None,
            original_fiscal_year: None,
            original_settlement_month: None,
        }
    }

    #[test]
    fn test_insert_fiscal_info_rejects_duplicate_year() {
        let mut store = MemoryDataset::new();
        let company = CompanyId::new();
        store.insert_fiscal_info(fiscal(company, 2025)).unwrap();
        let err = store.insert_fiscal_info(fiscal(company, 2025)).unwrap_err();
        assert!(matches!(err, GenkaFinanceError::Conflict { .. }));
    }

    #[test]
    fn test_replace_fiscal_info_detects_concurrent_modification() {
        let mut store = MemoryDataset::new();
        let company = CompanyId::new();
        store.insert_fiscal_info(fiscal(company, 2025)).unwrap();

        // A stale snapshot (different settlement month) must not win the CAS
        let mut stale = fiscal(company, 2025);
        stale.settlement_month = 9;
        let err = store
            .replace_fiscal_info(&stale, fiscal(company, 2026))
            .unwrap_err();
        assert!(matches!(err, GenkaFinanceError::Conflict { .. }));
    }

    #[test]
    fn test_put_scheduled_billing_updates_in_place() {
        let mut store = MemoryDataset::new();
        let company = CompanyId::new();
        let p = project(company);
        store.add_project(p.clone());

        let month = YearMonth::new(2025, 11).unwrap();
        store
            .put_scheduled_billing(ScheduledBilling {
                company_id: company,
                project_id: p.id,
                year_month: month,
                amount: dec!(1_000_000),
            })
            .unwrap();
        store
            .put_scheduled_billing(ScheduledBilling {
                company_id: company,
                project_id: p.id,
                year_month: month,
                amount: dec!(1_500_000),
            })
            .unwrap();

        let rows = store.scheduled_billings(company);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].amount, dec!(1_500_000));
    }

    #[test]
    fn test_put_scheduled_billing_guards_tenant() {
        let mut store = MemoryDataset::new();
        let owner = CompanyId::new();
        let intruder = CompanyId::new();
        let p = project(owner);
        store.add_project(p.clone());

        let err = store
            .put_scheduled_billing(ScheduledBilling {
                company_id: intruder,
                project_id: p.id,
                year_month: YearMonth::new(2025, 11).unwrap(),
                amount: dec!(1),
            })
            .unwrap_err();
        assert!(matches!(err, GenkaFinanceError::CrossTenant { .. }));
    }

    #[test]
    fn test_cost_entries_are_scoped_by_company() {
        let mut store = MemoryDataset::new();
        let a = CompanyId::new();
        let b = CompanyId::new();
        let pa = project(a);
        let pb = project(b);
        store.add_project(pa.clone());
        store.add_project(pb.clone());
        store
            .add_cost_entry(CostEntry {
                project_id: pa.id,
                amount: dec!(100),
                incurred_on: chrono::NaiveDate::from_ymd_opt(2025, 5, 10).unwrap(),
            })
            .unwrap();
        store
            .add_cost_entry(CostEntry {
                project_id: pb.id,
                amount: dec!(200),
                incurred_on: chrono::NaiveDate::from_ymd_opt(2025, 5, 10).unwrap(),
            })
            .unwrap();

        assert_eq!(store.cost_entries(a).len(), 1);
        assert_eq!(store.cost_entries(a)[0].amount, dec!(100));
    }

    #[test]
    fn test_subscription_charge_defaults_to_zero() {
        let store = MemoryDataset::new();
        assert_eq!(
            store.subscription_charge(CompanyId::new(), YearMonth::new(2025, 4).unwrap()),
            dec!(0)
        );
    }
}
