//! Storage seam. The engine is written against these traits; the excluded
//! HTTP/persistence layer supplies a relational implementation, while
//! [`MemoryDataset`] backs tests and fixture-driven tooling.
//!
//! Every listing method returns rows in insertion order. That order is the
//! tie-breaker in the `(date, insertion order)` total ordering the engine
//! uses for "latest progress" and "latest ledger row".

pub mod memory;

pub use memory::MemoryDataset;

use uuid::Uuid;

use crate::fiscal::calendar::{FiscalInfo, FiscalPeriodChange};
use crate::ledger::bank_balance::BankBalanceHistory;
use crate::types::{
    CompanyId, CostEntry, Money, ProgressRecord, Project, ProjectId, ScheduledBilling, YearMonth,
};
use crate::GenkaFinanceResult;

/// Read-only queries against collaborator-owned records (projects, progress,
/// costs, billing schedules). The engine never writes through this trait.
pub trait CompanyData {
    fn projects(&self, company_id: CompanyId) -> Vec<Project>;

    /// Progress records for one project, in insertion order.
    fn progress_records(&self, project_id: ProjectId) -> Vec<ProgressRecord>;

    /// All dated cost entries for a tenant's projects.
    fn cost_entries(&self, company_id: CompanyId) -> Vec<CostEntry>;

    fn scheduled_billings(&self, company_id: CompanyId) -> Vec<ScheduledBilling>;

    /// Recurring subscription amount for one month; zero when none is
    /// scheduled.
    fn subscription_charge(&self, company_id: CompanyId, month: YearMonth) -> Money;
}

/// Fiscal definition rows and the append-only period-change history.
pub trait FiscalStore {
    /// Fiscal info rows for a tenant, in insertion order.
    fn fiscal_rows(&self, company_id: CompanyId) -> Vec<FiscalInfo>;

    /// Insert a new fiscal row. `Conflict` if the tenant already has a row
    /// for the same fiscal year.
    fn insert_fiscal_info(&mut self, row: FiscalInfo) -> GenkaFinanceResult<()>;

    /// Optimistic compare-and-swap on the tenant's current row: the stored
    /// current row must still equal `expected`, otherwise `Conflict`.
    /// Serializes concurrent fiscal period changes for one tenant.
    fn replace_fiscal_info(
        &mut self,
        expected: &FiscalInfo,
        updated: FiscalInfo,
    ) -> GenkaFinanceResult<()>;

    /// Append one audit row. Audit rows are never mutated or deleted.
    fn append_period_change(&mut self, change: FiscalPeriodChange) -> GenkaFinanceResult<()>;

    fn period_changes(&self, company_id: CompanyId) -> Vec<FiscalPeriodChange>;
}

/// Monthly bank-balance rows, unique per (company, fiscal year, month).
pub trait BankBalanceStore {
    /// Balance rows for a tenant, in insertion order.
    fn balance_rows(&self, company_id: CompanyId) -> Vec<BankBalanceHistory>;

    /// Insert a row, enforcing the per-month uniqueness invariant.
    fn insert_balance_row(&mut self, row: BankBalanceHistory) -> GenkaFinanceResult<()>;

    /// Replace one row by id. The row must belong to the calling tenant and
    /// the replacement must not collide with another month.
    fn replace_balance_row(
        &mut self,
        company_id: CompanyId,
        id: Uuid,
        row: BankBalanceHistory,
    ) -> GenkaFinanceResult<()>;

    /// Explicit reset path; the only way a ledger row disappears.
    fn delete_balance_row(&mut self, company_id: CompanyId, id: Uuid) -> GenkaFinanceResult<()>;
}

/// Scheduled (split) billing rows, at most one per (project, month).
pub trait BillingStore {
    /// Insert or update the row for the billing's (project, month) key.
    /// A second write for the same key replaces the amount in place; it is
    /// never summed twice.
    fn put_scheduled_billing(
        &mut self,
        billing: ScheduledBilling,
    ) -> GenkaFinanceResult<ScheduledBilling>;
}
