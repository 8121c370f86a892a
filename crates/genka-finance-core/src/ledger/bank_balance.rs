use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::GenkaFinanceError;
use crate::store::BankBalanceStore;
use crate::types::{CompanyId, Money, YearMonth};
use crate::GenkaFinanceResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One calendar month's balance row for a tenant. Unique per
/// (company, fiscal year, month of balance_date); `balance_date` is always
/// normalized to the first of the month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankBalanceHistory {
    pub id: Uuid,
    pub company_id: CompanyId,
    pub fiscal_year: i32,
    pub balance_date: NaiveDate,
    pub opening_balance: Money,
    pub closing_balance: Money,
    pub total_income: Money,
    pub total_expense: Money,
}

impl BankBalanceHistory {
    /// The calendar month this row covers.
    pub fn month(&self) -> YearMonth {
        YearMonth::from_date(self.balance_date)
    }
}

/// Caller-supplied figures for one ledger month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyBalanceInput {
    pub company_id: CompanyId,
    pub fiscal_year: i32,
    pub balance_date: NaiveDate,
    pub opening_balance: Money,
    pub closing_balance: Money,
    pub total_income: Money,
    pub total_expense: Money,
}

/// What to do when a row already exists for the month. A blind insert is
/// always rejected; replacing is an explicit caller decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnConflict {
    Reject,
    Replace,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Flags a month whose closing balance does not reconcile with
/// opening + income - expense. Advisory only, never an error: the figures
/// are admin-entered and the mismatch may be deliberate.
pub fn consistency_warning(row: &BankBalanceHistory) -> Option<String> {
    let derived = row.opening_balance + row.total_income - row.total_expense;
    if derived != row.closing_balance {
        Some(format!(
            "Closing balance {} for {} does not equal opening + income - expense ({})",
            row.closing_balance,
            row.month(),
            derived
        ))
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Record one month's figures. `OnConflict::Reject` surfaces an existing row
/// for the same (company, fiscal year, month) as `Conflict`;
/// `OnConflict::Replace` is the explicit correct-a-month path and keeps the
/// existing row id.
pub fn record_month<S: BankBalanceStore>(
    store: &mut S,
    input: MonthlyBalanceInput,
    on_conflict: OnConflict,
) -> GenkaFinanceResult<BankBalanceHistory> {
    let row = BankBalanceHistory {
        id: Uuid::new_v4(),
        company_id: input.company_id,
        fiscal_year: input.fiscal_year,
        balance_date: first_of_month(input.balance_date),
        opening_balance: input.opening_balance,
        closing_balance: input.closing_balance,
        total_income: input.total_income,
        total_expense: input.total_expense,
    };

    if let Some(warning) = consistency_warning(&row) {
        tracing::warn!(company = %row.company_id, month = %row.month(), "{warning}");
    }

    let existing = store
        .balance_rows(input.company_id)
        .into_iter()
        .find(|r| r.fiscal_year == row.fiscal_year && r.month() == row.month());

    match (existing, on_conflict) {
        (Some(_), OnConflict::Reject) => Err(GenkaFinanceError::Conflict {
            entity: "bank_balance_history",
            key: format!(
                "company {} fiscal year {} month {}",
                row.company_id,
                row.fiscal_year,
                row.month()
            ),
        }),
        (Some(previous), OnConflict::Replace) => {
            let replacement = BankBalanceHistory {
                id: previous.id,
                ..row
            };
            store.replace_balance_row(input.company_id, previous.id, replacement.clone())?;
            tracing::info!(
                company = %replacement.company_id,
                month = %replacement.month(),
                "ledger month replaced"
            );
            Ok(replacement)
        }
        (None, _) => {
            store.insert_balance_row(row.clone())?;
            tracing::info!(company = %row.company_id, month = %row.month(), "ledger month recorded");
            Ok(row)
        }
    }
}

/// Explicit update-by-id path for correcting a month. The row must belong
/// to the calling tenant.
pub fn update_month_by_id<S: BankBalanceStore>(
    store: &mut S,
    company_id: CompanyId,
    id: Uuid,
    input: MonthlyBalanceInput,
) -> GenkaFinanceResult<BankBalanceHistory> {
    if input.company_id != company_id {
        return Err(GenkaFinanceError::CrossTenant {
            entity: "bank_balance_history",
            company_id,
        });
    }
    let replacement = BankBalanceHistory {
        id,
        company_id,
        fiscal_year: input.fiscal_year,
        balance_date: first_of_month(input.balance_date),
        opening_balance: input.opening_balance,
        closing_balance: input.closing_balance,
        total_income: input.total_income,
        total_expense: input.total_expense,
    };
    if let Some(warning) = consistency_warning(&replacement) {
        tracing::warn!(company = %company_id, month = %replacement.month(), "{warning}");
    }
    store.replace_balance_row(company_id, id, replacement.clone())?;
    Ok(replacement)
}

/// Ledger rows for a tenant, oldest month first, optionally limited to one
/// fiscal year.
pub fn list_for_company<S: BankBalanceStore>(
    store: &S,
    company_id: CompanyId,
    fiscal_year: Option<i32>,
) -> Vec<BankBalanceHistory> {
    let mut rows: Vec<BankBalanceHistory> = store
        .balance_rows(company_id)
        .into_iter()
        .filter(|row| fiscal_year.map_or(true, |year| row.fiscal_year == year))
        .collect();
    rows.sort_by_key(|row| row.balance_date);
    rows
}

/// Closing balance of the row with the greatest balance date, ties broken
/// by most recent insert. `NotFound` when the tenant has no ledger rows;
/// forecast callers treat that as an opening balance of zero.
pub fn latest_closing_balance<S: BankBalanceStore>(
    store: &S,
    company_id: CompanyId,
) -> GenkaFinanceResult<Money> {
    store
        .balance_rows(company_id)
        .into_iter()
        .enumerate()
        .max_by(|(ia, a), (ib, b)| a.balance_date.cmp(&b.balance_date).then(ia.cmp(ib)))
        .map(|(_, row)| row.closing_balance)
        .ok_or_else(|| GenkaFinanceError::NotFound {
            entity: "bank_balance_history",
            key: company_id.to_string(),
        })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
