//! Monthly bank-balance ledger: one row per tenant per calendar month,
//! with explicit replace semantics and the latest-closing-balance query the
//! cash-flow forecaster seeds from.

pub mod bank_balance;

pub use bank_balance::{
    consistency_warning, latest_closing_balance, list_for_company, record_month,
    update_month_by_id, BankBalanceHistory, MonthlyBalanceInput, OnConflict,
};
