//! Rolling 12-month cash-flow forecast built from scheduled billings,
//! recurring subscription charges, and dated cost entries, seeded from the
//! bank-balance ledger.

pub mod cashflow;

pub use cashflow::{forecast_cash_flow, ForecastRow};
