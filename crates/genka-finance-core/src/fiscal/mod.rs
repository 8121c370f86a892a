//! Fiscal calendar management: the tenant's fiscal definition, mid-period
//! settlement-month changes with audit history, and the impact analysis run
//! before a change is committed.

pub mod calendar;
pub mod impact;

pub use calendar::{
    change_fiscal_period, current_fiscal_info, forecast_window, initialize_fiscal_info,
    next_forecast_start_month, FiscalDefinition, FiscalInfo, FiscalPeriodChange,
};
pub use impact::{analyze_change_impact, ImpactSummary};
