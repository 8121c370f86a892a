//! Percentage-of-completion revenue recognition: project classification,
//! latest-progress resolution, and per-project / portfolio financials.

pub mod classify;
pub mod financials;
pub mod progress;

pub use classify::{classify, ProjectKind};
pub use financials::{
    company_financial_report, compute_project_financials, CompanyFinancialReport,
    ProjectFinancials,
};
pub use progress::{current_progress_rate, latest_progress};
