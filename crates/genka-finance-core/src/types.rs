use std::fmt;

use chrono::{Datelike, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::GenkaFinanceError;
use crate::GenkaFinanceResult;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Percentage values (25 = 25%). Progress rates and margins use this scale.
pub type Rate = Decimal;

/// Currency code. Tenants are Japanese construction companies, so JPY is
/// the default; the minor unit drives revenue-recognition rounding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    #[default]
    JPY,
    USD,
    EUR,
    GBP,
    Other(String),
}

impl Currency {
    /// Number of decimal places in the currency's minor unit.
    pub fn minor_units(&self) -> u32 {
        match self {
            Currency::JPY => 0,
            Currency::USD | Currency::EUR | Currency::GBP | Currency::Other(_) => 2,
        }
    }
}

/// Round to the currency's minor unit using round-half-up.
pub fn round_to_minor_unit(amount: Money, currency: &Currency) -> Money {
    amount.round_dp_with_strategy(
        currency.minor_units(),
        RoundingStrategy::MidpointAwayFromZero,
    )
}

/// Tenant identifier. Every entity in the engine is scoped by one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompanyId(pub Uuid);

impl CompanyId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for CompanyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Project identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectId(pub Uuid);

impl ProjectId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A calendar month. Ordering is chronological; `succ` wraps December into
/// January of the following year.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> GenkaFinanceResult<Self> {
        if !(1..=12).contains(&month) {
            return Err(GenkaFinanceError::InvalidInput {
                field: "month".to_string(),
                reason: format!("month must be between 1 and 12, got {month}"),
            });
        }
        Ok(Self { year, month })
    }

    /// The month a date falls in.
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The following calendar month.
    pub fn succ(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Lifecycle status of a construction project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectStatus {
    Planned,
    Active,
    Completed,
    Suspended,
}

/// A construction project as supplied by the project-management collaborator.
/// The engine never writes to these records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub company_id: CompanyId,
    /// Tenant-assigned business number, e.g. "K-2025-031"
    pub business_number: String,
    pub name: String,
    pub contract_amount: Money,
    pub status: ProjectStatus,
    #[serde(default)]
    pub currency: Currency,
}

/// One progress observation for a project. Append-only time series; the
/// latest record (by progress date, then insertion order) is the project's
/// current progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub id: Uuid,
    pub project_id: ProjectId,
    /// Percentage of completion, 0 to 100
    pub progress_rate: Rate,
    pub progress_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A dated cost amount attributed to a project, owned by the cost-entry
/// collaborator. The per-project total "as of now" is the sum over entries;
/// the per-month outflow is the sum over entries dated in that month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostEntry {
    pub project_id: ProjectId,
    pub amount: Money,
    pub incurred_on: NaiveDate,
}

/// A manually apportioned expected-billing amount for one project in one
/// calendar month. At most one row per (project, month).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledBilling {
    pub company_id: CompanyId,
    pub project_id: ProjectId,
    pub year_month: YearMonth,
    pub amount: Money,
}

/// Recurring subscription amount for one tenant in one calendar month,
/// sourced read-only from the subscription-billing collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionCharge {
    pub company_id: CompanyId,
    pub year_month: YearMonth,
    pub amount: Money,
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}
