use serde::{Deserialize, Serialize};

use crate::types::Project;

// ---------------------------------------------------------------------------
// Rule table
// ---------------------------------------------------------------------------

/// Business-number prefixes that mark a project as subscription-billed.
/// Compared case-insensitively against the trimmed business number.
pub const SUBSCRIPTION_NUMBER_PREFIXES: &[&str] = &["CADDON-"];

/// Project-name markers that mark a project as subscription-billed.
/// A name containing any marker (case-insensitive) is a subscription project.
pub const SUBSCRIPTION_NAME_MARKERS: &[&str] = &["CADDON"];

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Billing model of a project. Derived from the record, never stored, so a
/// rule change needs no data migration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectKind {
    /// Revenue recognized in proportion to progress (工事進行基準)
    PercentageOfCompletion,
    /// Flat recurring fee, excluded from progress-based recognition
    Subscription,
}

impl ProjectKind {
    pub fn is_subscription(self) -> bool {
        matches!(self, ProjectKind::Subscription)
    }
}

/// Classify a project against the rule table. Pure function of the record;
/// resolve the kind once when the project is loaded, not per calculation.
pub fn classify(project: &Project) -> ProjectKind {
    let number = project.business_number.trim().to_ascii_uppercase();
    if SUBSCRIPTION_NUMBER_PREFIXES
        .iter()
        .any(|prefix| number.starts_with(prefix))
    {
        return ProjectKind::Subscription;
    }

    let name = project.name.to_ascii_uppercase();
    if SUBSCRIPTION_NAME_MARKERS
        .iter()
        .any(|marker| name.contains(marker))
    {
        return ProjectKind::Subscription;
    }

    ProjectKind::PercentageOfCompletion
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
