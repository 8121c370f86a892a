use rust_decimal::Decimal;

use crate::error::GenkaFinanceError;
use crate::types::{ProgressRecord, Rate};
use crate::GenkaFinanceResult;

/// Progress rates are percentages, 0 to 100 inclusive.
pub fn validate_progress_rate(rate: Rate) -> GenkaFinanceResult<()> {
    if rate < Decimal::ZERO || rate > Decimal::ONE_HUNDRED {
        return Err(GenkaFinanceError::InvalidInput {
            field: "progress_rate".to_string(),
            reason: format!("progress rate must be between 0 and 100, got {rate}"),
        });
    }
    Ok(())
}

/// The record with the greatest progress date. The slice must be in
/// insertion order; ties on the date go to the most recently inserted
/// record.
pub fn latest_progress(records: &[ProgressRecord]) -> Option<&ProgressRecord> {
    records
        .iter()
        .enumerate()
        .max_by(|(ia, a), (ib, b)| a.progress_date.cmp(&b.progress_date).then(ia.cmp(ib)))
        .map(|(_, record)| record)
}

/// Current progress for a project: the latest record's rate, or 0 when the
/// project has no progress records yet.
pub fn current_progress_rate(records: &[ProgressRecord]) -> Rate {
    latest_progress(records)
        .map(|record| record.progress_rate)
        .unwrap_or(Decimal::ZERO)
}
