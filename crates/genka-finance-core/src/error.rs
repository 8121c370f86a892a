use thiserror::Error;

use crate::types::CompanyId;

#[derive(Debug, Error)]
pub enum GenkaFinanceError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Conflict: {entity} already exists for {key}")]
    Conflict { entity: &'static str, key: String },

    #[error("Not found: {entity} for {key}")]
    NotFound { entity: &'static str, key: String },

    #[error("Cross-tenant access: {entity} does not belong to company {company_id}")]
    CrossTenant {
        entity: &'static str,
        company_id: CompanyId,
    },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for GenkaFinanceError {
    fn from(e: serde_json::Error) -> Self {
        GenkaFinanceError::SerializationError(e.to_string())
    }
}
