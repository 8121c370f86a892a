pub mod error;
pub mod fiscal;
pub mod forecast;
pub mod ledger;
pub mod recognition;
pub mod store;
pub mod types;

pub use error::GenkaFinanceError;
pub use types::*;

/// Standard result type for all engine operations
pub type GenkaFinanceResult<T> = Result<T, GenkaFinanceError>;
