pub mod currency_service;
pub mod export_service;
pub mod record_service;
pub mod summary_service;

pub use currency_service::CurrencyService;
pub use export_service::ExportService;
pub use record_service::RecordService;
pub use summary_service::{DashboardSummary, SummaryService};

use crate::errors::LedgerError;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("{0}")]
    Invalid(String),
    #[error("{0} not found")]
    NotFound(String),
}
