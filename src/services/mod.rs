pub mod map_service;
pub mod zone_service;

pub use map_service::{DeletedMap, MapService};
pub use zone_service::ZoneService;

use thiserror::Error;
use tracing::warn;

use crate::database::record::RecordError;
use crate::database::store::{StoreError, StoreTransaction};

/// Errors surfaced by map and zone operations
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("Storage failure: {0}")]
    Storage(#[from] StoreError),
}

impl From<RecordError> for ServiceError {
    fn from(err: RecordError) -> Self {
        ServiceError::InvalidInput(err.to_string())
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Commit on success, roll back on failure.
///
/// A failed rollback is logged and the original error is returned; the
/// store discards the transaction either way.
pub(crate) async fn finish<T>(
    tx: Box<dyn StoreTransaction>,
    outcome: ServiceResult<T>,
) -> ServiceResult<T> {
    match outcome {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                warn!("Rollback failed after {}: {}", err, rollback_err);
            }
            Err(err)
        }
    }
}
