use thiserror::Error;

use shared_models::error::AppError;

#[derive(Error, Debug)]
pub enum InspectionQueueError {
    #[error("Service closed: {0}")]
    ServiceClosed(String),

    #[error("Store error: {0}")]
    Store(#[from] anyhow::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<InspectionQueueError> for AppError {
    fn from(err: InspectionQueueError) -> Self {
        match err {
            InspectionQueueError::ServiceClosed(reason) => {
                AppError::Conflict(format!("Service closed: {}", reason))
            }
            InspectionQueueError::Store(err) => AppError::Store(err.to_string()),
            InspectionQueueError::Serialization(err) => AppError::Internal(err.to_string()),
        }
    }
}
