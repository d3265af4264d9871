use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;
use uuid::Uuid;

use shared_models::error::AppError;

#[derive(Error, Debug)]
pub enum SchedulingError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Template not found: {0}")]
    TemplateNotFound(Uuid),

    #[error("Slot {start_time} on {date} is not available")]
    SlotUnavailable {
        date: NaiveDate,
        start_time: NaiveTime,
    },

    #[error("Store error: {0}")]
    Store(#[from] anyhow::Error),
}

impl From<SchedulingError> for AppError {
    fn from(err: SchedulingError) -> Self {
        match err {
            SchedulingError::Validation(msg) => AppError::Validation(msg),
            SchedulingError::TemplateNotFound(id) => {
                AppError::NotFound(format!("Template not found: {}", id))
            }
            SchedulingError::SlotUnavailable { date, start_time } => AppError::Conflict(format!(
                "Slot {} on {} is not available",
                start_time, date
            )),
            SchedulingError::Store(err) => AppError::Store(err.to_string()),
        }
    }
}
