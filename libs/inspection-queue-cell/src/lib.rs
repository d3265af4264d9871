pub mod error;
pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use error::*;
pub use models::*;
pub use router::create_inspection_queue_router;
pub use services::gate::{business_now, evaluate_window};
pub use services::notifier::QueueNotifierService;
pub use services::queue::InspectionQueueService;

use std::sync::Arc;

use shared_config::AppConfig;
use shared_database::HolidayCalendar;

/// Long-lived state shared by the queue handlers. The queue service must
/// outlive individual requests: entries and per-order serialization live
/// in process memory.
pub struct InspectionQueueState {
    pub config: Arc<AppConfig>,
    pub queue: Arc<InspectionQueueService>,
    pub notifier: QueueNotifierService,
    pub holidays: Arc<dyn HolidayCalendar>,
}
