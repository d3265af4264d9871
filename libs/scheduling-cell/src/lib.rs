pub mod error;
pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use error::*;
pub use models::*;
pub use router::create_scheduling_router;
pub use services::availability::AvailabilityService;
pub use services::booking::BookingService;

use std::sync::Arc;

use shared_config::AppConfig;

/// Long-lived state shared by the scheduling handlers.
pub struct SchedulingState {
    pub config: Arc<AppConfig>,
    pub availability: AvailabilityService,
    pub booking: BookingService,
}
