use std::sync::Arc;

use axum::{routing::get, Router};

use inspection_queue_cell::{create_inspection_queue_router, InspectionQueueState};
use scheduling_cell::{create_scheduling_router, SchedulingState};

pub fn create_router(
    scheduling: Arc<SchedulingState>,
    queue: Arc<InspectionQueueState>,
) -> Router {
    Router::new()
        .route("/", get(|| async { "Inspection API is running!" }))
        .nest("/scheduling", create_scheduling_router(scheduling))
        .nest("/queue", create_inspection_queue_router(queue))
}
