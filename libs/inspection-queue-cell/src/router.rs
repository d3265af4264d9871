use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_utils::extractor::auth_middleware;

use crate::handlers::{assign_next, get_status, get_window, queue_events_ws, request_admission};
use crate::InspectionQueueState;

pub fn create_inspection_queue_router(state: Arc<InspectionQueueState>) -> Router {
    // Order-token routes carry their own capability check in the handler.
    let public_routes = Router::new()
        .route("/window", get(get_window))
        .route("/{order_token}/admission", post(request_admission))
        .route("/{order_token}/status", get(get_status))
        .route("/{order_token}/ws", get(queue_events_ws));

    let staff_routes = Router::new()
        .route("/assignments/next", post(assign_next))
        .layer(middleware::from_fn_with_state(
            state.config.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(public_routes)
        .merge(staff_routes)
        .with_state(state)
}
