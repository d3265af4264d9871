use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_utils::extractor::auth_middleware;

use crate::handlers::{book_appointment, get_availability};
use crate::SchedulingState;

pub fn create_scheduling_router(state: Arc<SchedulingState>) -> Router {
    let protected_routes = Router::new()
        .route("/availability", get(get_availability))
        .route("/appointments", post(book_appointment))
        .layer(middleware::from_fn_with_state(
            state.config.clone(),
            auth_middleware,
        ));

    Router::new().merge(protected_routes).with_state(state)
}
