use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::Json,
    Extension,
};
use tracing::info;

use shared_models::auth::StaffUser;
use shared_models::error::AppError;

use crate::models::{
    AvailabilityQuery, BookAppointmentRequest, BookedAppointment, TemplateAvailability,
};
use crate::SchedulingState;

/// Availability for one branch/modality/type/date combination.
pub async fn get_availability(
    State(state): State<Arc<SchedulingState>>,
    Extension(user): Extension<StaffUser>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<Vec<TemplateAvailability>>, AppError> {
    info!("Availability query from staff user: {}", user.id);

    let results = state.availability.availability_for(query).await?;
    Ok(Json(results))
}

/// Commit a booking for a previously viewed slot.
pub async fn book_appointment(
    State(state): State<Arc<SchedulingState>>,
    Extension(user): Extension<StaffUser>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<Json<BookedAppointment>, AppError> {
    info!(
        "Booking request for order {} from staff user: {}",
        request.order_id, user.id
    );

    let booked = state.booking.commit(request).await?;
    Ok(Json(booked))
}
