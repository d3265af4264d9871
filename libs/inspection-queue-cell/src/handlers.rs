use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        Path, State, WebSocketUpgrade,
    },
    response::{IntoResponse, Response},
    Extension, Json,
};
use tracing::{debug, info};

use shared_models::auth::{OrderAccess, StaffUser};
use shared_models::error::AppError;
use shared_utils::capability::verify_order_token;

use crate::error::InspectionQueueError;
use crate::models::{
    AdmissionOutcome, AssignNextRequest, QueueEntry, QueueStatusResponse, WindowReason,
    WindowStatus,
};
use crate::services::gate::{business_now, evaluate_window};
use crate::services::notifier::QueueEventReceiver;
use crate::InspectionQueueState;

fn order_access(state: &InspectionQueueState, token: &str) -> Result<OrderAccess, AppError> {
    verify_order_token(token, &state.config.order_token_secret).map_err(AppError::Auth)
}

async fn window_status(state: &InspectionQueueState) -> Result<WindowStatus, AppError> {
    let local_now = business_now(state.config.business_utc_offset_minutes);
    let holiday = state
        .holidays
        .holiday_on(local_now.date_naive())
        .await
        .map_err(InspectionQueueError::from)?;
    Ok(evaluate_window(local_now, holiday.as_ref()))
}

fn closed_reason(reason: &WindowReason) -> String {
    match reason {
        WindowReason::Open => "open".to_string(),
        WindowReason::OutsideHours => "outside business hours".to_string(),
        WindowReason::Sunday => "closed on Sundays".to_string(),
        WindowReason::Holiday { name } => format!("closed for holiday {}", name),
    }
}

/// POST /queue/{order_token}/admission
///
/// Joins the virtual inspection queue. Refused while the business window
/// is closed; repeated calls while an entry is active are idempotent.
pub async fn request_admission(
    State(state): State<Arc<InspectionQueueState>>,
    Path(order_token): Path<String>,
) -> Result<Json<AdmissionOutcome>, AppError> {
    let access = order_access(&state, &order_token)?;

    let window = window_status(&state).await?;
    if !window.open {
        return Err(InspectionQueueError::ServiceClosed(closed_reason(&window.reason)).into());
    }

    let outcome = state.queue.admit(access.order_id).await?;
    Ok(Json(outcome))
}

/// GET /queue/{order_token}/status
pub async fn get_status(
    State(state): State<Arc<InspectionQueueState>>,
    Path(order_token): Path<String>,
) -> Result<Json<QueueStatusResponse>, AppError> {
    let access = order_access(&state, &order_token)?;

    let status = state
        .queue
        .status(access.order_id)
        .await?
        .ok_or_else(|| AppError::NotFound("No queue entry for this order".to_string()))?;

    Ok(Json(status))
}

/// GET /queue/{order_token}/ws
///
/// Pushes assignment and expiry events for the order as JSON text frames.
pub async fn queue_events_ws(
    State(state): State<Arc<InspectionQueueState>>,
    Path(order_token): Path<String>,
    ws: WebSocketUpgrade,
) -> Response {
    let access = match order_access(&state, &order_token) {
        Ok(access) => access,
        Err(err) => return err.into_response(),
    };

    let notifier = state.notifier.clone();
    ws.on_upgrade(move |socket| async move {
        info!("Queue socket connected for order {}", access.order_id);
        let receiver = notifier.subscribe(access.order_id).await;
        forward_events(socket, receiver).await;
        debug!("Queue socket closed for order {}", access.order_id);
    })
}

async fn forward_events(mut socket: WebSocket, mut receiver: QueueEventReceiver) {
    while let Ok(message) = receiver.recv().await {
        if socket.send(Message::Text(message.into())).await.is_err() {
            break;
        }
    }
}

/// POST /queue/assignments/next (staff)
///
/// Pops the oldest waiting entry and hands it to the calling inspector.
pub async fn assign_next(
    State(state): State<Arc<InspectionQueueState>>,
    Extension(staff): Extension<StaffUser>,
    Json(payload): Json<AssignNextRequest>,
) -> Result<Json<QueueEntry>, AppError> {
    debug!(
        "Staff {} requesting next assignment for inspector {}",
        staff.id, payload.inspector_id
    );

    let assigned = state
        .queue
        .assign_next(payload.inspector_id)
        .await?
        .ok_or_else(|| AppError::NotFound("No orders waiting in the queue".to_string()))?;

    Ok(Json(assigned))
}

/// GET /queue/window
pub async fn get_window(
    State(state): State<Arc<InspectionQueueState>>,
) -> Result<Json<WindowStatus>, AppError> {
    Ok(Json(window_status(&state).await?))
}
