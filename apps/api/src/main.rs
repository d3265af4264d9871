use std::net::SocketAddr;
use std::sync::Arc;

use dotenv::dotenv;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{self, TraceLayer};
use tracing::{info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod router;

use inspection_queue_cell::{InspectionQueueService, InspectionQueueState, QueueNotifierService};
use scheduling_cell::{AvailabilityService, BookingService, SchedulingState};
use shared_config::AppConfig;
use shared_database::{
    RestAppointmentStore, RestHolidayCalendar, RestTemplateCatalog, StoreClient,
};

#[tokio::main]
async fn main() {
    // Loading Env Vars
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting inspection API server");

    // Load configuration
    let config = Arc::new(AppConfig::from_env());

    // Store clients shared by both cells
    let store = Arc::new(StoreClient::new(&config));
    let catalog = Arc::new(RestTemplateCatalog::new(store.clone()));
    let appointments = Arc::new(RestAppointmentStore::new(store.clone()));
    let holidays = Arc::new(RestHolidayCalendar::new(store.clone()));

    let scheduling_state = Arc::new(SchedulingState {
        config: config.clone(),
        availability: AvailabilityService::new(catalog.clone(), appointments.clone()),
        booking: BookingService::new(catalog.clone(), appointments.clone()),
    });

    let notifier = QueueNotifierService::new();
    let queue = Arc::new(InspectionQueueService::new(
        appointments.clone(),
        notifier.clone(),
        config.queue_inactivity_minutes,
    ));
    queue
        .clone()
        .spawn_expiry_sweeper(config.queue_sweep_interval_seconds);

    let queue_state = Arc::new(InspectionQueueState {
        config: config.clone(),
        queue,
        notifier,
        holidays,
    });

    // Set up CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the application router
    let app = router::create_router(scheduling_state, queue_state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(trace::DefaultMakeSpan::new().level(Level::INFO))
                .on_response(trace::DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors);

    // Run the server
    let addr = SocketAddr::from(([0, 0, 0, 0], 3000));
    info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
