use std::net::SocketAddr;
use std::sync::Arc;

use dotenv::dotenv;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{self, TraceLayer};
use tracing::{info, warn, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod router;

use appointment_cell::services::booking::AppointmentBookingService;
use mail_queue_cell::CancellationMailQueue;
use notification_cell::NotificationStore;
use shared_config::AppConfig;
use shared_database::PostgrestClient;

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

    info!("Starting Trimline API server");

    // Load configuration
    let config = AppConfig::from_env();

    // Store clients are built once here and injected; they live for the
    // whole process and close with it.
    let store = Arc::new(PostgrestClient::new(&config));
    let notifications = Arc::new(NotificationStore::new(&config));

    let mail_queue = if config.is_mail_queue_configured() {
        match CancellationMailQueue::connect(&config).await {
            Ok(queue) => Some(Arc::new(queue)),
            Err(e) => {
                warn!("Cancellation mail queue unavailable: {}", e);
                None
            }
        }
    } else {
        warn!("REDIS_URL not set, cancellation mail queue disabled");
        None
    };

    let booking = Arc::new(AppointmentBookingService::new(
        store,
        notifications,
        mail_queue,
    ));

    // Set up CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the application router
    let app = router::create_router(booking)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(trace::DefaultMakeSpan::new().level(Level::INFO))
                .on_response(trace::DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors);

    // Run the server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
