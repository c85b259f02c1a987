use std::net::SocketAddr;
use std::sync::Arc;

use dotenv::dotenv;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{self, TraceLayer};
use tracing::{error, info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod router;

use doctor_cell::DoctorService;
use queue_cell::QueueOrchestrator;
use realtime_cell::{ChannelHub, NotificationRouter, RealtimeState, SubscriptionRegistry};
use shared_config::AppConfig;
use shared_database::{MemoryStore, QueueStore};
use shared_models::EventSink;

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

    info!("Starting Clinic Queue API server");

    // Load configuration
    let config = AppConfig::from_env();

    // Wire the cells: store -> notification router -> orchestrator ->
    // subscription registry.
    let store: Arc<dyn QueueStore> = Arc::new(MemoryStore::new());
    let hub = Arc::new(ChannelHub::new());
    let notifier: Arc<dyn EventSink> = Arc::new(NotificationRouter::new(hub.clone()));

    let orchestrator = Arc::new(QueueOrchestrator::new(
        store.clone(),
        notifier.clone(),
        config.retention_hours,
    ));
    let doctors = Arc::new(DoctorService::new(store.clone(), notifier.clone()));

    if config.seed_doctors {
        if let Err(e) = doctors.seed_doctors().await {
            error!("Doctor seeding failed: {}", e);
        }
    }

    let registry = Arc::new(SubscriptionRegistry::new(
        hub.clone(),
        store.clone(),
        orchestrator.clone(),
    ));
    let realtime = Arc::new(RealtimeState {
        hub,
        registry,
        orchestrator: orchestrator.clone(),
        doctors: doctors.clone(),
        store,
    });

    // Set up CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the application router
    let app = router::create_router(orchestrator, doctors, realtime)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(trace::DefaultMakeSpan::new().level(Level::INFO))
                .on_response(trace::DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors);

    // Run the server
    let addr: SocketAddr = format!("{}:{}", config.bind_host, config.bind_port)
        .parse()
        .unwrap_or_else(|_| SocketAddr::from(([0, 0, 0, 0], 3000)));
    info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
