// region:    --- Imports
use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post};
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use thriftup_service::config::AppConfig;
use thriftup_service::database::DatabaseManager;
use thriftup_service::handlers::{self, AppState};
use thriftup_service::scheduler::StatusScheduler;
// endregion: --- Imports

// region:    --- Main
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .without_time()
        .with_target(false)
        .init();

    let config = AppConfig::from_env();

    let db_manager = Arc::new(DatabaseManager::new(&config.database_url).await?);

    if let Err(e) = db_manager.initialize_database().await {
        error!("{:<12} --> schema initialization failed: {:?}", "Main", e);
        return Err(e.into());
    }
    info!("{:<12} --> database ready", "Main");

    // Lifecycle label sweeps for auctions and events
    let scheduler = StatusScheduler::new(db_manager.get_pool());
    scheduler.start().await;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let state = AppState::new(Arc::clone(&db_manager));

    let routes_all = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/bid", post(handlers::auctions::place_bid))
        .route("/buy-now", post(handlers::auctions::buy_now))
        .route(
            "/auctions",
            get(handlers::auctions::list_active_auctions).post(handlers::auctions::create_auction),
        )
        .route(
            "/auctions/:id",
            get(handlers::auctions::get_auction).delete(handlers::auctions::delete_auction),
        )
        .route("/auctions/:id/bids", get(handlers::auctions::get_bid_history))
        .route(
            "/auctions/:id/highest-bid",
            get(handlers::auctions::get_highest_bid),
        )
        .route(
            "/listings",
            get(handlers::listings::browse_listings).post(handlers::listings::create_listing),
        )
        .route("/listings/:id", delete(handlers::listings::delete_listing))
        .route(
            "/events",
            get(handlers::events::list_events).post(handlers::events::create_event),
        )
        .route(
            "/events/:id",
            get(handlers::events::get_event).delete(handlers::events::delete_event),
        )
        .route("/events/:id/attendees", get(handlers::events::list_attendees))
        .route(
            "/events/:id/rsvp",
            post(handlers::events::join_event).delete(handlers::events::cancel_rsvp),
        )
        .route(
            "/posts",
            get(handlers::community::list_posts).post(handlers::community::create_post),
        )
        .route("/dashboard", get(handlers::dashboard::get_dashboard))
        .route("/rsvps", get(handlers::dashboard::my_rsvps))
        .layer(cors)
        .layer(DefaultBodyLimit::max(1024 * 1024 * 2))
        .with_state(state);

    let listener = TcpListener::bind(config.server_addr()).await?;
    info!(
        "{:<12} --> Web Server: Listening on {}",
        "Main",
        listener.local_addr()?
    );

    if let Err(err) = axum::serve(listener, routes_all.into_make_service()).await {
        error!("{:<12} --> Server error: {}", "Main", err);
    }
    Ok(())
}
// endregion: --- Main
