//! services/api/src/bin/api.rs

use api_lib::{
    adapters::StdRandom,
    config::Config,
    error::ApiError,
    runtime::spawn_session,
    web::{self, rest::ApiDoc, state::AppState},
};
use axum::http::{header::{ACCEPT, CONTENT_TYPE}, HeaderValue, Method};
use axum::Router;
use chat_core::{seed_conversations, RandomSource, SessionController};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Build the Session ---
    let rng: Box<dyn RandomSource> = match config.simulator_seed {
        Some(seed) => {
            info!("Using fixed simulator seed {}", seed);
            Box::new(StdRandom::seeded(seed))
        }
        None => Box::new(StdRandom::from_os()),
    };
    let controller = if config.seed_conversations {
        SessionController::with_conversations(rng, seed_conversations())
    } else {
        SessionController::new(rng)
    };
    let (session, session_task) = spawn_session(controller);

    // --- 3. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        session: session.clone(),
        config: config.clone(),
    });

    let origin = config.cors_origin.parse::<HeaderValue>().map_err(|e| {
        ApiError::Internal(format!("Invalid CORS origin '{}': {}", config.cors_origin, e))
    })?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, ACCEPT]);

    // --- 4. Create the Web Router ---
    let app = Router::new()
        .merge(web::router(app_state).layer(cors))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 5. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received.");
        })
        .await?;

    // --- 6. Stop the Session ---
    session.shutdown();
    session_task
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(())
}
