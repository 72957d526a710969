//! TripMate - conversational travel-planning assistant backend
//!
//! Serves the embedded chat widget of the booking platform: session
//! management, the attention tooltip cycle, the assistant gateway, and
//! the hand-off into the itinerary flow.

mod api;
mod assistant;
mod attention;
mod classifier;
mod config;
mod handoff;
mod runtime;
mod session;

use api::{create_router, AppState};
use assistant::{AssistantClient, EnvTokenProvider, HttpAssistantClient, LoggingClient};
use config::Config;
use runtime::WidgetManager;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tripmate=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    let config = Config::from_env();

    // Gateway: HTTP client wrapped with duration/outcome logging. The
    // bearer token is read from the environment on every call.
    let token_provider = Arc::new(EnvTokenProvider::new(config.token_env_var.clone()));
    let http_client = HttpAssistantClient::new(
        config.assistant_url.clone(),
        config.request_timeout,
        token_provider,
    );
    let client: Arc<dyn AssistantClient> = Arc::new(LoggingClient::new(Arc::new(http_client)));

    let widgets = Arc::new(WidgetManager::new(config.widget, client));

    let app = create_router(AppState::new(widgets))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!(
        %addr,
        assistant_url = %config.assistant_url,
        "tripmate listening"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
