//! phrasedeck-web: browser frontend for the flashcard pipeline.
//!
//! Serves an upload form at `/`; posting a phrase list to `/create-cards`
//! runs translation and image resolution and returns the finished CSV as a
//! download.

mod api;
mod pipeline;

use std::sync::Arc;

use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use pipeline::Pipeline;

/// Application state shared across all handlers
pub type AppState = Arc<Pipeline>;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Credentials are checked up front so a missing key fails at startup,
    // not on the first request.
    let pipeline = match Pipeline::from_env() {
        Ok(pipeline) => pipeline,
        Err(e) => {
            eprintln!("configuration error: {e}");
            std::process::exit(1);
        }
    };

    let app = api::router()
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(pipeline));

    let addr = std::env::var("PHRASEDECK_WEB_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind listen address");

    tracing::info!("listening on {}", addr);

    axum::serve(listener, app).await.expect("server error");
}
