pub mod create_cards;
pub mod home;

use axum::routing::{get, post};
use axum::Router;
use serde::Serialize;

use crate::AppState;

/// Shared error response used by all endpoints
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/create-cards", post(create_cards::create_cards))
}
