//! `/top` endpoint handler returning the latest external listing as JSON.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use tracing::{debug, instrument};

use crate::state::SharedState;

/// Handler for the /top endpoint.
#[instrument(skip(state))]
pub async fn top_handler(State(state): State<SharedState>) -> impl IntoResponse {
    debug!("Processing /top request");
    if state.listing.is_none() {
        return (StatusCode::NOT_FOUND, "External listing is disabled").into_response();
    }
    let listing = state.cache.read().await.listing.listing.clone();
    Json(listing).into_response()
}
