use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::booking_handlers;
use crate::state::AppState;

pub fn booking_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(booking_handlers::index))
        .route("/pay", post(booking_handlers::pay))
        .route(booking_handlers::PENDING_PATH, get(booking_handlers::payment_pending))
}
