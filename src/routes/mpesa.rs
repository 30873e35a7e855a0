use axum::{routing::post, Router};

use crate::handlers::mpesa_handlers;
use crate::state::AppState;

pub fn mpesa_routes() -> Router<AppState> {
    Router::new().route("/callback", post(mpesa_handlers::mpesa_callback))
}
