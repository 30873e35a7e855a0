use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "environment": state.config.mpesa_environment.as_str(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
