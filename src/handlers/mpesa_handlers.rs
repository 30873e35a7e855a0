// handlers/mpesa_handlers.rs
use axum::{body::Bytes, extract::State, Json};
use tracing::{info, warn};

use crate::models::mpesa::AckResponse;
use crate::services::callback_service::{self, CallbackOutcome};
use crate::state::AppState;

/// Gateway webhook. The answer is always the fixed acknowledgment: anything
/// else makes the gateway redeliver.
pub async fn mpesa_callback(State(state): State<AppState>, body: Bytes) -> Json<AckResponse> {
    match callback_service::process_stk_callback(state.booking_store.as_ref(), &body).await {
        Ok(CallbackOutcome::Paid(record)) => {
            info!("Callback processed: paid, receipt {}", record.mpesa_receipt_number)
        }
        Ok(CallbackOutcome::Failed(failure)) => {
            info!("Callback processed: failed, {}", failure.reason)
        }
        Err(e) => warn!("Callback could not be processed: {}", e),
    }

    Json(AckResponse::accepted())
}
