// handlers/booking_handlers.rs
use axum::{
    extract::{Form, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
};
use tracing::{error, info, warn};
use validator::Validate;

use crate::errors::AppError;
use crate::models::booking::BookingForm;
use crate::services::payment_service::PaymentOutcome;
use crate::state::AppState;

pub const PENDING_PATH: &str = "/payment-pending";
pub const PAYMENT_FAILED_MESSAGE: &str = "Payment initiation failed. Please try again.";

const INDEX_PAGE: &str = include_str!("../../templates/index.html");
const PENDING_PAGE: &str = include_str!("../../templates/payment.html");

pub async fn index() -> Html<&'static str> {
    Html(INDEX_PAGE)
}

pub async fn payment_pending() -> Html<&'static str> {
    Html(PENDING_PAGE)
}

pub async fn pay(
    State(state): State<AppState>,
    Form(form): Form<BookingForm>,
) -> Result<Response, AppError> {
    form.validate()?;

    // Presence is checked by `validate`; emptiness again by the payment service.
    let phone = form.phone.unwrap_or_default();
    let amount = form.amount.unwrap_or_default();

    info!(
        "Booking received from {} ({}) for KSh {}",
        form.name.as_deref().unwrap_or("anonymous"),
        phone,
        amount
    );

    match state.payment_service.initiate_payment(&phone, &amount).await {
        Ok(PaymentOutcome::Pending(response)) => {
            info!(
                "Customer prompted: {}",
                response.customer_message.as_deref().unwrap_or("-")
            );
            Ok((StatusCode::FOUND, [(header::LOCATION, PENDING_PATH)]).into_response())
        }
        Ok(PaymentOutcome::Rejected(response)) => {
            warn!(
                "Payment initiation rejected: {:?}",
                response.response_description
            );
            Ok((StatusCode::BAD_GATEWAY, PAYMENT_FAILED_MESSAGE).into_response())
        }
        Err(e) => {
            error!("Failed to initiate payment: {}", e);
            Err(e)
        }
    }
}
