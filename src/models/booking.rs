use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Fields posted by the booking form.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct BookingForm {
    pub name: Option<String>,

    #[validate(required(message = "phone is required"), length(min = 1, message = "phone is required"))]
    pub phone: Option<String>,

    #[validate(required(message = "amount is required"), length(min = 1, message = "amount is required"))]
    pub amount: Option<String>,
}

/// Successful payment as reported by the gateway callback.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PaymentRecord {
    pub amount: String,
    pub phone_number: String,
    pub mpesa_receipt_number: String,
    pub transaction_date: Option<String>,
    pub checkout_request_id: Option<String>,
}

/// A push the gateway accepted and that still waits for its callback.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PendingPayment {
    pub checkout_request_id: String,
    pub merchant_request_id: Option<String>,
    pub phone_number: String,
    pub amount: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FailedPayment {
    pub reason: String,
    pub checkout_request_id: Option<String>,
}
