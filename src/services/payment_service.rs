// services/payment_service.rs
use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD as base64, Engine as _};
use chrono::{Local, Utc};
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::errors::{AppError, Result};
use crate::models::booking::PendingPayment;
use crate::models::mpesa::{StkPushRequest, StkPushResponse, TRANSACTION_TYPE_PAYBILL_ONLINE};
use crate::services::booking_store::BookingStore;
use crate::services::mpesa_service::MpesaGateway;

const TRUNK_PREFIX: &str = "0";
const COUNTRY_CODE: &str = "254";

#[derive(Debug)]
pub enum PaymentOutcome {
    /// The gateway accepted the push; the customer now sees the prompt.
    Pending(StkPushResponse),
    Rejected(StkPushResponse),
}

/// Rewrites a leading trunk `0` to the country code. Anything else, malformed
/// or not, is handed to the gateway untouched.
pub fn normalize_phone(phone: &str) -> String {
    match phone.strip_prefix(TRUNK_PREFIX) {
        Some(rest) => format!("{}{}", COUNTRY_CODE, rest),
        None => phone.to_string(),
    }
}

pub fn generate_timestamp() -> String {
    Local::now().format("%Y%m%d%H%M%S").to_string()
}

pub fn generate_password(short_code: &str, passkey: &str, timestamp: &str) -> String {
    base64.encode(format!("{}{}{}", short_code, passkey, timestamp))
}

/// Builds the push payload. The password is derived from the same `timestamp`
/// that goes into the payload.
pub fn build_stk_push_request(
    config: &AppConfig,
    phone: &str,
    amount: &str,
    timestamp: &str,
) -> StkPushRequest {
    StkPushRequest {
        business_short_code: config.mpesa_short_code.clone(),
        password: generate_password(&config.mpesa_short_code, &config.mpesa_passkey, timestamp),
        timestamp: timestamp.to_string(),
        transaction_type: TRANSACTION_TYPE_PAYBILL_ONLINE.to_string(),
        amount: amount.to_string(),
        party_a: phone.to_string(),
        party_b: config.mpesa_short_code.clone(),
        phone_number: phone.to_string(),
        callback_url: config.mpesa_callback_url.clone(),
        account_reference: config.account_reference.clone(),
        transaction_desc: config.transaction_desc.clone(),
    }
}

fn validate_booking(phone: &str, amount: &str) -> Result<()> {
    if phone.trim().is_empty() {
        return Err(AppError::invalid_data("phone is required"));
    }
    let parsed = amount
        .trim()
        .parse::<f64>()
        .map_err(|_| AppError::invalid_data(format!("amount '{}' is not a number", amount)))?;
    if !parsed.is_finite() || parsed <= 0.0 {
        return Err(AppError::invalid_data("amount must be greater than 0"));
    }
    Ok(())
}

pub struct PaymentService {
    config: Arc<AppConfig>,
    gateway: Arc<dyn MpesaGateway>,
    store: Arc<dyn BookingStore>,
}

impl PaymentService {
    pub fn new(
        config: Arc<AppConfig>,
        gateway: Arc<dyn MpesaGateway>,
        store: Arc<dyn BookingStore>,
    ) -> Self {
        PaymentService {
            config,
            gateway,
            store,
        }
    }

    pub async fn initiate_payment(&self, phone: &str, amount: &str) -> Result<PaymentOutcome> {
        validate_booking(phone, amount)?;

        let phone = normalize_phone(phone);
        let access_token = self.gateway.get_access_token().await?;

        let timestamp = generate_timestamp();
        let request = build_stk_push_request(&self.config, &phone, amount, &timestamp);

        let response = self.gateway.send_stk_push(&access_token, &request).await?;
        if !response.is_accepted() {
            warn!(
                "STK push rejected: code {:?} - {:?}",
                response.response_code, response.response_description
            );
            return Ok(PaymentOutcome::Rejected(response));
        }

        if let Some(checkout_request_id) = response.checkout_request_id.clone() {
            let pending = PendingPayment {
                checkout_request_id,
                merchant_request_id: response.merchant_request_id.clone(),
                phone_number: phone,
                amount: amount.to_string(),
                created_at: Utc::now(),
            };
            // The push already went out; a bookkeeping failure must not hide that.
            if let Err(e) = self.store.record_pending(pending).await {
                warn!("Could not record pending payment: {}", e);
            }
        }

        info!("STK push accepted, customer prompt sent");
        Ok(PaymentOutcome::Pending(response))
    }
}
