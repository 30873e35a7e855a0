// services/callback_service.rs
use serde_json::Value;
use tracing::info;

use crate::errors::{AppError, Result};
use crate::models::booking::{FailedPayment, PaymentRecord};
use crate::models::mpesa::{CallbackMetadata, MpesaCallback};
use crate::services::booking_store::BookingStore;

const ITEM_AMOUNT: &str = "Amount";
const ITEM_RECEIPT: &str = "MpesaReceiptNumber";
const ITEM_PHONE: &str = "PhoneNumber";
const ITEM_TRANSACTION_DATE: &str = "TransactionDate";

#[derive(Debug, PartialEq)]
pub enum CallbackOutcome {
    Paid(PaymentRecord),
    Failed(FailedPayment),
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Pulls the success fields out of the metadata. Every absent required item is
/// reported in one error.
fn extract_payment(
    metadata: Option<&CallbackMetadata>,
    checkout_request_id: Option<String>,
) -> Result<PaymentRecord> {
    let empty = CallbackMetadata::default();
    let metadata = metadata.unwrap_or(&empty);

    let amount = metadata.find(ITEM_AMOUNT);
    let receipt = metadata.find(ITEM_RECEIPT);
    let phone = metadata.find(ITEM_PHONE);

    match (amount, receipt, phone) {
        (Some(amount), Some(receipt), Some(phone)) => Ok(PaymentRecord {
            amount: value_to_string(amount),
            phone_number: value_to_string(phone),
            mpesa_receipt_number: value_to_string(receipt),
            transaction_date: metadata.find(ITEM_TRANSACTION_DATE).map(value_to_string),
            checkout_request_id,
        }),
        _ => {
            let missing: Vec<&str> = [
                (ITEM_AMOUNT, amount.is_none()),
                (ITEM_RECEIPT, receipt.is_none()),
                (ITEM_PHONE, phone.is_none()),
            ]
            .iter()
            .filter(|(_, absent)| *absent)
            .map(|(name, _)| *name)
            .collect();
            Err(AppError::callback(format!(
                "missing callback metadata items: {}",
                missing.join(", ")
            )))
        }
    }
}

/// Parses a raw callback body and hands the outcome to the booking store.
pub async fn process_stk_callback(store: &dyn BookingStore, body: &[u8]) -> Result<CallbackOutcome> {
    let callback: MpesaCallback =
        serde_json::from_slice(body).map_err(|e| AppError::callback(e.to_string()))?;
    let result = callback.body.stk_callback;

    info!(
        "Callback for checkout {:?} (merchant request {:?}): result code {}",
        result.checkout_request_id, result.merchant_request_id, result.result_code
    );

    if result.is_success() {
        let record = extract_payment(
            result.callback_metadata.as_ref(),
            result.checkout_request_id.clone(),
        )?;
        store.record_success(record.clone()).await?;
        Ok(CallbackOutcome::Paid(record))
    } else {
        let failure = FailedPayment {
            reason: result
                .result_desc
                .unwrap_or_else(|| "no result description".to_string()),
            checkout_request_id: result.checkout_request_id,
        };
        store.record_failure(failure.clone()).await?;
        Ok(CallbackOutcome::Failed(failure))
    }
}
