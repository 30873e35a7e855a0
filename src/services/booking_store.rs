// services/booking_store.rs
use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::errors::Result;
use crate::models::booking::{FailedPayment, PaymentRecord, PendingPayment};

/// Where payment outcomes end up. The callback receiver and the payment
/// initiator only talk to this trait, so a database-backed store can replace
/// the in-memory one without touching them.
#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn record_pending(&self, pending: PendingPayment) -> Result<()>;

    async fn record_success(&self, record: PaymentRecord) -> Result<()>;

    async fn record_failure(&self, failure: FailedPayment) -> Result<()>;
}

#[derive(Debug, Default)]
struct StoreInner {
    pending: HashMap<String, PendingPayment>,
    successes: Vec<PaymentRecord>,
    receipts: HashSet<String>,
    failures: Vec<FailedPayment>,
}

/// Process-local store. Successes are deduplicated on the receipt number so a
/// redelivered callback is recorded once.
///
/// Nothing is ever evicted, and a pending entry whose callback never arrives
/// stays forever: this store is unbounded and not meant for long-running
/// production use.
#[derive(Debug, Default)]
pub struct InMemoryBookingStore {
    inner: RwLock<StoreInner>,
}

impl InMemoryBookingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
impl InMemoryBookingStore {
    pub async fn successes(&self) -> Vec<PaymentRecord> {
        self.inner.read().await.successes.clone()
    }

    pub async fn failures(&self) -> Vec<FailedPayment> {
        self.inner.read().await.failures.clone()
    }

    pub async fn pending(&self, checkout_request_id: &str) -> Option<PendingPayment> {
        self.inner.read().await.pending.get(checkout_request_id).cloned()
    }
}

#[async_trait]
impl BookingStore for InMemoryBookingStore {
    async fn record_pending(&self, pending: PendingPayment) -> Result<()> {
        info!(
            "Awaiting callback for checkout {} ({} - KSh {})",
            pending.checkout_request_id, pending.phone_number, pending.amount
        );
        let mut inner = self.inner.write().await;
        inner
            .pending
            .insert(pending.checkout_request_id.clone(), pending);
        Ok(())
    }

    async fn record_success(&self, record: PaymentRecord) -> Result<()> {
        let mut inner = self.inner.write().await;
        if !inner.receipts.insert(record.mpesa_receipt_number.clone()) {
            info!(
                "Duplicate callback for receipt {} ignored",
                record.mpesa_receipt_number
            );
            return Ok(());
        }

        if let Some(checkout_id) = record.checkout_request_id.as_deref() {
            if inner.pending.remove(checkout_id).is_none() {
                warn!("Callback for unknown checkout {}", checkout_id);
            }
        }

        info!(
            "Payment successful! Amount: {}, Phone: {}, M-Pesa Code: {}",
            record.amount, record.phone_number, record.mpesa_receipt_number
        );
        inner.successes.push(record);
        Ok(())
    }

    async fn record_failure(&self, failure: FailedPayment) -> Result<()> {
        let mut inner = self.inner.write().await;
        if let Some(checkout_id) = failure.checkout_request_id.as_deref() {
            inner.pending.remove(checkout_id);
        }

        warn!("Payment failed: {}", failure.reason);
        inner.failures.push(failure);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(receipt: &str, checkout: Option<&str>) -> PaymentRecord {
        PaymentRecord {
            amount: "500".to_string(),
            phone_number: "254712345678".to_string(),
            mpesa_receipt_number: receipt.to_string(),
            transaction_date: None,
            checkout_request_id: checkout.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_duplicate_receipt_recorded_once() {
        let store = InMemoryBookingStore::new();
        store.record_success(record("ABC123", None)).await.unwrap();
        store.record_success(record("ABC123", None)).await.unwrap();
        store.record_success(record("XYZ789", None)).await.unwrap();

        let receipts: Vec<_> = store
            .successes()
            .await
            .into_iter()
            .map(|r| r.mpesa_receipt_number)
            .collect();
        assert_eq!(receipts, vec!["ABC123", "XYZ789"]);
    }

    #[tokio::test]
    async fn test_callback_settles_pending_checkout() {
        let store = InMemoryBookingStore::new();
        store
            .record_pending(PendingPayment {
                checkout_request_id: "ws_CO_1".to_string(),
                merchant_request_id: None,
                phone_number: "254712345678".to_string(),
                amount: "500".to_string(),
                created_at: Utc::now(),
            })
            .await
            .unwrap();
        assert!(store.pending("ws_CO_1").await.is_some());

        store
            .record_success(record("ABC123", Some("ws_CO_1")))
            .await
            .unwrap();
        assert!(store.pending("ws_CO_1").await.is_none());
    }

    #[tokio::test]
    async fn test_failure_is_kept() {
        let store = InMemoryBookingStore::new();
        store
            .record_failure(FailedPayment {
                reason: "Request cancelled by user".to_string(),
                checkout_request_id: None,
            })
            .await
            .unwrap();

        let failures = store.failures().await;
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].reason, "Request cancelled by user");
    }
}
