use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::booking_store::BookingStore;
use crate::services::mpesa_service::MpesaGateway;
use crate::services::payment_service::PaymentService;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub payment_service: Arc<PaymentService>,
    pub booking_store: Arc<dyn BookingStore>,
}

impl AppState {
    pub fn new(
        config: Arc<AppConfig>,
        gateway: Arc<dyn MpesaGateway>,
        booking_store: Arc<dyn BookingStore>,
    ) -> Self {
        let payment_service = Arc::new(PaymentService::new(
            config.clone(),
            gateway,
            booking_store.clone(),
        ));

        AppState {
            config,
            payment_service,
            booking_store,
        }
    }
}
