// Scripted gateway used by service and route tests.
use std::sync::Mutex;

use async_trait::async_trait;

use crate::errors::{AppError, Result};
use crate::models::mpesa::{StkPushRequest, StkPushResponse};
use crate::services::mpesa_service::MpesaGateway;

pub struct FakeGateway {
    token: Option<String>,
    push: Option<StkPushResponse>,
    tokens_used: Mutex<Vec<String>>,
    requests: Mutex<Vec<StkPushRequest>>,
}

impl FakeGateway {
    pub const TOKEN: &'static str = "test-access-token";
    pub const CHECKOUT_ID: &'static str = "ws_CO_191220191020363925";

    pub fn responding(code: &str) -> Self {
        FakeGateway {
            token: Some(Self::TOKEN.to_string()),
            push: Some(StkPushResponse {
                merchant_request_id: Some("29115-34620561-1".to_string()),
                checkout_request_id: Some(Self::CHECKOUT_ID.to_string()),
                response_code: Some(code.to_string()),
                response_description: Some("Success. Request accepted for processing".to_string()),
                customer_message: Some("Success. Request accepted for processing".to_string()),
            }),
            tokens_used: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn accepting() -> Self {
        Self::responding("0")
    }

    pub fn failing_auth() -> Self {
        FakeGateway {
            token: None,
            ..Self::accepting()
        }
    }

    pub fn unreachable() -> Self {
        FakeGateway {
            push: None,
            ..Self::accepting()
        }
    }

    pub fn sent_requests(&self) -> Vec<StkPushRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn tokens_used(&self) -> Vec<String> {
        self.tokens_used.lock().unwrap().clone()
    }
}

#[async_trait]
impl MpesaGateway for FakeGateway {
    async fn get_access_token(&self) -> Result<String> {
        self.token
            .clone()
            .ok_or_else(|| AppError::auth("token endpoint returned 401 Unauthorized"))
    }

    async fn send_stk_push(
        &self,
        access_token: &str,
        request: &StkPushRequest,
    ) -> Result<StkPushResponse> {
        self.tokens_used.lock().unwrap().push(access_token.to_string());
        self.requests.lock().unwrap().push(request.clone());
        self.push
            .clone()
            .ok_or_else(|| AppError::gateway("push request failed: connection refused"))
    }
}
