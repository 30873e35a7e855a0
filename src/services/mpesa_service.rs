// services/mpesa_service.rs
use std::sync::Arc;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as base64, Engine as _};
use reqwest::{header, Client};
use tracing::{error, info};

use crate::config::AppConfig;
use crate::errors::{AppError, Result};
use crate::models::mpesa::{AuthResponse, StkPushRequest, StkPushResponse};

/// The two Daraja calls a booking needs.
#[async_trait]
pub trait MpesaGateway: Send + Sync {
    /// Exchanges the consumer credentials for a bearer token. Never cached.
    async fn get_access_token(&self) -> Result<String>;

    async fn send_stk_push(
        &self,
        access_token: &str,
        request: &StkPushRequest,
    ) -> Result<StkPushResponse>;
}

#[derive(Debug, Clone)]
pub struct MpesaService {
    config: Arc<AppConfig>,
    client: Client,
}

impl MpesaService {
    pub fn new(config: Arc<AppConfig>) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(MpesaService { config, client })
    }

    fn basic_auth_header(&self) -> String {
        basic_auth_header(
            &self.config.mpesa_consumer_key,
            &self.config.mpesa_consumer_secret,
        )
    }
}

pub fn basic_auth_header(consumer_key: &str, consumer_secret: &str) -> String {
    let auth_string = format!("{}:{}", consumer_key, consumer_secret);
    format!("Basic {}", base64.encode(auth_string))
}

#[async_trait]
impl MpesaGateway for MpesaService {
    async fn get_access_token(&self) -> Result<String> {
        info!("Requesting new access token");

        let response = self
            .client
            .get(self.config.auth_url())
            .header(header::AUTHORIZATION, self.basic_auth_header())
            .send()
            .await
            .map_err(|e| AppError::auth(format!("token request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("Failed to get access token: {} - {}", status, body);
            return Err(AppError::auth(format!("token endpoint returned {}", status)));
        }

        let auth_response: AuthResponse = response
            .json()
            .await
            .map_err(|e| AppError::auth(format!("unreadable token response: {}", e)))?;

        let token = auth_response
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::auth("token response did not include an access_token"))?;

        info!(
            "Access token obtained (length {}, expires in {:?}s)",
            token.len(),
            auth_response.expires_in
        );
        Ok(token)
    }

    async fn send_stk_push(
        &self,
        access_token: &str,
        request: &StkPushRequest,
    ) -> Result<StkPushResponse> {
        info!(
            "STK push for {} - KSh {}",
            request.phone_number, request.amount
        );

        let response = self
            .client
            .post(self.config.stk_push_url())
            .header(header::AUTHORIZATION, format!("Bearer {}", access_token))
            .header(header::CONTENT_TYPE, "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| AppError::gateway(format!("push request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("STK push failed: {} - {}", status, body);
            return Err(AppError::gateway(format!("push endpoint returned {}", status)));
        }

        let stk_response: StkPushResponse = response
            .json()
            .await
            .map_err(|e| AppError::gateway(format!("unreadable push response: {}", e)))?;

        info!(
            "STK push acknowledged: code {:?}, checkout {:?}",
            stk_response.response_code, stk_response.checkout_request_id
        );
        Ok(stk_response)
    }
}
