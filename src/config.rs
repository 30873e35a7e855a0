// config.rs
use std::env;
use std::time::Duration;

use crate::errors::{AppError, Result};

const SANDBOX_BASE_URL: &str = "https://sandbox.safaricom.co.ke";
const PRODUCTION_BASE_URL: &str = "https://api.safaricom.co.ke";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MpesaEnvironment {
    Sandbox,
    Production,
}

impl MpesaEnvironment {
    fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "sandbox" => Ok(MpesaEnvironment::Sandbox),
            "production" => Ok(MpesaEnvironment::Production),
            _ => Err(AppError::configuration(
                "MPESA_ENVIRONMENT must be sandbox or production",
            )),
        }
    }

    fn default_base_url(&self) -> &'static str {
        match self {
            MpesaEnvironment::Production => PRODUCTION_BASE_URL,
            MpesaEnvironment::Sandbox => SANDBOX_BASE_URL,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MpesaEnvironment::Sandbox => "sandbox",
            MpesaEnvironment::Production => "production",
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub mpesa_consumer_key: String,
    pub mpesa_consumer_secret: String,
    pub mpesa_short_code: String,
    pub mpesa_passkey: String,
    pub mpesa_callback_url: String,
    pub mpesa_environment: MpesaEnvironment,
    /// Gateway host. Follows the environment unless `MPESA_BASE_URL` is set.
    pub mpesa_base_url: String,
    pub account_reference: String,
    pub transaction_desc: String,
    pub http_timeout: Duration,
    pub port: u16,
    pub host: String,
}

impl AppConfig {
    /// Loads the configuration once at startup. Every gateway credential is
    /// required, so a missing one stops the process before it binds a port.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<String> {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| AppError::configuration(format!("{} must be set", key)))
        };
        let optional = |key: &str, default: &str| -> String {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let callback_base = required("CALLBACK_BASE_URL")?;
        let mpesa_callback_url = format!("{}/callback", callback_base.trim_end_matches('/'));

        let http_timeout = optional("HTTP_TIMEOUT_SECS", "30")
            .parse::<u64>()
            .map_err(|_| AppError::configuration("HTTP_TIMEOUT_SECS must be a number"))?;
        if http_timeout == 0 {
            return Err(AppError::configuration("HTTP_TIMEOUT_SECS must be greater than 0"));
        }

        let mpesa_environment = MpesaEnvironment::parse(&optional("MPESA_ENVIRONMENT", "sandbox"))?;
        let mpesa_base_url = lookup("MPESA_BASE_URL")
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| mpesa_environment.default_base_url().to_string());

        let port = optional("PORT", "5000")
            .parse::<u16>()
            .map_err(|_| AppError::configuration("PORT must be a number"))?;

        Ok(AppConfig {
            mpesa_consumer_key: required("MPESA_CONSUMER_KEY")?,
            mpesa_consumer_secret: required("MPESA_CONSUMER_SECRET")?,
            mpesa_short_code: required("MPESA_SHORT_CODE")?,
            mpesa_passkey: required("MPESA_PASSKEY")?,
            mpesa_callback_url,
            mpesa_environment,
            mpesa_base_url,
            account_reference: optional("MPESA_ACCOUNT_REFERENCE", "AmbururuBooking"),
            transaction_desc: optional("MPESA_TRANSACTION_DESC", "Book Service"),
            http_timeout: Duration::from_secs(http_timeout),
            port,
            host: optional("HOST", "0.0.0.0"),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.mpesa_base_url
    }

    pub fn auth_url(&self) -> String {
        format!("{}/oauth/v1/generate?grant_type=client_credentials", self.base_url())
    }

    pub fn stk_push_url(&self) -> String {
        format!("{}/mpesa/stkpush/v1/processrequest", self.base_url())
    }

    pub fn is_production(&self) -> bool {
        self.mpesa_environment == MpesaEnvironment::Production
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> AppConfig {
    AppConfig {
        mpesa_consumer_key: "key".to_string(),
        mpesa_consumer_secret: "secret".to_string(),
        mpesa_short_code: "174379".to_string(),
        mpesa_passkey: "passkey".to_string(),
        mpesa_callback_url: "https://bookings.example.com/callback".to_string(),
        mpesa_environment: MpesaEnvironment::Sandbox,
        mpesa_base_url: SANDBOX_BASE_URL.to_string(),
        account_reference: "AmbururuBooking".to_string(),
        transaction_desc: "Book Service".to_string(),
        http_timeout: Duration::from_secs(5),
        port: 5000,
        host: "127.0.0.1".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const COMPLETE: &[(&str, &str)] = &[
        ("MPESA_CONSUMER_KEY", "key"),
        ("MPESA_CONSUMER_SECRET", "secret"),
        ("MPESA_SHORT_CODE", "174379"),
        ("MPESA_PASSKEY", "passkey"),
        ("CALLBACK_BASE_URL", "https://bookings.example.com/"),
    ];

    #[test]
    fn test_loads_with_defaults() {
        let config = AppConfig::from_lookup(lookup_from(COMPLETE)).unwrap();
        assert_eq!(config.mpesa_callback_url, "https://bookings.example.com/callback");
        assert_eq!(config.account_reference, "AmbururuBooking");
        assert_eq!(config.transaction_desc, "Book Service");
        assert_eq!(config.http_timeout, Duration::from_secs(30));
        assert_eq!(config.port, 5000);
        assert!(!config.is_production());
        assert_eq!(
            config.auth_url(),
            "https://sandbox.safaricom.co.ke/oauth/v1/generate?grant_type=client_credentials"
        );
    }

    #[test]
    fn test_missing_credential_fails_fast() {
        let pairs: Vec<_> = COMPLETE
            .iter()
            .copied()
            .filter(|(k, _)| *k != "MPESA_PASSKEY")
            .collect();
        let err = AppConfig::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert!(matches!(err, AppError::ConfigurationError(ref m) if m.contains("MPESA_PASSKEY")));
    }

    #[test]
    fn test_blank_value_counts_as_missing() {
        let pairs: Vec<_> = COMPLETE
            .iter()
            .map(|&(k, v)| if k == "MPESA_SHORT_CODE" { (k, "   ") } else { (k, v) })
            .collect();
        assert!(AppConfig::from_lookup(lookup_from(&pairs)).is_err());
    }

    #[test]
    fn test_production_environment_switches_host() {
        let mut pairs = COMPLETE.to_vec();
        pairs.push(("MPESA_ENVIRONMENT", "production"));
        let config = AppConfig::from_lookup(lookup_from(&pairs)).unwrap();
        assert!(config.is_production());
        assert_eq!(
            config.stk_push_url(),
            "https://api.safaricom.co.ke/mpesa/stkpush/v1/processrequest"
        );
    }

    #[test]
    fn test_unknown_environment_is_rejected() {
        for value in ["prod", "live", "Sandboxx"] {
            let mut pairs = COMPLETE.to_vec();
            pairs.push(("MPESA_ENVIRONMENT", value));
            let err = AppConfig::from_lookup(lookup_from(&pairs)).unwrap_err();
            assert!(
                matches!(err, AppError::ConfigurationError(ref m) if m.contains("MPESA_ENVIRONMENT")),
                "{}",
                value
            );
        }
    }

    #[test]
    fn test_environment_is_case_insensitive() {
        let mut pairs = COMPLETE.to_vec();
        pairs.push(("MPESA_ENVIRONMENT", " Production "));
        assert!(AppConfig::from_lookup(lookup_from(&pairs)).unwrap().is_production());
    }

    #[test]
    fn test_base_url_override() {
        let mut pairs = COMPLETE.to_vec();
        pairs.push(("MPESA_BASE_URL", "http://127.0.0.1:9000/"));
        let config = AppConfig::from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(config.base_url(), "http://127.0.0.1:9000");
        assert_eq!(
            config.stk_push_url(),
            "http://127.0.0.1:9000/mpesa/stkpush/v1/processrequest"
        );
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let mut pairs = COMPLETE.to_vec();
        pairs.push(("HTTP_TIMEOUT_SECS", "0"));
        let err = AppConfig::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert!(matches!(err, AppError::ConfigurationError(ref m) if m.contains("HTTP_TIMEOUT_SECS")));
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let mut pairs = COMPLETE.to_vec();
        pairs.push(("PORT", "not-a-port"));
        assert!(AppConfig::from_lookup(lookup_from(&pairs)).is_err());
    }
}
