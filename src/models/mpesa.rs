use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const TRANSACTION_TYPE_PAYBILL_ONLINE: &str = "CustomerPayBillOnline";

/// Push acknowledgment sentinel. The push endpoint answers with a string code.
pub const PUSH_ACCEPTED_CODE: &str = "0";

/// Callback sentinel. The webhook reports its result as a number, unlike the
/// push acknowledgment.
pub const CALLBACK_SUCCESS_CODE: i64 = 0;

#[derive(Debug, Deserialize)]
pub struct AuthResponse {
    pub access_token: Option<String>,
    // Sandbox sends a string, some deployments a number.
    pub expires_in: Option<Value>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StkPushRequest {
    #[serde(rename = "BusinessShortCode")]
    pub business_short_code: String,
    #[serde(rename = "Password")]
    pub password: String,
    #[serde(rename = "Timestamp")]
    pub timestamp: String,
    #[serde(rename = "TransactionType")]
    pub transaction_type: String,
    #[serde(rename = "Amount")]
    pub amount: String,
    #[serde(rename = "PartyA")]
    pub party_a: String,
    #[serde(rename = "PartyB")]
    pub party_b: String,
    #[serde(rename = "PhoneNumber")]
    pub phone_number: String,
    #[serde(rename = "CallBackURL")]
    pub callback_url: String,
    #[serde(rename = "AccountReference")]
    pub account_reference: String,
    #[serde(rename = "TransactionDesc")]
    pub transaction_desc: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StkPushResponse {
    #[serde(rename = "MerchantRequestID", default)]
    pub merchant_request_id: Option<String>,
    #[serde(rename = "CheckoutRequestID", default)]
    pub checkout_request_id: Option<String>,
    #[serde(rename = "ResponseCode", default)]
    pub response_code: Option<String>,
    #[serde(rename = "ResponseDescription", default)]
    pub response_description: Option<String>,
    #[serde(rename = "CustomerMessage", default)]
    pub customer_message: Option<String>,
}

impl StkPushResponse {
    pub fn is_accepted(&self) -> bool {
        self.response_code.as_deref() == Some(PUSH_ACCEPTED_CODE)
    }
}

// Callback Request
#[derive(Debug, Deserialize)]
pub struct MpesaCallback {
    #[serde(rename = "Body")]
    pub body: CallbackBody,
}

#[derive(Debug, Deserialize)]
pub struct CallbackBody {
    #[serde(rename = "stkCallback")]
    pub stk_callback: StkCallback,
}

#[derive(Debug, Deserialize)]
pub struct StkCallback {
    #[serde(rename = "MerchantRequestID", default)]
    pub merchant_request_id: Option<String>,

    #[serde(rename = "CheckoutRequestID", default)]
    pub checkout_request_id: Option<String>,

    #[serde(rename = "ResultCode", default)]
    pub result_code: Value,

    #[serde(rename = "ResultDesc", default)]
    pub result_desc: Option<String>,

    #[serde(rename = "CallbackMetadata", default)]
    pub callback_metadata: Option<CallbackMetadata>,
}

impl StkCallback {
    /// Only the numeric zero counts as success; a string "0" does not.
    pub fn is_success(&self) -> bool {
        self.result_code.as_i64() == Some(CALLBACK_SUCCESS_CODE)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CallbackMetadata {
    #[serde(rename = "Item", default)]
    pub items: Vec<CallbackItem>,
}

impl CallbackMetadata {
    /// Items arrive as an unordered list, so lookup is always by name.
    pub fn find(&self, name: &str) -> Option<&Value> {
        self.items
            .iter()
            .find(|item| item.name == name)
            .and_then(|item| item.value.as_ref())
    }
}

#[derive(Debug, Deserialize)]
pub struct CallbackItem {
    #[serde(rename = "Name")]
    pub name: String,

    #[serde(rename = "Value", default)]
    pub value: Option<Value>,
}

/// Fixed answer to every callback delivery. It acknowledges receipt, not payment.
#[derive(Debug, Serialize)]
pub struct AckResponse {
    #[serde(rename = "ResultCode")]
    pub result_code: i32,
    #[serde(rename = "ResultDesc")]
    pub result_desc: &'static str,
}

impl AckResponse {
    pub fn accepted() -> Self {
        AckResponse {
            result_code: 0,
            result_desc: "Accepted",
        }
    }
}
