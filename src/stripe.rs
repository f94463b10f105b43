use std::collections::HashMap;

use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

const API_BASE: &str = "https://api.stripe.com/v1";

/// Signed webhook timestamps older than this are rejected.
const SIGNATURE_TOLERANCE_SECS: i64 = 300;

pub const EVENT_PAYMENT_INTENT_SUCCEEDED: &str = "payment_intent.succeeded";

pub const STATUS_SUCCEEDED: &str = "succeeded";

#[derive(Debug, Error)]
pub enum StripeError {
    #[error("stripe request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("stripe api error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("invalid webhook signature")]
    InvalidSignature,

    #[error("invalid stripe payload: {0}")]
    Parse(#[from] serde_json::Error),
}

/// The processor-side charge attempt. `metadata` carries the
/// `{user_id, order_id}` binding set at creation; it is the only link
/// between a Stripe charge and a local order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub status: String,
    pub amount: i64,
    pub currency: String,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: WebhookEventData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEventData {
    pub object: serde_json::Value,
}

impl WebhookEvent {
    pub fn payment_intent(&self) -> Result<PaymentIntent, StripeError> {
        let intent = serde_json::from_value(self.data.object.clone())?;
        Ok(intent)
    }
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    message: String,
}

#[derive(Clone)]
pub struct StripeClient {
    http: reqwest::Client,
    secret_key: String,
    webhook_secret: String,
}

impl StripeClient {
    pub fn new(secret_key: impl Into<String>, webhook_secret: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            secret_key: secret_key.into(),
            webhook_secret: webhook_secret.into(),
        }
    }

    pub async fn create_payment_intent(
        &self,
        amount: i64,
        currency: &str,
        metadata: &HashMap<String, String>,
    ) -> Result<PaymentIntent, StripeError> {
        let mut form: Vec<(String, String)> = vec![
            ("amount".into(), amount.to_string()),
            ("currency".into(), currency.to_string()),
            ("automatic_payment_methods[enabled]".into(), "true".into()),
        ];
        for (key, value) in metadata {
            form.push((format!("metadata[{key}]"), value.clone()));
        }

        let response = self
            .http
            .post(format!("{API_BASE}/payment_intents"))
            .bearer_auth(&self.secret_key)
            .form(&form)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    pub async fn retrieve_payment_intent(&self, id: &str) -> Result<PaymentIntent, StripeError> {
        let response = self
            .http
            .get(format!("{API_BASE}/payment_intents/{id}"))
            .bearer_auth(&self.secret_key)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    async fn parse_response(response: reqwest::Response) -> Result<PaymentIntent, StripeError> {
        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            let message = serde_json::from_slice::<ApiErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or_else(|_| String::from_utf8_lossy(&body).into_owned());
            return Err(StripeError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(serde_json::from_slice(&body)?)
    }

    /// Verify the `stripe-signature` header against the raw payload and
    /// parse the event. Nothing is processed when verification fails.
    pub fn construct_event(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<WebhookEvent, StripeError> {
        let (timestamp, signature) =
            parse_signature_header(signature_header).ok_or(StripeError::InvalidSignature)?;

        let now = chrono::Utc::now().timestamp();
        if (now - timestamp).abs() > SIGNATURE_TOLERANCE_SECS {
            return Err(StripeError::InvalidSignature);
        }

        let expected = hex::decode(signature).map_err(|_| StripeError::InvalidSignature)?;
        let mut mac = HmacSha256::new_from_slice(self.webhook_secret.as_bytes())
            .map_err(|_| StripeError::InvalidSignature)?;
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        mac.verify_slice(&expected)
            .map_err(|_| StripeError::InvalidSignature)?;

        Ok(serde_json::from_slice(payload)?)
    }
}

/// Split a `t=<unix>,v1=<hex>` header into its parts.
fn parse_signature_header(header: &str) -> Option<(i64, &str)> {
    let mut timestamp = None;
    let mut signature = None;
    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp = value.parse::<i64>().ok(),
            Some(("v1", value)) => signature = Some(value),
            _ => {}
        }
    }
    Some((timestamp?, signature?))
}
