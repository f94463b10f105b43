use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePaymentIntentRequest {
    pub order_id: Uuid,
    pub currency: Option<String>,
    /// Extra metadata forwarded to the processor. The server-set
    /// `user_id`/`order_id` keys always win.
    pub metadata: Option<HashMap<String, String>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentIntentCreated {
    pub client_secret: String,
    pub payment_intent_id: String,
}
