use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Address, Customizations, Order, OrderItem};

#[derive(Debug, Deserialize, ToSchema)]
pub struct OrderItemInput {
    pub product_id: Uuid,
    pub quantity: i32,
    pub material: Option<String>,
    pub customizations: Option<Customizations>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePendingOrderRequest {
    /// The total the client believes it is paying. The server recomputes
    /// the authoritative total and rejects on mismatch.
    pub total_amount: Decimal,
    pub shipping_address: Address,
    pub billing_address: Option<Address>,
    pub items: Vec<OrderItemInput>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderCreated {
    pub order_id: Uuid,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ConfirmPaidRequest {
    pub order_id: Uuid,
    pub payment_intent_id: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ConfirmPaidResponse {
    pub order_id: Uuid,
    pub already_paid: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<Order>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItem>,
}
