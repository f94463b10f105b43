use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    models::{Customizations, Product},
    totals::CartTotals,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddToCartRequest {
    pub product_id: Uuid,
    pub quantity: i32,
    pub material: Option<String>,
    /// For preset products. `total_price` and `character_count` are
    /// recomputed server-side; client values are ignored.
    pub customizations: Option<Customizations>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCartItemRequest {
    pub quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartLineDto {
    pub id: Uuid,
    pub product: Product,
    pub quantity: i32,
    pub material: Option<String>,
    pub customizations: Option<Customizations>,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartSummary {
    pub items: Vec<CartLineDto>,
    pub totals: CartTotals,
}
