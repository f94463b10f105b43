use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::{
    models::Product,
    pricing::{InquiryContact, LetteringOptions},
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub name: String,
    pub name_localized: Option<String>,
    pub description: Option<String>,
    pub price: Decimal,
    pub images: Option<Vec<String>>,
    pub product_type: String,
    pub category: String,
    /// Pricing rules for preset products, contact data for inquire
    /// products; validated against the category.
    pub custom_config: Option<Value>,
    pub featured: Option<bool>,
    pub seasonal: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub name_localized: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub images: Option<Vec<String>>,
    pub product_type: Option<String>,
    pub category: Option<String>,
    pub custom_config: Option<Value>,
    pub featured: Option<bool>,
    pub seasonal: Option<bool>,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct ProductList {
    #[schema(value_type = Vec<Product>)]
    pub items: Vec<Product>,
}

/// Product plus whatever purchase surface its category exposes.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lettering: Option<LetteringOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inquiry: Option<InquiryContact>,
}
