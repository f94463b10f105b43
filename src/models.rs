use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub name_localized: Option<String>,
    pub description: Option<String>,
    /// Base/display price. For preset products the charged price comes
    /// from the customization snapshot, not this field.
    pub price: Decimal,
    pub images: Vec<String>,
    pub product_type: String,
    pub category: String,
    pub featured: bool,
    pub seasonal: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Structured customization snapshot stored on cart and order lines.
/// `total_price` is server-computed at cart-add and again at order intake.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct Customizations {
    pub text: String,
    pub font: String,
    pub color: String,
    pub size: String,
    pub character_count: i32,
    pub total_price: Decimal,
    pub outdoor: bool,
    pub led_strip: bool,
    pub color_addon: bool,
}

impl Customizations {
    /// Packed selection code kept on the line's `material` column.
    pub fn material_code(&self) -> String {
        format!("{}|{}|{}|{}", self.font, self.color, self.size, self.text)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct Address {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub state: Option<String>,
    pub postal_code: String,
    pub country: String,
}

impl Address {
    pub fn is_complete(&self) -> bool {
        !self.name.trim().is_empty()
            && !self.email.trim().is_empty()
            && !self.line1.trim().is_empty()
            && !self.city.trim().is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CartItem {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub material: Option<String>,
    pub customizations: Option<Customizations>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub total_amount: Decimal,
    pub shipping_address: Address,
    pub billing_address: Option<Address>,
    pub payment_status: String,
    pub status: String,
    pub payment_intent_id: Option<String>,
    pub tracking_number: Option<String>,
    pub confirmation_email_sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    /// Unit price snapshot taken at order time.
    pub price: Decimal,
    pub material: Option<String>,
    pub customizations: Option<Customizations>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Review {
    pub id: Uuid,
    pub product_id: Uuid,
    pub user_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

pub mod payment_status {
    pub const PENDING: &str = "pending";
    pub const PAID: &str = "paid";
}

pub mod order_status {
    pub const PENDING: &str = "pending";
    pub const CONFIRMED: &str = "confirmed";
    pub const SHIPPED: &str = "shipped";
    pub const DELIVERED: &str = "delivered";

    pub const ALL: [&str; 4] = [PENDING, CONFIRMED, SHIPPED, DELIVERED];
}

pub mod category {
    pub const PRESET: &str = "preset";
    pub const INQUIRE: &str = "inquire";
    pub const FINISHED: &str = "finished";

    pub const ALL: [&str; 3] = [PRESET, INQUIRE, FINISHED];
}

pub mod product_type {
    pub const CUSTOM: &str = "custom";
    pub const SEASONAL: &str = "seasonal";

    pub const ALL: [&str; 2] = [CUSTOM, SEASONAL];
}
