use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// Per-size pricing row for lettering products. Labels are free-form
/// admin input ("20cm", " Small ") and are matched case-insensitively
/// and trimmed everywhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SizePrice {
    pub label: String,
    pub price_per_character: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct AddonConfig {
    pub enabled: bool,
    pub price: Decimal,
}

/// Admin-defined pricing rules for a preset (configurable) product.
///
/// Every field defaults so that a malformed or partial config degrades to
/// zero prices and empty option lists instead of failing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct PresetConfig {
    pub size_prices: Vec<SizePrice>,
    /// Fallback per-character price, used only when `size_prices` is empty.
    pub price_per_character: Decimal,
    pub colors: Vec<String>,
    pub fonts: Vec<String>,
    pub default_font: Option<String>,
    pub outdoor: AddonConfig,
    pub led_strip: AddonConfig,
    pub color: AddonConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct InquireConfig {
    pub whatsapp_number: Option<String>,
    /// Message template; `{product_name}` is substituted at render time.
    pub whatsapp_message: Option<String>,
}

/// `custom_config` resolved once at the data-access boundary, keyed by the
/// product category. Unknown categories and malformed JSON both land on
/// the degraded variants rather than erroring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "category", rename_all = "lowercase")]
pub enum CustomConfig {
    Preset(PresetConfig),
    Inquire(InquireConfig),
    Finished,
}

impl CustomConfig {
    pub fn resolve(category: &str, raw: Option<&Value>) -> Self {
        match category {
            "preset" => {
                let config = raw
                    .and_then(|v| serde_json::from_value(v.clone()).ok())
                    .unwrap_or_default();
                CustomConfig::Preset(config)
            }
            "inquire" => {
                let config = raw
                    .and_then(|v| serde_json::from_value(v.clone()).ok())
                    .unwrap_or_default();
                CustomConfig::Inquire(config)
            }
            _ => CustomConfig::Finished,
        }
    }

    pub fn as_preset(&self) -> Option<&PresetConfig> {
        match self {
            CustomConfig::Preset(config) => Some(config),
            _ => None,
        }
    }
}

/// Customer selections for a lettering quote.
#[derive(Debug, Clone, Default)]
pub struct LetteringSelection {
    pub text: String,
    pub size: String,
    pub outdoor: bool,
    pub led_strip: bool,
    pub color: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub character_count: i32,
    pub price_per_character: Decimal,
    pub total: Decimal,
}

/// Look up the per-character price for a size label. Unmatched labels
/// price at zero; callers guard against zero-price checkouts.
pub fn price_for_size(size_prices: &[SizePrice], label: &str) -> Decimal {
    let wanted = label.trim().to_lowercase();
    size_prices
        .iter()
        .find(|entry| entry.label.trim().to_lowercase() == wanted)
        .map(|entry| entry.price_per_character)
        .unwrap_or(Decimal::ZERO)
}

/// Size labels in admin-defined order, blank labels dropped.
pub fn size_labels(size_prices: &[SizePrice]) -> Vec<String> {
    size_prices
        .iter()
        .map(|entry| entry.label.trim().to_string())
        .filter(|label| !label.is_empty())
        .collect()
}

impl PresetConfig {
    /// Per-character price for a size, falling back to the flat
    /// `price_per_character` only when no size table is configured.
    pub fn unit_price(&self, size: &str) -> Decimal {
        if self.size_prices.is_empty() {
            self.price_per_character
        } else {
            price_for_size(&self.size_prices, size)
        }
    }

    /// The options a customer is allowed to see. Disabled add-ons are
    /// omitted entirely, not surfaced at zero.
    pub fn customer_options(&self) -> LetteringOptions {
        LetteringOptions {
            sizes: self
                .size_prices
                .iter()
                .filter(|entry| !entry.label.trim().is_empty())
                .map(|entry| SizeOption {
                    label: entry.label.trim().to_string(),
                    price_per_character: entry.price_per_character,
                })
                .collect(),
            colors: self.colors.clone(),
            fonts: self.fonts.clone(),
            default_font: self.default_font.clone(),
            outdoor_price: self.outdoor.enabled.then_some(self.outdoor.price),
            led_strip_price: self.led_strip.enabled.then_some(self.led_strip.price),
            color_price: self.color.enabled.then_some(self.color.price),
        }
    }
}

/// Total price for a lettering selection:
/// characters × per-character price for the chosen size, plus each add-on
/// that is both enabled in the config and selected by the customer.
pub fn quote(config: &PresetConfig, selection: &LetteringSelection) -> Quote {
    let character_count = selection.text.chars().count() as i32;
    let price_per_character = config.unit_price(&selection.size);
    let mut total = Decimal::from(character_count) * price_per_character;

    if config.outdoor.enabled && selection.outdoor {
        total += config.outdoor.price;
    }
    if config.led_strip.enabled && selection.led_strip {
        total += config.led_strip.price;
    }
    if config.color.enabled && selection.color {
        total += config.color.price;
    }

    Quote {
        character_count,
        price_per_character,
        total,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SizeOption {
    pub label: String,
    pub price_per_character: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct LetteringOptions {
    pub sizes: Vec<SizeOption>,
    pub colors: Vec<String>,
    pub fonts: Vec<String>,
    pub default_font: Option<String>,
    pub outdoor_price: Option<Decimal>,
    pub led_strip_price: Option<Decimal>,
    pub color_price: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct InquiryContact {
    pub whatsapp_number: String,
    pub message: String,
}

const DEFAULT_INQUIRY_TEMPLATE: &str = "Hi! I'm interested in {product_name}.";

impl InquireConfig {
    /// Contact CTA for an inquire product. Without a WhatsApp number there
    /// is nothing to render.
    pub fn contact(&self, product_name: &str) -> Option<InquiryContact> {
        let number = self.whatsapp_number.as_deref()?.trim();
        if number.is_empty() {
            return None;
        }
        let template = self
            .whatsapp_message
            .as_deref()
            .filter(|message| !message.trim().is_empty())
            .unwrap_or(DEFAULT_INQUIRY_TEMPLATE);
        Some(InquiryContact {
            whatsapp_number: number.to_string(),
            message: template.replace("{product_name}", product_name),
        })
    }
}
