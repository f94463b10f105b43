use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use utoipa::ToSchema;

pub const FREE_SHIPPING_THRESHOLD: Decimal = dec!(50);
pub const FLAT_SHIPPING_FEE: Decimal = dec!(9.99);
pub const TAX_RATE: Decimal = dec!(0.10);

/// Hard cap on a single cart/order line.
pub const MAX_ITEM_QUANTITY: i32 = 10;

/// A priced line ready for aggregation. `unit_price` already reflects the
/// customization override when one applies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricedLine {
    pub unit_price: Decimal,
    pub quantity: i32,
}

/// The cart page shows subtotal + shipping only; tax is added at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TotalsScope {
    CartView,
    Checkout,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct CartTotals {
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

/// Unit price override rule: a customization snapshot carries the
/// authoritative price for configurable products.
pub fn effective_unit_price(base_price: Decimal, customization_total: Option<Decimal>) -> Decimal {
    customization_total.unwrap_or(base_price)
}

pub fn subtotal(lines: &[PricedLine]) -> Decimal {
    lines
        .iter()
        .map(|line| line.unit_price * Decimal::from(line.quantity))
        .sum()
}

pub fn shipping_fee(subtotal: Decimal) -> Decimal {
    if subtotal > FREE_SHIPPING_THRESHOLD {
        Decimal::ZERO
    } else {
        FLAT_SHIPPING_FEE
    }
}

pub fn sales_tax(subtotal: Decimal) -> Decimal {
    subtotal * TAX_RATE
}

/// Aggregate a cart from scratch. Totals are never cached or adjusted
/// incrementally; every mutation re-runs this over the full line list.
pub fn cart_totals(lines: &[PricedLine], scope: TotalsScope) -> CartTotals {
    let subtotal = subtotal(lines);
    let shipping = shipping_fee(subtotal);
    let tax = match scope {
        TotalsScope::Checkout => sales_tax(subtotal),
        TotalsScope::CartView => Decimal::ZERO,
    };
    CartTotals {
        subtotal,
        shipping,
        tax,
        total: subtotal + shipping + tax,
    }
}
