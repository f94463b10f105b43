use make_the_print_api::totals::{
    FLAT_SHIPPING_FEE, MAX_ITEM_QUANTITY, PricedLine, TotalsScope, cart_totals,
    effective_unit_price, sales_tax, shipping_fee, subtotal,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

#[test]
fn customization_total_overrides_base_price() {
    assert_eq!(effective_unit_price(dec!(12.99), Some(dec!(17.5))), dec!(17.5));
    assert_eq!(effective_unit_price(dec!(12.99), None), dec!(12.99));
}

#[test]
fn two_units_over_threshold_ship_free() {
    let lines = [PricedLine {
        unit_price: dec!(29.99),
        quantity: 2,
    }];

    assert_eq!(subtotal(&lines), dec!(59.98));

    let cart = cart_totals(&lines, TotalsScope::CartView);
    assert_eq!(cart.subtotal, dec!(59.98));
    assert_eq!(cart.shipping, Decimal::ZERO);
    assert_eq!(cart.tax, Decimal::ZERO);
    assert_eq!(cart.total, dec!(59.98));

    let checkout = cart_totals(&lines, TotalsScope::Checkout);
    assert_eq!(checkout.tax, dec!(5.998));
    assert_eq!(checkout.total, dec!(65.978));
}

#[test]
fn subtotal_of_exactly_fifty_still_pays_shipping() {
    assert_eq!(shipping_fee(dec!(50)), FLAT_SHIPPING_FEE);
    assert_eq!(shipping_fee(dec!(50.01)), Decimal::ZERO);
    assert_eq!(shipping_fee(dec!(17.5)), dec!(9.99));
}

#[test]
fn checkout_applies_ten_percent_tax() {
    assert_eq!(sales_tax(dec!(17.5)), dec!(1.750));

    let lines = [PricedLine {
        unit_price: dec!(17.5),
        quantity: 1,
    }];
    let checkout = cart_totals(&lines, TotalsScope::Checkout);
    assert_eq!(checkout.shipping, dec!(9.99));
    assert_eq!(checkout.total, dec!(29.24));
}

#[test]
fn totals_sum_across_lines() {
    let lines = [
        PricedLine {
            unit_price: dec!(17.5),
            quantity: 2,
        },
        PricedLine {
            unit_price: dec!(12.99),
            quantity: 1,
        },
    ];
    assert_eq!(subtotal(&lines), dec!(47.99));
}

#[test]
fn line_quantity_cap_is_ten() {
    assert_eq!(MAX_ITEM_QUANTITY, 10);
}
