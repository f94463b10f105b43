use chrono::Utc;
use make_the_print_api::{
    models::{Address, Order},
    services::email_service::{InvoiceLine, render_buyer_invoice, render_store_notification},
};
use rust_decimal_macros::dec;
use uuid::Uuid;

fn sample_order() -> Order {
    Order {
        id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        total_amount: dec!(29.24),
        shipping_address: Address {
            name: "Dana Areej".into(),
            email: "dana@example.com".into(),
            phone: None,
            line1: "12 Printer Lane".into(),
            line2: None,
            city: "Amman".into(),
            state: None,
            postal_code: "11118".into(),
            country: "JO".into(),
        },
        billing_address: None,
        payment_status: "paid".into(),
        status: "confirmed".into(),
        payment_intent_id: Some("pi_123".into()),
        tracking_number: None,
        confirmation_email_sent_at: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn sample_lines() -> Vec<InvoiceLine> {
    vec![InvoiceLine {
        name: "Custom Wall Lettering".into(),
        quantity: 1,
        unit_price: dec!(17.5),
        line_total: dec!(17.5),
        material: Some("Montserrat|Gold|20cm|HELLO".into()),
    }]
}

#[test]
fn buyer_invoice_carries_items_total_and_address() {
    let html = render_buyer_invoice(&sample_order(), &sample_lines());

    assert!(html.contains("Custom Wall Lettering"));
    assert!(html.contains("Montserrat|Gold|20cm|HELLO"));
    assert!(html.contains("$29.24"));
    assert!(html.contains("Dana Areej"));
    assert!(html.contains("12 Printer Lane"));
    assert!(html.contains("11118 Amman"));
}

#[test]
fn store_notification_carries_contents_and_shipping_address() {
    let html = render_store_notification(&sample_order(), &sample_lines());

    assert!(html.contains("Custom Wall Lettering"));
    assert!(html.contains("dana@example.com"));
    assert!(html.contains("12 Printer Lane"));
    assert!(html.contains("$29.24"));
}

#[test]
fn html_in_user_data_is_escaped() {
    let mut order = sample_order();
    order.shipping_address.name = "<script>alert(1)</script>".into();
    let html = render_buyer_invoice(&order, &sample_lines());

    assert!(!html.contains("<script>"));
    assert!(html.contains("&lt;script&gt;"));
}
