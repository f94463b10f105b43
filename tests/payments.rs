//! Pure reconciliation helpers: amount conversion and the metadata
//! binding that ties a processor charge to a local order.

use std::collections::HashMap;

use make_the_print_api::{
    error::AppError,
    services::payment_service::{charge_amount_cents, intent_correlation, verify_intent_binding},
    stripe::PaymentIntent,
};
use rust_decimal_macros::dec;
use uuid::Uuid;

fn intent_with_metadata(metadata: HashMap<String, String>) -> PaymentIntent {
    PaymentIntent {
        id: "pi_123".into(),
        status: "succeeded".into(),
        amount: 2924,
        currency: "usd".into(),
        client_secret: None,
        metadata,
    }
}

fn bound_intent(user_id: Uuid, order_id: Uuid) -> PaymentIntent {
    let mut metadata = HashMap::new();
    metadata.insert("user_id".into(), user_id.to_string());
    metadata.insert("order_id".into(), order_id.to_string());
    intent_with_metadata(metadata)
}

#[test]
fn totals_convert_to_minor_units() {
    assert_eq!(charge_amount_cents(dec!(29.24)).unwrap(), 2924);
    assert_eq!(charge_amount_cents(dec!(65.978)).unwrap(), 6598);
    assert_eq!(charge_amount_cents(dec!(100)).unwrap(), 10000);
    assert_eq!(charge_amount_cents(dec!(0.01)).unwrap(), 1);
}

#[test]
fn matching_binding_passes() {
    let user_id = Uuid::new_v4();
    let order_id = Uuid::new_v4();
    let intent = bound_intent(user_id, order_id);

    assert!(verify_intent_binding(&intent, user_id, order_id).is_ok());
    assert_eq!(intent_correlation(&intent), Some((user_id, order_id)));
}

#[test]
fn intent_for_a_different_order_is_rejected() {
    let user_id = Uuid::new_v4();
    let intent = bound_intent(user_id, Uuid::new_v4());

    let err = verify_intent_binding(&intent, user_id, Uuid::new_v4()).unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
}

#[test]
fn intent_for_a_different_user_is_rejected() {
    let order_id = Uuid::new_v4();
    let intent = bound_intent(Uuid::new_v4(), order_id);

    let err = verify_intent_binding(&intent, Uuid::new_v4(), order_id).unwrap_err();
    assert!(matches!(err, AppError::Forbidden));
}

#[test]
fn missing_metadata_fails_closed() {
    let intent = intent_with_metadata(HashMap::new());

    assert!(verify_intent_binding(&intent, Uuid::new_v4(), Uuid::new_v4()).is_err());
    assert_eq!(intent_correlation(&intent), None);
}
