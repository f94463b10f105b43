//! Webhook signature verification and event parsing tests.

use hmac::{Hmac, Mac};
use make_the_print_api::stripe::{EVENT_PAYMENT_INTENT_SUCCEEDED, StripeClient};
use sha2::Sha256;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

const WEBHOOK_SECRET: &str = "whsec_test123secret456";

fn test_client() -> StripeClient {
    StripeClient::new("sk_test_xxx", WEBHOOK_SECRET)
}

fn current_timestamp() -> i64 {
    chrono::Utc::now().timestamp()
}

fn compute_signature(payload: &[u8], secret: &str, timestamp: i64) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

fn signed_header(payload: &[u8], secret: &str, timestamp: i64) -> String {
    format!(
        "t={},v1={}",
        timestamp,
        compute_signature(payload, secret, timestamp)
    )
}

fn succeeded_event_payload(user_id: Uuid, order_id: Uuid) -> Vec<u8> {
    serde_json::json!({
        "id": "evt_1",
        "type": EVENT_PAYMENT_INTENT_SUCCEEDED,
        "data": {
            "object": {
                "id": "pi_123",
                "status": "succeeded",
                "amount": 2924,
                "currency": "usd",
                "metadata": {
                    "user_id": user_id.to_string(),
                    "order_id": order_id.to_string()
                }
            }
        }
    })
    .to_string()
    .into_bytes()
}

#[test]
fn valid_signature_is_accepted_and_event_parses() {
    let client = test_client();
    let user_id = Uuid::new_v4();
    let order_id = Uuid::new_v4();
    let payload = succeeded_event_payload(user_id, order_id);
    let header = signed_header(&payload, WEBHOOK_SECRET, current_timestamp());

    let event = client
        .construct_event(&payload, &header)
        .expect("valid signature should verify");
    assert_eq!(event.event_type, EVENT_PAYMENT_INTENT_SUCCEEDED);

    let intent = event.payment_intent().expect("intent");
    assert_eq!(intent.id, "pi_123");
    assert_eq!(intent.status, "succeeded");
    assert_eq!(
        intent.metadata.get("order_id"),
        Some(&order_id.to_string())
    );
    assert_eq!(intent.metadata.get("user_id"), Some(&user_id.to_string()));
}

#[test]
fn wrong_secret_is_rejected() {
    let client = test_client();
    let payload = succeeded_event_payload(Uuid::new_v4(), Uuid::new_v4());
    let header = signed_header(&payload, "wrong_secret", current_timestamp());

    assert!(client.construct_event(&payload, &header).is_err());
}

#[test]
fn tampered_payload_is_rejected() {
    let client = test_client();
    let payload = succeeded_event_payload(Uuid::new_v4(), Uuid::new_v4());
    let header = signed_header(&payload, WEBHOOK_SECRET, current_timestamp());

    let mut tampered = payload.clone();
    tampered.extend_from_slice(b" ");
    assert!(client.construct_event(&tampered, &header).is_err());
}

#[test]
fn stale_timestamp_is_rejected() {
    let client = test_client();
    let payload = succeeded_event_payload(Uuid::new_v4(), Uuid::new_v4());
    // 10 minutes ago, beyond the 5-minute tolerance.
    let stale = current_timestamp() - 600;
    let header = signed_header(&payload, WEBHOOK_SECRET, stale);

    assert!(client.construct_event(&payload, &header).is_err());
}

#[test]
fn malformed_signature_header_is_rejected() {
    let client = test_client();
    let payload = succeeded_event_payload(Uuid::new_v4(), Uuid::new_v4());

    assert!(client.construct_event(&payload, "garbage").is_err());
    assert!(client.construct_event(&payload, "t=notanumber,v1=aa").is_err());
    assert!(
        client
            .construct_event(&payload, &format!("t={}", current_timestamp()))
            .is_err()
    );
    assert!(
        client
            .construct_event(
                &payload,
                &format!("t={},v1=nothex!", current_timestamp())
            )
            .is_err()
    );
}

#[test]
fn event_without_metadata_still_parses_but_has_no_correlation() {
    let client = test_client();
    let payload = serde_json::json!({
        "id": "evt_2",
        "type": EVENT_PAYMENT_INTENT_SUCCEEDED,
        "data": {
            "object": {
                "id": "pi_456",
                "status": "succeeded",
                "amount": 1000,
                "currency": "usd"
            }
        }
    })
    .to_string()
    .into_bytes();
    let header = signed_header(&payload, WEBHOOK_SECRET, current_timestamp());

    let event = client.construct_event(&payload, &header).expect("event");
    let intent = event.payment_intent().expect("intent");
    assert!(intent.metadata.is_empty());
    assert!(make_the_print_api::services::payment_service::intent_correlation(&intent).is_none());
}
