use std::collections::HashMap;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, Condition, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    db::DbPool,
    dto::{
        orders::{ConfirmPaidRequest, ConfirmPaidResponse},
        payments::{CreatePaymentIntentRequest, PaymentIntentCreated},
    },
    entity::orders::{Column as OrderCol, Entity as Orders, Model as OrderModel},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::payment_status,
    response::{ApiResponse, Meta},
    services::{cart_service, email_service},
    state::AppState,
    stripe::{self, PaymentIntent, WebhookEvent},
};

/// Who is allowed to touch an order during reconciliation.
///
/// `Session` is the end-user path: the order is looked up under the
/// caller's own id. `Privileged` is the webhook path, where no session
/// exists and the identity comes from the verified intent metadata.
/// Keeping the two explicit stops a handler from silently escalating.
#[derive(Debug, Clone, Copy)]
pub enum OrderAccess<'a> {
    Session(&'a AuthUser),
    Privileged { user_id: Uuid },
}

impl OrderAccess<'_> {
    fn user_id(&self) -> Uuid {
        match self {
            OrderAccess::Session(user) => user.user_id,
            OrderAccess::Privileged { user_id } => *user_id,
        }
    }
}

/// Convert an order total to the processor's minor units.
pub fn charge_amount_cents(total: Decimal) -> AppResult<i64> {
    (total * dec!(100))
        .round()
        .to_i64()
        .ok_or_else(|| AppError::BadRequest("Order total is out of range".into()))
}

/// The metadata binding is the only link between a processor charge and a
/// local order; both halves must match before anything transitions.
pub fn verify_intent_binding(
    intent: &PaymentIntent,
    user_id: Uuid,
    order_id: Uuid,
) -> Result<(), AppError> {
    let meta_user = intent
        .metadata
        .get("user_id")
        .and_then(|v| Uuid::parse_str(v).ok());
    if meta_user != Some(user_id) {
        return Err(AppError::Forbidden);
    }

    let meta_order = intent
        .metadata
        .get("order_id")
        .and_then(|v| Uuid::parse_str(v).ok());
    if meta_order != Some(order_id) {
        return Err(AppError::BadRequest(
            "Payment does not belong to this order".into(),
        ));
    }
    Ok(())
}

/// `{user_id, order_id}` parsed out of an intent's metadata, if present.
pub fn intent_correlation(intent: &PaymentIntent) -> Option<(Uuid, Uuid)> {
    let user_id = intent
        .metadata
        .get("user_id")
        .and_then(|v| Uuid::parse_str(v).ok())?;
    let order_id = intent
        .metadata
        .get("order_id")
        .and_then(|v| Uuid::parse_str(v).ok())?;
    Some((user_id, order_id))
}

/// Create a processor charge intent bound 1:1 to a pending order.
///
/// The charge amount comes from the stored order total. The client picks
/// the currency at most; any amount it might claim never reaches here.
pub async fn create_payment_intent(
    state: &AppState,
    user: &AuthUser,
    payload: CreatePaymentIntentRequest,
) -> AppResult<ApiResponse<PaymentIntentCreated>> {
    let order = load_order(state, OrderAccess::Session(user), payload.order_id).await?;

    if order.payment_status == payment_status::PAID {
        return Err(AppError::BadRequest("Order already paid".into()));
    }

    let amount = charge_amount_cents(order.total_amount)?;
    let currency = payload
        .currency
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| state.config.currency.clone());

    let mut metadata: HashMap<String, String> = payload.metadata.unwrap_or_default();
    metadata.insert("user_id".into(), user.user_id.to_string());
    metadata.insert("order_id".into(), order.id.to_string());

    let intent = state
        .stripe
        .create_payment_intent(amount, &currency, &metadata)
        .await?;

    let client_secret = intent.client_secret.clone().ok_or_else(|| {
        AppError::Internal(anyhow::anyhow!("payment intent has no client secret"))
    })?;

    tracing::info!(order_id = %order.id, intent_id = %intent.id, "payment intent created");

    Ok(ApiResponse::success(
        "Payment intent created",
        PaymentIntentCreated {
            client_secret,
            payment_intent_id: intent.id,
        },
        Some(Meta::empty()),
    ))
}

/// Client-side confirmation path. The client's claim of success is never
/// trusted; the intent is re-fetched from the processor and its metadata
/// binding checked before the order transitions.
pub async fn confirm_paid(
    state: &AppState,
    user: &AuthUser,
    payload: ConfirmPaidRequest,
) -> AppResult<ApiResponse<ConfirmPaidResponse>> {
    let intent = state
        .stripe
        .retrieve_payment_intent(&payload.payment_intent_id)
        .await?;

    if intent.status != stripe::STATUS_SUCCEEDED {
        return Err(AppError::BadRequest("Payment has not succeeded".into()));
    }
    verify_intent_binding(&intent, user.user_id, payload.order_id)?;

    let already_paid =
        reconcile_paid_order(state, OrderAccess::Session(user), payload.order_id, &intent)
            .await?;

    Ok(ApiResponse::success(
        if already_paid {
            "Order already paid"
        } else {
            "Payment confirmed"
        },
        ConfirmPaidResponse {
            order_id: payload.order_id,
            already_paid,
        },
        Some(Meta::empty()),
    ))
}

/// Webhook path. The signature has already been verified by the caller;
/// this only reacts to successful payment intents carrying a complete
/// order correlation.
pub async fn handle_webhook_event(state: &AppState, event: &WebhookEvent) -> AppResult<()> {
    if event.event_type != stripe::EVENT_PAYMENT_INTENT_SUCCEEDED {
        tracing::debug!(event_type = %event.event_type, "ignoring webhook event");
        return Ok(());
    }

    let intent = event.payment_intent().map_err(|_| {
        AppError::BadRequest("Webhook event carries no payment intent".into())
    })?;
    let (user_id, order_id) = intent_correlation(&intent).ok_or_else(|| {
        AppError::BadRequest("Payment intent metadata is missing order correlation".into())
    })?;

    let already_paid =
        reconcile_paid_order(state, OrderAccess::Privileged { user_id }, order_id, &intent)
            .await?;
    if already_paid {
        tracing::info!(order_id = %order_id, "webhook redelivery for paid order, acknowledged");
    }
    Ok(())
}

/// The single `pending -> paid/confirmed` transition both entry points
/// share. Returns true when the order was already paid (or another caller
/// won the race), which is a success, not an error.
pub async fn reconcile_paid_order(
    state: &AppState,
    access: OrderAccess<'_>,
    order_id: Uuid,
    intent: &PaymentIntent,
) -> AppResult<bool> {
    let order = load_order(state, access, order_id).await?;

    if order.payment_status == payment_status::PAID {
        return Ok(true);
    }

    let transitioned = transition_order_paid(&state.pool, order_id, &intent.id).await?;
    if !transitioned {
        return Ok(true);
    }

    let cleared = cart_service::clear_user_cart(&state.pool, order.user_id).await?;
    tracing::info!(
        order_id = %order_id,
        intent_id = %intent.id,
        cart_items_cleared = cleared,
        "order marked paid"
    );

    if let Err(err) = log_audit(
        &state.pool,
        Some(order.user_id),
        "order_paid",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order_id, "payment_intent_id": intent.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    email_service::send_order_confirmation_emails(state, order_id).await?;

    Ok(false)
}

/// The atomic guard: a conditional update that only fires while the order
/// is still unpaid. Concurrent callers race on the WHERE clause, and
/// exactly one sees an affected row.
pub async fn transition_order_paid(
    pool: &DbPool,
    order_id: Uuid,
    payment_intent_id: &str,
) -> AppResult<bool> {
    let result = sqlx::query(
        r#"
        UPDATE orders
        SET payment_status = 'paid', status = 'confirmed',
            payment_intent_id = $2, updated_at = now()
        WHERE id = $1 AND payment_status <> 'paid'
        "#,
    )
    .bind(order_id)
    .bind(payment_intent_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

async fn load_order(
    state: &AppState,
    access: OrderAccess<'_>,
    order_id: Uuid,
) -> AppResult<OrderModel> {
    let order = Orders::find()
        .filter(
            Condition::all()
                .add(OrderCol::Id.eq(order_id))
                .add(OrderCol::UserId.eq(access.user_id())),
        )
        .one(&state.orm)
        .await?;
    order.ok_or(AppError::NotFound)
}
