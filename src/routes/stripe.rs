use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::HeaderMap,
    routing::post,
};

use crate::{
    dto::payments::{CreatePaymentIntentRequest, PaymentIntentCreated},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::payment_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create-payment-intent", post(create_payment_intent))
        .route("/webhook", post(webhook))
}

#[utoipa::path(
    post,
    path = "/api/stripe/create-payment-intent",
    request_body = CreatePaymentIntentRequest,
    responses(
        (status = 200, description = "Client secret for the order's stored total", body = ApiResponse<PaymentIntentCreated>),
        (status = 400, description = "Order already paid"),
        (status = 404, description = "Order not found or owned by another user"),
    ),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn create_payment_intent(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreatePaymentIntentRequest>,
) -> AppResult<Json<ApiResponse<PaymentIntentCreated>>> {
    let resp = payment_service::create_payment_intent(&state, &user, payload).await?;
    Ok(Json(resp))
}

/// Processor-facing endpoint: raw body, signature header, no session.
/// The response shape is the processor's contract, not the API envelope.
#[utoipa::path(
    post,
    path = "/api/stripe/webhook",
    request_body = String,
    responses(
        (status = 200, description = "Event acknowledged"),
        (status = 400, description = "Invalid signature or payload"),
        (status = 404, description = "Order not found"),
    ),
    tag = "Payments"
)]
pub async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<serde_json::Value>> {
    let signature = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::BadRequest("Missing stripe-signature header".into()))?;

    let event = match state.stripe.construct_event(&body, signature) {
        Ok(event) => event,
        Err(err) => {
            // Failed verification is a potential integrity issue, not noise.
            tracing::warn!(error = %err, "webhook signature verification failed");
            return Err(AppError::BadRequest("Invalid webhook signature".into()));
        }
    };

    payment_service::handle_webhook_event(&state, &event).await?;

    Ok(Json(serde_json::json!({ "received": true })))
}
