use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::orders::{
        ConfirmPaidRequest, ConfirmPaidResponse, CreatePendingOrderRequest, OrderCreated,
        OrderList, OrderWithItems,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    routes::params::OrderListQuery,
    services::{order_service, payment_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders))
        .route("/create-pending", post(create_pending))
        .route("/confirm-paid", post(confirm_paid))
        .route("/{id}", get(get_order))
}

#[utoipa::path(
    get,
    path = "/api/orders",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("status" = Option<String>, Query, description = "Filter by status"),
        ("sort_order" = Option<String>, Query, description = "asc or desc")
    ),
    responses(
        (status = 200, description = "List own orders", body = ApiResponse<OrderList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp = order_service::list_orders(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/orders/create-pending",
    request_body = CreatePendingOrderRequest,
    responses(
        (status = 200, description = "Pending order created from a priced cart snapshot", body = ApiResponse<OrderCreated>),
        (status = 400, description = "Empty items, incomplete address or total mismatch"),
        (status = 401, description = "Authentication required"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn create_pending(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreatePendingOrderRequest>,
) -> AppResult<Json<ApiResponse<OrderCreated>>> {
    let resp = order_service::create_pending_order(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/orders/confirm-paid",
    request_body = ConfirmPaidRequest,
    responses(
        (status = 200, description = "Order confirmed, or already paid (no-op)", body = ApiResponse<ConfirmPaidResponse>),
        (status = 400, description = "Payment not succeeded or wrong order"),
        (status = 403, description = "Payment belongs to another user"),
        (status = 404, description = "Order not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn confirm_paid(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<ConfirmPaidRequest>,
) -> AppResult<Json<ApiResponse<ConfirmPaidResponse>>> {
    let resp = payment_service::confirm_paid(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Own order with items", body = ApiResponse<OrderWithItems>),
        (status = 404, description = "Order not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    let resp = order_service::get_order(&state, &user, id).await?;
    Ok(Json(resp))
}
