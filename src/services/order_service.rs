use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::orders::{
        CreatePendingOrderRequest, OrderCreated, OrderList, OrderWithItems,
    },
    entity::{
        order_items::{
            ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems,
            Model as OrderItemModel,
        },
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
        products::Entity as Products,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Address, Customizations, Order, OrderItem, order_status, payment_status},
    pricing::{CustomConfig, LetteringSelection, PresetConfig, quote},
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    services::product_service,
    state::AppState,
    totals::{self, MAX_ITEM_QUANTITY, PricedLine, TotalsScope},
};

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = query.pagination.normalize();
    let mut condition = Condition::all().add(OrderCol::UserId.eq(user.user_id));
    if let Some(status) = query.status.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(OrderCol::Status.eq(status.clone()));
    }

    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);

    let mut finder = Orders::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Ok",
        OrderList { items: orders },
        Some(meta),
    ))
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let order = Orders::find()
        .filter(
            Condition::all()
                .add(OrderCol::UserId.eq(user.user_id))
                .add(OrderCol::Id.eq(id)),
        )
        .one(&state.orm)
        .await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_item_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "OK",
        OrderWithItems {
            order: order_from_entity(order),
            items,
        },
        Some(Meta::empty()),
    ))
}

struct PricedItem {
    product_id: Uuid,
    quantity: i32,
    unit_price: Decimal,
    material: Option<String>,
    customizations: Option<Customizations>,
}

/// Create a pending order from a priced cart snapshot. Every line is
/// repriced from the stored product data; the client-submitted total is
/// only ever compared against the server's, never charged. A material
/// change on the client side (new total, new address) creates a brand-new
/// pending order rather than mutating this one.
pub async fn create_pending_order(
    state: &AppState,
    user: &AuthUser,
    payload: CreatePendingOrderRequest,
) -> AppResult<ApiResponse<OrderCreated>> {
    if payload.items.is_empty() {
        return Err(AppError::BadRequest("Order items are required".into()));
    }
    if !payload.shipping_address.is_complete() {
        return Err(AppError::BadRequest(
            "Shipping address is incomplete".into(),
        ));
    }

    let mut priced_items: Vec<PricedItem> = Vec::with_capacity(payload.items.len());
    for item in payload.items {
        if item.quantity <= 0 {
            return Err(AppError::BadRequest(
                "quantity must be greater than 0".into(),
            ));
        }
        if item.quantity > MAX_ITEM_QUANTITY {
            return Err(AppError::BadRequest(format!(
                "quantity cannot exceed {MAX_ITEM_QUANTITY}"
            )));
        }

        let product = Products::find_by_id(item.product_id).one(&state.orm).await?;
        let product = match product {
            Some(p) => p,
            None => {
                return Err(AppError::BadRequest(format!(
                    "product {} not found",
                    item.product_id
                )));
            }
        };

        let priced = match product_service::resolve_config(&product) {
            CustomConfig::Preset(config) => {
                let requested = item.customizations.ok_or_else(|| {
                    AppError::BadRequest("This product requires customization".into())
                })?;
                let priced = price_preset_selection(&config, requested)?;
                PricedItem {
                    product_id: product.id,
                    quantity: item.quantity,
                    unit_price: priced.total_price,
                    material: Some(priced.material_code()),
                    customizations: Some(priced),
                }
            }
            CustomConfig::Inquire(_) => {
                return Err(AppError::BadRequest(
                    "This product is ordered via direct inquiry".into(),
                ));
            }
            CustomConfig::Finished => PricedItem {
                product_id: product.id,
                quantity: item.quantity,
                unit_price: product.price,
                material: item.material,
                customizations: None,
            },
        };
        priced_items.push(priced);
    }

    let lines: Vec<PricedLine> = priced_items
        .iter()
        .map(|item| PricedLine {
            unit_price: item.unit_price,
            quantity: item.quantity,
        })
        .collect();
    let checkout = totals::cart_totals(&lines, TotalsScope::Checkout);

    if checkout.total <= Decimal::ZERO {
        return Err(AppError::BadRequest(
            "Order total must be greater than zero".into(),
        ));
    }
    if payload.total_amount != checkout.total {
        return Err(AppError::BadRequest("Order total mismatch".into()));
    }

    let shipping_address = serde_json::to_value(&payload.shipping_address)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e)))?;
    let billing_address = payload
        .billing_address
        .as_ref()
        .map(serde_json::to_value)
        .transpose()
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e)))?;

    let txn = state.orm.begin().await?;

    let order_id = Uuid::new_v4();
    let order = OrderActive {
        id: Set(order_id),
        user_id: Set(user.user_id),
        total_amount: Set(checkout.total),
        shipping_address: Set(shipping_address),
        billing_address: Set(billing_address),
        payment_status: Set(payment_status::PENDING.into()),
        status: Set(order_status::PENDING.into()),
        payment_intent_id: Set(None),
        tracking_number: Set(None),
        confirmation_email_sent_at: Set(None),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;

    for item in &priced_items {
        let customizations = item
            .customizations
            .as_ref()
            .map(serde_json::to_value)
            .transpose()
            .map_err(|e| AppError::Internal(anyhow::anyhow!(e)))?;
        OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            product_id: Set(item.product_id),
            quantity: Set(item.quantity),
            price: Set(item.unit_price),
            material: Set(item.material.clone()),
            customizations: Set(customizations),
            created_at: NotSet,
        }
        .insert(&txn)
        .await?;
    }

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "order_create_pending",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id, "total": checkout.total })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Order created",
        OrderCreated { order_id: order.id },
        Some(Meta::empty()),
    ))
}

/// Reprice a lettering selection against the product's stored pricing
/// rules. The client's `total_price` and `character_count` are replaced
/// with server-computed values.
pub fn price_preset_selection(
    config: &PresetConfig,
    mut requested: Customizations,
) -> AppResult<Customizations> {
    requested.text = requested.text.trim().to_string();
    if requested.text.is_empty() {
        return Err(AppError::BadRequest("Lettering text is required".into()));
    }
    if requested.font.trim().is_empty() {
        requested.font = config.default_font.clone().unwrap_or_default();
    }

    let selection = LetteringSelection {
        text: requested.text.clone(),
        size: requested.size.clone(),
        outdoor: requested.outdoor,
        led_strip: requested.led_strip,
        color: requested.color_addon,
    };
    let quoted = quote(config, &selection);
    if quoted.price_per_character <= Decimal::ZERO {
        return Err(AppError::BadRequest("Select a valid size".into()));
    }

    requested.character_count = quoted.character_count;
    requested.total_price = quoted.total;
    Ok(requested)
}

pub fn order_from_entity(model: OrderModel) -> Order {
    Order {
        id: model.id,
        user_id: model.user_id,
        total_amount: model.total_amount,
        shipping_address: serde_json::from_value::<Address>(model.shipping_address)
            .unwrap_or_default(),
        billing_address: model
            .billing_address
            .and_then(|v| serde_json::from_value(v).ok()),
        payment_status: model.payment_status,
        status: model.status,
        payment_intent_id: model.payment_intent_id,
        tracking_number: model.tracking_number,
        confirmation_email_sent_at: model
            .confirmation_email_sent_at
            .map(|dt| dt.with_timezone(&Utc)),
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

pub fn order_item_from_entity(model: OrderItemModel) -> OrderItem {
    OrderItem {
        id: model.id,
        order_id: model.order_id,
        product_id: model.product_id,
        quantity: model.quantity,
        price: model.price,
        material: model.material,
        customizations: model
            .customizations
            .and_then(|v| serde_json::from_value(v).ok()),
        created_at: model.created_at.with_timezone(&Utc),
    }
}
