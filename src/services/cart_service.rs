use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    db::DbPool,
    dto::cart::{AddToCartRequest, CartLineDto, CartSummary, UpdateCartItemRequest},
    entity::{
        cart_items::{
            ActiveModel as CartItemActive, Column as CartCol, Entity as CartItems,
            Model as CartItemModel,
        },
        products::Entity as Products,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{CartItem, Customizations},
    pricing::CustomConfig,
    response::{ApiResponse, Meta},
    services::{order_service::price_preset_selection, product_service},
    state::AppState,
    totals::{self, MAX_ITEM_QUANTITY, PricedLine, TotalsScope},
};

/// The whole cart with cart-view totals (subtotal + shipping, no tax).
/// Totals are recomputed from the full line list on every call.
pub async fn list_cart(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<CartSummary>> {
    let rows = CartItems::find()
        .filter(CartCol::UserId.eq(user.user_id))
        .order_by_desc(CartCol::CreatedAt)
        .find_also_related(Products)
        .all(&state.orm)
        .await?;

    let mut items = Vec::with_capacity(rows.len());
    let mut lines = Vec::with_capacity(rows.len());

    for (item, product) in rows {
        let product = match product {
            Some(p) => product_service::product_from_entity(p),
            None => continue,
        };
        let customizations: Option<Customizations> = item
            .customizations
            .as_ref()
            .and_then(|v| serde_json::from_value(v.clone()).ok());
        let unit_price = totals::effective_unit_price(
            product.price,
            customizations.as_ref().map(|c| c.total_price),
        );
        lines.push(PricedLine {
            unit_price,
            quantity: item.quantity,
        });
        items.push(CartLineDto {
            id: item.id,
            quantity: item.quantity,
            material: item.material,
            line_total: unit_price * rust_decimal::Decimal::from(item.quantity),
            unit_price,
            customizations,
            product,
        });
    }

    let summary = CartSummary {
        totals: totals::cart_totals(&lines, TotalsScope::CartView),
        items,
    };
    Ok(ApiResponse::success("OK", summary, Some(Meta::empty())))
}

pub async fn add_to_cart(
    state: &AppState,
    user: &AuthUser,
    payload: AddToCartRequest,
) -> AppResult<ApiResponse<CartItem>> {
    validate_quantity(payload.quantity)?;

    let product = Products::find_by_id(payload.product_id)
        .one(&state.orm)
        .await?;
    let product = match product {
        Some(p) => p,
        None => return Err(AppError::BadRequest("product not found".to_string())),
    };

    let (material, customizations) = match product_service::resolve_config(&product) {
        CustomConfig::Preset(config) => {
            let requested = payload.customizations.ok_or_else(|| {
                AppError::BadRequest("This product requires customization".into())
            })?;
            let priced = price_preset_selection(&config, requested)?;
            (Some(priced.material_code()), Some(priced))
        }
        CustomConfig::Inquire(_) => {
            return Err(AppError::BadRequest(
                "This product is ordered via direct inquiry".into(),
            ));
        }
        CustomConfig::Finished => (payload.material, None),
    };

    let mut condition = Condition::all()
        .add(CartCol::UserId.eq(user.user_id))
        .add(CartCol::ProductId.eq(payload.product_id));
    condition = match material.as_ref() {
        Some(m) => condition.add(CartCol::Material.eq(m.clone())),
        None => condition.add(CartCol::Material.is_null()),
    };

    let existing = CartItems::find().filter(condition).one(&state.orm).await?;

    let customizations_json = customizations
        .as_ref()
        .map(serde_json::to_value)
        .transpose()
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e)))?;

    let item = if let Some(existing) = existing {
        let mut active: CartItemActive = existing.into();
        active.quantity = Set(payload.quantity);
        active.customizations = Set(customizations_json);
        active.update(&state.orm).await?
    } else {
        CartItemActive {
            id: Set(Uuid::new_v4()),
            user_id: Set(user.user_id),
            product_id: Set(payload.product_id),
            quantity: Set(payload.quantity),
            material: Set(material),
            customizations: Set(customizations_json),
            created_at: NotSet,
        }
        .insert(&state.orm)
        .await?
    };

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "cart_update",
        Some("cart_items"),
        Some(serde_json::json!({ "product_id": payload.product_id, "quantity": payload.quantity })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success("OK", cart_item_from_entity(item), None))
}

pub async fn update_cart_item(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateCartItemRequest,
) -> AppResult<ApiResponse<CartItem>> {
    validate_quantity(payload.quantity)?;

    let existing = CartItems::find()
        .filter(
            Condition::all()
                .add(CartCol::Id.eq(id))
                .add(CartCol::UserId.eq(user.user_id)),
        )
        .one(&state.orm)
        .await?;
    let existing = match existing {
        Some(item) => item,
        None => return Err(AppError::NotFound),
    };

    let mut active: CartItemActive = existing.into();
    active.quantity = Set(payload.quantity);
    let item = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "OK",
        cart_item_from_entity(item),
        Some(Meta::empty()),
    ))
}

pub async fn remove_cart_item(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = CartItems::delete_many()
        .filter(
            Condition::all()
                .add(CartCol::Id.eq(id))
                .add(CartCol::UserId.eq(user.user_id)),
        )
        .exec(&state.orm)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "cart_remove",
        Some("cart_items"),
        Some(serde_json::json!({ "cart_item_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Removed from cart",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Empty a user's cart after their order is paid. Called from both
/// reconciliation paths, so an already-empty cart is not an error.
pub async fn clear_user_cart(pool: &DbPool, user_id: Uuid) -> AppResult<u64> {
    let result = sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

fn validate_quantity(quantity: i32) -> Result<(), AppError> {
    if quantity <= 0 {
        return Err(AppError::BadRequest(
            "quantity must be greater than 0".to_string(),
        ));
    }
    if quantity > MAX_ITEM_QUANTITY {
        return Err(AppError::BadRequest(format!(
            "quantity cannot exceed {MAX_ITEM_QUANTITY}"
        )));
    }
    Ok(())
}

fn cart_item_from_entity(model: CartItemModel) -> CartItem {
    CartItem {
        id: model.id,
        user_id: model.user_id,
        product_id: model.product_id,
        quantity: model.quantity,
        material: model.material,
        customizations: model
            .customizations
            .and_then(|v| serde_json::from_value(v).ok()),
        created_at: model.created_at.with_timezone(&chrono::Utc),
    }
}
