use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::wishlist::{AddWishlistRequest, WishlistProductList},
    entity::{
        products::Entity as Products,
        wishlist_items::{
            ActiveModel as WishlistActive, Column as WishlistCol, Entity as WishlistItems,
        },
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    services::product_service,
    state::AppState,
};

pub async fn list_wishlist(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<WishlistProductList>> {
    let (page, limit, offset) = pagination.normalize();

    let finder = WishlistItems::find().filter(WishlistCol::UserId.eq(user.user_id));
    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .order_by_desc(WishlistCol::CreatedAt)
        .limit(limit as u64)
        .offset(offset as u64)
        .find_also_related(Products)
        .all(&state.orm)
        .await?
        .into_iter()
        .filter_map(|(_, product)| product.map(product_service::product_from_entity))
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "OK",
        WishlistProductList { items },
        Some(meta),
    ))
}

pub async fn add_to_wishlist(
    state: &AppState,
    user: &AuthUser,
    payload: AddWishlistRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let product = Products::find_by_id(payload.product_id)
        .one(&state.orm)
        .await?;
    if product.is_none() {
        return Err(AppError::BadRequest("Product not found".into()));
    }

    let existing = WishlistItems::find()
        .filter(
            Condition::all()
                .add(WishlistCol::UserId.eq(user.user_id))
                .add(WishlistCol::ProductId.eq(payload.product_id)),
        )
        .one(&state.orm)
        .await?;

    if existing.is_none() {
        WishlistActive {
            id: Set(Uuid::new_v4()),
            user_id: Set(user.user_id),
            product_id: Set(payload.product_id),
            created_at: NotSet,
        }
        .insert(&state.orm)
        .await?;
    }

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "wishlist_add",
        Some("wishlist_items"),
        Some(serde_json::json!({ "product_id": payload.product_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Added to wishlist",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn remove_from_wishlist(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = WishlistItems::delete_many()
        .filter(
            Condition::all()
                .add(WishlistCol::UserId.eq(user.user_id))
                .add(WishlistCol::ProductId.eq(product_id)),
        )
        .exec(&state.orm)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "wishlist_remove",
        Some("wishlist_items"),
        Some(serde_json::json!({ "product_id": product_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Removed from wishlist",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}
