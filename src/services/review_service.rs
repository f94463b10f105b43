use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::reviews::{CreateReviewRequest, ReviewList},
    entity::{
        products::Entity as Products,
        reviews::{
            ActiveModel as ReviewActive, Column as ReviewCol, Entity as Reviews,
            Model as ReviewModel,
        },
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Review,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    state::AppState,
};

pub async fn list_reviews(
    state: &AppState,
    product_id: Uuid,
    pagination: Pagination,
) -> AppResult<ApiResponse<ReviewList>> {
    let (page, limit, offset) = pagination.normalize();

    let finder = Reviews::find().filter(ReviewCol::ProductId.eq(product_id));
    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .order_by_desc(ReviewCol::CreatedAt)
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(review_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Reviews", ReviewList { items }, Some(meta)))
}

pub async fn create_review(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
    payload: CreateReviewRequest,
) -> AppResult<ApiResponse<Review>> {
    if !(1..=5).contains(&payload.rating) {
        return Err(AppError::BadRequest(
            "rating must be between 1 and 5".into(),
        ));
    }

    let product = Products::find_by_id(product_id).one(&state.orm).await?;
    if product.is_none() {
        return Err(AppError::NotFound);
    }

    let existing = Reviews::find()
        .filter(
            Condition::all()
                .add(ReviewCol::UserId.eq(user.user_id))
                .add(ReviewCol::ProductId.eq(product_id)),
        )
        .one(&state.orm)
        .await?;
    if existing.is_some() {
        return Err(AppError::BadRequest(
            "You have already reviewed this product".into(),
        ));
    }

    let review = ReviewActive {
        id: Set(Uuid::new_v4()),
        product_id: Set(product_id),
        user_id: Set(user.user_id),
        rating: Set(payload.rating),
        comment: Set(payload.comment),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "review_create",
        Some("reviews"),
        Some(serde_json::json!({ "product_id": product_id, "rating": payload.rating })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Review created",
        review_from_entity(review),
        Some(Meta::empty()),
    ))
}

fn review_from_entity(model: ReviewModel) -> Review {
    Review {
        id: model.id,
        product_id: model.product_id,
        user_id: model.user_id,
        rating: model.rating,
        comment: model.comment,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
