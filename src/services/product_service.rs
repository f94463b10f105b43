use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::products::{CreateProductRequest, ProductDetail, ProductList, UpdateProductRequest},
    entity::products::{ActiveModel, Column, Entity as Products, Model as ProductModel},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Product, category, product_type},
    pricing::{CustomConfig, InquireConfig, PresetConfig},
    response::{ApiResponse, Meta},
    routes::params::{ProductQuery, ProductSortBy, SortOrder},
    state::AppState,
};

pub async fn list_products(
    state: &AppState,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, limit, offset) = query.pagination.normalize();
    let mut condition = Condition::all();

    if let Some(search) = query.q.as_ref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        condition = condition.add(
            Condition::any()
                .add(Expr::col(Column::Name).ilike(pattern.clone()))
                .add(Expr::col(Column::Description).ilike(pattern)),
        );
    }

    if let Some(cat) = query.category.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(Column::Category.eq(cat.clone()));
    }

    if let Some(kind) = query.product_type.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(Column::ProductType.eq(kind.clone()));
    }

    if let Some(featured) = query.featured {
        condition = condition.add(Column::Featured.eq(featured));
    }

    if let Some(seasonal) = query.seasonal {
        condition = condition.add(Column::Seasonal.eq(seasonal));
    }

    if let Some(min_price) = query.min_price {
        condition = condition.add(Column::Price.gte(min_price));
    }

    if let Some(max_price) = query.max_price {
        condition = condition.add(Column::Price.lte(max_price));
    }

    let sort_by = query.sort_by.unwrap_or(ProductSortBy::CreatedAt);
    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    let sort_col = match sort_by {
        ProductSortBy::CreatedAt => Column::CreatedAt,
        ProductSortBy::Price => Column::Price,
        ProductSortBy::Name => Column::Name,
    };

    let mut finder = Products::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(sort_col),
        SortOrder::Desc => finder.order_by_desc(sort_col),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(product_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    let data = ProductList { items };
    Ok(ApiResponse::success("Products", data, Some(meta)))
}

/// Product detail with the purchase surface resolved from `custom_config`:
/// lettering options for preset products (disabled add-ons omitted),
/// the contact CTA for inquire products, neither for finished goods.
pub async fn get_product(state: &AppState, id: Uuid) -> AppResult<ApiResponse<ProductDetail>> {
    let model = Products::find_by_id(id).one(&state.orm).await?;
    let model = match model {
        Some(m) => m,
        None => return Err(AppError::NotFound),
    };

    let config = resolve_config(&model);
    let product = product_from_entity(model);

    let detail = match &config {
        CustomConfig::Preset(preset) => ProductDetail {
            lettering: Some(preset.customer_options()),
            inquiry: None,
            product,
        },
        CustomConfig::Inquire(inquire) => ProductDetail {
            lettering: None,
            inquiry: inquire.contact(&product.name),
            product,
        },
        CustomConfig::Finished => ProductDetail {
            lettering: None,
            inquiry: None,
            product,
        },
    };

    Ok(ApiResponse::success("Product", detail, None))
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;
    validate_product_type(&payload.product_type)?;
    validate_category(&payload.category)?;
    let custom_config = validate_config(&payload.category, payload.custom_config.as_ref())?;

    let id = Uuid::new_v4();
    let active = ActiveModel {
        id: Set(id),
        name: Set(payload.name),
        name_localized: Set(payload.name_localized),
        description: Set(payload.description),
        price: Set(payload.price),
        images: Set(serde_json::json!(payload.images.unwrap_or_default())),
        product_type: Set(payload.product_type),
        category: Set(payload.category),
        custom_config: Set(custom_config),
        featured: Set(payload.featured.unwrap_or(false)),
        seasonal: Set(payload.seasonal.unwrap_or(false)),
        created_at: NotSet,
        updated_at: NotSet,
    };
    let product = active.insert(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "product_create",
        Some("products"),
        Some(serde_json::json!({ "product_id": product.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Product created",
        product_from_entity(product),
        Some(Meta::empty()),
    ))
}

pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;

    let existing = Products::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    let category = payload.category.clone().unwrap_or(existing.category.clone());
    validate_category(&category)?;
    if let Some(kind) = payload.product_type.as_ref() {
        validate_product_type(kind)?;
    }

    // A category or config change revalidates the pair together.
    let custom_config = if payload.custom_config.is_some() || payload.category.is_some() {
        let raw = payload
            .custom_config
            .as_ref()
            .or(existing.custom_config.as_ref());
        validate_config(&category, raw)?
    } else {
        existing.custom_config.clone()
    };

    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(name_localized) = payload.name_localized {
        active.name_localized = Set(Some(name_localized));
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }
    if let Some(price) = payload.price {
        active.price = Set(price);
    }
    if let Some(images) = payload.images {
        active.images = Set(serde_json::json!(images));
    }
    if let Some(kind) = payload.product_type {
        active.product_type = Set(kind);
    }
    if let Some(featured) = payload.featured {
        active.featured = Set(featured);
    }
    if let Some(seasonal) = payload.seasonal {
        active.seasonal = Set(seasonal);
    }
    active.category = Set(category);
    active.custom_config = Set(custom_config);
    active.updated_at = Set(Utc::now().into());
    let product = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "product_update",
        Some("products"),
        Some(serde_json::json!({ "product_id": product.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Updated",
        product_from_entity(product),
        Some(Meta::empty()),
    ))
}

pub async fn delete_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let result = Products::delete_by_id(id).exec(&state.orm).await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "product_delete",
        Some("products"),
        Some(serde_json::json!({ "product_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

fn validate_product_type(kind: &str) -> Result<(), AppError> {
    if product_type::ALL.contains(&kind) {
        Ok(())
    } else {
        Err(AppError::BadRequest("Invalid product type".into()))
    }
}

fn validate_category(cat: &str) -> Result<(), AppError> {
    if category::ALL.contains(&cat) {
        Ok(())
    } else {
        Err(AppError::BadRequest("Invalid category".into()))
    }
}

/// Category invariant at the admin write boundary: preset products must
/// carry pricing rules, inquire products a reachable contact, finished
/// products carry no config at all. The stored JSON is the serde
/// round-trip of the typed config, so reads never see junk keys.
fn validate_config(category: &str, raw: Option<&Value>) -> Result<Option<Value>, AppError> {
    match category {
        "preset" => {
            let raw = raw.ok_or_else(|| {
                AppError::BadRequest("Preset products require pricing configuration".into())
            })?;
            let config: PresetConfig = serde_json::from_value(raw.clone()).map_err(|_| {
                AppError::BadRequest("Invalid pricing configuration".into())
            })?;
            let has_pricing = !config.size_prices.is_empty()
                || config.price_per_character > rust_decimal::Decimal::ZERO;
            if !has_pricing {
                return Err(AppError::BadRequest(
                    "Preset products require at least one per-character price".into(),
                ));
            }
            Ok(Some(serde_json::to_value(config).map_err(|e| {
                AppError::Internal(anyhow::anyhow!(e))
            })?))
        }
        "inquire" => {
            let raw = raw.ok_or_else(|| {
                AppError::BadRequest("Inquire products require contact configuration".into())
            })?;
            let config: InquireConfig = serde_json::from_value(raw.clone()).map_err(|_| {
                AppError::BadRequest("Invalid contact configuration".into())
            })?;
            if config
                .whatsapp_number
                .as_deref()
                .map(str::trim)
                .unwrap_or("")
                .is_empty()
            {
                return Err(AppError::BadRequest(
                    "Inquire products require a WhatsApp number".into(),
                ));
            }
            Ok(Some(serde_json::to_value(config).map_err(|e| {
                AppError::Internal(anyhow::anyhow!(e))
            })?))
        }
        _ => Ok(None),
    }
}

/// Resolve the polymorphic config exactly once, at the entity boundary.
pub fn resolve_config(model: &ProductModel) -> CustomConfig {
    CustomConfig::resolve(&model.category, model.custom_config.as_ref())
}

pub fn product_from_entity(model: ProductModel) -> Product {
    Product {
        id: model.id,
        name: model.name,
        name_localized: model.name_localized,
        description: model.description,
        price: model.price,
        images: serde_json::from_value(model.images).unwrap_or_default(),
        product_type: model.product_type,
        category: model.category,
        featured: model.featured,
        seasonal: model.seasonal,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}
