//! Integration flow: cart-add with server-side repricing, pending-order
//! intake, the idempotent paid transition, cart clearing and the
//! confirmation-email claim. Requires a database; skips without one.

use make_the_print_api::{
    config::AppConfig,
    db::{create_orm_conn, create_pool},
    dto::{
        cart::AddToCartRequest,
        orders::{CreatePendingOrderRequest, OrderItemInput},
    },
    entity::{products::ActiveModel as ProductActive, users::ActiveModel as UserActive},
    error::AppError,
    mailer::Mailer,
    middleware::auth::AuthUser,
    models::{Address, Customizations},
    services::{cart_service, email_service, order_service, payment_service},
    state::AppState,
    stripe::StripeClient,
};
use rust_decimal_macros::dec;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set, Statement};
use uuid::Uuid;

#[tokio::test]
async fn checkout_reprice_transition_and_email_claim_flow() -> anyhow::Result<()> {
    // Allow skipping when no DB is configured in the environment.
    let database_url =
        match std::env::var("TEST_DATABASE_URL").or_else(|_| std::env::var("DATABASE_URL")) {
            Ok(url) => url,
            Err(_) => {
                eprintln!(
                    "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
                );
                return Ok(());
            }
        };

    let state = setup_state(&database_url).await?;

    let user_id = create_user(&state, "user", "buyer@example.com").await?;
    let auth_user = AuthUser {
        user_id,
        role: "user".into(),
    };

    // Preset lettering product: 20cm at 1.5/char, outdoor +10, LED disabled.
    let config = serde_json::json!({
        "size_prices": [
            { "label": "20cm", "price_per_character": "1.5" },
            { "label": "30cm", "price_per_character": "2.25" }
        ],
        "price_per_character": "1.5",
        "colors": ["Black", "Gold"],
        "fonts": ["Montserrat"],
        "default_font": "Montserrat",
        "outdoor": { "enabled": true, "price": "10" },
        "led_strip": { "enabled": false, "price": "25" },
        "color": { "enabled": false, "price": "0" }
    });
    let product = ProductActive {
        id: Set(Uuid::new_v4()),
        name: Set("Custom Wall Lettering".into()),
        name_localized: Set(None),
        description: Set(Some("Lettering for testing".into())),
        price: Set(dec!(1.5)),
        images: Set(serde_json::json!([])),
        product_type: Set("custom".into()),
        category: Set("preset".into()),
        custom_config: Set(Some(config)),
        featured: Set(false),
        seasonal: Set(false),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    // The client-claimed total_price is a lie; the server must reprice.
    let requested = Customizations {
        text: "HELLO".into(),
        font: String::new(),
        color: "Gold".into(),
        size: "20cm".into(),
        character_count: 0,
        total_price: dec!(999),
        outdoor: true,
        led_strip: false,
        color_addon: false,
    };

    let added = cart_service::add_to_cart(
        &state,
        &auth_user,
        AddToCartRequest {
            product_id: product.id,
            quantity: 1,
            material: None,
            customizations: Some(requested.clone()),
        },
    )
    .await?;
    let line = added.data.unwrap();
    let snapshot = line.customizations.expect("customizations snapshot");
    assert_eq!(snapshot.total_price, dec!(17.5));
    assert_eq!(snapshot.character_count, 5);
    assert_eq!(snapshot.font, "Montserrat");
    assert_eq!(line.material.as_deref(), Some("Montserrat|Gold|20cm|HELLO"));

    // Cart view: subtotal + shipping, no tax.
    let cart = cart_service::list_cart(&state, &auth_user).await?;
    let summary = cart.data.unwrap();
    assert_eq!(summary.totals.subtotal, dec!(17.5));
    assert_eq!(summary.totals.shipping, dec!(9.99));
    assert_eq!(summary.totals.tax, dec!(0));
    assert_eq!(summary.totals.total, dec!(27.49));

    let shipping_address = Address {
        name: "Test Buyer".into(),
        email: "buyer@example.com".into(),
        phone: None,
        line1: "1 Print Street".into(),
        line2: None,
        city: "Amman".into(),
        state: None,
        postal_code: "11118".into(),
        country: "JO".into(),
    };
    let order_items = vec![OrderItemInput {
        product_id: product.id,
        quantity: 1,
        material: None,
        customizations: Some(requested.clone()),
    }];

    // A stale client total is rejected outright.
    let mismatch = order_service::create_pending_order(
        &state,
        &auth_user,
        CreatePendingOrderRequest {
            total_amount: dec!(999),
            shipping_address: shipping_address.clone(),
            billing_address: None,
            items: vec![OrderItemInput {
                product_id: product.id,
                quantity: 1,
                material: None,
                customizations: Some(requested.clone()),
            }],
        },
    )
    .await;
    assert!(matches!(mismatch, Err(AppError::BadRequest(_))));

    // Checkout total: 17.5 + 9.99 shipping + 1.75 tax.
    let created = order_service::create_pending_order(
        &state,
        &auth_user,
        CreatePendingOrderRequest {
            total_amount: dec!(29.24),
            shipping_address,
            billing_address: None,
            items: order_items,
        },
    )
    .await?;
    let order_id = created.data.unwrap().order_id;

    let pending = order_service::get_order(&state, &auth_user, order_id).await?;
    let pending = pending.data.unwrap();
    assert_eq!(pending.order.payment_status, "pending");
    assert_eq!(pending.order.status, "pending");
    assert_eq!(pending.order.total_amount, dec!(29.24));
    assert_eq!(pending.items.len(), 1);
    assert_eq!(pending.items[0].price, dec!(17.5));

    // The conditional update transitions exactly once.
    let first = payment_service::transition_order_paid(&state.pool, order_id, "pi_test_1").await?;
    assert!(first, "first transition should affect the row");
    let second = payment_service::transition_order_paid(&state.pool, order_id, "pi_test_2").await?;
    assert!(!second, "second transition must be a no-op");

    let paid = order_service::get_order(&state, &auth_user, order_id).await?;
    let paid = paid.data.unwrap();
    assert_eq!(paid.order.payment_status, "paid");
    assert_eq!(paid.order.status, "confirmed");
    assert_eq!(paid.order.payment_intent_id.as_deref(), Some("pi_test_1"));

    // Cart clearing tolerates repetition.
    let cleared = cart_service::clear_user_cart(&state.pool, user_id).await?;
    assert_eq!(cleared, 1);
    let cleared_again = cart_service::clear_user_cart(&state.pool, user_id).await?;
    assert_eq!(cleared_again, 0);
    let empty = cart_service::list_cart(&state, &auth_user).await?;
    assert!(empty.data.unwrap().items.is_empty());

    // The email claim grants the send to exactly one caller.
    let first_claim = email_service::claim_confirmation_email(&state.pool, order_id).await?;
    assert!(first_claim, "first claim should win");
    let second_claim = email_service::claim_confirmation_email(&state.pool, order_id).await?;
    assert!(!second_claim, "second claim must lose");

    Ok(())
}

async fn setup_state(database_url: &str) -> anyhow::Result<AppState> {
    let pool = create_pool(database_url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    let orm = create_orm_conn(database_url).await?;

    // Clean tables between runs
    let backend = orm.get_database_backend();
    orm.execute(Statement::from_string(
        backend,
        "TRUNCATE TABLE order_items, orders, cart_items, wishlist_items, reviews, audit_logs, products, users RESTART IDENTITY CASCADE",
    ))
    .await?;

    Ok(AppState {
        pool,
        orm,
        stripe: StripeClient::new("sk_test_dummy", "whsec_dummy"),
        mailer: Mailer::new("re_dummy", "store@example.com"),
        config: AppConfig {
            database_url: database_url.to_string(),
            host: "127.0.0.1".into(),
            port: 0,
            stripe_secret_key: "sk_test_dummy".into(),
            stripe_webhook_secret: "whsec_dummy".into(),
            email_api_key: "re_dummy".into(),
            email_from: "store@example.com".into(),
            store_notification_email: "owner@example.com".into(),
            currency: "usd".into(),
        },
    })
}

async fn create_user(state: &AppState, role: &str, email: &str) -> anyhow::Result<Uuid> {
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        email: Set(email.to_string()),
        password_hash: Set("dummy".into()),
        role: Set(role.into()),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(user.id)
}
