use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use make_the_print_api::{config::AppConfig, db::create_pool};
use rust_decimal_macros::dec;
use serde_json::json;
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    sqlx::migrate!("./migrations").run(&pool).await?;

    let admin_id = ensure_user_with_role(&pool, "admin@maketheprint.com", "admin123", "admin").await?;
    let user_id = ensure_user_with_role(&pool, "customer@example.com", "customer1", "user").await?;
    seed_products(&pool).await?;

    println!("Seed completed. Admin ID: {admin_id}, User ID: {user_id}");
    Ok(())
}

async fn ensure_user_with_role(
    pool: &sqlx::PgPool,
    email: &str,
    password: &str,
    role: &str,
) -> anyhow::Result<Uuid> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();

    let row: Option<(Uuid,)> = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, password_hash, role)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .fetch_optional(pool)
    .await?;

    let user_id = match row {
        Some((id,)) => id,
        None => {
            let existing: (Uuid,) = sqlx::query_as("SELECT id FROM users WHERE email = $1")
                .bind(email)
                .fetch_one(pool)
                .await?;
            existing.0
        }
    };

    println!("Ensured user {email} (role={role})");
    Ok(user_id)
}

async fn seed_products(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let lettering_config = json!({
        "size_prices": [
            { "label": "20cm", "price_per_character": dec!(1.5) },
            { "label": "30cm", "price_per_character": dec!(2.25) },
            { "label": "40cm", "price_per_character": dec!(3.0) }
        ],
        "price_per_character": dec!(1.5),
        "colors": ["Black", "White", "Gold", "Walnut"],
        "fonts": ["Montserrat", "Pacifico", "Bebas Neue"],
        "default_font": "Montserrat",
        "outdoor": { "enabled": true, "price": dec!(10) },
        "led_strip": { "enabled": true, "price": dec!(25) },
        "color": { "enabled": false, "price": dec!(0) }
    });

    let inquire_config = json!({
        "whatsapp_number": "+15551234567",
        "whatsapp_message": "Hi! I'd like a quote for {product_name}."
    });

    upsert_product(
        pool,
        "Custom Wall Lettering",
        Some("Personalized 3D-printed wall lettering, priced per character."),
        dec!(1.5),
        "custom",
        "preset",
        Some(&lettering_config),
        true,
        false,
    )
    .await?;

    upsert_product(
        pool,
        "Custom 3D Print Commission",
        Some("Bring your own model or idea; quoted individually."),
        dec!(0),
        "custom",
        "inquire",
        Some(&inquire_config),
        false,
        false,
    )
    .await?;

    upsert_product(
        pool,
        "Desk Cable Organizer",
        Some("Five-slot printed cable organizer."),
        dec!(12.99),
        "custom",
        "finished",
        None,
        true,
        false,
    )
    .await?;

    upsert_product(
        pool,
        "Snowflake Ornament Set",
        Some("Set of six printed tree ornaments."),
        dec!(19.99),
        "seasonal",
        "finished",
        None,
        false,
        true,
    )
    .await?;

    println!("Seeded products");
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn upsert_product(
    pool: &sqlx::PgPool,
    name: &str,
    description: Option<&str>,
    price: rust_decimal::Decimal,
    product_type: &str,
    category: &str,
    custom_config: Option<&serde_json::Value>,
    featured: bool,
    seasonal: bool,
) -> anyhow::Result<()> {
    let exists: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM products WHERE name = $1")
        .bind(name)
        .fetch_optional(pool)
        .await?;
    if exists.is_some() {
        return Ok(());
    }

    sqlx::query(
        r#"
        INSERT INTO products
            (id, name, description, price, product_type, category, custom_config, featured, seasonal)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(description)
    .bind(price)
    .bind(product_type)
    .bind(category)
    .bind(custom_config)
    .bind(featured)
    .bind(seasonal)
    .execute(pool)
    .await?;

    Ok(())
}
