use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub stripe_secret_key: String,
    pub stripe_webhook_secret: String,
    pub email_api_key: String,
    pub email_from: String,
    pub store_notification_email: String,
    pub currency: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let stripe_secret_key = env::var("STRIPE_SECRET_KEY")?;
        let stripe_webhook_secret = env::var("STRIPE_WEBHOOK_SECRET")?;
        let email_api_key = env::var("EMAIL_API_KEY")?;
        let email_from = env::var("EMAIL_FROM")?;
        let store_notification_email = env::var("STORE_NOTIFICATION_EMAIL")?;
        let currency = env::var("CURRENCY").unwrap_or_else(|_| "usd".to_string());
        Ok(Self {
            database_url,
            host,
            port,
            stripe_secret_key,
            stripe_webhook_secret,
            email_api_key,
            email_from,
            store_notification_email,
            currency,
        })
    }
}
