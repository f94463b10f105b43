use crate::{
    config::AppConfig,
    db::{DbPool, OrmConn},
    mailer::Mailer,
    stripe::StripeClient,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub stripe: StripeClient,
    pub mailer: Mailer,
    pub config: AppConfig,
}
