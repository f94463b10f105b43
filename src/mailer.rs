use serde::Serialize;
use thiserror::Error;

const API_BASE: &str = "https://api.resend.com";

#[derive(Debug, Error)]
pub enum MailError {
    #[error("email request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("email api error ({status}): {message}")]
    Api { status: u16, message: String },
}

#[derive(Serialize)]
struct SendEmailBody<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

/// Thin transactional-email client (Resend-compatible API).
#[derive(Clone)]
pub struct Mailer {
    http: reqwest::Client,
    api_key: String,
    from: String,
}

impl Mailer {
    pub fn new(api_key: impl Into<String>, from: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            from: from.into(),
        }
    }

    pub async fn send(&self, to: &str, subject: &str, html: &str) -> Result<(), MailError> {
        let body = SendEmailBody {
            from: &self.from,
            to: [to],
            subject,
            html,
        };

        let response = self
            .http
            .post(format!("{API_BASE}/emails"))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(MailError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(())
    }
}
