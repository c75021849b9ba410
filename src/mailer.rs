//! Outbound transactional email.
//!
//! Delivery goes through an HTTP relay (any provider accepting a JSON message
//! with a bearer key). Without a relay configured, messages are only logged.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, info};

/// A single HTML email
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("mail relay request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("mail relay rejected message with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError>;
}

/// Delivers mail by POSTing it to a relay endpoint
pub struct HttpMailer {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpMailer {
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(endpoint: String, api_key: Option<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            api_key,
        })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        debug!("Relaying email to {} via {}", email.to, self.endpoint);

        let mut request = self.client.post(&self.endpoint).json(email);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MailError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        info!("Email relayed to {} (subject={:?})", email.to, email.subject);
        Ok(())
    }
}

/// Writes messages to the log instead of sending them
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        info!(
            "Mail relay not configured; email to {} not sent (subject={:?})",
            email.to, email.subject
        );
        Ok(())
    }
}
