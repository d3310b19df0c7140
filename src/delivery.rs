//! Delivery adapter — Telegram Bot API.
//!
//! Sends the composed digest to one preconfigured chat via the
//! `sendMessage` method. Exactly one outbound message per successful
//! run; no retry, no deduplication, no rate limiting.
//!
//! API: `https://api.telegram.org/bot{token}/sendMessage`
//! Auth: bot token in the URL path; chat id in the request body.

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

const DEFAULT_API_BASE: &str = "https://api.telegram.org";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Typed failure modes, so callers can tell "never attempted I/O"
/// apart from "the API said no".
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("Delivery credential missing: {0}")]
    MissingCredentials(&'static str),

    #[error("Telegram API rejected the message ({status}): {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Telegram transport error: {0}")]
    Http(#[from] reqwest::Error),
}

// ---------------------------------------------------------------------------
// Seam
// ---------------------------------------------------------------------------

/// Abstraction over the outbound message sink.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send one text message to the configured destination.
    async fn deliver(&self, text: &str) -> Result<(), DeliveryError>;
}

// ---------------------------------------------------------------------------
// Telegram implementation
// ---------------------------------------------------------------------------

pub struct TelegramNotifier {
    http: Client,
    bot_token: Option<String>,
    chat_id: Option<String>,
    api_base: String,
}

impl TelegramNotifier {
    /// Credentials are resolved by the caller and may be absent —
    /// in that case `deliver` fails before any network I/O.
    pub fn new(bot_token: Option<String>, chat_id: Option<String>) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(15))
            .user_agent("DAYBRIEF/0.1.0")
            .build()
            .context("Failed to build Telegram HTTP client")?;
        Ok(Self {
            http,
            bot_token,
            chat_id,
            api_base: DEFAULT_API_BASE.to_string(),
        })
    }

    /// Override the API base URL (tests point this at an unreachable
    /// address to prove the credential check happens first).
    #[doc(hidden)]
    pub fn with_api_base(mut self, api_base: &str) -> Self {
        self.api_base = api_base.to_string();
        self
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn deliver(&self, text: &str) -> Result<(), DeliveryError> {
        let bot_token = self
            .bot_token
            .as_deref()
            .ok_or(DeliveryError::MissingCredentials("bot token"))?;
        let chat_id = self
            .chat_id
            .as_deref()
            .ok_or(DeliveryError::MissingCredentials("chat id"))?;

        let url = format!("{}/bot{bot_token}/sendMessage", self.api_base);
        let body = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
        });

        debug!(chars = text.len(), "Sending digest to Telegram");

        let resp = self.http.post(&url).json(&body).send().await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(DeliveryError::Api { status, body });
        }

        info!(chat_id = %chat_id, "Digest sent");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    /// Unreachable on any sane machine — a request here would error
    /// with a transport failure, not a credential one.
    const DEAD_BASE: &str = "http://127.0.0.1:9";

    #[tokio::test]
    async fn test_deliver_without_token_fails_before_io() {
        let notifier = TelegramNotifier::new(None, Some("42".to_string()))
            .unwrap()
            .with_api_base(DEAD_BASE);
        let err = notifier.deliver("hello").await.unwrap_err();
        assert!(matches!(
            err,
            DeliveryError::MissingCredentials("bot token")
        ));
    }

    #[tokio::test]
    async fn test_deliver_without_chat_id_fails_before_io() {
        let notifier = TelegramNotifier::new(Some("123:abc".to_string()), None)
            .unwrap()
            .with_api_base(DEAD_BASE);
        let err = notifier.deliver("hello").await.unwrap_err();
        assert!(matches!(err, DeliveryError::MissingCredentials("chat id")));
    }

    #[tokio::test]
    async fn test_deliver_with_credentials_reaches_transport() {
        // Both credentials present: the request is attempted and the
        // dead endpoint surfaces as a transport error instead.
        let notifier = TelegramNotifier::new(
            Some("123:abc".to_string()),
            Some("42".to_string()),
        )
        .unwrap()
        .with_api_base(DEAD_BASE);
        let err = notifier.deliver("hello").await.unwrap_err();
        assert!(matches!(err, DeliveryError::Http(_)));
    }

    #[test]
    fn test_error_display() {
        let err = DeliveryError::MissingCredentials("bot token");
        assert_eq!(format!("{err}"), "Delivery credential missing: bot token");
    }
}
