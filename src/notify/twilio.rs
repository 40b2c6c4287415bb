use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::{Delivery, MessageSender};
use crate::config::TwilioConfig;
use crate::error::NotifyError;

/// Twilio Messages API success response
#[derive(Debug, Deserialize)]
struct MessageResource {
    sid: String,
    status: String,
}

/// Twilio REST error body
#[derive(Debug, Deserialize)]
struct TwilioErrorBody {
    code: Option<i64>,
    message: Option<String>,
}

/// Sends WhatsApp messages through the Twilio Messages API.
pub struct TwilioClient {
    client: Client,
    config: TwilioConfig,
}

impl TwilioClient {
    pub fn new(config: TwilioConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn messages_url(&self, account_sid: &str) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.config.api_base.trim_end_matches('/'),
            account_sid
        )
    }
}

fn required<'a>(value: &'a Option<String>, name: &'static str) -> Result<&'a str, NotifyError> {
    value
        .as_deref()
        .ok_or(NotifyError::MissingCredentials(name))
}

#[async_trait]
impl MessageSender for TwilioClient {
    async fn send(&self, body: &str) -> Result<Delivery, NotifyError> {
        let account_sid = required(&self.config.account_sid, "TWILIO_ACCOUNT_SID")?;
        let auth_token = required(&self.config.auth_token, "TWILIO_AUTH_TOKEN")?;
        let from = required(&self.config.from, "TWILIO_WHATSAPP_FROM")?;
        let to = required(&self.config.to, "TWILIO_WHATSAPP_TO")?;

        let url = self.messages_url(account_sid);
        debug!("Posting message to {}", url);

        let response = self
            .client
            .post(&url)
            .basic_auth(account_sid, Some(auth_token))
            .form(&[("From", from), ("To", to), ("Body", body)])
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| NotifyError::Transport(format!("failed reading response: {}", e)))?;

        if !status.is_success() {
            let parsed: Option<TwilioErrorBody> = serde_json::from_str(&text).ok();
            let (code, message) = match parsed {
                Some(body) => (
                    body.code.unwrap_or_else(|| i64::from(status.as_u16())),
                    body.message.unwrap_or_else(|| status.to_string()),
                ),
                None => (i64::from(status.as_u16()), status.to_string()),
            };
            return Err(NotifyError::from_provider(code, message, from));
        }

        let resource: MessageResource = serde_json::from_str(&text)
            .map_err(|e| NotifyError::Transport(format!("unexpected response: {}", e)))?;

        Ok(Delivery {
            sid: resource.sid,
            status: resource.status,
        })
    }
}
