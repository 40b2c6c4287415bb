//! WhatsApp notifications for rate opportunities.

pub mod twilio;

use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::{error, info};

use crate::error::NotifyError;
use crate::models::RateEntry;

pub use twilio::TwilioClient;

/// At most this many opportunities are listed in one message.
pub const MAX_LISTED: usize = 10;

pub const REMINDER_BODY: &str = "🤖 *Mantenimiento Bot*\n\n\
Para evitar que la sesión de prueba caduque, por favor responde a este mensaje \
con cualquier texto (ej: \"ok\").";

/// Provider acknowledgement of an accepted message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub sid: String,
    pub status: String,
}

/// Trait for the channel that delivers a message body to the configured recipient.
#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send(&self, body: &str) -> Result<Delivery, NotifyError>;
}

/// Formats opportunity alerts and hands them to a `MessageSender`.
#[derive(Clone)]
pub struct Notifier {
    sender: Arc<dyn MessageSender>,
    min_rate: Decimal,
}

impl Notifier {
    pub fn new(sender: Arc<dyn MessageSender>, min_rate: Decimal) -> Self {
        Self { sender, min_rate }
    }

    /// Send the top opportunities. No outbound call when there are none.
    pub async fn notify(&self, opportunities: &[RateEntry]) -> Result<Option<Delivery>, NotifyError> {
        if opportunities.is_empty() {
            return Ok(None);
        }

        let body = format_opportunities(opportunities, self.min_rate);
        match self.sender.send(&body).await {
            Ok(delivery) => {
                info!(
                    "WhatsApp sent. SID: {} - Status: {}",
                    delivery.sid, delivery.status
                );
                Ok(Some(delivery))
            }
            Err(e) => {
                log_failure("Failed to send opportunity alert", &e);
                Err(e)
            }
        }
    }

    /// Message that keeps the sandbox session from expiring.
    pub async fn send_reminder(&self) -> Result<Delivery, NotifyError> {
        let delivery = self.sender.send(REMINDER_BODY).await?;
        info!("Maintenance reminder sent. SID: {}", delivery.sid);
        Ok(delivery)
    }
}

fn log_failure(context: &str, err: &NotifyError) {
    if err.is_session_expired() {
        error!("⚠️  SANDBOX ALERT: {}", err);
    } else {
        error!("{}: {}", context, err);
    }
}

/// Message body listing the first `MAX_LISTED` opportunities in order.
pub fn format_opportunities(opportunities: &[RateEntry], min_rate: Decimal) -> String {
    let mut body = format!(
        "🚀 *Oportunidades de Caución (> {}%)* 🚀\n\n",
        min_rate.normalize()
    );
    for op in opportunities.iter().take(MAX_LISTED) {
        body.push_str(&format!(
            "📅 Plazo: {} días - 📈 Tasa: {}%\n",
            op.term_days,
            op.rate_percent.normalize()
        ));
    }
    body
}
