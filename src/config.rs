//! Process configuration, read once at startup from the environment.

use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use tracing::warn;

use crate::error::ConfigError;
use crate::scheduler;

pub const DEFAULT_SOURCE_URL: &str = "https://www.dolarito.ar/merval/cauciones";
pub const DEFAULT_TWILIO_API_BASE: &str = "https://api.twilio.com";
pub const DEFAULT_PORT: u16 = 3000;

static THRESHOLD_RE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^\s*(-?\d+(?:[.,]\d+)?)").ok());

/// Credentials and addresses for the Twilio WhatsApp API.
///
/// Every field is optional: a missing value only fails when a message is sent.
#[derive(Debug, Clone, Default)]
pub struct TwilioConfig {
    pub account_sid: Option<String>,
    pub auth_token: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub api_base: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub twilio: TwilioConfig,
    /// Minimum TNA (percent); only strictly higher rates are opportunities
    pub min_rate: Decimal,
    /// Cron expression for the scheduled scan
    pub scan_schedule: Option<String>,
    /// Shared secret for `GET /run`
    pub run_token: Option<String>,
    pub port: u16,
    pub source_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            twilio: TwilioConfig {
                api_base: DEFAULT_TWILIO_API_BASE.to_string(),
                ..Default::default()
            },
            min_rate: Decimal::ZERO,
            scan_schedule: None,
            run_token: None,
            port: DEFAULT_PORT,
            source_url: DEFAULT_SOURCE_URL.to_string(),
        }
    }
}

impl Config {
    /// Load from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let min_rate = match get("MIN_TNA") {
            None => Decimal::ZERO,
            Some(raw) => parse_rate_threshold(&raw).unwrap_or_else(|| {
                warn!("MIN_TNA={:?} is not a number, using 0", raw);
                Decimal::ZERO
            }),
        };

        let port = match get("PORT") {
            None => DEFAULT_PORT,
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: "PORT",
                value: raw.clone(),
            })?,
        };

        let scan_schedule = get("CRON_SCHEDULE");
        if let Some(expr) = scan_schedule.as_deref() {
            scheduler::parse_schedule(expr)?;
        }

        Ok(Self {
            twilio: TwilioConfig {
                account_sid: get("TWILIO_ACCOUNT_SID"),
                auth_token: get("TWILIO_AUTH_TOKEN"),
                from: get("TWILIO_WHATSAPP_FROM"),
                to: get("TWILIO_WHATSAPP_TO"),
                api_base: get("TWILIO_API_BASE")
                    .unwrap_or_else(|| DEFAULT_TWILIO_API_BASE.to_string()),
            },
            min_rate,
            scan_schedule,
            run_token: get("RUN_TOKEN"),
            port,
            source_url: get("CAUCIONES_URL").unwrap_or_else(|| DEFAULT_SOURCE_URL.to_string()),
        })
    }
}

/// Leading number of the value: `35`, `35.5`, `35,5`, `30%` and `30 TNA` all
/// parse; text without a leading number does not.
fn parse_rate_threshold(raw: &str) -> Option<Decimal> {
    let caps = THRESHOLD_RE.as_ref()?.captures(raw)?;
    Decimal::from_str(&caps.get(1)?.as_str().replace(',', ".")).ok()
}
