use std::{env, fmt::Display, str::FromStr, time::Duration};

use chrono::{FixedOffset, Offset, Utc};
use log::{info, warn};
use thiserror::Error;

use crate::schedule::slot_utils::{parse_shifts, SlotError, TimeSlots};

const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {key} value '{value}': {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("invalid clinic slots: {0}")]
    Slots(#[from] SlotError),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub port: u16,
    pub api_url: String,
    pub admin_email: String,
    pub admin_password: String,
    pub slots: TimeSlots,
    pub utc_offset: FixedOffset,
    pub session_ttl: chrono::Duration,
    pub notification_ttl: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0".to_string(),
            port: 3000,
            api_url: "http://localhost:3000".to_string(),
            admin_email: "admin@clinic.local".to_string(),
            admin_password: DEFAULT_ADMIN_PASSWORD.to_string(),
            slots: TimeSlots::default(),
            utc_offset: Utc.fix(),
            session_ttl: chrono::Duration::minutes(60),
            notification_ttl: Duration::from_secs(3),
        }
    }
}

impl Config {
    /// Reads the process environment, after loading `.env` if there is one.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let shifts = var(&lookup, "CLINIC_SHIFTS").unwrap_or_else(|| "09:00-12:00,14:00-17:00".to_string());
        let step: u32 = try_load(&lookup, "SLOT_MINUTES", "30")?;
        let slots = TimeSlots::from_shifts(&parse_shifts(&shifts)?, step)?;

        let offset_raw = var(&lookup, "CLINIC_UTC_OFFSET").unwrap_or_else(|| "+00:00".to_string());
        let utc_offset = FixedOffset::from_str(&offset_raw).map_err(|e| ConfigError::Invalid {
            key: "CLINIC_UTC_OFFSET",
            value: offset_raw.clone(),
            reason: e.to_string(),
        })?;

        let admin_password = var(&lookup, "ADMIN_PASSWORD").unwrap_or_else(|| {
            warn!("ADMIN_PASSWORD not set, using the built-in default password");
            DEFAULT_ADMIN_PASSWORD.to_string()
        });

        let session_minutes: i64 = try_load(&lookup, "SESSION_TTL_MINUTES", "60")?;
        let session_ttl = chrono::Duration::try_minutes(session_minutes)
            .filter(|ttl| *ttl > chrono::Duration::zero())
            .ok_or_else(|| ConfigError::Invalid {
                key: "SESSION_TTL_MINUTES",
                value: session_minutes.to_string(),
                reason: "must be a positive number of minutes".to_string(),
            })?;
        let notification_seconds: u64 = try_load(&lookup, "NOTIFICATION_SECONDS", "3")?;

        Ok(Self {
            bind_addr: var(&lookup, "BIND_ADDR").unwrap_or(defaults.bind_addr),
            port: try_load(&lookup, "PORT", "3000")?,
            api_url: var(&lookup, "API_URL").unwrap_or(defaults.api_url),
            admin_email: var(&lookup, "ADMIN_EMAIL").unwrap_or(defaults.admin_email),
            admin_password,
            slots,
            utc_offset,
            session_ttl,
            notification_ttl: Duration::from_secs(notification_seconds),
        })
    }
}

fn var<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn try_load<F, T>(lookup: &F, key: &'static str, default: &str) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    let raw = var(lookup, key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });
    raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        value: raw.clone(),
        reason: e.to_string(),
    })
}
