//! Server configuration, read from the environment.
//!
//! | Variable                   | Default   |
//! |----------------------------|-----------|
//! | `HOST`                     | `0.0.0.0` |
//! | `PORT`                     | `3001`    |
//! | `HEARTS_IDLE_TIMEOUT_SECS` | `300`     |
//! | `HEARTS_HOST_FALLBACK`     | `false`   |

use std::str::FromStr;
use std::time::Duration;

use hearts_room::RoomConfig;
use serde::{Deserialize, Serialize};

use crate::ServerError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// A connection that sends nothing for this long is dropped.
    pub idle_timeout_secs: u64,
    pub rooms: RoomConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            idle_timeout_secs: 300,
            rooms: RoomConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Reads the configuration from process environment variables,
    /// falling back to defaults for anything unset.
    pub fn from_env() -> Result<Self, ServerError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`ServerConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ServerError> {
        let defaults = Self::default();
        let host = lookup("HOST").unwrap_or(defaults.host);
        let port = parse_var(&lookup, "PORT", defaults.port)?;
        let idle_timeout_secs =
            parse_var(&lookup, "HEARTS_IDLE_TIMEOUT_SECS", defaults.idle_timeout_secs)?;
        let host_fallback_on_lookup = match lookup("HEARTS_HOST_FALLBACK") {
            Some(raw) => parse_bool("HEARTS_HOST_FALLBACK", &raw)?,
            None => defaults.rooms.host_fallback_on_lookup,
        };

        if idle_timeout_secs == 0 {
            return Err(ServerError::Config(
                "HEARTS_IDLE_TIMEOUT_SECS must be greater than zero".into(),
            ));
        }

        Ok(Self {
            host,
            port,
            idle_timeout_secs,
            rooms: RoomConfig {
                host_fallback_on_lookup,
                ..defaults.rooms
            },
        })
    }

    /// `host:port`, ready for binding.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ServerError> {
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ServerError::Config(format!("{key} has invalid value {raw:?}"))),
        None => Ok(default),
    }
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, ServerError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ServerError::Config(format!("{key} has invalid value {raw:?}"))),
    }
}
