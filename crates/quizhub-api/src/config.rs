//! Server configuration read from the environment.

use std::fmt::Display;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use quizhub_broadcast::HubConfig;

use crate::error::AppError;

/// Runtime settings for the API server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Interface to bind (`HOST`, default `0.0.0.0`).
    pub host: String,
    /// Port to bind (`PORT`, default `3000`).
    pub port: u16,
    /// JSON file of quizzes to load at startup (`QUIZ_SEED_PATH`).
    pub quiz_seed_path: Option<PathBuf>,
    /// Broadcast hub tunables (`HUB_MAILBOX_CAPACITY`, `HUB_SEND_TIMEOUT_MS`,
    /// `HUB_TEARDOWN_GRACE_MS`).
    pub hub: HubConfig,
}

impl ServerConfig {
    /// Reads the configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is set but invalid.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, which maps a variable name
    /// to its value.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is set but invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let defaults = HubConfig::default();
        let mailbox_capacity = parse_or(&lookup, "HUB_MAILBOX_CAPACITY", defaults.mailbox_capacity)?;
        if mailbox_capacity == 0 {
            return Err(AppError::Config(
                "HUB_MAILBOX_CAPACITY must be at least 1".to_owned(),
            ));
        }
        let send_timeout = parse_millis_or(&lookup, "HUB_SEND_TIMEOUT_MS", defaults.send_timeout)?;
        if send_timeout.is_zero() {
            return Err(AppError::Config(
                "HUB_SEND_TIMEOUT_MS must be at least 1".to_owned(),
            ));
        }
        let teardown_grace =
            parse_millis_or(&lookup, "HUB_TEARDOWN_GRACE_MS", defaults.teardown_grace)?;

        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_owned()),
            port: parse_or(&lookup, "PORT", 3000)?,
            quiz_seed_path: lookup("QUIZ_SEED_PATH")
                .filter(|path| !path.is_empty())
                .map(PathBuf::from),
            hub: HubConfig {
                mailbox_capacity,
                send_timeout,
                teardown_grace,
            },
        })
    }

    /// The socket address to listen on.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `host` is not an IP address.
    pub fn bind_addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::Config(format!("{key} must be a valid number: {e}"))),
        None => Ok(default),
    }
}

fn parse_millis_or(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: Duration,
) -> Result<Duration, AppError> {
    match lookup(key) {
        Some(_) => parse_or(lookup, key, 0_u64).map(Duration::from_millis),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<ServerConfig, AppError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_apply_when_nothing_is_set() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.quiz_seed_path, None);
        assert_eq!(config.hub, HubConfig::default());
        assert_eq!(config.bind_addr().unwrap().port(), 3000);
    }

    #[test]
    fn test_values_are_read_from_lookup() {
        let config = config_from(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("QUIZ_SEED_PATH", "/etc/quizhub/quizzes.json"),
            ("HUB_MAILBOX_CAPACITY", "16"),
            ("HUB_SEND_TIMEOUT_MS", "250"),
            ("HUB_TEARDOWN_GRACE_MS", "500"),
        ])
        .unwrap();

        assert_eq!(config.bind_addr().unwrap().to_string(), "127.0.0.1:8080");
        assert_eq!(
            config.quiz_seed_path,
            Some(PathBuf::from("/etc/quizhub/quizzes.json"))
        );
        assert_eq!(config.hub.mailbox_capacity, 16);
        assert_eq!(config.hub.send_timeout, Duration::from_millis(250));
        assert_eq!(config.hub.teardown_grace, Duration::from_millis(500));
    }

    #[test]
    fn test_invalid_port_is_config_error() {
        let result = config_from(&[("PORT", "not-a-port")]);

        assert!(matches!(result, Err(AppError::Config(msg)) if msg.contains("PORT")));
    }

    #[test]
    fn test_zero_mailbox_capacity_is_rejected() {
        let result = config_from(&[("HUB_MAILBOX_CAPACITY", "0")]);

        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_zero_send_timeout_is_rejected() {
        let result = config_from(&[("HUB_SEND_TIMEOUT_MS", "0")]);

        assert!(matches!(result, Err(AppError::Config(msg)) if msg.contains("HUB_SEND_TIMEOUT_MS")));
    }

    #[test]
    fn test_zero_teardown_grace_is_allowed() {
        let config = config_from(&[("HUB_TEARDOWN_GRACE_MS", "0")]).unwrap();

        assert_eq!(config.hub.teardown_grace, Duration::ZERO);
    }

    #[test]
    fn test_hostname_is_not_a_bind_address() {
        let config = config_from(&[("HOST", "localhost")]).unwrap();

        assert!(matches!(config.bind_addr(), Err(AppError::Config(_))));
    }
}
