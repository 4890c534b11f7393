//! Object store connection settings, read from the environment.
//!
//! A `.env` file in the working directory is honoured. The password is kept
//! in a [`SecretString`] and never appears in `Debug` output or logs.

use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

pub const ENV_BASE_URL: &str = "WEBJURIS_BASE_URL";
pub const ENV_OBJECT_PATH: &str = "WEBJURIS_OBJECT_PATH";
pub const ENV_USERNAME: &str = "WEBJURIS_USERNAME";
pub const ENV_PASSWORD: &str = "WEBJURIS_PASSWORD";
pub const ENV_PAGE_SIZE: &str = "WEBJURIS_PAGE_SIZE";
pub const ENV_TIMEOUT_SECS: &str = "WEBJURIS_TIMEOUT_SECS";
pub const ENV_FETCH_RELATED: &str = "WEBJURIS_FETCH_RELATED";

pub const DEFAULT_OBJECT_PATH: &str = "/o/c/dossiers";
pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 500;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required setting {key}")]
    Missing { key: String },

    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Where and how to reach the object store.
#[derive(Debug)]
pub struct ObjectStoreConfig {
    /// Scheme and host, no trailing slash, e.g. `https://portal.example.ma`.
    pub base_url: String,
    /// Collection path, e.g. `/o/c/dossiers`.
    pub object_path: String,
    pub username: String,
    pub password: SecretString,
    pub page_size: u32,
    pub timeout: Duration,
    /// Whether to fetch `relatedParties` / `relatedDecisions` per record.
    pub fetch_related: bool,
}

impl ObjectStoreConfig {
    pub fn new(base_url: &str, username: &str, password: &str) -> Self {
        Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            object_path: DEFAULT_OBJECT_PATH.to_string(),
            username: username.to_string(),
            password: SecretString::from(password.to_string()),
            page_size: DEFAULT_PAGE_SIZE,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            fetch_related: true,
        }
    }

    /// Load from the process environment, after reading `.env` if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env file is normal.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let require = |key: &str| {
            get(key).ok_or_else(|| ConfigError::Missing {
                key: key.to_string(),
            })
        };

        let base_url = validate_base_url(&require(ENV_BASE_URL)?)?;
        let object_path = match get(ENV_OBJECT_PATH) {
            Some(raw) => validate_object_path(&raw)?,
            None => DEFAULT_OBJECT_PATH.to_string(),
        };
        let username = require(ENV_USERNAME)?;
        let password = SecretString::from(require(ENV_PASSWORD)?);

        let page_size = match get(ENV_PAGE_SIZE) {
            Some(raw) => parse_page_size(&raw)?,
            None => DEFAULT_PAGE_SIZE,
        };
        let timeout_secs = match get(ENV_TIMEOUT_SECS) {
            Some(raw) => raw.parse::<u64>().ok().filter(|s| *s > 0).ok_or_else(|| {
                ConfigError::InvalidValue {
                    key: ENV_TIMEOUT_SECS.to_string(),
                    message: format!("expected a positive number of seconds, got '{raw}'"),
                }
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };
        let fetch_related = match get(ENV_FETCH_RELATED) {
            Some(raw) => parse_bool(ENV_FETCH_RELATED, &raw)?,
            None => true,
        };

        Ok(Self {
            base_url,
            object_path,
            username,
            password,
            page_size,
            timeout: Duration::from_secs(timeout_secs),
            fetch_related,
        })
    }

    /// Absolute URL of the case collection.
    pub fn collection_url(&self) -> String {
        format!("{}{}", self.base_url, self.object_path)
    }
}

fn validate_base_url(raw: &str) -> Result<String, ConfigError> {
    if !(raw.starts_with("http://") || raw.starts_with("https://")) {
        return Err(ConfigError::InvalidValue {
            key: ENV_BASE_URL.to_string(),
            message: "must start with http:// or https://".to_string(),
        });
    }
    Ok(raw.trim_end_matches('/').to_string())
}

fn validate_object_path(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim_matches('/');
    if trimmed.is_empty() || trimmed.split('/').any(|seg| seg.is_empty() || seg == "..") {
        return Err(ConfigError::InvalidValue {
            key: ENV_OBJECT_PATH.to_string(),
            message: format!("'{raw}' is not a collection path"),
        });
    }
    Ok(format!("/{trimmed}"))
}

fn parse_page_size(raw: &str) -> Result<u32, ConfigError> {
    raw.parse::<u32>()
        .ok()
        .filter(|n| (1..=MAX_PAGE_SIZE).contains(n))
        .ok_or_else(|| ConfigError::InvalidValue {
            key: ENV_PAGE_SIZE.to_string(),
            message: format!("expected 1..={MAX_PAGE_SIZE}, got '{raw}'"),
        })
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("expected a boolean, got '{raw}'"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn minimal() -> Vec<(&'static str, &'static str)> {
        vec![
            (ENV_BASE_URL, "https://portal.example.ma/"),
            (ENV_USERNAME, "webjuris-api-service"),
            (ENV_PASSWORD, "s3cret"),
        ]
    }

    #[test]
    fn defaults_apply() {
        let cfg = ObjectStoreConfig::from_lookup(lookup(&minimal())).unwrap();
        assert_eq!(cfg.base_url, "https://portal.example.ma");
        assert_eq!(cfg.object_path, "/o/c/dossiers");
        assert_eq!(cfg.collection_url(), "https://portal.example.ma/o/c/dossiers");
        assert_eq!(cfg.page_size, 20);
        assert_eq!(cfg.timeout, Duration::from_secs(30));
        assert!(cfg.fetch_related);
        assert_eq!(cfg.password.expose_secret(), "s3cret");
    }

    #[test]
    fn password_is_not_in_debug_output() {
        let cfg = ObjectStoreConfig::from_lookup(lookup(&minimal())).unwrap();
        assert!(!format!("{cfg:?}").contains("s3cret"));
    }

    #[test]
    fn overrides_are_read() {
        let mut pairs = minimal();
        pairs.push((ENV_OBJECT_PATH, "o/c/affaires/"));
        pairs.push((ENV_PAGE_SIZE, "50"));
        pairs.push((ENV_TIMEOUT_SECS, "5"));
        pairs.push((ENV_FETCH_RELATED, "off"));
        let cfg = ObjectStoreConfig::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(cfg.object_path, "/o/c/affaires");
        assert_eq!(cfg.page_size, 50);
        assert_eq!(cfg.timeout, Duration::from_secs(5));
        assert!(!cfg.fetch_related);
    }

    #[test]
    fn missing_credentials_are_reported() {
        let err = ObjectStoreConfig::from_lookup(lookup(&[(ENV_BASE_URL, "https://x.ma")]))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::Missing {
                key: ENV_USERNAME.to_string()
            }
        );
    }

    #[test]
    fn blank_values_count_as_missing() {
        let mut pairs = minimal();
        pairs[2] = (ENV_PASSWORD, "   ");
        let err = ObjectStoreConfig::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::Missing { key } if key == ENV_PASSWORD));
    }

    #[test]
    fn invalid_values_are_rejected() {
        for (key, value) in [
            (ENV_BASE_URL, "portal.example.ma"),
            (ENV_PAGE_SIZE, "0"),
            (ENV_PAGE_SIZE, "1000"),
            (ENV_TIMEOUT_SECS, "soon"),
            (ENV_FETCH_RELATED, "maybe"),
            (ENV_OBJECT_PATH, "/o/../secret"),
        ] {
            let mut pairs = minimal();
            pairs.retain(|(k, _)| *k != key);
            pairs.push((key, value));
            let err = ObjectStoreConfig::from_lookup(lookup(&pairs)).unwrap_err();
            assert!(
                matches!(&err, ConfigError::InvalidValue { key: k, .. } if k == key),
                "{key}={value} gave {err:?}"
            );
        }
    }
}
