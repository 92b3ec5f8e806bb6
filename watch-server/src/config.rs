use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::ebay::DEFAULT_EBAY_API_URL;

const BIND_ADDR_ENV: &str = "WATCH_BIND_ADDR";
const STORE_PATH_ENV: &str = "WATCH_STORE_PATH";
const SITE_ROOT_ENV: &str = "WATCH_SITE_ROOT";
const EBAY_APP_ID_ENV: &str = "EBAY_APP_ID";
// Lets deployments point at the sandbox or a mock.
const EBAY_API_URL_ENV: &str = "EBAY_API_URL";
const REFRESH_SECS_ENV: &str = "WATCH_REFRESH_SECS";

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_STORE_PATH: &str = "watches.json";
const DEFAULT_SITE_ROOT: &str = "site";
const DEFAULT_REFRESH_SECS: u64 = 3_600;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub store_path: PathBuf,
    pub site_root: PathBuf,
    /// Marketplace refresh runs only when an app id is configured.
    pub ebay_app_id: Option<String>,
    pub ebay_api_url: String,
    pub refresh_every: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_raw = get(BIND_ADDR_ENV).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr: SocketAddr = bind_raw.parse().map_err(|_| ConfigError::Invalid {
            key: BIND_ADDR_ENV,
            value: bind_raw.clone(),
        })?;

        let refresh_every = match get(REFRESH_SECS_ENV) {
            None => Duration::from_secs(DEFAULT_REFRESH_SECS),
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::Invalid {
                        key: REFRESH_SECS_ENV,
                        value: raw,
                    })
                }
            },
        };

        Ok(Self {
            bind_addr,
            store_path: get(STORE_PATH_ENV)
                .unwrap_or_else(|| DEFAULT_STORE_PATH.to_string())
                .into(),
            site_root: get(SITE_ROOT_ENV)
                .unwrap_or_else(|| DEFAULT_SITE_ROOT.to_string())
                .into(),
            ebay_app_id: get(EBAY_APP_ID_ENV),
            ebay_api_url: get(EBAY_API_URL_ENV)
                .unwrap_or_else(|| DEFAULT_EBAY_API_URL.to_string()),
            refresh_every,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(config.store_path, PathBuf::from("watches.json"));
        assert_eq!(config.site_root, PathBuf::from("site"));
        assert_eq!(config.ebay_app_id, None);
        assert_eq!(config.ebay_api_url, DEFAULT_EBAY_API_URL);
        assert_eq!(config.refresh_every, Duration::from_secs(3_600));
    }

    #[test]
    fn overrides_are_read() {
        let config = Config::from_lookup(lookup(&[
            ("WATCH_BIND_ADDR", "127.0.0.1:9000"),
            ("EBAY_APP_ID", "app-123"),
            ("WATCH_REFRESH_SECS", "60"),
            ("WATCH_STORE_PATH", " "),
        ]))
        .unwrap();
        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.ebay_app_id.as_deref(), Some("app-123"));
        assert_eq!(config.refresh_every, Duration::from_secs(60));
        assert_eq!(config.store_path, PathBuf::from("watches.json"));
    }

    #[test]
    fn bad_values_are_rejected() {
        let err = Config::from_lookup(lookup(&[("WATCH_REFRESH_SECS", "0")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                key: "WATCH_REFRESH_SECS",
                value: "0".into()
            }
        );
        assert!(Config::from_lookup(lookup(&[("WATCH_BIND_ADDR", "nope")])).is_err());
    }
}
