/// 환경 변수 기반 설정
// region:    --- Imports
use std::str::FromStr;
use thiserror::Error;

// endregion: --- Imports

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_API_URL: &str = "http://localhost:3000";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// 설정되지 않으면 메모리 저장소 사용
    pub database_url: Option<String>,
    pub bind_addr: String,
    pub db_max_connections: u32,
    pub scheduler_interval_ms: u64,
    pub api_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            db_max_connections: 5,
            scheduler_interval_ms: 1000,
            api_url: DEFAULT_API_URL.to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 조회 함수로부터 설정 구성 (테스트에서 환경 변수 없이 사용)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        let non_empty = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Ok(Config {
            database_url: non_empty("DATABASE_URL"),
            bind_addr: non_empty("BIND_ADDR").unwrap_or(defaults.bind_addr),
            db_max_connections: parse_or(
                "DB_MAX_CONNECTIONS",
                non_empty("DB_MAX_CONNECTIONS"),
                defaults.db_max_connections,
            )?,
            scheduler_interval_ms: parse_or(
                "SCHEDULER_INTERVAL_MS",
                non_empty("SCHEDULER_INTERVAL_MS"),
                defaults.scheduler_interval_ms,
            )?,
            api_url: non_empty("API_URL").unwrap_or(defaults.api_url),
        })
    }
}

fn parse_or<T: FromStr>(
    key: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value.parse().map_err(|_| ConfigError::Invalid { key, value }),
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
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_env() {
        assert_eq!(Config::from_lookup(lookup(&[])).unwrap(), Config::default());
    }

    #[test]
    fn blank_api_url_falls_back() {
        let config =
            Config::from_lookup(lookup(&[("API_URL", "   "), ("DATABASE_URL", "")])).unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.database_url, None);
    }

    #[test]
    fn reads_overrides_and_rejects_garbage() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/auction"),
            ("SCHEDULER_INTERVAL_MS", "250"),
            ("API_URL", " http://api:8080 "),
        ]))
        .unwrap();
        assert_eq!(
            config.database_url.as_deref(),
            Some("postgres://localhost/auction")
        );
        assert_eq!(config.scheduler_interval_ms, 250);
        assert_eq!(config.api_url, "http://api:8080");

        assert_eq!(
            Config::from_lookup(lookup(&[("DB_MAX_CONNECTIONS", "many")])),
            Err(ConfigError::Invalid {
                key: "DB_MAX_CONNECTIONS",
                value: "many".to_string()
            })
        );
    }
}
