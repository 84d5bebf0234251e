use std::{env, fmt::Display, str::FromStr, time::Duration};

use thiserror::Error;
use url::Url;

pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_UPSTREAM_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_GENERATE_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid {key} value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: Box<str>,
        reason: Box<str>,
    },
}

/// Process-wide settings, read once at startup and never mutated.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub upstream_url: Url,
    /// Budget for search, profile lookup and profile listing.
    pub upstream_timeout: Duration,
    pub generate_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            upstream_url: Url::parse(DEFAULT_UPSTREAM_URL).expect("default upstream URL is valid"),
            upstream_timeout: DEFAULT_UPSTREAM_TIMEOUT,
            generate_timeout: DEFAULT_GENERATE_TIMEOUT,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let upstream_url = match lookup("ML_SERVICE_URL").or_else(|| lookup("PYTHON_ML_URL")) {
            Some(value) => parse_upstream_url(&value)?,
            None => {
                tracing::info!("ML_SERVICE_URL not set, using default: {DEFAULT_UPSTREAM_URL}");
                Url::parse(DEFAULT_UPSTREAM_URL).map_err(|e| invalid("ML_SERVICE_URL", DEFAULT_UPSTREAM_URL, e))?
            }
        };

        Ok(Self {
            port: try_load(&lookup, "PORT", DEFAULT_PORT)?,
            upstream_url,
            upstream_timeout: load_timeout(&lookup, "UPSTREAM_TIMEOUT_SECS", DEFAULT_UPSTREAM_TIMEOUT)?,
            generate_timeout: load_timeout(&lookup, "GENERATE_TIMEOUT_SECS", DEFAULT_GENERATE_TIMEOUT)?,
        })
    }

    /// Upstream address as shown to operators, without the trailing slash `Url` adds.
    pub fn upstream_display(&self) -> &str {
        self.upstream_url.as_str().trim_end_matches('/')
    }
}

fn invalid(key: &'static str, value: &str, reason: impl Display) -> ConfigError {
    ConfigError::Invalid {
        key,
        value: value.into(),
        reason: reason.to_string().into(),
    }
}

fn try_load<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Display,
    T::Err: Display,
{
    match lookup(key) {
        Some(value) => value.trim().parse().map_err(|e| invalid(key, &value, e)),
        None => {
            tracing::info!("{key} not set, using default: {default}");
            Ok(default)
        }
    }
}

fn load_timeout<F>(lookup: &F, key: &'static str, default: Duration) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let secs: u64 = try_load(lookup, key, default.as_secs())?;
    if secs == 0 {
        return Err(invalid(key, "0", "timeout must be at least one second"));
    }
    Ok(Duration::from_secs(secs))
}

fn parse_upstream_url(value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value.trim()).map_err(|e| invalid("ML_SERVICE_URL", value, e))?;
    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(invalid("ML_SERVICE_URL", value, "expected an absolute http(s) URL"));
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn falls_back_to_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.port, 3001);
        assert_eq!(config.upstream_display(), "http://127.0.0.1:8000");
        assert_eq!(config.upstream_timeout, Duration::from_secs(10));
        assert_eq!(config.generate_timeout, Duration::from_secs(15));
    }

    #[test]
    fn reads_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("PORT", "8080"),
            ("ML_SERVICE_URL", "https://ml.internal:9000/v1"),
            ("UPSTREAM_TIMEOUT_SECS", "3"),
            ("GENERATE_TIMEOUT_SECS", "30"),
        ]))
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.upstream_display(), "https://ml.internal:9000/v1");
        assert_eq!(config.upstream_timeout, Duration::from_secs(3));
        assert_eq!(config.generate_timeout, Duration::from_secs(30));
    }

    #[test]
    fn accepts_legacy_upstream_variable() {
        let config = Config::from_lookup(lookup(&[("PYTHON_ML_URL", "http://ml:8000")])).unwrap();
        assert_eq!(config.upstream_display(), "http://ml:8000");
    }

    #[test]
    fn prefers_new_upstream_variable() {
        let config = Config::from_lookup(lookup(&[
            ("PYTHON_ML_URL", "http://old:8000"),
            ("ML_SERVICE_URL", "http://new:8000"),
        ]))
        .unwrap();
        assert_eq!(config.upstream_display(), "http://new:8000");
    }

    #[test]
    fn rejects_bad_port() {
        let err = Config::from_lookup(lookup(&[("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "PORT", .. }));
    }

    #[test]
    fn rejects_non_http_upstream() {
        for value in ["ftp://ml:21", "not a url", "mailto:ml@example.com"] {
            let err = Config::from_lookup(lookup(&[("ML_SERVICE_URL", value)])).unwrap_err();
            assert!(
                matches!(err, ConfigError::Invalid { key: "ML_SERVICE_URL", .. }),
                "{value} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_zero_timeout() {
        let err = Config::from_lookup(lookup(&[("GENERATE_TIMEOUT_SECS", "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "GENERATE_TIMEOUT_SECS", .. }));
    }
}
