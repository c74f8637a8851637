//! Environment-driven client configuration.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Base URL used when `MARQUEE_API_URL` is unset.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:3000";
/// Request timeout used when `MARQUEE_HTTP_TIMEOUT_SECS` is unset.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
/// Environment variable holding the API base URL.
pub const ENV_API_URL: &str = "MARQUEE_API_URL";
/// Environment variable holding the request timeout in seconds.
pub const ENV_TIMEOUT_SECS: &str = "MARQUEE_HTTP_TIMEOUT_SECS";
/// Environment variable holding the persisted session path.
pub const ENV_SESSION_FILE: &str = "MARQUEE_SESSION_FILE";

const SESSION_FILE_NAME: &str = "session.json";

/// Errors raised while building client configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The base URL could not be parsed.
    #[error("invalid API URL '{value}'")]
    InvalidUrl {
        /// Offending input.
        value: String,
        /// Parser failure.
        #[source]
        source: url::ParseError,
    },
    /// The base URL parsed but is not http(s).
    #[error("API URL '{value}' must use http or https")]
    UnsupportedScheme {
        /// Offending input.
        value: String,
    },
    /// The timeout was not a positive integer.
    #[error("invalid HTTP timeout '{value}': expected a positive number of seconds")]
    InvalidTimeout {
        /// Offending input.
        value: String,
    },
    /// The underlying HTTP client could not be constructed.
    #[error("failed to build HTTP client")]
    HttpClient {
        /// Builder failure.
        #[source]
        source: reqwest::Error,
    },
}

/// Resolved settings for an [`crate::ApiClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend root, without a trailing slash requirement.
    pub base_url: Url,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Where the file session backend persists token and user.
    pub session_path: PathBuf,
}

impl ClientConfig {
    /// Configuration pointing at `base_url` with default timeout and session path.
    #[must_use]
    pub fn for_base_url(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            session_path: default_session_path(|key| std::env::var(key).ok()),
        }
    }

    /// Read configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error when a variable is present but malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary lookup, for tests and embedding.
    ///
    /// # Errors
    ///
    /// Returns an error when a variable is present but malformed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = match non_blank(lookup(ENV_API_URL)) {
            Some(raw) => parse_base_url(&raw)?,
            None => parse_base_url(DEFAULT_API_URL)?,
        };
        let timeout = match non_blank(lookup(ENV_TIMEOUT_SECS)) {
            Some(raw) => parse_timeout(&raw)?,
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };
        let session_path = non_blank(lookup(ENV_SESSION_FILE))
            .map_or_else(|| default_session_path(&lookup), PathBuf::from);

        Ok(Self {
            base_url,
            timeout,
            session_path,
        })
    }
}

/// Parse and check an API base URL.
///
/// # Errors
///
/// Returns an error for unparsable input or a non-http(s) scheme.
pub fn parse_base_url(input: &str) -> Result<Url, ConfigError> {
    let trimmed = input.trim();
    let url = Url::parse(trimmed).map_err(|source| ConfigError::InvalidUrl {
        value: trimmed.to_string(),
        source,
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(ConfigError::UnsupportedScheme {
            value: trimmed.to_string(),
        }),
    }
}

fn parse_timeout(input: &str) -> Result<Duration, ConfigError> {
    match input.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidTimeout {
            value: input.to_string(),
        }),
    }
}

fn default_session_path<F>(lookup: F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    let base = non_blank(lookup("XDG_CONFIG_HOME"))
        .map(PathBuf::from)
        .or_else(|| non_blank(lookup("HOME")).map(|home| PathBuf::from(home).join(".config")))
        .unwrap_or_else(std::env::temp_dir);
    base.join("marquee-admin").join(SESSION_FILE_NAME)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|raw| !raw.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_environment_is_empty() {
        let config = ClientConfig::from_lookup(lookup(&[("HOME", "/home/admin")]))
            .expect("config should resolve");
        assert_eq!(config.base_url.as_str(), "http://127.0.0.1:3000/");
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert_eq!(
            config.session_path,
            PathBuf::from("/home/admin/.config/marquee-admin/session.json")
        );
    }

    #[test]
    fn explicit_values_override_defaults() {
        let config = ClientConfig::from_lookup(lookup(&[
            (ENV_API_URL, "https://api.example.com/v1"),
            (ENV_TIMEOUT_SECS, "3"),
            (ENV_SESSION_FILE, "/tmp/s.json"),
        ]))
        .expect("config should resolve");
        assert_eq!(config.base_url.host_str(), Some("api.example.com"));
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.session_path, PathBuf::from("/tmp/s.json"));
    }

    #[test]
    fn malformed_values_are_rejected() {
        let err = ClientConfig::from_lookup(lookup(&[(ENV_API_URL, "not a url")]))
            .expect_err("bad url");
        assert!(matches!(err, ConfigError::InvalidUrl { .. }));

        let err = ClientConfig::from_lookup(lookup(&[(ENV_API_URL, "ftp://host")]))
            .expect_err("bad scheme");
        assert!(matches!(err, ConfigError::UnsupportedScheme { .. }));

        let err = ClientConfig::from_lookup(lookup(&[(ENV_TIMEOUT_SECS, "0")]))
            .expect_err("bad timeout");
        assert!(matches!(err, ConfigError::InvalidTimeout { .. }));
    }
}
