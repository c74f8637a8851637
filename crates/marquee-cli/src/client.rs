//! Shared client construction, error types, and argument parsers for the CLI.

use std::fmt::{self, Display, Formatter};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use marquee_client::config::parse_base_url;
use marquee_client::{
    ApiClient, ApiError, ClientConfig, ConfigError, FileSessionBackend, LoginBoundary, Session,
    SessionError,
};
use url::Url;

/// CLI-level error type to distinguish validation from operational failures.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Failure(anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("cli error")
    }
}

impl std::error::Error for CliError {}

impl From<ApiError> for CliError {
    fn from(err: ApiError) -> Self {
        if err.is_validation() {
            Self::Validation(err.message().to_string())
        } else {
            Self::failure(err)
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        Self::failure(err)
    }
}

impl From<SessionError> for CliError {
    fn from(err: SessionError) -> Self {
        Self::failure(err)
    }
}

/// Login boundary for a terminal: tells the operator to sign in again.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct TerminalBoundary;

impl LoginBoundary for TerminalBoundary {
    fn redirect_to_login(&self) {
        eprintln!("session ended: run `marquee-admin login` to sign in again");
    }
}

/// Connection overrides collected from global flags.
#[derive(Debug, Clone, Default)]
pub(crate) struct ConnectionArgs {
    pub(crate) api_url: Option<Url>,
    pub(crate) timeout_secs: Option<u64>,
    pub(crate) session_file: Option<PathBuf>,
}

impl ConnectionArgs {
    /// Environment configuration with flags layered on top.
    pub(crate) fn client_config(&self) -> CliResult<ClientConfig> {
        self.apply(ClientConfig::from_env()?)
    }

    fn apply(&self, mut config: ClientConfig) -> CliResult<ClientConfig> {
        if let Some(url) = &self.api_url {
            config.base_url = url.clone();
        }
        if let Some(secs) = self.timeout_secs {
            if secs == 0 {
                return Err(CliError::validation("--timeout must be at least 1 second"));
            }
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(path) = &self.session_file {
            config.session_path.clone_from(path);
        }
        Ok(config)
    }
}

/// Application context passed to command handlers.
#[derive(Clone)]
pub(crate) struct AppContext {
    pub(crate) client: ApiClient,
}

impl AppContext {
    /// Open the persisted session and build the API client around it.
    pub(crate) fn connect(args: &ConnectionArgs) -> CliResult<Self> {
        let config = args.client_config()?;
        tracing::debug!(
            api_url = %config.base_url,
            session = %config.session_path.display(),
            "connecting"
        );
        let session = Session::open(
            FileSessionBackend::new(config.session_path.clone()),
            Arc::new(TerminalBoundary),
        )?;
        let client = ApiClient::new(&config, session)?;
        Ok(Self { client })
    }
}

/// Parse the API URL provided to the CLI.
pub(crate) fn parse_url(input: &str) -> Result<Url, String> {
    parse_base_url(input).map_err(|err| err.to_string())
}

/// Parse a `field=value` assignment.
pub(crate) fn parse_assignment(input: &str) -> Result<(String, String), String> {
    let (field, value) = input
        .split_once('=')
        .ok_or_else(|| format!("expected field=value, got '{input}'"))?;
    let field = field.trim();
    if field.is_empty() {
        return Err(format!("field name missing in '{input}'"));
    }
    Ok((field.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn api_errors_map_to_exit_codes() {
        let validation = CliError::from(ApiError::validation("Name is required"));
        assert_eq!(validation.exit_code(), 2);
        assert_eq!(validation.display_message(), "Name is required");

        let failure = CliError::from(ApiError::NotFound {
            message: "Marquee not found".into(),
        });
        assert_eq!(failure.exit_code(), 3);
        assert_eq!(failure.display_message(), "Marquee not found");
    }

    #[test]
    fn failure_message_includes_context_chain() {
        let err = CliError::failure(anyhow!("inner").context("outer"));
        assert_eq!(err.display_message(), "outer: inner");
    }

    #[test]
    fn assignments_split_on_first_equals() {
        assert_eq!(
            parse_assignment("title=a=b"),
            Ok(("title".to_string(), "a=b".to_string()))
        );
        assert_eq!(
            parse_assignment("price="),
            Ok(("price".to_string(), String::new()))
        );
        assert!(parse_assignment("title").is_err());
        assert!(parse_assignment("=x").is_err());
    }

    #[test]
    fn url_parser_rejects_other_schemes() {
        assert!(parse_url("http://localhost:3000").is_ok());
        assert!(parse_url("ftp://localhost").is_err());
        assert!(parse_url("not a url").is_err());
    }

    fn env_config(vars: &[(&str, &str)]) -> ClientConfig {
        ClientConfig::from_lookup(|key| {
            vars.iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| (*value).to_string())
        })
        .expect("env config")
    }

    #[test]
    fn flags_override_environment() {
        let base = env_config(&[
            ("MARQUEE_API_URL", "http://env.example:3000"),
            ("MARQUEE_HTTP_TIMEOUT_SECS", "7"),
            ("MARQUEE_SESSION_FILE", "/tmp/env-session.json"),
        ]);
        let args = ConnectionArgs {
            api_url: Some("http://localhost:4000".parse().expect("url")),
            timeout_secs: Some(3),
            session_file: Some(PathBuf::from("/tmp/marquee-session.json")),
        };
        let config = args.apply(base.clone()).expect("config");
        assert_eq!(config.base_url.as_str(), "http://localhost:4000/");
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(
            config.session_path,
            PathBuf::from("/tmp/marquee-session.json")
        );

        let untouched = ConnectionArgs::default().apply(base.clone()).expect("config");
        assert_eq!(untouched, base);

        let zero = ConnectionArgs {
            timeout_secs: Some(0),
            ..args
        };
        assert_eq!(zero.apply(base).map(|_| ()).map_err(|e| e.exit_code()), Err(2));
    }

    #[test]
    fn connect_opens_file_session() {
        let dir = tempfile::tempdir().expect("tempdir");
        let args = ConnectionArgs {
            api_url: Some("http://localhost:4000".parse().expect("url")),
            timeout_secs: Some(5),
            session_file: Some(dir.path().join("session.json")),
        };
        let ctx = AppContext::connect(&args).expect("context");
        assert!(ctx.client.session().token().is_none());
    }
}
