//! Thin HTTP wrapper: base URL, cookie jar, JSON headers and optional bearer.

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;
use uuid::Uuid;

use marquee_api_models::ErrorBody;

use crate::config::{ClientConfig, ConfigError};
use crate::session::Session;

/// Correlation header attached to every request.
pub const HEADER_REQUEST_ID: &str = "x-request-id";

/// Typed failure raised by [`ApiClient::send`] before context mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpFailure {
    /// Non-2xx response with whatever error body could be parsed.
    Status {
        /// Response status.
        status: StatusCode,
        /// Parsed `{ "message": ... }` body, if any.
        body: Option<ErrorBody>,
    },
    /// No response was received.
    Network {
        /// Transport error text.
        message: String,
    },
    /// A 2xx body was not the expected JSON.
    Decode {
        /// Parser error text.
        message: String,
    },
    /// The request body could not be serialised.
    Encode {
        /// Serializer error text.
        message: String,
    },
}

/// How a request authenticates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Credentials {
    /// Rely on the cookie jar only.
    CookiesOnly,
    /// Cookie jar plus `Authorization: Bearer` when a token is stored.
    Bearer,
}

/// A single request against the API.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    body: Option<Value>,
    headers: HeaderMap,
    credentials: Credentials,
}

impl ApiRequest {
    /// Request with `method` against `path`, cookie credentials only.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            headers: HeaderMap::new(),
            credentials: Credentials::CookiesOnly,
        }
    }

    /// `GET path`.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// `POST path`.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// `PUT path`.
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    /// `PATCH path`.
    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    /// `DELETE path`.
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Attach the stored bearer token, when there is one.
    #[must_use]
    pub fn bearer(mut self) -> Self {
        self.credentials = Credentials::Bearer;
        self
    }

    /// Add or override a header.
    #[must_use]
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Serialise `body` as the JSON payload.
    ///
    /// # Errors
    ///
    /// Returns [`HttpFailure::Encode`] when `body` cannot be represented as JSON.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, HttpFailure> {
        let value = serde_json::to_value(body).map_err(|err| HttpFailure::Encode {
            message: err.to_string(),
        })?;
        self.body = Some(value);
        Ok(self)
    }

    /// HTTP method.
    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// Path relative to the base URL.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Session-aware API client. Clones share the connection pool, cookie jar and
/// session.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    session: Session,
}

impl ApiClient {
    /// Build a client from resolved configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when the HTTP client cannot be constructed.
    pub fn new(config: &ClientConfig, session: Session) -> Result<Self, ConfigError> {
        let mut default_headers = HeaderMap::new();
        let request_id = HeaderValue::from_str(&Uuid::new_v4().to_string())
            .unwrap_or_else(|_| HeaderValue::from_static("marquee-admin"));
        default_headers.insert(HEADER_REQUEST_ID, request_id);

        let http = Client::builder()
            .timeout(config.timeout)
            .cookie_store(true)
            .default_headers(default_headers)
            .build()
            .map_err(|source| ConfigError::HttpClient { source })?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            session,
        })
    }

    /// Client over a pre-built `reqwest` client.
    #[must_use]
    pub fn with_http(http: Client, base_url: Url, session: Session) -> Self {
        Self {
            http,
            base_url,
            session,
        }
    }

    /// Shared session.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Backend root.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve `path` under the base URL, keeping any base path prefix.
    ///
    /// # Errors
    ///
    /// Returns [`HttpFailure::Network`] when the joined URL is malformed.
    pub fn url(&self, path: &str) -> Result<Url, HttpFailure> {
        let joined = format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        Url::parse(&joined).map_err(|err| HttpFailure::Network {
            message: format!("invalid request URL '{joined}': {err}"),
        })
    }

    /// Send `request` and return the parsed JSON body (`null` when empty).
    ///
    /// # Errors
    ///
    /// Returns [`HttpFailure::Status`] for non-2xx responses,
    /// [`HttpFailure::Network`] when no response arrived and
    /// [`HttpFailure::Decode`] when a 2xx body is not JSON.
    pub async fn send(&self, request: ApiRequest) -> Result<Value, HttpFailure> {
        let url = self.url(&request.path)?;
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.extend(request.headers);

        let mut builder = self
            .http
            .request(request.method.clone(), url)
            .headers(headers);
        if request.credentials == Credentials::Bearer {
            if let Some(token) = self.session.token() {
                builder = builder.bearer_auth(token);
            }
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        debug!(method = %request.method, path = %request.path, "sending API request");
        let response = builder.send().await.map_err(|err| {
            warn!(method = %request.method, path = %request.path, error = %err, "API request failed");
            HttpFailure::Network {
                message: err.to_string(),
            }
        })?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(|err| HttpFailure::Network {
            message: err.to_string(),
        })?;

        if !status.is_success() {
            let body = serde_json::from_slice::<ErrorBody>(&bytes).ok();
            warn!(
                method = %request.method,
                path = %request.path,
                status = status.as_u16(),
                "API request returned an error status"
            );
            return Err(HttpFailure::Status { status, body });
        }

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&bytes).map_err(|err| HttpFailure::Decode {
            message: format!("response from {} is not valid JSON: {err}", request.path),
        })
    }

    /// Send `request` and decode the body as `T`.
    ///
    /// # Errors
    ///
    /// As [`ApiClient::send`], plus [`HttpFailure::Decode`] on shape mismatch.
    pub async fn send_json<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
    ) -> Result<T, HttpFailure> {
        let path = request.path.clone();
        let value = self.send(request).await?;
        serde_json::from_value(value).map_err(|err| HttpFailure::Decode {
            message: format!("unexpected response shape from {path}: {err}"),
        })
    }
}
