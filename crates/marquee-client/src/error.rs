//! Error taxonomy and the shared status-to-message table.
//!
//! # Design
//! - Every call site maps failures through [`map_failure`] with an
//!   [`EndpointContext`]; there are no per-screen message tables.
//! - The variant is chosen by HTTP status, the message by context.
//! - Mapping is pure: clearing the session on 401 is the caller's policy.

use marquee_api_models::{EntityId, ErrorBody, IdError};
use reqwest::StatusCode;
use thiserror::Error;

use crate::http::HttpFailure;

/// Message shown for any 401 once a session has been used.
pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized: Please log in again";
/// Message shown when an action needs a token and none is stored.
pub const LOGIN_REQUIRED_MESSAGE: &str = "Please log in to perform this action.";
const NETWORK_MESSAGE: &str = "Network error or server unavailable";

/// Backend resources managed by the admin client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// Rentable venue.
    Marquee,
    /// Scheduled event.
    Event,
    /// Bookable service.
    Service,
}

impl EntityKind {
    /// Lowercase singular noun.
    #[must_use]
    pub const fn singular(self) -> &'static str {
        match self {
            Self::Marquee => "marquee",
            Self::Event => "event",
            Self::Service => "service",
        }
    }

    /// Capitalised singular noun.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Marquee => "Marquee",
            Self::Event => "Event",
            Self::Service => "Service",
        }
    }

    /// Collection route segment, also used as the plural noun.
    #[must_use]
    pub const fn route(self) -> &'static str {
        match self {
            Self::Marquee => "marquees",
            Self::Event => "events",
            Self::Service => "services",
        }
    }
}

/// Which operation a failure came from; selects the message template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointContext {
    /// `POST /users/login`.
    Login,
    /// `POST /users/register`.
    Register,
    /// `GET /users/has-admin`.
    HasAdmin,
    /// Single-entity GET.
    FetchEntity,
    /// List GET.
    FetchList,
    /// `DELETE /<kind>/:id`.
    Delete(EntityKind),
    /// Full edit through `PUT /<kind>/:id`.
    Update(EntityKind),
    /// Approve/reject through `PUT /<kind>/:id`.
    StatusChange {
        /// Resource being reviewed.
        kind: EntityKind,
        /// `true` when approving, `false` when rejecting.
        approve: bool,
    },
    /// Generic field form through `PATCH /<kind>/:id`.
    FormUpdate,
}

/// Normalised client error, ready to render as an alert banner.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Rejected locally before any network call.
    #[error("{0}")]
    Validation(String),
    /// HTTP 401, or no token where one is required.
    #[error("{message}")]
    Unauthorized {
        /// User-facing message.
        message: String,
    },
    /// HTTP 403.
    #[error("{message}")]
    Forbidden {
        /// User-facing message.
        message: String,
    },
    /// HTTP 404.
    #[error("{message}")]
    NotFound {
        /// User-facing message.
        message: String,
    },
    /// HTTP 400.
    #[error("{message}")]
    BadRequest {
        /// User-facing message.
        message: String,
    },
    /// No response was received.
    #[error("{message}")]
    Network {
        /// User-facing message.
        message: String,
    },
    /// Any other non-2xx status.
    #[error("{message}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// User-facing message.
        message: String,
    },
    /// A 2xx body did not match the expected shape.
    #[error("{message}")]
    Decode {
        /// Diagnostic message.
        message: String,
    },
    /// Reading or writing the persisted session failed.
    #[error("{message}")]
    Session {
        /// Diagnostic message.
        message: String,
    },
}

impl ApiError {
    /// Shorthand for [`ApiError::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Error raised when an action needs a stored token and there is none.
    #[must_use]
    pub fn login_required() -> Self {
        Self::Unauthorized {
            message: LOGIN_REQUIRED_MESSAGE.to_string(),
        }
    }

    /// The user-facing message.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Validation(message) => message,
            Self::Unauthorized { message }
            | Self::Forbidden { message }
            | Self::NotFound { message }
            | Self::BadRequest { message }
            | Self::Network { message }
            | Self::Server { message, .. }
            | Self::Decode { message }
            | Self::Session { message } => message,
        }
    }

    /// HTTP status associated with the error, when one was received.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::BadRequest { .. } => Some(400),
            Self::Unauthorized { .. } => Some(401),
            Self::Forbidden { .. } => Some(403),
            Self::NotFound { .. } => Some(404),
            Self::Server { status, .. } => Some(*status),
            Self::Validation(_) | Self::Network { .. } | Self::Decode { .. } | Self::Session { .. } => {
                None
            }
        }
    }

    /// Whether the error should end the session under an expiring policy.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// Whether the error was produced before touching the network.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Parse an entity id, phrasing failures as "Cannot <verb>: ...".
pub(crate) fn parse_entity_id(raw: &str, verb: &str) -> Result<EntityId, ApiError> {
    EntityId::parse(raw).map_err(|err| match err {
        IdError::Missing => ApiError::validation(format!("Cannot {verb}: Item ID is missing.")),
        IdError::InvalidFormat { .. } => {
            ApiError::validation(format!("Cannot {verb}: Invalid item ID format."))
        }
    })
}

/// Map a non-2xx response to the tagged error for `context`.
#[must_use]
pub fn map_status_to_message(
    context: EndpointContext,
    status: StatusCode,
    body: Option<&ErrorBody>,
) -> ApiError {
    let backend = body.and_then(ErrorBody::message);
    let or_backend = |fallback: String| backend.map_or(fallback, str::to_string);
    let reason = status_reason(status);

    let message = match (context, status.as_u16()) {
        (EndpointContext::Login, 400 | 401) => "Invalid email or password".to_string(),
        (EndpointContext::Login, 403) => {
            "Only admin users can log in to the admin panel".to_string()
        }
        (EndpointContext::Login, 404) => {
            "Login endpoint not found. Check server configuration.".to_string()
        }
        (EndpointContext::Login, _) => or_backend("An error occurred during login".to_string()),

        (EndpointContext::Register, 400) => {
            or_backend("User with this email already exists".to_string())
        }
        (EndpointContext::Register, 403) => "An admin already exists".to_string(),
        (EndpointContext::Register, 404) => {
            "Register endpoint not found. Check server configuration.".to_string()
        }
        (EndpointContext::Register, _) => {
            or_backend("An error occurred during registration".to_string())
        }

        (EndpointContext::HasAdmin, _) => "Failed to check admin status".to_string(),

        (EndpointContext::FetchEntity, 401) | (EndpointContext::FetchList, 401) => {
            UNAUTHORIZED_MESSAGE.to_string()
        }
        (EndpointContext::FetchEntity | EndpointContext::FetchList, 403) => {
            "Forbidden: You do not have access to this resource".to_string()
        }
        (EndpointContext::FetchEntity, _) => format!(
            "Error fetching data: {}",
            status.canonical_reason().unwrap_or(status.as_str())
        ),
        (EndpointContext::FetchList, _) => or_backend("Failed to fetch data".to_string()),

        (EndpointContext::Delete(kind), 400) => format!("Invalid {} ID", kind.singular()),
        (EndpointContext::Update(_), 400) => "Invalid update data".to_string(),
        (EndpointContext::Delete(_) | EndpointContext::Update(_), 401) => {
            UNAUTHORIZED_MESSAGE.to_string()
        }
        (EndpointContext::Delete(kind), 403) => {
            format!("Unauthorized: You can only delete your own {}", kind.route())
        }
        (EndpointContext::Update(kind), 403) => {
            format!("Unauthorized: You can only update your own {}", kind.route())
        }
        (EndpointContext::Delete(kind) | EndpointContext::Update(kind), 404) => {
            format!("{} not found", kind.title())
        }
        (EndpointContext::Delete(_), _) => or_backend(format!("Failed to delete the item: {reason}")),
        (EndpointContext::Update(kind), _) => {
            or_backend(format!("Failed to update {}: {reason}", kind.singular()))
        }

        (EndpointContext::StatusChange { .. } | EndpointContext::FormUpdate, 401) => {
            UNAUTHORIZED_MESSAGE.to_string()
        }
        (EndpointContext::StatusChange { kind, approve }, _) => {
            or_backend(review_failure(kind, approve))
        }

        (EndpointContext::FormUpdate, 403) => {
            "You do not have permission to update this resource".to_string()
        }
        (EndpointContext::FormUpdate, _) => or_backend("Failed to update".to_string()),
    };

    classify(status, message)
}

/// Map any wrapper failure (status, transport, decode) for `context`.
#[must_use]
pub fn map_failure(context: EndpointContext, failure: HttpFailure) -> ApiError {
    match failure {
        HttpFailure::Status { status, body } => {
            map_status_to_message(context, status, body.as_ref())
        }
        HttpFailure::Network { message } => ApiError::Network {
            message: network_message(context, &message),
        },
        HttpFailure::Decode { message } => ApiError::Decode { message },
        HttpFailure::Encode { message } => {
            ApiError::Validation(format!("request body could not be encoded: {message}"))
        }
    }
}

fn network_message(context: EndpointContext, reason: &str) -> String {
    match context {
        EndpointContext::Login | EndpointContext::Register => NETWORK_MESSAGE.to_string(),
        EndpointContext::HasAdmin => "Failed to check admin status".to_string(),
        EndpointContext::FetchEntity => format!("Error fetching data: {reason}"),
        EndpointContext::FetchList => "Failed to fetch data".to_string(),
        EndpointContext::Delete(_) => format!("Failed to delete the item: {reason}"),
        EndpointContext::Update(kind) => format!("Failed to update {}: {reason}", kind.singular()),
        EndpointContext::StatusChange { kind, approve } => review_failure(kind, approve),
        EndpointContext::FormUpdate => "Failed to update".to_string(),
    }
}

fn review_failure(kind: EntityKind, approve: bool) -> String {
    let verb = if approve { "approve" } else { "reject" };
    format!("Failed to {verb} {}", kind.singular())
}

fn status_reason(status: StatusCode) -> String {
    format!("request failed with status {status}")
}

fn classify(status: StatusCode, message: String) -> ApiError {
    match status {
        StatusCode::BAD_REQUEST => ApiError::BadRequest { message },
        StatusCode::UNAUTHORIZED => ApiError::Unauthorized { message },
        StatusCode::FORBIDDEN => ApiError::Forbidden { message },
        StatusCode::NOT_FOUND => ApiError::NotFound { message },
        other => ApiError::Server {
            status: other.as_u16(),
            message,
        },
    }
}
