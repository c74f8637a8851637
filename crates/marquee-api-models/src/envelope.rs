//! Response wrappers shared by every endpoint.

use serde::{Deserialize, Serialize};

/// Payload wrapped under a `data` key, as returned by list and mutation
/// endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DataEnvelope<T> {
    /// Wrapped payload.
    pub data: T,
}

/// Error document returned by the backend on non-2xx responses.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Human-readable message supplied by the backend.
    pub message: Option<String>,
}

impl ErrorBody {
    /// Backend message when present and non-blank.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message
            .as_deref()
            .map(str::trim)
            .filter(|message| !message.is_empty())
    }
}
