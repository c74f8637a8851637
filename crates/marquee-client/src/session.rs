//! Bearer token and cached user, shared by every client handle.
//!
//! # Design
//! - Reads go through an in-memory copy; the backend is only touched on writes.
//! - [`Session::expire`] holds the write lock across clear and redirect, so no
//!   request can observe a cleared token before the login boundary has fired.
//! - Login boundaries must not call back into the session.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use marquee_api_models::AdminUser;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::error::ApiError;

/// Persisted session document; keys mirror the storage keys `token` and `user`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StoredSession {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Bearer token, if logged in.
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Cached user document.
    pub user: Option<AdminUser>,
}

impl StoredSession {
    /// Whether neither a token nor a user is stored.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.token.is_none() && self.user.is_none()
    }
}

/// Failures raised by a session backend.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Filesystem access failed.
    #[error("session storage {operation} failed for {path}")]
    Io {
        /// Operation being attempted.
        operation: &'static str,
        /// File involved.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: io::Error,
    },
    /// The stored document could not be decoded or encoded.
    #[error("session file {path} is not a valid session document")]
    Format {
        /// File involved.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: serde_json::Error,
    },
}

impl From<SessionError> for ApiError {
    fn from(error: SessionError) -> Self {
        Self::Session {
            message: error.to_string(),
        }
    }
}

/// Durable storage for the session document.
pub trait SessionBackend: Send + Sync + fmt::Debug {
    /// Load the stored session; absent storage yields an empty session.
    ///
    /// # Errors
    ///
    /// Returns an error when storage exists but cannot be read.
    fn load(&self) -> Result<StoredSession, SessionError>;

    /// Replace the stored session.
    ///
    /// # Errors
    ///
    /// Returns an error when storage cannot be written.
    fn save(&self, session: &StoredSession) -> Result<(), SessionError>;

    /// Remove every stored key.
    ///
    /// # Errors
    ///
    /// Returns an error when storage cannot be removed.
    fn clear(&self) -> Result<(), SessionError>;
}

/// Process-local backend, used by tests and short-lived embeddings.
#[derive(Debug, Default)]
pub struct MemorySessionBackend {
    stored: Mutex<StoredSession>,
}

impl MemorySessionBackend {
    /// Backend pre-seeded with `session`.
    #[must_use]
    pub fn with(session: StoredSession) -> Self {
        Self {
            stored: Mutex::new(session),
        }
    }
}

impl SessionBackend for MemorySessionBackend {
    fn load(&self) -> Result<StoredSession, SessionError> {
        Ok(self
            .stored
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, session: &StoredSession) -> Result<(), SessionError> {
        *self.stored.lock().unwrap_or_else(PoisonError::into_inner) = session.clone();
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        *self.stored.lock().unwrap_or_else(PoisonError::into_inner) = StoredSession::default();
        Ok(())
    }
}

/// JSON file backend used by the CLI.
#[derive(Debug, Clone)]
pub struct FileSessionBackend {
    path: PathBuf,
}

impl FileSessionBackend {
    /// Backend persisting to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the session file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, operation: &'static str, source: io::Error) -> SessionError {
        SessionError::Io {
            operation,
            path: self.path.clone(),
            source,
        }
    }
}

impl SessionBackend for FileSessionBackend {
    fn load(&self) -> Result<StoredSession, SessionError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Ok(StoredSession::default());
            }
            Err(err) => return Err(self.io_error("read", err)),
        };
        if raw.trim().is_empty() {
            return Ok(StoredSession::default());
        }
        serde_json::from_str(&raw).map_err(|source| SessionError::Format {
            path: self.path.clone(),
            source,
        })
    }

    fn save(&self, session: &StoredSession) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| self.io_error("create directory", err))?;
        }
        let encoded =
            serde_json::to_string_pretty(session).map_err(|source| SessionError::Format {
                path: self.path.clone(),
                source,
            })?;
        fs::write(&self.path, encoded).map_err(|err| self.io_error("write", err))
    }

    fn clear(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(self.io_error("remove", err)),
        }
    }
}

/// Navigation hook fired when the user must sign in again.
pub trait LoginBoundary: Send + Sync {
    /// Send the user to the login screen.
    fn redirect_to_login(&self);
}

/// Boundary that only records the redirect in the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogOnlyBoundary;

impl LoginBoundary for LogOnlyBoundary {
    fn redirect_to_login(&self) {
        info!("login required");
    }
}

/// What to do with the session when a call fails with 401.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnauthorizedPolicy {
    /// Report the error and keep the session.
    #[default]
    Surface,
    /// Clear the session and redirect to login.
    Expire,
}

struct SessionInner {
    state: RwLock<StoredSession>,
    backend: Box<dyn SessionBackend>,
    boundary: Arc<dyn LoginBoundary>,
}

/// Shared session handle; clones observe the same state.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

impl fmt::Debug for Session {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Session")
            .field("logged_in", &self.token().is_some())
            .field("backend", &self.inner.backend)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Open a session over `backend`, loading whatever it already stores.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend cannot be read.
    pub fn open<B>(backend: B, boundary: Arc<dyn LoginBoundary>) -> Result<Self, SessionError>
    where
        B: SessionBackend + 'static,
    {
        let stored = backend.load()?;
        Ok(Self {
            inner: Arc::new(SessionInner {
                state: RwLock::new(stored),
                backend: Box::new(backend),
                boundary,
            }),
        })
    }

    /// Empty in-memory session with a log-only boundary.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::in_memory_with(StoredSession::default(), Arc::new(LogOnlyBoundary))
    }

    /// In-memory session seeded with `stored`.
    #[must_use]
    pub fn in_memory_with(stored: StoredSession, boundary: Arc<dyn LoginBoundary>) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                state: RwLock::new(stored.clone()),
                backend: Box::new(MemorySessionBackend::with(stored)),
                boundary,
            }),
        }
    }

    /// Current bearer token; blank tokens count as absent.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.read()
            .token
            .as_ref()
            .filter(|token| !token.trim().is_empty())
            .cloned()
    }

    /// Cached user, if any.
    #[must_use]
    pub fn user(&self) -> Option<AdminUser> {
        self.read().user.clone()
    }

    /// Copy of the whole stored document.
    #[must_use]
    pub fn snapshot(&self) -> StoredSession {
        self.read().clone()
    }

    /// Replace the token, keeping the cached user.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend cannot be written.
    pub fn set_token(&self, token: impl Into<String>) -> Result<(), SessionError> {
        let mut state = self.write();
        let mut next = state.clone();
        next.token = Some(token.into());
        self.inner.backend.save(&next)?;
        *state = next;
        Ok(())
    }

    /// Replace token and user together, as after a login.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend cannot be written.
    pub fn establish(
        &self,
        token: Option<String>,
        user: Option<AdminUser>,
    ) -> Result<(), SessionError> {
        let next = StoredSession { token, user };
        let mut state = self.write();
        self.inner.backend.save(&next)?;
        *state = next;
        Ok(())
    }

    /// Remove token and user without redirecting.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend cannot be cleared; memory is cleared
    /// regardless.
    pub fn clear(&self) -> Result<(), SessionError> {
        let mut state = self.write();
        *state = StoredSession::default();
        self.inner.backend.clear()
    }

    /// Clear the session and fire the login boundary as one step.
    ///
    /// # Errors
    ///
    /// Returns the backend failure after the redirect has still been fired.
    pub fn expire(&self) -> Result<(), SessionError> {
        let mut state = self.write();
        *state = StoredSession::default();
        let cleared = self.inner.backend.clear();
        self.inner.boundary.redirect_to_login();
        drop(state);
        info!("session expired");
        cleared
    }

    /// Fire the login boundary without touching stored state.
    pub fn redirect_to_login(&self) {
        self.inner.boundary.redirect_to_login();
    }

    /// Apply `policy` to a failed call.
    pub fn handle_failure(&self, policy: UnauthorizedPolicy, error: &ApiError) {
        if policy == UnauthorizedPolicy::Expire && error.is_unauthorized() {
            if let Err(err) = self.expire() {
                warn!(error = %err, "failed to clear persisted session");
            }
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, StoredSession> {
        self.inner.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, StoredSession> {
        self.inner.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}
