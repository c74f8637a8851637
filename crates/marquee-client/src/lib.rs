#![forbid(unsafe_code)]
#![warn(
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    rustdoc::broken_intra_doc_links,
    missing_docs
)]
#![allow(clippy::module_name_repetitions)]

//! Session-aware client for the marquee booking admin API.
//!
//! Layout:
//! - `http.rs`: request wrapper over `reqwest` (base URL, cookies, bearer)
//! - `session.rs`: token/user store with memory and file backends
//! - `error.rs`: `ApiError` and the shared status-to-message table
//! - `fetch.rs`: the configurable resource fetcher
//! - `delete.rs`, `update.rs`, `form.rs`: mutation flows
//! - `auth.rs`: login, registration, admin lookup, logout
//! - `board.rs`: marquee management screen state

pub mod auth;
pub mod board;
pub mod collection;
pub mod config;
pub mod delete;
pub mod error;
pub mod fetch;
pub mod form;
pub mod http;
pub mod notice;
pub mod session;
pub mod update;

pub use auth::{FieldErrors, LoginForm, RegisterForm, has_admin, login, logout, register};
pub use board::{MarqueeBoard, StatusFilter};
pub use collection::{Entity, remove_entity, replace_entity};
pub use config::{ClientConfig, ConfigError};
pub use delete::DeleteAction;
pub use error::{ApiError, EndpointContext, EntityKind, map_failure, map_status_to_message};
pub use fetch::{
    Concurrency, Envelope, FetchConfig, FetchOutcome, FetchPhase, FetchSnapshot, Fetcher,
    TokenPolicy,
};
pub use form::{Editable, FieldKind, FormField, UpdateForm, load_entity};
pub use http::{ApiClient, ApiRequest, Credentials, HttpFailure};
pub use notice::{Notice, NoticeLevel};
pub use session::{
    FileSessionBackend, LogOnlyBoundary, LoginBoundary, MemorySessionBackend, Session,
    SessionBackend, SessionError, StoredSession, UnauthorizedPolicy,
};
pub use update::{MarqueeForm, Review, review_marquee, update_marquee};
