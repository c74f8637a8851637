#![forbid(unsafe_code)]
#![warn(
    unused,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::module_name_repetitions)]
//! Shared HTTP DTOs for the marquee booking API.
//!
//! These types describe the backend's wire format (camelCase keys, `_id`
//! identifiers, `{data: ...}` envelopes) so the client and the CLI encode and
//! decode requests against a single definition.

pub mod auth;
pub mod envelope;
pub mod event;
pub mod id;
pub mod marquee;

pub use auth::{AdminUser, HasAdminResponse, LoginRequest, RegisterRequest, RegisterResponse};
pub use envelope::{DataEnvelope, ErrorBody};
pub use event::{Event, Service};
pub use id::{EntityId, IdError};
pub use marquee::{
    AdditionalFee, BookingStatus, Deal, Location, Marquee, MarqueeStatusUpdate, MarqueeUpdate,
    Pricing, ProviderRef, ProviderSummary,
};
