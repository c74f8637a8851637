//! Command handlers grouped by resource.

pub(crate) mod auth;
pub(crate) mod entities;
pub(crate) mod marquees;
