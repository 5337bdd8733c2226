//! # Server — request handlers over the blacklist engine
//!
//! The five endpoints of spec.md §6, as async methods on [`Handlers`] that
//! take already-parsed query parameters and return raw payload bytes or
//! typed errors. Wiring these to an actual HTTP framework (axum, or
//! whatever else) is the deliberately excluded transport layer — this
//! crate stops at the request/response contract.
mod activity_log;
mod error;
mod handlers;

pub use activity_log::{ActivityLog, Tag};
pub use error::ServerError;
pub use handlers::Handlers;
