//! Medibox API Library
//!
//! HTTP handlers, error mapping and application setup for the medibox service.

mod api_doc;
mod handlers;

pub mod error;
pub mod setup;
pub mod state;

pub use error::{HttpAppError, ValidatedJson};
pub use state::AppState;
