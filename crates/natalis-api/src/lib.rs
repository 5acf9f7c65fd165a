//! Natalis HTTP service
//!
//! Axum surface of the birth-registration service: per-endpoint rate limiting,
//! request validation, record handlers, scheduled retention and bootstrap.

pub mod api_doc;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod services;
pub mod setup;
pub mod state;
pub mod telemetry;

pub use error::{ErrorResponse, HttpAppError};
pub use state::AppState;
