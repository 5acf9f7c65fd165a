//! Natalis Core Library
//!
//! This crate provides the domain model, error types, configuration, and validation
//! shared by the storage and HTTP layers of the birth-registration service.

pub mod config;
pub mod error;
pub mod models;
pub mod rate_limit;
pub mod validation;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{BirthRecord, BirthRecordSubmission, IdType, NewBirthRecord};
pub use rate_limit::{Endpoint, RateLimitConfig, RateLimitRule};
