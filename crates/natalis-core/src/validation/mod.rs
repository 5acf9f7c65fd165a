//! Validation modules

pub mod birth;

pub use birth::{validate_birth_date, validate_id_type, validate_submission, BIRTH_DATE_PATTERN};
