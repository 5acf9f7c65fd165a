//! Birth record validation
//!
//! Structural checks only: the birth date is matched lexically and is not checked
//! against the calendar, and id types are not cross-checked against id values.

use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;
use validator::{Validate, ValidationError};

use crate::error::AppError;
use crate::models::{BirthRecordSubmission, IdType, NewBirthRecord};

/// `YYYY-MM-DD`, digits only
pub static BIRTH_DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("birth date pattern is valid"));

pub fn validate_id_type(value: &str) -> Result<(), ValidationError> {
    value.parse::<IdType>().map(|_| ()).map_err(|reason| {
        let mut err = ValidationError::new("invalid_id_type");
        err.message = Some(Cow::Owned(reason));
        err
    })
}

pub fn validate_birth_date(value: &str) -> Result<(), ValidationError> {
    if BIRTH_DATE_PATTERN.is_match(value) {
        return Ok(());
    }
    let mut err = ValidationError::new("invalid_birth_date");
    err.message = Some(Cow::Owned(format!(
        "Birth date '{}' must match YYYY-MM-DD",
        value
    )));
    Err(err)
}

/// Validate a raw submission and turn it into an insertable record
pub fn validate_submission(submission: BirthRecordSubmission) -> Result<NewBirthRecord, AppError> {
    submission.validate()?;

    let father_id_type = submission
        .father_id_type
        .parse::<IdType>()
        .map_err(AppError::InvalidInput)?;
    let mother_id_type = submission
        .mother_id_type
        .parse::<IdType>()
        .map_err(AppError::InvalidInput)?;
    let father_id = submission
        .father_id
        .ok_or_else(|| AppError::InvalidInput("father_id is required".to_string()))?;
    let mother_id = submission
        .mother_id
        .ok_or_else(|| AppError::InvalidInput("mother_id is required".to_string()))?;

    Ok(NewBirthRecord {
        father_id_type,
        father_id,
        mother_id_type,
        mother_id,
        mother_name: submission.mother_name,
        hospital_name: submission.hospital_name,
        birth_date: submission.birth_date,
    })
}
