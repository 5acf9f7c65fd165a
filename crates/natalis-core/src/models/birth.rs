use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use validator::Validate;

use crate::validation::{validate_birth_date, validate_id_type};

/// Kind of identity document a parent identifier belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IdType {
    #[serde(alias = "رقم الموحدة")]
    UnifiedNumber,
    #[serde(alias = "رقم هوية الأحوال")]
    CivilRegistryNumber,
}

impl IdType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdType::UnifiedNumber => "UNIFIED_NUMBER",
            IdType::CivilRegistryNumber => "CIVIL_REGISTRY_NUMBER",
        }
    }
}

impl fmt::Display for IdType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IdType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "UNIFIED_NUMBER" | "رقم الموحدة" => Ok(IdType::UnifiedNumber),
            "CIVIL_REGISTRY_NUMBER" | "رقم هوية الأحوال" => Ok(IdType::CivilRegistryNumber),
            other => Err(format!(
                "Invalid id type '{}'. Must be 'UNIFIED_NUMBER' or 'CIVIL_REGISTRY_NUMBER'",
                other
            )),
        }
    }
}

/// A persisted birth registration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BirthRecord {
    pub id: i64,
    pub father_id_type: IdType,
    pub father_id: i64,
    pub mother_id_type: IdType,
    pub mother_id: i64,
    pub mother_name: String,
    pub hospital_name: String,
    pub birth_date: String,
    pub created_at: DateTime<Utc>,
}

// `created_at` is stored as integer microseconds so retention comparisons stay numeric.
#[cfg(feature = "sqlx")]
impl<'r> sqlx::FromRow<'r, sqlx::sqlite::SqliteRow> for BirthRecord {
    fn from_row(row: &'r sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        use sqlx::Row;

        let created_at_us: i64 = row.try_get("created_at")?;
        let created_at = DateTime::<Utc>::from_timestamp_micros(created_at_us).ok_or_else(|| {
            sqlx::Error::ColumnDecode {
                index: "created_at".to_string(),
                source: format!("timestamp {} out of range", created_at_us).into(),
            }
        })?;

        Ok(Self {
            id: row.try_get("id")?,
            father_id_type: row.try_get("father_id_type")?,
            father_id: row.try_get("father_id")?,
            mother_id_type: row.try_get("mother_id_type")?,
            mother_id: row.try_get("mother_id")?,
            mother_name: row.try_get("mother_name")?,
            hospital_name: row.try_get("hospital_name")?,
            birth_date: row.try_get("birth_date")?,
            created_at,
        })
    }
}

/// A validated registration ready to be inserted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBirthRecord {
    pub father_id_type: IdType,
    pub father_id: i64,
    pub mother_id_type: IdType,
    pub mother_id: i64,
    pub mother_name: String,
    pub hospital_name: String,
    pub birth_date: String,
}

/// Request DTO for submitting a registration.
///
/// Fields are kept raw so that every constraint is reported by the validator
/// with a readable reason instead of a generic decoding failure.
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct BirthRecordSubmission {
    #[validate(custom(function = "validate_id_type"))]
    #[schema(example = "UNIFIED_NUMBER")]
    pub father_id_type: String,
    #[validate(required(message = "father_id is required"))]
    pub father_id: Option<i64>,
    #[validate(custom(function = "validate_id_type"))]
    #[schema(example = "CIVIL_REGISTRY_NUMBER")]
    pub mother_id_type: String,
    #[validate(required(message = "mother_id is required"))]
    pub mother_id: Option<i64>,
    #[validate(length(
        min = 2,
        max = 100,
        message = "Mother name must be between 2 and 100 characters"
    ))]
    pub mother_name: String,
    #[validate(length(
        min = 2,
        max = 100,
        message = "Hospital name must be between 2 and 100 characters"
    ))]
    pub hospital_name: String,
    #[validate(custom(function = "validate_birth_date"))]
    #[schema(example = "2024-05-17")]
    pub birth_date: String,
}
