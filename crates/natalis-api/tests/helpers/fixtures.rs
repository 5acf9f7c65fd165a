use serde_json::{json, Value};

/// A submission that passes validation
pub fn submission(father_id: i64, mother_id: i64, hospital_name: &str) -> Value {
    json!({
        "father_id_type": "UNIFIED_NUMBER",
        "father_id": father_id,
        "mother_id_type": "CIVIL_REGISTRY_NUMBER",
        "mother_id": mother_id,
        "mother_name": "Aisha Saleh",
        "hospital_name": hospital_name,
        "birth_date": "2024-06-01"
    })
}
