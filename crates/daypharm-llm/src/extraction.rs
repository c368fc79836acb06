//! Prescription extraction from LLM output.

use daypharm_core::models::MedicationRecord;
use daypharm_core::session::PrescriptionIntake;
use serde_json::Value;
use thiserror::Error;

/// Extraction errors.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("JSON 파싱 오류: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid response format: {0}")]
    InvalidFormat(String),
}

pub type ExtractionResult<T> = Result<T, ExtractionError>;

/// Parse the model's reply into intake data.
///
/// Accepts fenced (```` ```json ````) or bare JSON, tolerates prose around
/// the object, and coerces numeric fields (e.g. `"age": 45`) to text.
pub fn parse_extraction_output(text: &str) -> ExtractionResult<PrescriptionIntake> {
    let json = extract_json_block(text);

    let value: Value = match serde_json::from_str(json) {
        Ok(value) => value,
        Err(first_err) => {
            // Fall back to the outermost braces in case of surrounding prose
            let start = text.find('{');
            let end = text.rfind('}');
            match (start, end) {
                (Some(start), Some(end)) if start < end => serde_json::from_str(&text[start..=end])?,
                _ => return Err(first_err.into()),
            }
        }
    };

    let object = value.as_object().ok_or_else(|| {
        ExtractionError::InvalidFormat("Expected a JSON object at top level".into())
    })?;

    let medications = match object.get("medications") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.iter().filter_map(to_medication).collect(),
        Some(other) => {
            return Err(ExtractionError::InvalidFormat(format!(
                "\"medications\" must be an array, got {}",
                other
            )))
        }
    };

    Ok(PrescriptionIntake {
        name: field_text(object.get("name")).unwrap_or_default(),
        age: field_text(object.get("age")).unwrap_or_default(),
        medications,
    })
}

/// Strip Markdown code fences around a JSON payload.
pub fn extract_json_block(text: &str) -> &str {
    if let Some((_, rest)) = text.split_once("```json") {
        return rest.split("```").next().unwrap_or(rest).trim();
    }
    let mut fenced = text.split("```");
    if let (Some(_), Some(inner), Some(_)) = (fenced.next(), fenced.next(), fenced.next()) {
        return inner.trim();
    }
    text.trim()
}

fn to_medication(item: &Value) -> Option<MedicationRecord> {
    match item {
        Value::String(name) => Some(MedicationRecord::named(name.clone())),
        Value::Object(fields) => Some(MedicationRecord {
            name: field_text(fields.get("name")),
            dosage: field_text(fields.get("dosage")),
            frequency: field_text(fields.get("frequency")),
            timing: field_text(fields.get("timing")),
            duration: field_text(fields.get("duration")),
        }),
        _ => None,
    }
}

fn field_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
