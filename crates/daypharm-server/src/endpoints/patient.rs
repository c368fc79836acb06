//! Patient-side endpoints.
//!
//! - `POST /intake/image` and `POST /intake/manual` register medications
//! - `GET /medications`, `GET /records`, `POST /select` manage the patient's list
//! - `GET /schedule`, `PUT /schedule/taken` drive the weekly checklist
//! - `POST /interactions` asks for interaction warnings

use axum::extract::{Path, Query, State};
use axum::Json;
use base64::Engine;
use chrono::NaiveDate;
use daypharm_core::models::{DoseTime, MedicationRecord, PatientRecord, ScheduleEntry};
use daypharm_core::session::{DoseKey, PrescriptionIntake};
use daypharm_core::store::PatientHandle;
use daypharm_llm::{InlineImage, InteractionNotice, PATIENT_DISCLAIMER};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

const DEFAULT_IMAGE_MIME: &str = "image/jpeg";

#[derive(Deserialize)]
pub struct ImageIntakeRequest {
    /// Base64 data URL (e.g., `data:image/jpeg;base64,/9j/...`) or raw base64
    pub image: String,
    pub mime_type: Option<String>,
}

#[derive(Serialize)]
pub struct IntakeResponse {
    pub patient_index: PatientHandle,
    pub intake: PrescriptionIntake,
    /// Patient-side medication list after the intake
    pub medications: Vec<MedicationRecord>,
}

#[derive(Serialize)]
pub struct MedicationsResponse {
    pub medications: Vec<MedicationRecord>,
    pub names: Vec<String>,
}

#[derive(Serialize)]
pub struct RecordsResponse {
    pub names: Vec<String>,
}

#[derive(Deserialize)]
pub struct SelectRequest {
    pub name: String,
}

#[derive(Serialize)]
pub struct SelectResponse {
    pub patient: PatientRecord,
    pub medications: Vec<MedicationRecord>,
    pub disclaimer: &'static str,
}

#[derive(Deserialize)]
pub struct ScheduleQuery {
    /// `YYYY-MM-DD`; defaults to today in local time
    pub start: Option<String>,
}

#[derive(Serialize)]
pub struct ScheduleDay {
    pub date: String,
    /// Entries sorted by time of day
    pub entries: Vec<ScheduleEntry>,
}

#[derive(Serialize)]
pub struct ScheduleResponse {
    pub start: NaiveDate,
    pub days: Vec<ScheduleDay>,
}

#[derive(Deserialize)]
pub struct TakenRequest {
    pub date: NaiveDate,
    pub time: DoseTime,
    /// `slot` of the schedule entry being ticked
    pub slot: usize,
    pub medication: String,
    pub taken: bool,
}

#[derive(Serialize)]
pub struct InteractionsResponse {
    pub medications: Vec<String>,
    pub notice: InteractionNotice,
    pub disclaimer: &'static str,
}

/// `POST /api/sessions/:session_id/patient/intake/image`
///
/// The photo is read by the assistant with no session lock held.
pub async fn intake_image(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<ImageIntakeRequest>,
) -> Result<Json<IntakeResponse>, ApiError> {
    // Fail fast on unknown sessions before spending an AI call
    state.session(&session_id)?;

    let (url_mime, data) = decode_data_url(&request.image)
        .map_err(|e| ApiError::BadRequest(format!("Invalid image data: {e}")))?;
    if data.is_empty() {
        return Err(ApiError::BadRequest("Empty image".into()));
    }
    let mime_type = request
        .mime_type
        .or(url_mime)
        .unwrap_or_else(|| DEFAULT_IMAGE_MIME.to_string());

    let intake = state
        .assistant
        .extract_prescription(InlineImage { mime_type, data })
        .await?;

    state.with_session(&session_id, |session| {
        let patient_index = session.record_intake(intake.clone());
        Ok(Json(IntakeResponse {
            patient_index,
            intake,
            medications: session.patient_medications().to_vec(),
        }))
    })
}

/// `POST /api/sessions/:session_id/patient/intake/manual`
pub async fn intake_manual(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(intake): Json<PrescriptionIntake>,
) -> Result<Json<IntakeResponse>, ApiError> {
    if intake.medications.is_empty() {
        return Err(ApiError::BadRequest("At least one medication is required".into()));
    }

    state.with_session(&session_id, |session| {
        let patient_index = session.record_intake(intake.clone());
        Ok(Json(IntakeResponse {
            patient_index,
            intake,
            medications: session.patient_medications().to_vec(),
        }))
    })
}

/// `GET /api/sessions/:session_id/patient/medications`
pub async fn medications(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<MedicationsResponse>, ApiError> {
    state.with_session(&session_id, |session| {
        Ok(Json(MedicationsResponse {
            medications: session.patient_medications().to_vec(),
            names: session.medication_names(),
        }))
    })
}

/// `GET /api/sessions/:session_id/patient/records`
pub async fn records(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<RecordsResponse>, ApiError> {
    state.with_session(&session_id, |session| {
        Ok(Json(RecordsResponse {
            names: session.store().display_names(),
        }))
    })
}

/// `POST /api/sessions/:session_id/patient/select`
pub async fn select(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<SelectRequest>,
) -> Result<Json<SelectResponse>, ApiError> {
    state.with_session(&session_id, |session| {
        let patient = session.select_patient(&request.name)?.clone();
        Ok(Json(SelectResponse {
            patient,
            medications: session.patient_medications().to_vec(),
            disclaimer: PATIENT_DISCLAIMER,
        }))
    })
}

/// `GET /api/sessions/:session_id/patient/schedule?start=YYYY-MM-DD`
pub async fn schedule(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Query(query): Query<ScheduleQuery>,
) -> Result<Json<ScheduleResponse>, ApiError> {
    let start = match query.start.as_deref() {
        Some(text) => NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .map_err(|e| ApiError::BadRequest(format!("Invalid start date '{text}': {e}")))?,
        None => chrono::Local::now().date_naive(),
    };

    let schedule = state.with_session(&session_id, |session| Ok(session.schedule(start)))?;

    let days = schedule
        .date_keys()
        .map(|key| ScheduleDay {
            date: key.to_string(),
            entries: schedule.day_sorted(key).into_iter().cloned().collect(),
        })
        .collect();

    Ok(Json(ScheduleResponse { start, days }))
}

/// `PUT /api/sessions/:session_id/patient/schedule/taken`
pub async fn set_taken(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<TakenRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.with_session(&session_id, |session| {
        session.set_taken(
            DoseKey {
                date: request.date,
                time: request.time,
                slot: request.slot,
                medication: request.medication,
            },
            request.taken,
        );
        Ok(Json(serde_json::json!({ "taken": request.taken })))
    })
}

/// `POST /api/sessions/:session_id/patient/interactions`
pub async fn interactions(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<InteractionsResponse>, ApiError> {
    let medications = state.with_session(&session_id, |session| Ok(session.medication_names()))?;
    if medications.is_empty() {
        return Err(ApiError::BadRequest("No medications registered".into()));
    }

    let notice = state.assistant.check_interactions(&medications).await;

    Ok(Json(InteractionsResponse {
        medications,
        notice,
        disclaimer: PATIENT_DISCLAIMER,
    }))
}

/// Decode a base64 data URL to its MIME type (if present) and raw bytes.
///
/// Handles both `data:image/jpeg;base64,...` and raw base64 strings.
pub fn decode_data_url(data_url: &str) -> Result<(Option<String>, Vec<u8>), base64::DecodeError> {
    let (mime, payload) = match data_url.split_once(',') {
        Some((header, payload)) => {
            let mime = header
                .strip_prefix("data:")
                .and_then(|rest| rest.split(';').next())
                .filter(|m| !m.is_empty())
                .map(String::from);
            (mime, payload)
        }
        None => (None, data_url),
    };

    let bytes = base64::engine::general_purpose::STANDARD.decode(payload.trim())?;
    Ok((mime, bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_data_url_with_header() {
        let (mime, bytes) = decode_data_url("data:image/png;base64,aGVsbG8=").unwrap();
        assert_eq!(mime.as_deref(), Some("image/png"));
        assert_eq!(bytes, b"hello");
    }

    #[test]
    fn decode_data_url_raw_base64() {
        let raw = base64::engine::general_purpose::STANDARD.encode(b"hello");
        let (mime, bytes) = decode_data_url(&raw).unwrap();
        assert_eq!(mime, None);
        assert_eq!(bytes, b"hello");
    }

    #[test]
    fn decode_data_url_invalid_base64() {
        assert!(decode_data_url("not-valid-base64!!!").is_err());
    }
}
