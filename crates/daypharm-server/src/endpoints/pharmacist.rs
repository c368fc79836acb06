//! Pharmacist-side endpoints: patient list, prefilled form, report.

use axum::extract::{Path, Query, State};
use axum::Json;
use daypharm_core::models::PatientRecord;
use daypharm_core::session::{PharmacistForm, GENDER_OPTIONS};
use daypharm_core::store::PatientHandle;
use daypharm_llm::PHARMACIST_DISCLAIMER;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Serialize)]
pub struct PatientOption {
    pub index: PatientHandle,
    pub label: String,
}

#[derive(Serialize)]
pub struct RegistryRow {
    pub index: PatientHandle,
    pub name: String,
    pub age: String,
    pub gender: String,
    pub medications: String,
    pub has_report: bool,
    pub updated_at: String,
}

#[derive(Serialize)]
pub struct PatientsResponse {
    /// Most recent record, preselected in the picker
    pub default_selection: Option<PatientHandle>,
    /// Picker options in insertion order
    pub options: Vec<PatientOption>,
    /// Registry table, newest first
    pub registry: Vec<RegistryRow>,
}

#[derive(Deserialize)]
pub struct FormQuery {
    pub selected: Option<usize>,
}

#[derive(Serialize)]
pub struct FormResponse {
    pub form: PharmacistForm,
    pub gender_options: [&'static str; 4],
}

#[derive(Deserialize)]
pub struct ReportRequest {
    pub form: PharmacistForm,
    /// Extra reference data appended to the prompt
    #[serde(default)]
    pub context: Option<String>,
}

#[derive(Serialize)]
pub struct ReportResponse {
    pub index: PatientHandle,
    pub report: String,
    pub patient: PatientRecord,
    pub disclaimer: &'static str,
}

/// `GET /api/sessions/:session_id/pharmacist/patients`
pub async fn patients(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<PatientsResponse>, ApiError> {
    state.with_session(&session_id, |session| {
        let store = session.store();

        let options = store
            .records()
            .iter()
            .enumerate()
            .map(|(i, record)| PatientOption {
                index: PatientHandle::from_index(i),
                label: record.option_label(),
            })
            .collect();

        let registry = store
            .iter_recent_first()
            .map(|(index, record)| RegistryRow {
                index,
                name: record.name.clone(),
                age: record.age.clone(),
                gender: record.gender.clone(),
                medications: record.medication_summary(),
                has_report: record.report.is_some(),
                updated_at: record.updated_at.clone(),
            })
            .collect();

        Ok(Json(PatientsResponse {
            default_selection: store.find_most_recent().map(|(handle, _)| handle),
            options,
            registry,
        }))
    })
}

/// `GET /api/sessions/:session_id/pharmacist/form?selected=N`
pub async fn form(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Query(query): Query<FormQuery>,
) -> Result<Json<FormResponse>, ApiError> {
    state.with_session(&session_id, |session| {
        let selected = query.selected.map(PatientHandle::from_index);
        if let Some(handle) = selected {
            if session.store().get(handle).is_none() {
                return Err(ApiError::NotFound(format!(
                    "No patient at index {}",
                    handle.index()
                )));
            }
        }

        Ok(Json(FormResponse {
            form: PharmacistForm::prefill(session.store(), selected),
            gender_options: GENDER_OPTIONS,
        }))
    })
}

/// `POST /api/sessions/:session_id/pharmacist/report`
///
/// Generates the report with the session unlocked, then stores it on the
/// selected record or a new one.
pub async fn report(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<ReportRequest>,
) -> Result<Json<ReportResponse>, ApiError> {
    state.session(&session_id)?;

    let data = request.form.to_patient_data();
    let report = state
        .assistant
        .write_report(&data, request.context.as_deref())
        .await?;

    state.with_session(&session_id, |session| {
        let index = session.submit_report(&request.form, report.clone());
        let patient = session
            .store()
            .get(index)
            .cloned()
            .ok_or_else(|| ApiError::Internal("stored report vanished".into()))?;

        Ok(Json(ReportResponse {
            index,
            report,
            patient,
            disclaimer: PHARMACIST_DISCLAIMER,
        }))
    })
}
