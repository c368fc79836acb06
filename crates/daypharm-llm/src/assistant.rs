//! Pharmacy assistant: prompt building, provider calls and graceful
//! degradation when no model is configured.

use std::sync::Arc;

use daypharm_core::models::{ChatMessage, PatientData};
use daypharm_core::session::PrescriptionIntake;
use serde::Serialize;
use thiserror::Error;

use crate::extraction::{parse_extraction_output, ExtractionError};
use crate::prompts::{
    make_chat_prompt, make_interaction_prompt, make_report_prompt, EXTRACTION_PROMPT,
    NO_API_KEY_CHAT, NO_API_KEY_EXTRACTION, NO_API_KEY_REPORT, STATIC_INTERACTION_NOTICE,
};
use crate::provider::{InlineImage, LlmError, LlmProvider, LlmRequest};

/// Assistant errors.
#[derive(Error, Debug)]
pub enum AssistantError {
    #[error("{}", NO_API_KEY_EXTRACTION)]
    ConfigurationMissing,

    #[error(transparent)]
    ExtractionParse(#[from] ExtractionError),

    #[error("LLM 호출 오류: {0}")]
    Provider(#[from] LlmError),
}

impl AssistantError {
    /// Message suitable for showing to the dashboard user.
    pub fn user_message(&self) -> String {
        match self {
            AssistantError::ConfigurationMissing => NO_API_KEY_EXTRACTION.to_string(),
            AssistantError::ExtractionParse(e) => e.to_string(),
            AssistantError::Provider(e) => format!("AI 응답을 받지 못했습니다: {}", e),
        }
    }
}

pub type AssistantResult<T> = Result<T, AssistantError>;

/// Interaction warnings, either generated or the generic caution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "lowercase")]
pub enum InteractionNotice {
    Generated(String),
    Static(String),
}

impl InteractionNotice {
    pub fn text(&self) -> &str {
        match self {
            InteractionNotice::Generated(text) | InteractionNotice::Static(text) => text,
        }
    }
}

/// Front door to the language model for every dashboard feature.
#[derive(Clone, Default)]
pub struct PharmacyAssistant {
    provider: Option<Arc<dyn LlmProvider>>,
}

impl PharmacyAssistant {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self {
            provider: Some(provider),
        }
    }

    /// Assistant with no model; every feature falls back to fixed text.
    pub fn unconfigured() -> Self {
        Self { provider: None }
    }

    pub fn is_configured(&self) -> bool {
        self.provider.is_some()
    }

    /// Name of the backing provider, if any.
    pub fn provider_name(&self) -> Option<&str> {
        self.provider.as_deref().map(|p| p.name())
    }

    /// Read a prescription bag photo into intake data.
    pub async fn extract_prescription(
        &self,
        image: InlineImage,
    ) -> AssistantResult<PrescriptionIntake> {
        let provider = self
            .provider
            .as_ref()
            .ok_or(AssistantError::ConfigurationMissing)?;

        let bytes = image.data.len();
        let reply = provider
            .generate(&LlmRequest::with_image(EXTRACTION_PROMPT, image))
            .await?;
        let intake = parse_extraction_output(&reply)?;

        tracing::info!(
            bytes,
            medications = intake.medications.len(),
            "Prescription extracted"
        );
        Ok(intake)
    }

    /// Pharmacist report for a patient.
    pub async fn write_report(
        &self,
        patient: &PatientData,
        context: Option<&str>,
    ) -> AssistantResult<String> {
        let Some(provider) = &self.provider else {
            return Ok(NO_API_KEY_REPORT.to_string());
        };
        let prompt = make_report_prompt(patient, context);
        Ok(provider.generate(&LlmRequest::text(prompt)).await?)
    }

    /// Interaction warnings for the given medication names.
    ///
    /// Provider failures degrade to the generic caution.
    pub async fn check_interactions(&self, medications: &[String]) -> InteractionNotice {
        let Some(provider) = &self.provider else {
            return InteractionNotice::Static(STATIC_INTERACTION_NOTICE.to_string());
        };

        let prompt = make_interaction_prompt(medications);
        match provider.generate(&LlmRequest::text(prompt)).await {
            Ok(text) => InteractionNotice::Generated(text),
            Err(e) => {
                tracing::warn!(error = %e, "Interaction check failed");
                InteractionNotice::Static(STATIC_INTERACTION_NOTICE.to_string())
            }
        }
    }

    /// Answer a patient question.
    pub async fn chat(
        &self,
        history: &[ChatMessage],
        medications: &[String],
        question: &str,
    ) -> AssistantResult<String> {
        let Some(provider) = &self.provider else {
            return Ok(NO_API_KEY_CHAT.to_string());
        };
        let prompt = make_chat_prompt(history, medications, question);
        Ok(provider.generate(&LlmRequest::text(prompt)).await?)
    }
}

impl std::fmt::Debug for PharmacyAssistant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PharmacyAssistant")
            .field("provider", &self.provider_name())
            .finish()
    }
}
