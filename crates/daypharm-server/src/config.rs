//! Server configuration and application constants.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use daypharm_llm::gemini::{DEFAULT_BASE_URL, DEFAULT_MODELS, DEFAULT_TIMEOUT_SECS};
use daypharm_llm::{GeminiProvider, LlmError, PharmacyAssistant};
use thiserror::Error;

/// Application-level constants
pub const APP_NAME: &str = "DayPharm";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Address the dashboard API listens on by default.
pub const DEFAULT_BIND: &str = "127.0.0.1:8501";

/// Idle time after which a session and its patient data are dropped.
pub const DEFAULT_SESSION_TTL_SECS: u64 = 900;

/// How often the registry is swept for idle sessions.
pub const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Default tracing filter when neither `DAYPHARM_LOG` nor `RUST_LOG` is set.
pub fn default_log_filter() -> &'static str {
    "daypharm=info,daypharm_core=info,daypharm_llm=info,daypharm_server=info,tower_http=info"
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid DAYPHARM_BIND address '{0}'")]
    InvalidBind(String),

    #[error("Invalid DAYPHARM_LLM_TIMEOUT_SECS value '{0}'")]
    InvalidTimeout(String),

    #[error("Invalid DAYPHARM_SESSION_TTL_SECS value '{0}'")]
    InvalidSessionTtl(String),

    #[error("LLM client setup failed: {0}")]
    Llm(#[from] LlmError),
}

/// Runtime settings read from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    /// Gemini API key; `None` runs the dashboard without AI features
    pub gemini_api_key: Option<String>,
    pub gemini_models: Vec<String>,
    pub gemini_base_url: String,
    pub llm_timeout: Duration,
    pub session_ttl: Duration,
}

impl ServerConfig {
    /// Read configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind_text = var("DAYPHARM_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind: SocketAddr = bind_text
            .parse()
            .map_err(|_| ConfigError::InvalidBind(bind_text.clone()))?;

        let gemini_models = match var("DAYPHARM_GEMINI_MODELS") {
            Some(list) => list
                .split(',')
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(String::from)
                .collect(),
            None => DEFAULT_MODELS.iter().map(|m| m.to_string()).collect(),
        };

        let llm_timeout = match var("DAYPHARM_LLM_TIMEOUT_SECS") {
            Some(secs) => Duration::from_secs(
                secs.parse()
                    .map_err(|_| ConfigError::InvalidTimeout(secs.clone()))?,
            ),
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let session_ttl = match var("DAYPHARM_SESSION_TTL_SECS") {
            Some(secs) => Duration::from_secs(
                secs.parse()
                    .map_err(|_| ConfigError::InvalidSessionTtl(secs.clone()))?,
            ),
            None => Duration::from_secs(DEFAULT_SESSION_TTL_SECS),
        };

        Ok(Self {
            bind,
            gemini_api_key: var("GEMINI_API_KEY"),
            gemini_models,
            gemini_base_url: var("DAYPHARM_GEMINI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            llm_timeout,
            session_ttl,
        })
    }

    /// Build the assistant; without an API key every AI feature degrades
    /// to its placeholder text.
    pub fn assistant(&self) -> Result<PharmacyAssistant, ConfigError> {
        let Some(key) = &self.gemini_api_key else {
            tracing::warn!("GEMINI_API_KEY not set, AI features disabled");
            return Ok(PharmacyAssistant::unconfigured());
        };

        let provider = GeminiProvider::new(
            key,
            self.gemini_models.clone(),
            &self.gemini_base_url,
            self.llm_timeout,
        )?;
        tracing::info!(models = ?self.gemini_models, "Gemini provider configured");
        Ok(PharmacyAssistant::new(Arc::new(provider)))
    }
}
