//! Language model collaborators for the DayPharm dashboard.
//!
//! Prescription photo extraction, pharmacist reports, interaction warnings
//! and patient chat, all routed through a pluggable [`LlmProvider`]. The
//! production provider is Google Gemini.

pub mod assistant;
pub mod extraction;
pub mod gemini;
pub mod prompts;
pub mod provider;

pub use assistant::*;
pub use extraction::*;
pub use gemini::GeminiProvider;
pub use prompts::*;
pub use provider::*;
