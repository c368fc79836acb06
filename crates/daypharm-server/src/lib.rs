//! DayPharm dashboard API.
//!
//! An axum JSON API exposing the pharmacist and patient views. Every request
//! names a session; sessions own their patient registry and never see each
//! other's data.

pub mod config;
pub mod endpoints;
pub mod error;
pub mod router;
pub mod state;

pub use config::ServerConfig;
pub use error::ApiError;
pub use router::api_router;
pub use state::AppState;
