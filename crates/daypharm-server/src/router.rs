//! Dashboard API router.
//!
//! Routes are nested under `/api/`; per-session routes live under
//! `/api/sessions/:session_id`.

use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::endpoints;
use crate::state::AppState;

/// Build the dashboard API router.
pub fn api_router(state: AppState) -> Router {
    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    let session = Router::new()
        .route("/role", put(endpoints::sessions::set_role))
        .route(
            "/patient/intake/image",
            post(endpoints::patient::intake_image),
        )
        .route(
            "/patient/intake/manual",
            post(endpoints::patient::intake_manual),
        )
        .route("/patient/medications", get(endpoints::patient::medications))
        .route("/patient/records", get(endpoints::patient::records))
        .route("/patient/select", post(endpoints::patient::select))
        .route("/patient/schedule", get(endpoints::patient::schedule))
        .route(
            "/patient/schedule/taken",
            put(endpoints::patient::set_taken),
        )
        .route(
            "/patient/interactions",
            post(endpoints::patient::interactions),
        )
        .route(
            "/chat",
            get(endpoints::chat::history).post(endpoints::chat::send),
        )
        .route(
            "/pharmacist/patients",
            get(endpoints::pharmacist::patients),
        )
        .route("/pharmacist/form", get(endpoints::pharmacist::form))
        .route("/pharmacist/report", post(endpoints::pharmacist::report));

    let api = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/sessions", post(endpoints::sessions::create))
        .route("/sessions/:session_id", delete(endpoints::sessions::delete))
        .nest("/sessions/:session_id", session);

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
