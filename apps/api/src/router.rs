use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use appointment_cell::router::appointment_routes;
use auth_cell::router::auth_routes;
use clinical_note_cell::router::clinical_note_routes;
use finance_cell::router::finance_routes;
use patient_cell::router::patient_routes;
use professional_cell::router::professional_routes;
use shared_config::AppConfig;

pub fn create_router(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(|| async { "Clinic API is running!" }))
        .nest("/auth", auth_routes(state.clone()))
        .nest("/patients", patient_routes(state.clone()))
        .nest("/professionals", professional_routes(state.clone()))
        .nest("/appointments", appointment_routes(state.clone()))
        .nest("/finance", finance_routes(state.clone()))
        .nest("/clinical-notes", clinical_note_routes(state))
}
