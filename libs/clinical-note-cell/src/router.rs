use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
    middleware,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn clinical_note_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", post(handlers::create_note))
        .route("/patients/{patient_id}", get(handlers::list_patient_notes))
        .route(
            "/{note_id}",
            get(handlers::get_note)
                .put(handlers::update_note)
                .delete(handlers::delete_note),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
