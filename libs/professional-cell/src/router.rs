use std::sync::Arc;

use axum::{
    Router,
    routing::get,
    middleware,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn professional_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route(
            "/",
            get(handlers::list_professionals).post(handlers::create_professional),
        )
        .route(
            "/{professional_id}",
            get(handlers::get_professional)
                .put(handlers::update_professional)
                .delete(handlers::deactivate_professional),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
