//! In-memory reference implementation of the task store HTTP contract.

pub mod api;
pub mod errors;
pub mod store;

use std::sync::Arc;

use axum::{
    routing::{get, patch},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use errors::{ApiError, ServerError, ServerResult};
pub use store::TaskStore;

#[derive(Debug, Default)]
pub struct AppState {
    pub store: TaskStore,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/api/:user_id/tasks",
            get(api::list_tasks).post(api::create_task),
        )
        .route(
            "/api/:user_id/tasks/:task_id",
            get(api::get_task)
                .put(api::update_task)
                .delete(api::delete_task),
        )
        .route(
            "/api/:user_id/tasks/:task_id/complete",
            patch(api::toggle_complete),
        )
        .route("/health", get(|| async { "OK" }))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
