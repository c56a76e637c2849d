use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use taskdeck_core::{NewTask, Task, TaskFilter, TaskId, TaskUpdate};

use crate::{
    errors::{ApiError, ServerResult},
    AppState,
};

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    status_filter: TaskFilter,
}

pub async fn list_tasks(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ServerResult<Json<Vec<Task>>> {
    // Bad filters get the same {"detail"} body as every other failure
    let Query(query) = query.map_err(|e| ApiError::unprocessable(e.body_text()))?;
    let tasks = state.store.list(&user_id, query.status_filter);
    tracing::debug!(%user_id, count = tasks.len(), filter = %query.status_filter, "listing tasks");
    Ok(Json(tasks))
}

pub async fn create_task(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Json(body): Json<NewTask>,
) -> ServerResult<(StatusCode, Json<Task>)> {
    let task = state.store.create(&user_id, body)?;
    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn get_task(
    State(state): State<Arc<AppState>>,
    Path((user_id, task_id)): Path<(String, TaskId)>,
) -> ServerResult<Json<Task>> {
    Ok(Json(state.store.get(&user_id, task_id)?))
}

pub async fn update_task(
    State(state): State<Arc<AppState>>,
    Path((user_id, task_id)): Path<(String, TaskId)>,
    Json(body): Json<TaskUpdate>,
) -> ServerResult<Json<Task>> {
    Ok(Json(state.store.update(&user_id, task_id, &body)?))
}

pub async fn toggle_complete(
    State(state): State<Arc<AppState>>,
    Path((user_id, task_id)): Path<(String, TaskId)>,
) -> ServerResult<Json<Task>> {
    Ok(Json(state.store.toggle(&user_id, task_id)?))
}

pub async fn delete_task(
    State(state): State<Arc<AppState>>,
    Path((user_id, task_id)): Path<(String, TaskId)>,
) -> ServerResult<StatusCode> {
    state.store.delete(&user_id, task_id)?;
    tracing::debug!(%user_id, task_id, "task deleted");
    Ok(StatusCode::NO_CONTENT)
}
