use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use dashmap::DashMap;
use taskdeck_core::{
    NewTask, Task, TaskFilter, TaskId, TaskUpdate, MAX_DESCRIPTION_LEN, MAX_TITLE_LEN,
};

use crate::errors::ApiError;

/// In-memory task table. Ids are allocated from a single counter shared by
/// all users.
#[derive(Debug, Default)]
pub struct TaskStore {
    tasks: DashMap<TaskId, Task>,
    next_id: AtomicI64,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A user's tasks in ascending id order.
    pub fn list(&self, user_id: &str, filter: TaskFilter) -> Vec<Task> {
        let mut tasks: Vec<Task> = self
            .tasks
            .iter()
            .filter(|entry| entry.user_id == user_id && filter.matches(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        tasks.sort_by_key(|t| t.id);
        tasks
    }

    pub fn create(&self, user_id: &str, new_task: NewTask) -> Result<Task, ApiError> {
        validate_title(&new_task.title)?;
        validate_description(&new_task.description)?;

        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let now = Utc::now();
        let task = Task {
            id,
            user_id: user_id.to_string(),
            title: new_task.title,
            description: new_task.description,
            completed: false,
            created_at: now,
            updated_at: now,
        };
        self.tasks.insert(id, task.clone());
        tracing::debug!(user_id, task_id = id, "task stored");
        Ok(task)
    }

    pub fn get(&self, user_id: &str, id: TaskId) -> Result<Task, ApiError> {
        let task = self
            .tasks
            .get(&id)
            .ok_or_else(|| not_found(id))?;
        check_owner(&task, user_id)?;
        Ok(task.value().clone())
    }

    pub fn update(&self, user_id: &str, id: TaskId, update: &TaskUpdate) -> Result<Task, ApiError> {
        if let Some(title) = &update.title {
            validate_title(title)?;
        }
        if let Some(description) = &update.description {
            validate_description(description)?;
        }

        let mut task = self
            .tasks
            .get_mut(&id)
            .ok_or_else(|| not_found(id))?;
        check_owner(&task, user_id)?;
        task.apply_update(update, Utc::now());
        Ok(task.value().clone())
    }

    pub fn toggle(&self, user_id: &str, id: TaskId) -> Result<Task, ApiError> {
        let mut task = self
            .tasks
            .get_mut(&id)
            .ok_or_else(|| not_found(id))?;
        check_owner(&task, user_id)?;
        let completed = !task.completed;
        task.apply_update(&TaskUpdate::completed(completed), Utc::now());
        Ok(task.value().clone())
    }

    pub fn delete(&self, user_id: &str, id: TaskId) -> Result<(), ApiError> {
        match self.tasks.remove_if(&id, |_, task| task.user_id == user_id) {
            Some(_) => Ok(()),
            None if self.tasks.contains_key(&id) => {
                Err(ApiError::forbidden("This task belongs to another user"))
            }
            None => Err(not_found(id)),
        }
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

fn not_found(id: TaskId) -> ApiError {
    ApiError::not_found(format!("Task with id {} not found", id))
}

fn check_owner(task: &Task, user_id: &str) -> Result<(), ApiError> {
    if task.user_id != user_id {
        return Err(ApiError::forbidden("This task belongs to another user"));
    }
    Ok(())
}

fn validate_title(title: &str) -> Result<(), ApiError> {
    if title.trim().is_empty() {
        return Err(ApiError::unprocessable("title must not be empty"));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(ApiError::unprocessable(format!(
            "title must be at most {} characters",
            MAX_TITLE_LEN
        )));
    }
    Ok(())
}

fn validate_description(description: &str) -> Result<(), ApiError> {
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(ApiError::unprocessable(format!(
            "description must be at most {} characters",
            MAX_DESCRIPTION_LEN
        )));
    }
    Ok(())
}
