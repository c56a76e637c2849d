//! Typed access to the remote task store.
//!
//! One method per HTTP call. Every call resolves to exactly one result;
//! nothing is streamed and nothing is retried.

use std::future::Future;

use reqwest::{Method, StatusCode};
use taskdeck_core::{ClientError, ClientResult, NewTask, Task, TaskId, TaskUpdate};

use crate::config::ClientConfig;
use crate::http::HttpTransport;

/// The task store contract, scoped by user identifier.
///
/// Implemented over HTTP by [`HttpTaskClient`]; the collection controller is
/// generic over it so it can be driven by any store.
pub trait TaskApi: Send + Sync + 'static {
    fn list_tasks(&self, user_id: &str) -> impl Future<Output = ClientResult<Vec<Task>>> + Send;

    /// Any non-2xx answer is reported as [`ClientError::NotFound`].
    fn get_task(
        &self,
        user_id: &str,
        task_id: TaskId,
    ) -> impl Future<Output = ClientResult<Task>> + Send;

    fn create_task(
        &self,
        user_id: &str,
        task: NewTask,
    ) -> impl Future<Output = ClientResult<Task>> + Send;

    fn update_task(
        &self,
        user_id: &str,
        task_id: TaskId,
        update: TaskUpdate,
    ) -> impl Future<Output = ClientResult<Task>> + Send;

    fn delete_task(
        &self,
        user_id: &str,
        task_id: TaskId,
    ) -> impl Future<Output = ClientResult<()>> + Send;
}

#[derive(Debug, Clone)]
pub struct HttpTaskClient {
    transport: HttpTransport,
}

impl HttpTaskClient {
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        Ok(Self {
            transport: HttpTransport::new(config)?,
        })
    }

    pub fn from_env() -> ClientResult<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    pub fn config(&self) -> &ClientConfig {
        self.transport.config()
    }

    fn tasks_url(&self, user_id: &str) -> reqwest::Url {
        self.transport.endpoint(&["api", user_id, "tasks"])
    }

    fn task_url(&self, user_id: &str, task_id: TaskId) -> reqwest::Url {
        let id = task_id.to_string();
        self.transport.endpoint(&["api", user_id, "tasks", &id])
    }
}

impl TaskApi for HttpTaskClient {
    async fn list_tasks(&self, user_id: &str) -> ClientResult<Vec<Task>> {
        tracing::debug!(user_id, "GET tasks");
        let request = self.transport.request(Method::GET, self.tasks_url(user_id));
        let response = self.transport.send(request).await?;

        if !response.status().is_success() {
            return Err(HttpTransport::failure(response, "Failed to fetch tasks").await);
        }
        HttpTransport::decode(response).await
    }

    async fn get_task(&self, user_id: &str, task_id: TaskId) -> ClientResult<Task> {
        tracing::debug!(user_id, task_id, "GET task");
        let request = self
            .transport
            .request(Method::GET, self.task_url(user_id, task_id));
        let response = self.transport.send(request).await?;

        if !response.status().is_success() {
            tracing::warn!(
                user_id,
                task_id,
                status = response.status().as_u16(),
                "task lookup failed"
            );
            return Err(ClientError::NotFound(task_id));
        }
        HttpTransport::decode(response).await
    }

    async fn create_task(&self, user_id: &str, task: NewTask) -> ClientResult<Task> {
        task.validate()?;
        tracing::debug!(user_id, title = %task.title, "POST task");
        let request = self
            .transport
            .request(Method::POST, self.tasks_url(user_id))
            .json(&task);
        let response = self.transport.send(request).await?;

        if !response.status().is_success() {
            return Err(HttpTransport::failure(response, "Failed to create task").await);
        }
        HttpTransport::decode(response).await
    }

    async fn update_task(
        &self,
        user_id: &str,
        task_id: TaskId,
        update: TaskUpdate,
    ) -> ClientResult<Task> {
        update.validate()?;
        tracing::debug!(user_id, task_id, ?update, "PUT task");
        let request = self
            .transport
            .request(Method::PUT, self.task_url(user_id, task_id))
            .json(&update);
        let response = self.transport.send(request).await?;

        match response.status() {
            status if status.is_success() => HttpTransport::decode(response).await,
            StatusCode::NOT_FOUND => Err(ClientError::NotFound(task_id)),
            _ => Err(HttpTransport::failure(response, "Failed to update task").await),
        }
    }

    async fn delete_task(&self, user_id: &str, task_id: TaskId) -> ClientResult<()> {
        tracing::debug!(user_id, task_id, "DELETE task");
        let request = self
            .transport
            .request(Method::DELETE, self.task_url(user_id, task_id));
        let response = self.transport.send(request).await?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::NOT_FOUND => Err(ClientError::NotFound(task_id)),
            _ => Err(HttpTransport::failure(response, "Failed to delete task").await),
        }
    }
}
