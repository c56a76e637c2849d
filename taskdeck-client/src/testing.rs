//! In-memory `TaskApi` used by the unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::Mutex;

use chrono::{TimeZone, Utc};
use taskdeck_core::{ClientError, ClientResult, NewTask, Task, TaskId, TaskUpdate};
use tokio::sync::oneshot;

use crate::api::TaskApi;

pub(crate) fn task(id: TaskId, title: &str, completed: bool) -> Task {
    let at = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
    Task {
        id,
        user_id: "user-1".to_string(),
        title: title.to_string(),
        description: String::new(),
        completed,
        created_at: at,
        updated_at: at,
    }
}

#[derive(Default)]
pub(crate) struct FakeApi {
    store: Mutex<Vec<Task>>,
    next_id: AtomicI64,
    calls: AtomicUsize,
    failing: AtomicBool,
    /// When non-empty, `list_tasks` waits on the front receiver instead of
    /// reading the store.
    list_gates: Mutex<VecDeque<oneshot::Receiver<Vec<Task>>>>,
}

impl FakeApi {
    pub(crate) fn with_tasks(tasks: Vec<Task>) -> Self {
        let next = tasks.iter().map(|t| t.id).max().unwrap_or(0);
        Self {
            store: Mutex::new(tasks),
            next_id: AtomicI64::new(next),
            ..Self::default()
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub(crate) fn gate_list(&self) -> oneshot::Sender<Vec<Task>> {
        let (tx, rx) = oneshot::channel();
        self.list_gates.lock().unwrap().push_back(rx);
        tx
    }

    /// Remove a task behind the collection's back.
    pub(crate) fn remove_remote(&self, id: TaskId) {
        self.store.lock().unwrap().retain(|t| t.id != id);
    }

    fn enter(&self) -> ClientResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(ClientError::Network("connection refused".into()));
        }
        Ok(())
    }
}

impl TaskApi for FakeApi {
    async fn list_tasks(&self, _user_id: &str) -> ClientResult<Vec<Task>> {
        self.enter()?;
        let gate = self.list_gates.lock().unwrap().pop_front();
        match gate {
            Some(rx) => rx
                .await
                .map_err(|_| ClientError::Network("gate dropped".into())),
            None => Ok(self.store.lock().unwrap().clone()),
        }
    }

    async fn get_task(&self, _user_id: &str, task_id: TaskId) -> ClientResult<Task> {
        self.enter()?;
        self.store
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.id == task_id)
            .cloned()
            .ok_or(ClientError::NotFound(task_id))
    }

    async fn create_task(&self, user_id: &str, task: NewTask) -> ClientResult<Task> {
        self.enter()?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let now = Utc::now();
        let created = Task {
            id,
            user_id: user_id.to_string(),
            title: task.title,
            description: task.description,
            completed: false,
            created_at: now,
            updated_at: now,
        };
        self.store.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn update_task(
        &self,
        _user_id: &str,
        task_id: TaskId,
        update: TaskUpdate,
    ) -> ClientResult<Task> {
        self.enter()?;
        let mut store = self.store.lock().unwrap();
        let task = store
            .iter_mut()
            .find(|t| t.id == task_id)
            .ok_or(ClientError::NotFound(task_id))?;
        task.apply_update(&update, Utc::now());
        Ok(task.clone())
    }

    async fn delete_task(&self, _user_id: &str, task_id: TaskId) -> ClientResult<()> {
        self.enter()?;
        let mut store = self.store.lock().unwrap();
        let before = store.len();
        store.retain(|t| t.id != task_id);
        if store.len() == before {
            return Err(ClientError::NotFound(task_id));
        }
        Ok(())
    }
}
