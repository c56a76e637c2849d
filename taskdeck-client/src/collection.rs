//! Client-side task collection for one user.
//!
//! [`TaskCollection`] keeps an ordered, id-unique list of tasks in step with
//! the remote store. Every mutation is confirm-then-apply: the store is asked
//! first and local state changes only once it answers, so a failed call never
//! needs rolling back. The last successful answer wins.
//!
//! Loads carry a sequence number. When loads overlap, only the answer to the
//! most recently dispatched one is applied; older answers that arrive late are
//! dropped instead of overwriting fresher state.
//!
//! Outcomes are returned to the caller and also broadcast as [`TaskEvent`]s.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use taskdeck_core::{ClientResult, NewTask, Task, TaskFilter, TaskId, TaskUpdate};
use tokio::sync::broadcast;

use crate::api::TaskApi;
use crate::events::{EventDispatcher, Operation, TaskEvent};

#[derive(Debug, Default)]
struct State {
    tasks: Vec<Task>,
    filter: TaskFilter,
    loading: bool,
    load_seq: u64,
}

impl State {
    fn visible(&self) -> Vec<Task> {
        self.filter.apply(&self.tasks)
    }

    fn find(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Swap in the store's copy at the same position. A task that has left
    /// the collection in the meantime is not brought back.
    fn replace(&mut self, task: &Task) -> bool {
        match self.tasks.iter_mut().find(|t| t.id == task.id) {
            Some(slot) => {
                *slot = task.clone();
                true
            }
            None => false,
        }
    }

    fn prepend(&mut self, task: Task) {
        self.tasks.retain(|t| t.id != task.id);
        self.tasks.insert(0, task);
    }
}

struct Inner<A> {
    api: A,
    user_id: String,
    state: Mutex<State>,
    events: EventDispatcher,
}

/// Handle to a user's task collection. Clones share the same state.
pub struct TaskCollection<A> {
    inner: Arc<Inner<A>>,
}

impl<A> Clone for TaskCollection<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A: TaskApi> TaskCollection<A> {
    pub fn new(api: A, user_id: impl Into<String>) -> Self {
        Self::with_events(api, user_id, EventDispatcher::new())
    }

    pub fn with_events(api: A, user_id: impl Into<String>, events: EventDispatcher) -> Self {
        Self {
            inner: Arc::new(Inner {
                api,
                user_id: user_id.into(),
                state: Mutex::new(State::default()),
                events,
            }),
        }
    }

    pub fn api(&self) -> &A {
        &self.inner.api
    }

    pub fn user_id(&self) -> &str {
        &self.inner.user_id
    }

    pub fn events(&self) -> &EventDispatcher {
        &self.inner.events
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TaskEvent> {
        self.inner.events.subscribe()
    }

    // The guard never crosses an await: callers only touch state inside `f`.
    fn with_state<R>(&self, f: impl FnOnce(&mut State) -> R) -> R {
        let mut state: MutexGuard<'_, State> = self
            .inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }

    /// Every task currently held, in collection order.
    pub fn tasks(&self) -> Vec<Task> {
        self.with_state(|s| s.tasks.clone())
    }

    /// The tasks that pass the current filter, in collection order.
    pub fn visible(&self) -> Vec<Task> {
        self.with_state(|s| s.visible())
    }

    pub fn filter(&self) -> TaskFilter {
        self.with_state(|s| s.filter)
    }

    pub fn is_loading(&self) -> bool {
        self.with_state(|s| s.loading)
    }

    pub fn get(&self, id: TaskId) -> Option<Task> {
        self.with_state(|s| s.find(id).cloned())
    }

    pub fn contains(&self, id: TaskId) -> bool {
        self.with_state(|s| s.find(id).is_some())
    }

    pub fn len(&self) -> usize {
        self.with_state(|s| s.tasks.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fetch the full list from the store and make `filter` current.
    ///
    /// Filtering happens locally. On failure the previous collection stays in
    /// place. Returns the visible tasks after the call.
    pub async fn load(&self, filter: TaskFilter) -> ClientResult<Vec<Task>> {
        let seq = self.with_state(|s| {
            s.filter = filter;
            s.loading = true;
            s.load_seq += 1;
            s.load_seq
        });
        tracing::debug!(user_id = %self.inner.user_id, %filter, seq, "loading tasks");

        let result = self.inner.api.list_tasks(&self.inner.user_id).await;

        let applied = self.with_state(|s| {
            if seq != s.load_seq {
                return None;
            }
            s.loading = false;
            if let Ok(tasks) = &result {
                s.tasks = dedup_by_id(tasks.clone());
            }
            Some((s.visible(), s.tasks.len()))
        });

        let Some((visible, count)) = applied else {
            tracing::debug!(seq, "discarding answer to superseded load");
            return Ok(self.visible());
        };

        match result {
            Ok(_) => {
                tracing::info!(user_id = %self.inner.user_id, count, %filter, "tasks loaded");
                self.inner.events.emit(TaskEvent::Loaded { count, filter });
                Ok(visible)
            }
            Err(e) => {
                tracing::warn!(user_id = %self.inner.user_id, error = %e, "failed to load tasks");
                self.inner.events.emit_failure(Operation::Load, &e);
                Err(e)
            }
        }
    }

    /// Switch filters. Always reloads rather than re-filtering what is held.
    pub async fn set_filter(&self, filter: TaskFilter) -> ClientResult<Vec<Task>> {
        self.load(filter).await
    }

    /// Create a task and prepend the store's copy once it is confirmed.
    ///
    /// A blank title is rejected without contacting the store.
    pub async fn create(&self, title: &str, description: &str) -> ClientResult<Task> {
        let new_task = NewTask::new(title, description);
        new_task.validate()?;

        match self
            .inner
            .api
            .create_task(&self.inner.user_id, new_task)
            .await
        {
            Ok(task) => {
                tracing::info!(task_id = task.id, "task created");
                self.with_state(|s| s.prepend(task.clone()));
                self.inner
                    .events
                    .emit(TaskEvent::Created { task: task.clone() });
                Ok(task)
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to create task");
                self.inner.events.emit_failure(Operation::Create, &e);
                Err(e)
            }
        }
    }

    /// Flip `completed` on a held task.
    ///
    /// Returns `Ok(None)` without contacting the store when `id` is not in the
    /// collection.
    pub async fn toggle_complete(&self, id: TaskId) -> ClientResult<Option<Task>> {
        let Some(completed) = self.with_state(|s| s.find(id).map(|t| t.completed)) else {
            tracing::debug!(task_id = id, "toggle ignored for unknown task");
            return Ok(None);
        };

        match self
            .inner
            .api
            .update_task(&self.inner.user_id, id, TaskUpdate::completed(!completed))
            .await
        {
            Ok(task) => {
                self.apply_update(&task, Operation::Toggle);
                Ok(Some(task))
            }
            Err(e) => {
                tracing::warn!(task_id = id, error = %e, "failed to toggle task");
                self.inner.events.emit_failure(Operation::Toggle, &e);
                Err(e)
            }
        }
    }

    /// Delete a task. The store is always asked, even for ids not held here.
    pub async fn delete(&self, id: TaskId) -> ClientResult<()> {
        match self
            .inner
            .api
            .delete_task(&self.inner.user_id, id)
            .await
        {
            Ok(()) => {
                tracing::info!(task_id = id, "task deleted");
                self.with_state(|s| s.tasks.retain(|t| t.id != id));
                self.inner.events.emit(TaskEvent::Deleted { id });
                Ok(())
            }
            Err(e) => {
                tracing::warn!(task_id = id, error = %e, "failed to delete task");
                self.inner.events.emit_failure(Operation::Delete, &e);
                Err(e)
            }
        }
    }

    /// Replace title and description. A blank title is rejected without
    /// contacting the store.
    pub async fn update(&self, id: TaskId, title: &str, description: &str) -> ClientResult<Task> {
        let update = TaskUpdate::content(title, description);
        update.validate()?;

        match self
            .inner
            .api
            .update_task(&self.inner.user_id, id, update)
            .await
        {
            Ok(task) => {
                self.apply_update(&task, Operation::Update);
                Ok(task)
            }
            Err(e) => {
                tracing::warn!(task_id = id, error = %e, "failed to update task");
                self.inner.events.emit_failure(Operation::Update, &e);
                Err(e)
            }
        }
    }

    fn apply_update(&self, task: &Task, operation: Operation) {
        if !self.with_state(|s| s.replace(task)) {
            tracing::debug!(task_id = task.id, "updated task no longer held; not re-adding");
        }
        self.inner.events.emit(TaskEvent::Updated {
            task: task.clone(),
            operation,
        });
    }
}

fn dedup_by_id(tasks: Vec<Task>) -> Vec<Task> {
    let mut seen = std::collections::HashSet::with_capacity(tasks.len());
    tasks.into_iter().filter(|t| seen.insert(t.id)).collect()
}
