//! Notifications emitted by the task collection
//!
//! Every operation on [`TaskCollection`](crate::collection::TaskCollection)
//! reports its outcome here, in addition to returning a `Result` to the caller.
//! Presentation code subscribes once and renders each event as a toast via
//! [`TaskEvent::notice`].
//!
//! # Delivery
//!
//! Events go out over a `tokio::sync::broadcast` channel:
//! 1. Emitting never blocks and never fails, even with no subscribers
//! 2. Each subscriber sees every event emitted after it subscribed
//! 3. A subscriber that falls more than the channel capacity behind loses the
//!    oldest events and is told how many it missed

use taskdeck_core::{Task, TaskFilter, TaskId};
use tokio::sync::broadcast;

const EVENT_CAPACITY: usize = 256;

/// Which collection operation an event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Load,
    Create,
    Update,
    Toggle,
    Delete,
}

impl Operation {
    fn failure_text(&self) -> &'static str {
        match self {
            Operation::Load => "Failed to load tasks",
            Operation::Create => "Failed to create task",
            Operation::Update | Operation::Toggle => "Failed to update task",
            Operation::Delete => "Failed to delete task",
        }
    }
}

#[derive(Debug, Clone)]
pub enum TaskEvent {
    /// The collection was replaced by a fresh list from the store
    Loaded { count: usize, filter: TaskFilter },
    /// The store confirmed a new task and it was prepended
    Created { task: Task },
    /// The store confirmed an edit or a completion toggle
    Updated { task: Task, operation: Operation },
    /// The store confirmed a deletion
    Deleted { id: TaskId },
    /// A store call failed; the collection was left as it was
    Failed {
        operation: Operation,
        message: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A short user-facing message for an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    fn success(message: &str) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.to_string(),
        }
    }

    fn error(message: &str) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.to_string(),
        }
    }
}

impl TaskEvent {
    /// Toast text for this event, if it warrants one. Loads and completion
    /// toggles are silent on success.
    pub fn notice(&self) -> Option<Notice> {
        match self {
            TaskEvent::Loaded { .. } => None,
            TaskEvent::Created { .. } => Some(Notice::success("Task created")),
            TaskEvent::Updated {
                operation: Operation::Toggle,
                ..
            } => None,
            TaskEvent::Updated { .. } => Some(Notice::success("Task updated")),
            TaskEvent::Deleted { .. } => Some(Notice::success("Task deleted")),
            TaskEvent::Failed { operation, .. } => Some(Notice::error(operation.failure_text())),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, TaskEvent::Failed { .. })
    }
}

/// Fan-out point for [`TaskEvent`]s.
#[derive(Debug, Clone)]
pub struct EventDispatcher {
    sender: broadcast::Sender<TaskEvent>,
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl EventDispatcher {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TaskEvent> {
        self.sender.subscribe()
    }

    pub fn emit(&self, event: TaskEvent) {
        tracing::trace!(?event, "emitting task event");
        // No subscribers is fine
        let _ = self.sender.send(event);
    }

    pub fn emit_failure(&self, operation: Operation, error: &impl std::fmt::Display) {
        self.emit(TaskEvent::Failed {
            operation,
            message: error.to_string(),
        });
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_texts() {
        let failed = TaskEvent::Failed {
            operation: Operation::Load,
            message: "connection refused".into(),
        };
        assert_eq!(
            failed.notice(),
            Some(Notice {
                level: NoticeLevel::Error,
                message: "Failed to load tasks".into()
            })
        );
        assert!(failed.is_failure());

        let toggled_failure = TaskEvent::Failed {
            operation: Operation::Toggle,
            message: String::new(),
        };
        assert_eq!(
            toggled_failure.notice().unwrap().message,
            "Failed to update task"
        );

        assert_eq!(
            TaskEvent::Deleted { id: 4 }.notice().unwrap().message,
            "Task deleted"
        );
        assert!(TaskEvent::Loaded {
            count: 3,
            filter: TaskFilter::All
        }
        .notice()
        .is_none());
    }

    #[tokio::test]
    async fn test_emit_without_subscribers_is_silent() {
        let dispatcher = EventDispatcher::new();
        assert_eq!(dispatcher.subscriber_count(), 0);
        dispatcher.emit(TaskEvent::Deleted { id: 1 });
    }

    #[tokio::test]
    async fn test_subscribers_receive_in_order() {
        let dispatcher = EventDispatcher::new();
        let mut rx = dispatcher.subscribe();

        dispatcher.emit(TaskEvent::Deleted { id: 1 });
        dispatcher.emit_failure(Operation::Delete, &"Task not found: 1");

        match rx.recv().await.unwrap() {
            TaskEvent::Deleted { id } => assert_eq!(id, 1),
            other => panic!("unexpected event {:?}", other),
        }
        match rx.recv().await.unwrap() {
            TaskEvent::Failed { operation, message } => {
                assert_eq!(operation, Operation::Delete);
                assert_eq!(message, "Task not found: 1");
            }
            other => panic!("unexpected event {:?}", other),
        }
    }
}
