//! Taskdeck - task list client with server-confirmed reconciliation
//!
//! This crate provides a unified API for the Taskdeck client and the
//! in-memory reference store.
//!
//! # Example
//!
//! ```ignore
//! use taskdeck::{ClientConfig, HttpTaskClient, HttpTaskCollection, TaskFilter};
//!
//! let api = HttpTaskClient::new(ClientConfig::from_env()?)?;
//! let tasks = HttpTaskCollection::new(api, "demo-user");
//! tasks.load(TaskFilter::All).await?;
//! tasks.create("Buy groceries", "").await?;
//! ```

// Re-export client types
pub use taskdeck_client::{
    ChatClient, ChatSession, ClientConfig, EditorState, EventDispatcher, HttpTaskClient,
    HttpTaskCollection, Notice, NoticeLevel, Operation, RowEditor, SaveOutcome, TaskApi,
    TaskCollection, TaskEvent,
};

// Re-export server types
pub use taskdeck_server::{router, AppState as Server};

// Re-export core types that external applications may need
pub use taskdeck_core::errors::ClientError;
pub use taskdeck_core::models::{NewTask, Task, TaskFilter, TaskId, TaskUpdate};
pub use taskdeck_core::protocol::{ChatReply, ConversationInfo, MessageInfo};
pub use taskdeck_core::ClientResult;
