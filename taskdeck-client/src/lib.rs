pub mod api;
pub mod chat;
pub mod collection;
pub mod config;
pub mod editor;
pub mod events;
mod http;

#[cfg(test)]
mod testing;

pub use api::{HttpTaskClient, TaskApi};
pub use chat::{ChatClient, ChatSession};
pub use collection::TaskCollection;
pub use config::ClientConfig;
pub use editor::{EditDraft, EditorState, RowEditor, SaveOutcome};
pub use events::{EventDispatcher, Notice, NoticeLevel, Operation, TaskEvent};

/// Collection backed by the HTTP task store.
pub type HttpTaskCollection = TaskCollection<HttpTaskClient>;
