//! Single-row edit mode on top of a [`TaskCollection`].
//!
//! At most one task is being edited at a time across the whole collection.
//! Starting a new edit discards the previous draft without saving it.

use taskdeck_core::TaskId;
use tokio::task::JoinHandle;

use crate::api::TaskApi;
use crate::collection::TaskCollection;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditDraft {
    pub task_id: TaskId,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EditorState {
    #[default]
    Viewing,
    Editing(EditDraft),
}

#[derive(Debug)]
pub enum SaveOutcome {
    /// Nothing was being edited.
    NotEditing,
    /// The draft title is blank. Still editing; nothing was sent.
    EmptyTitle,
    /// Back to viewing. The update runs in the background and reports its
    /// outcome through the collection's events.
    Dispatched(JoinHandle<()>),
}

pub struct RowEditor<A> {
    collection: TaskCollection<A>,
    state: EditorState,
}

impl<A: TaskApi> RowEditor<A> {
    pub fn new(collection: TaskCollection<A>) -> Self {
        Self {
            collection,
            state: EditorState::Viewing,
        }
    }

    pub fn collection(&self) -> &TaskCollection<A> {
        &self.collection
    }

    pub fn state(&mut self) -> &EditorState {
        self.reconcile();
        &self.state
    }

    pub fn draft(&mut self) -> Option<&EditDraft> {
        match self.state() {
            EditorState::Editing(draft) => Some(draft),
            EditorState::Viewing => None,
        }
    }

    pub fn is_editing(&mut self, id: TaskId) -> bool {
        self.draft().is_some_and(|d| d.task_id == id)
    }

    /// Drop the draft if its task is no longer in the collection. Returns
    /// true when a draft was dropped.
    pub fn reconcile(&mut self) -> bool {
        if let EditorState::Editing(draft) = &self.state {
            if !self.collection.contains(draft.task_id) {
                tracing::debug!(task_id = draft.task_id, "task gone; dropping edit draft");
                self.state = EditorState::Viewing;
                return true;
            }
        }
        false
    }

    /// Start editing `id`, seeding the draft from the held task. Any other
    /// draft is discarded. Returns false if the task is not held.
    pub fn begin(&mut self, id: TaskId) -> bool {
        let Some(task) = self.collection.get(id) else {
            return false;
        };
        if let EditorState::Editing(previous) = &self.state {
            if previous.task_id != id {
                tracing::debug!(task_id = previous.task_id, "discarding unsaved draft");
            }
        }
        self.state = EditorState::Editing(EditDraft {
            task_id: task.id,
            title: task.title,
            description: task.description,
        });
        true
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        if let EditorState::Editing(draft) = &mut self.state {
            draft.title = title.into();
        }
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        if let EditorState::Editing(draft) = &mut self.state {
            draft.description = description.into();
        }
    }

    pub fn cancel(&mut self) {
        self.state = EditorState::Viewing;
    }

    /// Save the draft. Must be called from within a tokio runtime.
    pub fn save(&mut self) -> SaveOutcome {
        self.reconcile();
        let draft = match &self.state {
            EditorState::Viewing => return SaveOutcome::NotEditing,
            EditorState::Editing(draft) if draft.title.trim().is_empty() => {
                return SaveOutcome::EmptyTitle
            }
            EditorState::Editing(draft) => draft.clone(),
        };
        self.state = EditorState::Viewing;

        let collection = self.collection.clone();
        let handle = tokio::spawn(async move {
            let title = draft.title.trim();
            let description = draft.description.trim();
            // Failures are already reported by the collection
            if let Err(e) = collection.update(draft.task_id, title, description).await {
                tracing::debug!(task_id = draft.task_id, error = %e, "background save failed");
            }
        });
        SaveOutcome::Dispatched(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{Operation, TaskEvent};
    use crate::testing::{task, FakeApi};
    use taskdeck_core::TaskFilter;

    async fn editor_with(tasks: Vec<taskdeck_core::Task>) -> RowEditor<FakeApi> {
        let collection = TaskCollection::new(FakeApi::with_tasks(tasks), "user-1");
        collection.load(TaskFilter::All).await.unwrap();
        RowEditor::new(collection)
    }

    #[tokio::test]
    async fn test_begin_seeds_draft_from_task() {
        let mut a = task(1, "A", false);
        a.description = "details".into();
        let mut editor = editor_with(vec![a, task(2, "B", false)]).await;

        assert!(editor.begin(1));
        assert_eq!(
            editor.state(),
            &EditorState::Editing(EditDraft {
                task_id: 1,
                title: "A".into(),
                description: "details".into(),
            })
        );

        assert!(editor.begin(2));
        assert_eq!(editor.draft().unwrap().description, "");
    }

    #[tokio::test]
    async fn test_begin_unknown_task_stays_viewing() {
        let mut editor = editor_with(vec![task(1, "A", false)]).await;
        assert!(!editor.begin(42));
        assert_eq!(editor.state(), &EditorState::Viewing);
    }

    #[tokio::test]
    async fn test_second_edit_discards_first_draft() {
        let mut editor = editor_with(vec![task(1, "A", false), task(2, "B", false)]).await;
        let calls = editor.collection().api().calls();

        editor.begin(1);
        editor.set_title("A edited");
        editor.begin(2);

        assert!(editor.is_editing(2));
        assert!(!editor.is_editing(1));
        assert_eq!(editor.draft().unwrap().title, "B");
        // Nothing was saved on the way
        assert_eq!(editor.collection().api().calls(), calls);
        assert_eq!(editor.collection().get(1).unwrap().title, "A");
    }

    #[tokio::test]
    async fn test_cancel_discards_without_calling_store() {
        let mut editor = editor_with(vec![task(1, "A", false)]).await;
        let calls = editor.collection().api().calls();

        editor.begin(1);
        editor.set_title("changed");
        editor.cancel();

        assert_eq!(editor.state(), &EditorState::Viewing);
        assert_eq!(editor.collection().api().calls(), calls);
        assert_eq!(editor.collection().get(1).unwrap().title, "A");
    }

    #[tokio::test]
    async fn test_save_with_blank_title_keeps_editing() {
        let mut editor = editor_with(vec![task(1, "A", false)]).await;
        let calls = editor.collection().api().calls();

        editor.begin(1);
        editor.set_title("   ");

        assert!(matches!(editor.save(), SaveOutcome::EmptyTitle));
        assert!(editor.is_editing(1));
        assert_eq!(editor.collection().api().calls(), calls);
    }

    #[tokio::test]
    async fn test_save_while_viewing() {
        let mut editor = editor_with(vec![task(1, "A", false)]).await;
        assert!(matches!(editor.save(), SaveOutcome::NotEditing));
    }

    #[tokio::test]
    async fn test_save_returns_to_viewing_and_updates_collection() {
        let mut editor = editor_with(vec![task(1, "A", false), task(2, "B", false)]).await;

        editor.begin(2);
        editor.set_title("  B renamed ");
        editor.set_description(" with notes  ");

        let SaveOutcome::Dispatched(handle) = editor.save() else {
            panic!("save should dispatch");
        };
        // Viewing before the update has resolved
        assert_eq!(editor.state(), &EditorState::Viewing);

        handle.await.unwrap();
        let saved = editor.collection().get(2).unwrap();
        assert_eq!(saved.title, "B renamed");
        assert_eq!(saved.description, "with notes");
        assert_eq!(
            editor
                .collection()
                .tasks()
                .iter()
                .map(|t| t.id)
                .collect::<Vec<_>>(),
            vec![1, 2]
        );
    }

    #[tokio::test]
    async fn test_failed_save_reports_through_collection() {
        let mut editor = editor_with(vec![task(1, "A", false)]).await;
        let mut events = editor.collection().subscribe();

        editor.begin(1);
        editor.set_title("A2");
        editor.collection().api().set_failing(true);

        let SaveOutcome::Dispatched(handle) = editor.save() else {
            panic!("save should dispatch");
        };
        handle.await.unwrap();

        assert_eq!(editor.state(), &EditorState::Viewing);
        assert_eq!(editor.collection().get(1).unwrap().title, "A");
        match events.recv().await.unwrap() {
            TaskEvent::Failed { operation, .. } => assert_eq!(operation, Operation::Update),
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_draft_dropped_when_task_is_deleted() {
        let mut editor = editor_with(vec![task(1, "A", false), task(2, "B", false)]).await;

        editor.begin(1);
        editor.collection().delete(1).await.unwrap();

        assert_eq!(editor.state(), &EditorState::Viewing);
        assert!(matches!(editor.save(), SaveOutcome::NotEditing));
    }

    #[tokio::test]
    async fn test_draft_dropped_when_reload_no_longer_has_task() {
        let mut editor = editor_with(vec![task(1, "A", false), task(2, "B", false)]).await;

        editor.begin(2);
        editor.collection().api().remove_remote(2);
        editor.collection().load(TaskFilter::All).await.unwrap();

        assert!(editor.reconcile());
        assert!(!editor.is_editing(2));
    }
}
