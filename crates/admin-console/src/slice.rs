//! Per-entity state slice: the cached list, a request status, and the last
//! error, mutated only by reducing `SliceAction`s.
//!
//! Transitions follow `Idle -> Loading -> {Succeeded, Failed}` for every
//! thunk. Nothing de-duplicates overlapping requests: whichever fetch is
//! reduced last owns the list.

use affiliate_core::{ConsoleError, ConsoleResult, Entity, EntityId, EntityKind};
use serde_json::Value;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliceStatus {
    Idle,
    Loading,
    Succeeded,
    Failed,
}

/// The asynchronous operations a slice tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Thunk {
    Fetch,
    Create,
    Update,
    SetStatus,
    Delete,
}

impl Thunk {
    pub fn as_str(&self) -> &'static str {
        match self {
            Thunk::Fetch => "fetch",
            Thunk::Create => "create",
            Thunk::Update => "update",
            Thunk::SetStatus => "set_status",
            Thunk::Delete => "delete",
        }
    }

    /// Message shown when the backend gives none.
    pub fn fallback_message(&self, kind: EntityKind) -> String {
        match self {
            Thunk::Fetch => format!("Failed to load {}", kind.plural()),
            Thunk::Create => format!("Failed to create {}", kind.singular()),
            Thunk::Update => format!("Failed to update {}", kind.singular()),
            Thunk::SetStatus => format!("Failed to update {} status", kind.singular()),
            Thunk::Delete => format!("Failed to delete {}", kind.singular()),
        }
    }
}

#[derive(Debug, Clone)]
pub enum SliceAction<E> {
    Pending(Thunk),
    FetchFulfilled(Vec<E>),
    CreateFulfilled(E),
    UpdateFulfilled { id: EntityId, patch: Value },
    StatusFulfilled { id: EntityId, patch: Value },
    DeleteFulfilled(EntityId),
    Rejected { thunk: Thunk, error: String },
}

#[derive(Debug, Clone)]
pub struct EntitySlice<E> {
    list: Vec<E>,
    status: SliceStatus,
    error: Option<String>,
}

impl<E> Default for EntitySlice<E> {
    fn default() -> Self {
        Self {
            list: Vec::new(),
            status: SliceStatus::Idle,
            error: None,
        }
    }
}

impl<E: Entity> EntitySlice<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn list(&self) -> &[E] {
        &self.list
    }

    pub fn status(&self) -> SliceStatus {
        self.status
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.status == SliceStatus::Loading
    }

    pub fn find(&self, id: &EntityId) -> Option<&E> {
        self.list.iter().find(|e| e.id() == id)
    }

    pub fn reduce(&mut self, action: SliceAction<E>) {
        match action {
            SliceAction::Pending(thunk) => {
                debug!(entity = %E::KIND, thunk = thunk.as_str(), "Pending");
                self.status = SliceStatus::Loading;
                self.error = None;
            }
            SliceAction::FetchFulfilled(list) => {
                self.list = list;
                self.succeed();
            }
            SliceAction::CreateFulfilled(record) => {
                self.list.insert(0, record);
                self.succeed();
            }
            SliceAction::UpdateFulfilled { id, patch }
            | SliceAction::StatusFulfilled { id, patch } => match self.merge_into(&id, &patch) {
                Ok(()) => self.succeed(),
                Err(e) => {
                    warn!(entity = %E::KIND, id = %id, error = %e, "Could not merge update");
                    self.fail(e.to_string());
                }
            },
            SliceAction::DeleteFulfilled(id) => {
                self.list.retain(|e| e.id() != &id);
                self.succeed();
            }
            SliceAction::Rejected { thunk, error } => {
                if thunk == Thunk::Fetch {
                    self.list.clear();
                }
                self.fail(error);
            }
        }
    }

    fn succeed(&mut self) {
        self.status = SliceStatus::Succeeded;
        self.error = None;
    }

    fn fail(&mut self, error: String) {
        self.status = SliceStatus::Failed;
        self.error = Some(error);
    }

    /// Replace the row with `id` by `old + patch`. Rows with other ids, and
    /// a list that does not contain `id`, are left alone.
    fn merge_into(&mut self, id: &EntityId, patch: &Value) -> ConsoleResult<()> {
        if let Some(slot) = self.list.iter_mut().find(|e| e.id() == id) {
            *slot = shallow_merge(slot, patch)?;
        }
        Ok(())
    }
}

/// Overlay the top-level fields of `patch` on `record`.
pub fn shallow_merge<E: Entity>(record: &E, patch: &Value) -> ConsoleResult<E> {
    let patch = patch.as_object().ok_or_else(|| {
        ConsoleError::UnexpectedResponse("update payload is not an object".to_string())
    })?;
    let mut merged = serde_json::to_value(record)?;
    if let Some(target) = merged.as_object_mut() {
        for (key, value) in patch {
            target.insert(key.clone(), value.clone());
        }
    }
    serde_json::from_value(merged).map_err(|e| ConsoleError::UnexpectedResponse(e.to_string()))
}
