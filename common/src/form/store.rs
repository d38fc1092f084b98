//! Durable per-origin storage for the draft.

use std::cell::RefCell;
use std::rc::Rc;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("storage is unavailable")]
    Unavailable,
    #[error("storage write failed: {0}")]
    Write(String),
}

/// Get/set/remove of a single serialized draft.
///
/// Writes are fire-and-forget from the controller's point of view: the last
/// write wins and a failed write never rolls back in-memory state.
pub trait DraftStore {
    fn load(&self) -> Result<Option<String>, StoreError>;
    fn save(&self, json: &str) -> Result<(), StoreError>;
    fn clear(&self) -> Result<(), StoreError>;
}

/// In-memory store. Clones share the same slot, which lets a second
/// controller observe what the first one persisted.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slot: Rc<RefCell<Option<String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(json: impl Into<String>) -> Self {
        Self {
            slot: Rc::new(RefCell::new(Some(json.into()))),
        }
    }

    pub fn contents(&self) -> Option<String> {
        self.slot.borrow().clone()
    }
}

impl DraftStore for MemoryStore {
    fn load(&self) -> Result<Option<String>, StoreError> {
        Ok(self.slot.borrow().clone())
    }

    fn save(&self, json: &str) -> Result<(), StoreError> {
        *self.slot.borrow_mut() = Some(json.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.slot.borrow_mut() = None;
        Ok(())
    }
}
