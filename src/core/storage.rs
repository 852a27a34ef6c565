//! Persistence backends for session state.
//!
//! The filesystem and the command history persist themselves as a single
//! string blob each. Saving is best-effort: callers log failures and carry on
//! with the in-memory state.

use std::cell::RefCell;
use std::rc::Rc;

use crate::core::error::StorageError;

/// A key-value slot holding one serialized blob.
pub trait Storage {
    fn save(&self, blob: &str) -> Result<(), StorageError>;

    /// Returns `Ok(None)` when nothing has been saved yet.
    fn load(&self) -> Result<Option<String>, StorageError>;
}

/// Storage that forgets everything. Used when persistence is not wanted.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullStorage;

impl Storage for NullStorage {
    fn save(&self, _blob: &str) -> Result<(), StorageError> {
        Ok(())
    }

    fn load(&self) -> Result<Option<String>, StorageError> {
        Ok(None)
    }
}

/// In-memory storage.
///
/// Clones share the same slot, so a test can keep a handle and inspect what
/// the filesystem or history wrote.
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    slot: Rc<RefCell<Option<String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create storage pre-populated with a blob.
    pub fn with_blob(blob: impl Into<String>) -> Self {
        Self {
            slot: Rc::new(RefCell::new(Some(blob.into()))),
        }
    }

    /// Current contents of the slot.
    pub fn contents(&self) -> Option<String> {
        self.slot.borrow().clone()
    }
}

impl Storage for MemoryStorage {
    fn save(&self, blob: &str) -> Result<(), StorageError> {
        *self.slot.borrow_mut() = Some(blob.to_string());
        Ok(())
    }

    fn load(&self) -> Result<Option<String>, StorageError> {
        Ok(self.slot.borrow().clone())
    }
}
