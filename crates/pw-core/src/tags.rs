//! Tag interface between the plant model and the external controller.
//!
//! The real deployment backs this with an industrial protocol session. The model
//! only sees the [`TagInterface`] contract: every read or write either succeeds or
//! fails discretely, per call.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thiserror::Error;

use crate::ids::TagId;

/// Failure of a single tag read or write.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TagError {
    #[error("Unknown tag: {tag}")]
    UnknownTag { tag: TagId },

    #[error("Tag unavailable: {tag}")]
    Unavailable { tag: TagId },

    #[error("Tag I/O timed out: {tag}")]
    Timeout { tag: TagId },

    #[error("Session error: {message}")]
    Session { message: String },
}

impl TagError {
    /// Tag the failure refers to, if it is tag-specific.
    pub fn tag(&self) -> Option<&TagId> {
        match self {
            Self::UnknownTag { tag } | Self::Unavailable { tag } | Self::Timeout { tag } => {
                Some(tag)
            }
            Self::Session { .. } => None,
        }
    }
}

/// Read/write access to the controller's boolean tags.
///
/// Actuators are read, sensors are written. Implementations may be network bound;
/// callers must treat every call as fallible.
pub trait TagInterface: Send {
    /// Read the current value of a tag.
    fn read(&mut self, tag: &TagId) -> Result<bool, TagError>;

    /// Publish a new value for a tag.
    fn write(&mut self, tag: &TagId, value: bool) -> Result<(), TagError>;
}

impl<T: TagInterface + ?Sized> TagInterface for Box<T> {
    fn read(&mut self, tag: &TagId) -> Result<bool, TagError> {
        (**self).read(tag)
    }

    fn write(&mut self, tag: &TagId, value: bool) -> Result<(), TagError> {
        (**self).write(tag, value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fault {
    Once,
    Persistent,
}

#[derive(Debug, Default)]
struct TableInner {
    values: HashMap<TagId, bool>,
    read_faults: HashMap<TagId, Fault>,
    write_faults: HashMap<TagId, Fault>,
    strict: bool,
}

impl TableInner {
    fn take_fault(faults: &mut HashMap<TagId, Fault>, tag: &TagId) -> bool {
        match faults.get(tag) {
            Some(Fault::Persistent) => true,
            Some(Fault::Once) => {
                faults.remove(tag);
                true
            }
            None => false,
        }
    }
}

/// In-memory tag table shared between the simulation and a controller.
///
/// Cloning yields another handle onto the same table, so a test or a scripted
/// controller can keep one handle while the tick driver owns the other.
/// Reads and writes can be made to fail for fault-injection scenarios.
#[derive(Debug, Clone, Default)]
pub struct SharedTagTable {
    inner: Arc<Mutex<TableInner>>,
}

impl SharedTagTable {
    /// Table where tags nobody has written yet read as `false`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Table where reading a tag nobody has written yet is an error.
    pub fn strict() -> Self {
        let table = Self::default();
        table.lock().strict = true;
        table
    }

    fn lock(&self) -> MutexGuard<'_, TableInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Controller-side write (e.g. commanding an actuator).
    pub fn set(&self, tag: impl Into<TagId>, value: bool) {
        self.lock().values.insert(tag.into(), value);
    }

    /// Controller-side read (e.g. polling a sensor). `None` if never written.
    pub fn get(&self, tag: &TagId) -> Option<bool> {
        self.lock().values.get(tag).copied()
    }

    /// Make the next read of `tag` fail once.
    pub fn fail_next_read(&self, tag: impl Into<TagId>) {
        self.lock().read_faults.insert(tag.into(), Fault::Once);
    }

    /// Make every read of `tag` fail until cleared.
    pub fn fail_reads(&self, tag: impl Into<TagId>) {
        self.lock().read_faults.insert(tag.into(), Fault::Persistent);
    }

    /// Make the next write of `tag` fail once.
    pub fn fail_next_write(&self, tag: impl Into<TagId>) {
        self.lock().write_faults.insert(tag.into(), Fault::Once);
    }

    /// Make every write of `tag` fail until cleared.
    pub fn fail_writes(&self, tag: impl Into<TagId>) {
        self.lock().write_faults.insert(tag.into(), Fault::Persistent);
    }

    /// Remove every injected fault.
    pub fn clear_faults(&self) {
        let mut inner = self.lock();
        inner.read_faults.clear();
        inner.write_faults.clear();
    }

    /// Sorted copy of every known tag value.
    pub fn snapshot(&self) -> BTreeMap<TagId, bool> {
        self.lock()
            .values
            .iter()
            .map(|(tag, value)| (tag.clone(), *value))
            .collect()
    }
}

impl TagInterface for SharedTagTable {
    fn read(&mut self, tag: &TagId) -> Result<bool, TagError> {
        let mut inner = self.lock();
        if TableInner::take_fault(&mut inner.read_faults, tag) {
            return Err(TagError::Unavailable { tag: tag.clone() });
        }
        match inner.values.get(tag) {
            Some(value) => Ok(*value),
            None if inner.strict => Err(TagError::UnknownTag { tag: tag.clone() }),
            None => Ok(false),
        }
    }

    fn write(&mut self, tag: &TagId, value: bool) -> Result<(), TagError> {
        let mut inner = self.lock();
        if TableInner::take_fault(&mut inner.write_faults, tag) {
            return Err(TagError::Unavailable { tag: tag.clone() });
        }
        inner.values.insert(tag.clone(), value);
        Ok(())
    }
}
