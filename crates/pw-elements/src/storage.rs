//! Storage rack next to the plant.
//!
//! Holds workpieces by label in numbered slots. The engine owns at most one
//! storage module and empties it on reset.

use crate::error::{ElementError, ElementResult};

/// Slots of the fischertechnik high-bay rack.
pub const DEFAULT_CAPACITY: usize = 9;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageModule {
    slots: Vec<Option<String>>,
}

impl Default for StorageModule {
    fn default() -> Self {
        Self {
            slots: vec![None; DEFAULT_CAPACITY],
        }
    }
}

impl StorageModule {
    /// # Errors
    ///
    /// Returns error if `capacity` is zero.
    pub fn new(capacity: usize) -> ElementResult<Self> {
        if capacity == 0 {
            return Err(ElementError::InvalidArg {
                what: "storage capacity must be positive",
            });
        }
        Ok(Self {
            slots: vec![None; capacity],
        })
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn occupied(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_full(&self) -> bool {
        self.occupied() == self.capacity()
    }

    /// Store a workpiece in the lowest free slot and return the slot index.
    pub fn store(&mut self, workpiece: impl Into<String>) -> ElementResult<usize> {
        let capacity = self.capacity();
        let (slot, free) = self
            .slots
            .iter_mut()
            .enumerate()
            .find(|(_, slot)| slot.is_none())
            .ok_or(ElementError::StorageFull { capacity })?;
        *free = Some(workpiece.into());
        Ok(slot)
    }

    /// Take the workpiece out of `slot`; `Ok(None)` if the slot is empty.
    pub fn retrieve(&mut self, slot: usize) -> ElementResult<Option<String>> {
        let capacity = self.capacity();
        self.slots
            .get_mut(slot)
            .map(Option::take)
            .ok_or(ElementError::SlotOutOfRange { slot, capacity })
    }

    pub fn get(&self, slot: usize) -> Option<&str> {
        self.slots.get(slot).and_then(|s| s.as_deref())
    }

    /// Empty every slot.
    pub fn reset(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
    }
}
