//! Binary tags as seen from the plant model.
//!
//! An [`Actuator`] is commanded by the external controller; the model only ever
//! reads it, and only through the value latched for the current tick.
//! A [`Sensor`] is owned by the model and published to the controller after
//! every tick in which its value differs from what the controller last received.

use pw_core::TagId;

/// Controller-commanded boolean input.
///
/// An unassigned actuator (no tag) models a drive direction that is not wired
/// on the physical plant; it is permanently off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actuator {
    tag: Option<TagId>,
    value: bool,
}

impl Actuator {
    pub fn new(tag: impl Into<TagId>) -> Self {
        Self {
            tag: Some(tag.into()),
            value: false,
        }
    }

    pub fn unassigned() -> Self {
        Self {
            tag: None,
            value: false,
        }
    }

    /// Wrap an optional tag; `None` gives an unassigned actuator.
    pub fn from_optional(tag: Option<TagId>) -> Self {
        Self { tag, value: false }
    }

    pub fn tag(&self) -> Option<&TagId> {
        self.tag.as_ref()
    }

    /// Value latched for the current tick.
    pub fn is_on(&self) -> bool {
        self.value
    }

    pub(crate) fn latch(&mut self, value: bool) {
        self.value = value;
    }
}

/// Model-computed boolean output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sensor {
    tag: TagId,
    value: bool,
    initial: bool,
    /// Last value the tag interface accepted.
    published: Option<bool>,
}

impl Sensor {
    /// Sensor starting (and resetting) to `false`.
    pub fn new(tag: impl Into<TagId>) -> Self {
        Self::with_initial(tag, false)
    }

    /// Sensor starting (and resetting) to `initial`.
    pub fn with_initial(tag: impl Into<TagId>, initial: bool) -> Self {
        Self {
            tag: tag.into(),
            value: initial,
            initial,
            published: None,
        }
    }

    pub fn tag(&self) -> &TagId {
        &self.tag
    }

    pub fn is_on(&self) -> bool {
        self.value
    }

    pub fn initial(&self) -> bool {
        self.initial
    }

    pub fn activate(&mut self) {
        self.value = true;
    }

    pub fn deactivate(&mut self) {
        self.value = false;
    }

    pub fn set(&mut self, value: bool) {
        self.value = value;
    }

    /// Force the sensor back to its configured initial value.
    pub fn reset(&mut self) {
        self.value = self.initial;
    }

    /// Value still to be published, if the controller has not seen it yet.
    pub fn pending(&self) -> Option<bool> {
        (self.published != Some(self.value)).then_some(self.value)
    }

    /// Record that `value` reached the tag interface.
    pub fn mark_published(&mut self, value: bool) {
        self.published = Some(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unassigned_actuator_has_no_tag_and_is_off() {
        let act = Actuator::unassigned();
        assert!(act.tag().is_none());
        assert!(!act.is_on());
        assert_eq!(Actuator::from_optional(None), act);
    }

    #[test]
    fn sensor_reset_restores_initial() {
        let mut closed = Sensor::with_initial("B1_S13", true);
        closed.deactivate();
        assert!(!closed.is_on());
        closed.reset();
        assert!(closed.is_on());

        let mut open = Sensor::new("B1_S12");
        open.activate();
        open.reset();
        assert!(!open.is_on());
    }

    #[test]
    fn pending_tracks_unpublished_changes() {
        let mut sensor = Sensor::new("B1_S21");
        // Never published: initial value still has to reach the controller.
        assert_eq!(sensor.pending(), Some(false));

        sensor.mark_published(false);
        assert_eq!(sensor.pending(), None);

        sensor.activate();
        assert_eq!(sensor.pending(), Some(true));
        sensor.mark_published(true);
        assert_eq!(sensor.pending(), None);

        // Toggling back and forth within a tick publishes nothing.
        sensor.deactivate();
        sensor.activate();
        assert_eq!(sensor.pending(), None);
    }
}
