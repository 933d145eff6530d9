//! Per-tick view of the controller's actuator tags.

use std::collections::HashMap;

use pw_core::{TagError, TagId};
use tracing::warn;

use crate::events::Diagnostic;
use crate::tag::Actuator;

/// Outcome of reading one actuator tag at the start of a tick.
pub type ActuatorRead = Result<bool, TagError>;

/// Actuator values read once, before any element is updated.
///
/// Every element of a tick sees the same values, however the controller changes
/// its tags while the tick is computed.
#[derive(Debug, Clone, Default)]
pub struct ActuatorSnapshot {
    values: HashMap<TagId, ActuatorRead>,
}

impl ActuatorSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of successfully read values.
    pub fn from_values<I, T>(values: I) -> Self
    where
        I: IntoIterator<Item = (T, bool)>,
        T: Into<TagId>,
    {
        Self {
            values: values
                .into_iter()
                .map(|(tag, value)| (tag.into(), Ok(value)))
                .collect(),
        }
    }

    pub fn insert(&mut self, tag: TagId, read: ActuatorRead) {
        self.values.insert(tag, read);
    }

    pub fn get(&self, tag: &TagId) -> Option<&ActuatorRead> {
        self.values.get(tag)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of tags whose read failed.
    pub fn failed_reads(&self) -> usize {
        self.values.values().filter(|read| read.is_err()).count()
    }
}

/// Context handed to every element update within one tick.
#[derive(Debug)]
pub struct TickContext<'a> {
    tick: u64,
    snapshot: &'a ActuatorSnapshot,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> TickContext<'a> {
    pub fn new(tick: u64, snapshot: &'a ActuatorSnapshot) -> Self {
        Self {
            tick,
            snapshot,
            diagnostics: Vec::new(),
        }
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Latch the snapshot value into `actuator`.
    ///
    /// Returns `false` if the tag could not be read; the actuator is then latched
    /// off and an [`Diagnostic::ActuatorUnavailable`] is reported for `element`.
    pub fn latch(&mut self, element: &str, actuator: &mut Actuator) -> bool {
        let Some(tag) = actuator.tag().cloned() else {
            actuator.latch(false);
            return true;
        };
        let read = match self.snapshot.get(&tag) {
            Some(read) => read.clone(),
            None => Err(TagError::UnknownTag { tag: tag.clone() }),
        };
        match read {
            Ok(value) => {
                actuator.latch(value);
                true
            }
            Err(error) => {
                actuator.latch(false);
                self.report(Diagnostic::ActuatorUnavailable {
                    tick: self.tick,
                    element: element.to_string(),
                    tag,
                    error,
                });
                false
            }
        }
    }

    /// Latch both actuators of an opposing pair. Both are always latched so each
    /// unreadable tag is reported.
    pub fn latch_pair(
        &mut self,
        element: &str,
        forward: &mut Actuator,
        reverse: &mut Actuator,
    ) -> bool {
        let forward_ok = self.latch(element, forward);
        let reverse_ok = self.latch(element, reverse);
        forward_ok && reverse_ok
    }

    /// Report a conflict between two opposing actuators.
    pub fn report_conflict(&mut self, element: &str, forward: &Actuator, reverse: &Actuator) {
        let unassigned = || TagId::new("<unassigned>");
        self.report(Diagnostic::Conflict {
            tick: self.tick,
            element: element.to_string(),
            forward: forward.tag().cloned().unwrap_or_else(unassigned),
            reverse: reverse.tag().cloned().unwrap_or_else(unassigned),
        });
    }

    pub fn report(&mut self, diagnostic: Diagnostic) {
        warn!(tick = self.tick, "{diagnostic}");
        self.diagnostics.push(diagnostic);
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}
