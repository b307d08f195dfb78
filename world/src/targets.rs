//! Authoritative target state management utilities.

use std::collections::BTreeMap;
use std::time::Duration;

use unitfall_core::{ConversionQuestion, ConversionRecord, TargetId};

/// State of a falling target stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct TargetState {
    /// Identifier allocated by the world for the target.
    pub(crate) id: TargetId,
    /// Conversion the target challenges the player with.
    pub(crate) record: ConversionRecord,
    /// Question derived from the record when the target spawned.
    pub(crate) question: ConversionQuestion,
    /// Time left before the target expires.
    pub(crate) remaining_lifetime: Duration,
}

/// Registry that stores targets and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct TargetRegistry {
    entries: BTreeMap<TargetId, TargetState>,
    next_target_id: TargetId,
}

impl TargetRegistry {
    /// Creates an empty target registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_target_id: TargetId::new(0),
        }
    }

    /// Allocates an identifier and stores a freshly spawned target.
    pub(crate) fn insert(
        &mut self,
        record: ConversionRecord,
        question: ConversionQuestion,
        lifetime: Duration,
    ) -> TargetId {
        let id = self.next_target_id;
        self.next_target_id = TargetId::new(id.get().wrapping_add(1));
        let _ = self.entries.insert(
            id,
            TargetState {
                id,
                record,
                question,
                remaining_lifetime: lifetime,
            },
        );
        id
    }

    /// Removes a target, yielding its final state.
    pub(crate) fn remove(&mut self, id: TargetId) -> Option<TargetState> {
        self.entries.remove(&id)
    }

    /// Looks up a live target by identifier.
    pub(crate) fn get(&self, id: TargetId) -> Option<&TargetState> {
        self.entries.get(&id)
    }

    /// Iterates live targets in ascending identifier order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &TargetState> {
        self.entries.values()
    }

    /// Iterates live targets mutably in ascending identifier order.
    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut TargetState> {
        self.entries.values_mut()
    }

    /// Number of targets currently in play.
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use unitfall_core::{MeasurementFamily, Unit};

    fn sample_state_parts() -> (ConversionRecord, ConversionQuestion) {
        let record =
            ConversionRecord::new(MeasurementFamily::Length, Unit::Inch, Unit::Foot, 12.0)
                .expect("record");
        (record, ConversionQuestion::derive(record))
    }

    #[test]
    fn registry_starts_empty_with_zero_identifier() {
        let registry = TargetRegistry::new();
        assert!(registry.entries.is_empty());
        assert_eq!(registry.next_target_id.get(), 0);
    }

    #[test]
    fn insert_allocates_sequential_identifiers() {
        let mut registry = TargetRegistry::new();
        let (record, question) = sample_state_parts();
        let first = registry.insert(record, question.clone(), Duration::from_secs(10));
        let second = registry.insert(record, question, Duration::from_secs(10));
        assert_eq!(first.get(), 0);
        assert_eq!(second.get(), 1);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn remove_yields_the_stored_state() {
        let mut registry = TargetRegistry::new();
        let (record, question) = sample_state_parts();
        let id = registry.insert(record, question, Duration::from_secs(10));
        let state = registry.remove(id).expect("state");
        assert_eq!(state.id, id);
        assert_eq!(state.record, record);
        assert!(registry.remove(id).is_none());
    }
}
