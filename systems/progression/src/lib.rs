#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Answer statistics and tutorial-gated unit-group unlocks.
//!
//! Judged answers accumulate per measurement family; correct answers
//! unlock the family's unit groups in declared order, widening the pool
//! the question generator may draw from.

use std::collections::BTreeMap;

use unitfall_core::{Event, MeasurementFamily, Unit, UnitGroup};

/// Correct answers required to unlock each subsequent unit group.
pub const DEFAULT_UNLOCK_STEP: u32 = 5;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct FamilyStats {
    attempts: u32,
    hits: u32,
    streak: u32,
    best_streak: u32,
}

/// Point-in-time progression summary for one family.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FamilyProgress {
    /// Family the row tallies.
    pub family: MeasurementFamily,
    /// Answers judged so far.
    pub attempts: u32,
    /// Correct answers so far.
    pub hits: u32,
    /// Correct answers since the last miss.
    pub streak: u32,
    /// Longest streak observed.
    pub best_streak: u32,
    /// Groups unlocked so far, in declared order.
    pub unlocked_groups: Vec<UnitGroup>,
}

/// Immutable progression snapshot for hosts.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProgressReport {
    rows: Vec<FamilyProgress>,
}

impl ProgressReport {
    /// Rows in family display order, one per family.
    #[must_use]
    pub fn rows(&self) -> &[FamilyProgress] {
        &self.rows
    }
}

/// Pure system folding judged answers into statistics and unlocks.
#[derive(Debug)]
pub struct Progression {
    unlock_step: u32,
    stats: BTreeMap<MeasurementFamily, FamilyStats>,
}

impl Progression {
    /// Creates a tracker unlocking one further group per `unlock_step` hits.
    ///
    /// A zero step unlocks every group from the start.
    #[must_use]
    pub fn new(unlock_step: u32) -> Self {
        Self {
            unlock_step,
            stats: BTreeMap::new(),
        }
    }

    /// Consumes judged answers, updating attempts, hits, and streaks.
    pub fn handle(&mut self, events: &[Event]) {
        for event in events {
            if let Event::AnswerJudged {
                family, correct, ..
            } = event
            {
                let stats = self.stats.entry(*family).or_default();
                stats.attempts = stats.attempts.saturating_add(1);
                if *correct {
                    stats.hits = stats.hits.saturating_add(1);
                    stats.streak = stats.streak.saturating_add(1);
                    stats.best_streak = stats.best_streak.max(stats.streak);
                } else {
                    stats.streak = 0;
                }
            }
        }
    }

    /// Groups of `family` unlocked so far, in declared order.
    ///
    /// The first group is always unlocked.
    #[must_use]
    pub fn unlocked_groups(&self, family: MeasurementFamily) -> &'static [UnitGroup] {
        let groups = family.groups();
        let unlocked = self.unlocked_count(family, groups.len());
        &groups[..unlocked]
    }

    /// Units the question generator may draw from for `family`.
    #[must_use]
    pub fn unlocked_units(&self, family: MeasurementFamily) -> Vec<Unit> {
        self.unlocked_groups(family)
            .iter()
            .flat_map(|group| group.members().iter().copied())
            .collect()
    }

    /// Captures a snapshot of every family's statistics and unlocks.
    #[must_use]
    pub fn report(&self) -> ProgressReport {
        let rows = MeasurementFamily::ALL
            .iter()
            .map(|&family| {
                let stats = self.stats.get(&family).copied().unwrap_or_default();
                FamilyProgress {
                    family,
                    attempts: stats.attempts,
                    hits: stats.hits,
                    streak: stats.streak,
                    best_streak: stats.best_streak,
                    unlocked_groups: self.unlocked_groups(family).to_vec(),
                }
            })
            .collect();
        ProgressReport { rows }
    }

    fn unlocked_count(&self, family: MeasurementFamily, total: usize) -> usize {
        if self.unlock_step == 0 {
            return total;
        }
        let hits = self.stats.get(&family).map_or(0, |stats| stats.hits);
        let earned = 1 + (hits / self.unlock_step) as usize;
        earned.min(total)
    }
}

impl Default for Progression {
    fn default() -> Self {
        Self::new(DEFAULT_UNLOCK_STEP)
    }
}
