#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Candidate-answer set construction.
//!
//! Distractors are stochastic, the correct entry is not: every built set
//! carries the answer bit for bit in exactly one slot, no matter what the
//! perturbation draws produce.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};
use unitfall_core::{
    Candidate, CandidateError, CandidateSet, Command, Event, TargetId, RNG_STREAM_CANDIDATES,
};

const DISTINCT_RETRIES: usize = 8;

/// Builds a candidate set of `slot_count` options around `correct`.
///
/// Distractors perturb the answer by one to four magnitude-scaled steps in
/// either direction. Should a perturbation collapse back onto the answer,
/// that entry is adopted as the correct one; otherwise the answer
/// overwrites a random slot. `randomize` shuffles the final order.
pub fn build<R: Rng>(
    correct: f32,
    slot_count: usize,
    rng: &mut R,
    randomize: bool,
) -> Result<CandidateSet, CandidateError> {
    if slot_count == 0 {
        return Err(CandidateError::InsufficientSlots);
    }

    let mut values = Vec::with_capacity(slot_count);
    for _ in 0..slot_count {
        let value = distinct_perturbation(correct, &values, rng);
        values.push(value);
    }

    let mut entries: Vec<Candidate> = values
        .iter()
        .map(|&value| Candidate::new(value, false))
        .collect();

    // Rounding can collapse a perturbation onto the answer despite the
    // retry budget; adopt the collision instead of injecting a duplicate.
    match values.iter().position(|&value| value == correct) {
        Some(index) => entries[index] = Candidate::new(correct, true),
        None => {
            let index = if slot_count > 1 {
                rng.gen_range(0..slot_count)
            } else {
                0
            };
            entries[index] = Candidate::new(correct, true);
        }
    }

    if randomize {
        entries.shuffle(rng);
    }

    CandidateSet::new(entries)
}

fn distinct_perturbation<R: Rng>(correct: f32, taken: &[f32], rng: &mut R) -> f32 {
    let mut value = perturb(correct, rng);
    for _ in 0..DISTINCT_RETRIES {
        if value != correct && !taken.contains(&value) {
            break;
        }
        value = perturb(correct, rng);
    }
    value
}

fn perturb<R: Rng>(correct: f32, rng: &mut R) -> f32 {
    let steps = rng.gen_range(1..=4) as f32;
    let sign = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
    correct + sign * steps * offset_step(correct)
}

fn offset_step(correct: f32) -> f32 {
    let scale = correct.abs();
    if scale >= 100.0 {
        10.0
    } else if scale >= 10.0 {
        1.0
    } else if scale >= 1.0 {
        0.5
    } else {
        0.05
    }
}

/// Pure system that answers [`Event::CandidatesNeeded`] with built sets.
#[derive(Debug)]
pub struct CandidateGeneration {
    global_seed: u64,
}

impl CandidateGeneration {
    /// Creates a new candidate system drawing from `global_seed`.
    #[must_use]
    pub const fn new(global_seed: u64) -> Self {
        Self { global_seed }
    }

    /// Consumes events and emits [`Command::PresentCandidates`].
    ///
    /// A request the builder rejects (zero slots escaping host validation)
    /// falls back to the degenerate single-slot set so the session never
    /// stalls waiting for options.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            if let Event::CandidatesNeeded {
                target,
                correct_value,
                slot_count,
                randomize,
            } = event
            {
                let seed = derive_candidate_seed(self.global_seed, *target);
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                let candidates = match build(*correct_value, *slot_count, &mut rng, *randomize) {
                    Ok(candidates) => candidates,
                    Err(error) => {
                        log::warn!(
                            "candidate build for target {} failed ({error}); using the solo set",
                            target.get()
                        );
                        CandidateSet::solo(*correct_value)
                    }
                };
                out.push(Command::PresentCandidates {
                    target: *target,
                    candidates,
                });
            }
        }
    }
}

fn derive_candidate_seed(global_seed: u64, target: TargetId) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(global_seed.to_le_bytes());
    hasher.update(RNG_STREAM_CANDIDATES.as_bytes());
    hasher.update(target.get().to_le_bytes());
    finalize_seed(hasher)
}

fn finalize_seed(hasher: Sha256) -> u64 {
    let digest = hasher.finalize();
    let bytes: [u8; 8] = digest[0..8].try_into().expect("sha256 digest slice length");
    u64::from_le_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rng(seed: u64) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(seed)
    }

    #[test]
    fn zero_slots_are_rejected() {
        let result = build(5.0, 0, &mut rng(1), false);
        assert_eq!(result, Err(CandidateError::InsufficientSlots));
    }

    #[test]
    fn built_sets_hold_exactly_one_correct_entry() {
        for seed in 0..64 {
            for slot_count in 1..=7 {
                let set = build(2.204_622_6, slot_count, &mut rng(seed), true).expect("set");
                assert_eq!(set.len(), slot_count);
                let corrects: Vec<&Candidate> = set
                    .entries()
                    .iter()
                    .filter(|candidate| candidate.is_correct())
                    .collect();
                assert_eq!(corrects.len(), 1);
                assert_eq!(corrects[0].value(), 2.204_622_6);
            }
        }
    }

    #[test]
    fn single_slot_sets_are_always_correct() {
        for seed in 0..16 {
            let set = build(0.25, 1, &mut rng(seed), false).expect("set");
            assert_eq!(set.len(), 1);
            assert_eq!(set.correct_index(), Some(0));
            assert_eq!(set.correct_value(), 0.25);
        }
    }

    #[test]
    fn injection_fills_a_wrong_slot_with_the_exact_answer() {
        let set = build(5.0, 4, &mut rng(42), false).expect("set");
        assert_eq!(set.len(), 4);
        let index = set.correct_index().expect("correct slot");
        assert_eq!(set.entries()[index].value(), 5.0);
        for candidate in set.entries() {
            assert!(candidate.value().is_finite());
        }
    }

    #[test]
    fn distractors_stay_distinct_from_the_answer() {
        for seed in 0..64 {
            let set = build(120.0, 5, &mut rng(seed), false).expect("set");
            for candidate in set.entries() {
                if !candidate.is_correct() {
                    assert_ne!(candidate.value(), 120.0);
                }
            }
        }
    }

    #[test]
    fn identical_seeds_build_identical_sets() {
        let first = build(33.3, 6, &mut rng(9), true).expect("set");
        let second = build(33.3, 6, &mut rng(9), true).expect("set");
        assert_eq!(first, second);
    }

    #[test]
    fn shuffling_permutes_without_changing_membership() {
        let plain = build(8.0, 5, &mut rng(17), false).expect("set");
        let shuffled = build(8.0, 5, &mut rng(17), true).expect("set");
        let mut plain_values: Vec<f32> = plain.entries().iter().map(|c| c.value()).collect();
        let mut shuffled_values: Vec<f32> = shuffled.entries().iter().map(|c| c.value()).collect();
        plain_values.sort_by(f32::total_cmp);
        shuffled_values.sort_by(f32::total_cmp);
        assert_eq!(plain_values, shuffled_values);
    }

    #[test]
    fn needed_events_are_answered_with_present_commands() {
        let mut generation = CandidateGeneration::new(1_234);
        let events = vec![Event::CandidatesNeeded {
            target: TargetId::new(3),
            correct_value: 1.0,
            slot_count: 4,
            randomize: true,
        }];
        let mut out = Vec::new();
        generation.handle(&events, &mut out);
        match out.as_slice() {
            [Command::PresentCandidates { target, candidates }] => {
                assert_eq!(*target, TargetId::new(3));
                assert_eq!(candidates.len(), 4);
                assert_eq!(candidates.correct_value(), 1.0);
            }
            other => panic!("expected PresentCandidates, got {other:?}"),
        }
    }

    #[test]
    fn repeated_requests_for_one_target_replay_identically() {
        let events = vec![Event::CandidatesNeeded {
            target: TargetId::new(8),
            correct_value: 2_000.0,
            slot_count: 5,
            randomize: true,
        }];
        let mut first = Vec::new();
        CandidateGeneration::new(77).handle(&events, &mut first);
        let mut second = Vec::new();
        CandidateGeneration::new(77).handle(&events, &mut second);
        assert_eq!(first, second);
    }

    #[test]
    fn zero_slot_requests_fall_back_to_the_solo_set() {
        let mut generation = CandidateGeneration::new(5);
        let events = vec![Event::CandidatesNeeded {
            target: TargetId::new(0),
            correct_value: 7.5,
            slot_count: 0,
            randomize: false,
        }];
        let mut out = Vec::new();
        generation.handle(&events, &mut out);
        match out.as_slice() {
            [Command::PresentCandidates { candidates, .. }] => {
                assert_eq!(candidates.len(), 1);
                assert_eq!(candidates.correct_index(), Some(0));
                assert_eq!(candidates.correct_value(), 7.5);
            }
            other => panic!("expected PresentCandidates, got {other:?}"),
        }
    }
}
