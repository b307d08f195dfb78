#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Periodic position-swap puzzle.
//!
//! Candidate pieces occupy layout slots and the slot-to-piece assignment
//! rotates one position whenever the swap timer elapses. Pausing suspends
//! the countdown without resetting it; each timer crossing performs at
//! most one rotation before the timer refills.

use std::time::Duration;

use unitfall_core::{CandidateSet, Event, PieceId, PlayPhase, SlotLayout};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Idle,
    Active,
}

#[derive(Clone, Copy, Debug)]
struct SwapPiece {
    id: PieceId,
    candidate_index: usize,
}

/// Timed state machine rotating candidate pieces across layout slots.
#[derive(Debug)]
pub struct SwapPuzzle {
    interval: Duration,
    remaining: Duration,
    state: State,
    pieces: Vec<SwapPiece>,
    assignment: Vec<usize>,
}

impl SwapPuzzle {
    /// Creates an idle puzzle rotating every `interval`.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            remaining: interval,
            state: State::Idle,
            pieces: Vec::new(),
            assignment: Vec::new(),
        }
    }

    /// Allocates one piece per layout slot, bound to candidates in order.
    ///
    /// Candidate indices cycle when slots outnumber candidates, so the
    /// extra slots show duplicates. Surplus candidates are not displayed.
    /// The puzzle returns to Idle with a fresh timer.
    pub fn initialize(&mut self, candidates: &CandidateSet, layout: &SlotLayout) {
        self.state = State::Idle;
        self.remaining = self.interval;
        self.pieces.clear();
        self.assignment.clear();

        if layout.is_empty() || candidates.is_empty() {
            log::warn!("swap puzzle initialized without slots or candidates; rotation is a no-op");
            return;
        }
        if candidates.len() > layout.len() {
            log::warn!(
                "{} candidates for {} slots; the surplus is not displayed",
                candidates.len(),
                layout.len()
            );
        }

        for slot in 0..layout.len() {
            self.pieces.push(SwapPiece {
                id: PieceId::new(slot as u32),
                candidate_index: slot % candidates.len(),
            });
            self.assignment.push(slot);
        }
    }

    /// Activates rotation with a full timer.
    pub fn start(&mut self) {
        self.state = State::Active;
        self.remaining = self.interval;
    }

    /// Halts rotation and resets the timer; the assignment is retained.
    pub fn stop(&mut self) {
        self.state = State::Idle;
        self.remaining = self.interval;
    }

    /// Destroys the pieces and clears the assignment.
    pub fn end(&mut self) {
        self.state = State::Idle;
        self.remaining = self.interval;
        self.pieces.clear();
        self.assignment.clear();
    }

    /// Consumes events, counting down and rotating while play is live.
    ///
    /// Phases other than Playing leave the remaining time untouched.
    pub fn handle(&mut self, events: &[Event], play_phase: PlayPhase) {
        if self.state != State::Active || play_phase != PlayPhase::Playing {
            return;
        }

        for event in events {
            if let Event::TimeAdvanced { dt } = event {
                self.remaining = self.remaining.saturating_sub(*dt);
                if self.remaining.is_zero() {
                    self.rotate();
                    self.remaining = self.interval;
                }
            }
        }
    }

    fn rotate(&mut self) {
        if self.assignment.is_empty() {
            log::warn!("swap rotation with no assigned slots is a no-op");
            return;
        }
        // Slot i's occupant moves to slot i + 1; the last wraps to the first.
        self.assignment.rotate_right(1);
    }

    /// Reports whether the puzzle is rotating.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state == State::Active
    }

    /// Number of slots holding pieces.
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.assignment.len()
    }

    /// Fraction of the swap interval still remaining, in [0, 1].
    ///
    /// Idle puzzles report a full timer.
    #[must_use]
    pub fn progress(&self) -> f32 {
        if self.state == State::Idle {
            return 1.0;
        }
        if self.interval.is_zero() {
            return 0.0;
        }
        (self.remaining.as_secs_f32() / self.interval.as_secs_f32()).clamp(0.0, 1.0)
    }

    /// Identifier of the piece occupying `slot`.
    #[must_use]
    pub fn piece_at(&self, slot: usize) -> Option<PieceId> {
        let piece = *self.assignment.get(slot)?;
        self.pieces.get(piece).map(|piece| piece.id)
    }

    /// Candidate index displayed at `slot`.
    #[must_use]
    pub fn candidate_at(&self, slot: usize) -> Option<usize> {
        let piece = *self.assignment.get(slot)?;
        self.pieces.get(piece).map(|piece| piece.candidate_index)
    }
}
