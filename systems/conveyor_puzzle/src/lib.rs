#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pooled conveyor puzzle.
//!
//! Candidate pieces spawn on a cadence, ride straight lanes toward their
//! destination, and recycle through a per-lane pool on arrival. Pieces
//! live in a controller-wide arena; lanes hold index lists only, so no
//! piece is ever shared or leaked between lanes.

use std::time::Duration;

use unitfall_core::{CandidateSet, Event, PieceId, PuzzleError, SlotPoint, TrackLine};

#[derive(Clone, Copy, Debug)]
struct PieceState {
    id: PieceId,
    candidate_index: usize,
    distance: f32,
}

#[derive(Debug)]
struct Lane {
    line: TrackLine,
    pool: Vec<usize>,
    active: Vec<usize>,
    cursor: usize,
    spawn_accumulator: Duration,
}

impl Lane {
    fn new(line: TrackLine) -> Self {
        Self {
            line,
            pool: Vec::new(),
            active: Vec::new(),
            cursor: 0,
            spawn_accumulator: Duration::ZERO,
        }
    }
}

/// Point-in-time copy of an in-flight conveyor piece.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PiecePlacement {
    /// Identifier of the piece.
    pub id: PieceId,
    /// Candidate template the piece displays.
    pub candidate_index: usize,
    /// Current position along the lane.
    pub position: SlotPoint,
}

/// Pooled conveyor controller advancing candidate pieces along lanes.
#[derive(Debug)]
pub struct ConveyorPuzzle {
    spawn_interval: Duration,
    speed: f32,
    template_count: usize,
    pieces: Vec<PieceState>,
    lanes: Vec<Lane>,
    running: bool,
}

impl ConveyorPuzzle {
    /// Creates an empty controller spawning every `spawn_interval` at `speed`.
    #[must_use]
    pub fn new(spawn_interval: Duration, speed: f32) -> Self {
        Self {
            spawn_interval,
            speed,
            template_count: 0,
            pieces: Vec::new(),
            lanes: Vec::new(),
            running: false,
        }
    }

    /// Installs the candidate templates and lane geometry.
    ///
    /// Existing pieces are discarded. Degenerate lanes stay usable but
    /// recycle their pieces immediately, which keeps a misconfigured
    /// layout from accumulating pieces forever.
    pub fn initialize(&mut self, candidates: &CandidateSet, lines: &[TrackLine]) {
        self.template_count = candidates.len();
        self.pieces.clear();
        self.lanes.clear();
        self.running = false;

        if lines.is_empty() {
            log::warn!("conveyor initialized without lanes; the playable area is undefined");
        }
        for line in lines {
            if line.is_degenerate() {
                log::warn!("conveyor lane is degenerate; its pieces will expire immediately");
            }
            self.lanes.push(Lane::new(*line));
        }
    }

    /// Starts the cadence and piece movement.
    pub fn start(&mut self) {
        self.running = true;
    }

    /// Halts the cadence and piece movement; pieces stay where they are.
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Releases every piece and halts the controller.
    pub fn destroy_all(&mut self) {
        self.running = false;
        self.pieces.clear();
        for lane in &mut self.lanes {
            lane.pool.clear();
            lane.active.clear();
            lane.cursor = 0;
            lane.spawn_accumulator = Duration::ZERO;
        }
    }

    /// Spawns one piece at the origin of `lane`.
    ///
    /// A pooled piece is reused with its template binding intact;
    /// otherwise a fresh piece takes the next template in cursor order,
    /// wrapping modulo the template count.
    pub fn spawn(&mut self, lane: usize) -> Result<PieceId, PuzzleError> {
        if self.template_count == 0 {
            log::warn!("conveyor spawn with no candidate templates is a no-op");
            return Err(PuzzleError::EmptyCandidatePool);
        }
        let Some(lane_state) = self.lanes.get_mut(lane) else {
            return Err(PuzzleError::UndefinedPlayArea);
        };

        let piece = match lane_state.pool.pop() {
            Some(piece) => {
                self.pieces[piece].distance = 0.0;
                piece
            }
            None => {
                let piece = self.pieces.len();
                self.pieces.push(PieceState {
                    id: PieceId::new(piece as u32),
                    candidate_index: lane_state.cursor,
                    distance: 0.0,
                });
                lane_state.cursor = (lane_state.cursor + 1) % self.template_count;
                piece
            }
        };
        lane_state.active.push(piece);
        Ok(self.pieces[piece].id)
    }

    /// Consumes events, advancing pieces and running the spawn cadence.
    ///
    /// Both run on wall-clock time; the controller ignores slow motion
    /// and play-phase flips entirely.
    pub fn handle(&mut self, events: &[Event]) {
        if !self.running {
            return;
        }

        let mut elapsed = Duration::ZERO;
        for event in events {
            if let Event::TimeAdvanced { dt } = event {
                elapsed = elapsed.saturating_add(*dt);
            }
        }
        if elapsed.is_zero() {
            return;
        }

        self.advance_pieces(elapsed);
        self.run_spawn_timers(elapsed);
    }

    fn advance_pieces(&mut self, elapsed: Duration) {
        let step = self.speed * elapsed.as_secs_f32();
        for lane in &mut self.lanes {
            let length = lane.line.length();
            let degenerate = lane.line.is_degenerate();
            // Reverse order keeps removal safe while iterating in place.
            for index in (0..lane.active.len()).rev() {
                let piece = lane.active[index];
                let state = &mut self.pieces[piece];
                state.distance += step;
                if degenerate || state.distance >= length {
                    state.distance = length;
                    let _ = lane.active.remove(index);
                    lane.pool.push(piece);
                }
            }
        }
    }

    fn run_spawn_timers(&mut self, elapsed: Duration) {
        if self.spawn_interval.is_zero() || self.template_count == 0 {
            return;
        }
        for lane in 0..self.lanes.len() {
            self.lanes[lane].spawn_accumulator =
                self.lanes[lane].spawn_accumulator.saturating_add(elapsed);
            while self.lanes[lane].spawn_accumulator >= self.spawn_interval {
                self.lanes[lane].spawn_accumulator -= self.spawn_interval;
                let _ = self.spawn(lane);
            }
        }
    }

    /// Reports whether the cadence and movement are live.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Number of lanes the controller drives.
    #[must_use]
    pub fn lane_count(&self) -> usize {
        self.lanes.len()
    }

    /// Number of pieces in flight on `lane`.
    #[must_use]
    pub fn active_count(&self, lane: usize) -> usize {
        self.lanes.get(lane).map_or(0, |lane| lane.active.len())
    }

    /// Number of recycled pieces waiting in the pool of `lane`.
    #[must_use]
    pub fn pooled_count(&self, lane: usize) -> usize {
        self.lanes.get(lane).map_or(0, |lane| lane.pool.len())
    }

    /// Total number of pieces the arena has ever allocated.
    #[must_use]
    pub fn piece_count(&self) -> usize {
        self.pieces.len()
    }

    /// Captures the in-flight pieces of `lane` in travel order.
    #[must_use]
    pub fn placements(&self, lane: usize) -> Vec<PiecePlacement> {
        let Some(lane_state) = self.lanes.get(lane) else {
            return Vec::new();
        };
        lane_state
            .active
            .iter()
            .map(|&piece| {
                let state = &self.pieces[piece];
                PiecePlacement {
                    id: state.id,
                    candidate_index: state.candidate_index,
                    position: lane_state.line.point_at(state.distance),
                }
            })
            .collect()
    }
}
