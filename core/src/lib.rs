#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Unitfall engine.
//!
//! This crate defines the message surface that connects hosts, the
//! authoritative session world, and pure systems. Hosts and systems submit
//! [`Command`] values describing desired mutations, the world executes
//! those commands via its `apply` entry point, and then broadcasts
//! [`Event`] values for systems to react to deterministically. The
//! measurement vocabulary itself lives in [`units`].

pub mod units;

pub use units::{ConversionError, MeasurementFamily, Unit, UnitGroup};

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Unitfall.";

/// Largest candidate slot count the reference layout can display.
pub const MAX_SLOT_COUNT: usize = 7;

/// Label salting the question stream of the session RNG.
pub const RNG_STREAM_QUESTION: &str = "unitfall.question";

/// Label salting the candidate stream of the session RNG.
pub const RNG_STREAM_CANDIDATES: &str = "unitfall.candidates";

/// Coarse phase the session is in, as reported by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlayPhase {
    /// Gameplay is live; lifetimes decay and puzzles rotate.
    Playing,
    /// Gameplay is suspended; timers hold their remaining time.
    Paused,
    /// A tutorial modal is up; treated like a pause for puzzle cadence.
    Tutorial,
}

/// Identifier assigned to each target when it spawns.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct TargetId(u32);

impl TargetId {
    /// Creates an identifier from a raw integer value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Returns the raw integer backing the identifier.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

/// Identifier assigned to each puzzle piece inside a controller arena.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct PieceId(u32);

impl PieceId {
    /// Creates an identifier from a raw integer value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Returns the raw integer backing the identifier.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

/// Remaining player health measured in whole hearts.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct Health(u32);

impl Health {
    /// Creates a health value from a raw integer.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Returns the raw integer backing the health value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Returns the health left after absorbing `penalty`, floored at zero.
    #[must_use]
    pub const fn damaged(self, penalty: u32) -> Self {
        Self(self.0.saturating_sub(penalty))
    }

    /// Reports whether the player has run out of health.
    #[must_use]
    pub const fn is_depleted(self) -> bool {
        self.0 == 0
    }
}

/// Accumulated session score.
#[derive(
    Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize,
)]
pub struct Score(u32);

impl Score {
    /// Creates a score from a raw integer.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Returns the raw integer backing the score.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Returns the score after awarding `points`, saturating on overflow.
    #[must_use]
    pub const fn rewarded(self, points: u32) -> Self {
        Self(self.0.saturating_add(points))
    }
}

/// Difficulty tier scaling generated question values.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct DifficultyTier(u32);

impl DifficultyTier {
    /// Creates a tier from a raw integer value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Returns the raw integer backing the tier.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Smallest increment between generated input values.
    ///
    /// Low tiers stick to round numbers; higher tiers admit finer steps.
    #[must_use]
    pub const fn value_step(self) -> f32 {
        match self.0 {
            0 => 1.0,
            1 => 0.5,
            2 => 0.1,
            _ => 0.05,
        }
    }

    /// Upper bound of generated input values, widening with the tier.
    #[must_use]
    pub fn value_ceiling(self) -> f32 {
        10.0 * self.0.saturating_add(1) as f32
    }
}

/// Immutable description of one conversion challenge.
///
/// Both units belong to `family` when the record is built through
/// [`ConversionRecord::new`]; the world re-validates records arriving
/// from deserialized sources before admitting them.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConversionRecord {
    family: MeasurementFamily,
    input_unit: Unit,
    output_unit: Unit,
    input_value: f32,
}

impl ConversionRecord {
    /// Creates a record after checking that both units belong to `family`.
    pub fn new(
        family: MeasurementFamily,
        input_unit: Unit,
        output_unit: Unit,
        input_value: f32,
    ) -> Result<Self, ConversionError> {
        if input_unit.family() != family || output_unit.family() != family {
            return Err(ConversionError::MismatchedFamily {
                family,
                from: input_unit,
                to: output_unit,
            });
        }
        Ok(Self {
            family,
            input_unit,
            output_unit,
            input_value,
        })
    }

    /// Returns the family the record converts within.
    #[must_use]
    pub const fn family(&self) -> MeasurementFamily {
        self.family
    }

    /// Returns the unit the input value is expressed in.
    #[must_use]
    pub const fn input_unit(&self) -> Unit {
        self.input_unit
    }

    /// Returns the unit the answer must be expressed in.
    #[must_use]
    pub const fn output_unit(&self) -> Unit {
        self.output_unit
    }

    /// Returns the quantity shown to the player.
    #[must_use]
    pub const fn input_value(&self) -> f32 {
        self.input_value
    }

    /// Computes the correct answer through the conversion table.
    #[must_use]
    pub fn correct_value(&self) -> f32 {
        units::convert(
            self.input_value,
            self.family,
            self.input_unit,
            self.output_unit,
        )
    }

    /// Renders the `<value> <from> -> <to>` prompt shown to the player.
    #[must_use]
    pub fn display_text(&self) -> String {
        format!(
            "{} {} -> {}",
            units::format_value(self.input_value),
            self.input_unit.symbol(),
            self.output_unit.symbol()
        )
    }
}

/// A fully derived challenge: the record plus its canonical answer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConversionQuestion {
    record: ConversionRecord,
    correct_value: f32,
    display_text: String,
    fractional_display: bool,
}

impl ConversionQuestion {
    /// Derives the question for `record`.
    ///
    /// The stored correct value is whatever the conversion table returns
    /// for the record; recomputing it later must match bit for bit.
    #[must_use]
    pub fn derive(record: ConversionRecord) -> Self {
        let correct_value = record.correct_value();
        Self {
            record,
            correct_value,
            display_text: record.display_text(),
            fractional_display: units::fraction_parts(correct_value).is_some(),
        }
    }

    /// Returns the record the question was derived from.
    #[must_use]
    pub const fn record(&self) -> ConversionRecord {
        self.record
    }

    /// Returns the answer the player must match exactly.
    #[must_use]
    pub const fn correct_value(&self) -> f32 {
        self.correct_value
    }

    /// Returns the prompt shown to the player.
    #[must_use]
    pub fn display_text(&self) -> &str {
        &self.display_text
    }

    /// Reports whether downstream display should render a fraction.
    #[must_use]
    pub const fn fractional_display(&self) -> bool {
        self.fractional_display
    }
}

/// One selectable answer option.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    value: f32,
    is_correct: bool,
}

impl Candidate {
    /// Creates a candidate carrying `value`.
    #[must_use]
    pub const fn new(value: f32, is_correct: bool) -> Self {
        Self { value, is_correct }
    }

    /// Returns the numeric answer the candidate offers.
    #[must_use]
    pub const fn value(self) -> f32 {
        self.value
    }

    /// Reports whether the candidate carries the correct answer.
    #[must_use]
    pub const fn is_correct(self) -> bool {
        self.is_correct
    }

    /// Renders the option, as a fraction when the value sits in (0, 1).
    #[must_use]
    pub fn display_text(self) -> String {
        match units::fraction_parts(self.value) {
            Some((numerator, denominator)) => format!("{numerator}/{denominator}"),
            None => units::format_value(self.value),
        }
    }
}

/// Raised when a candidate set violates its construction contract.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error, Serialize, Deserialize)]
pub enum CandidateError {
    /// A set needs at least one slot.
    #[error("candidate sets need at least one slot")]
    InsufficientSlots,
    /// No entry was marked correct.
    #[error("no candidate is marked correct")]
    MissingCorrect,
    /// More than one entry was marked correct.
    #[error("{0} candidates are marked correct")]
    MultipleCorrect(usize),
}

/// Ordered candidate options holding exactly one correct entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CandidateSet {
    entries: Vec<Candidate>,
}

impl CandidateSet {
    /// Validates and wraps `entries`.
    pub fn new(entries: Vec<Candidate>) -> Result<Self, CandidateError> {
        if entries.is_empty() {
            return Err(CandidateError::InsufficientSlots);
        }
        let correct = entries.iter().filter(|entry| entry.is_correct()).count();
        match correct {
            0 => Err(CandidateError::MissingCorrect),
            1 => Ok(Self { entries }),
            n => Err(CandidateError::MultipleCorrect(n)),
        }
    }

    /// Builds the degenerate single-slot set holding only the answer.
    #[must_use]
    pub fn solo(correct_value: f32) -> Self {
        Self {
            entries: vec![Candidate::new(correct_value, true)],
        }
    }

    /// Returns the ordered entries.
    #[must_use]
    pub fn entries(&self) -> &[Candidate] {
        &self.entries
    }

    /// Returns the number of slots in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether the set has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the candidate stored at `index`, if any.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<Candidate> {
        self.entries.get(index).copied()
    }

    /// Returns the slot index of the correct entry.
    #[must_use]
    pub fn correct_index(&self) -> Option<usize> {
        self.entries.iter().position(|entry| entry.is_correct())
    }

    /// Returns the value carried by the correct entry.
    #[must_use]
    pub fn correct_value(&self) -> f32 {
        self.entries
            .iter()
            .find(|entry| entry.is_correct())
            .map_or(0.0, |entry| entry.value())
    }
}

/// Position in the presentation layer's coordinate space.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SlotPoint {
    /// Horizontal coordinate in layout units.
    pub x: f32,
    /// Vertical coordinate in layout units.
    pub y: f32,
}

impl SlotPoint {
    /// Creates a point from raw coordinates.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Ordered slot positions forming the swap-puzzle ring.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SlotLayout {
    points: Vec<SlotPoint>,
}

impl SlotLayout {
    /// Wraps an ordered list of slot positions.
    #[must_use]
    pub fn new(points: Vec<SlotPoint>) -> Self {
        Self { points }
    }

    /// Builds an evenly spaced horizontal row, a convenience for hosts.
    #[must_use]
    pub fn row(slot_count: usize, spacing: f32) -> Self {
        let points = (0..slot_count)
            .map(|index| SlotPoint::new(spacing * index as f32, 0.0))
            .collect();
        Self { points }
    }

    /// Returns the ordered slot positions.
    #[must_use]
    pub fn points(&self) -> &[SlotPoint] {
        &self.points
    }

    /// Returns the number of slots in the layout.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Reports whether the layout has no slots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Straight conveyor line between two endpoints.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrackLine {
    start: SlotPoint,
    end: SlotPoint,
    reversed: bool,
}

impl TrackLine {
    /// Creates a line; `reversed` swaps the travel direction.
    #[must_use]
    pub const fn new(start: SlotPoint, end: SlotPoint, reversed: bool) -> Self {
        Self {
            start,
            end,
            reversed,
        }
    }

    /// Returns the endpoint pieces spawn at, honoring the reversed flag.
    #[must_use]
    pub const fn origin(&self) -> SlotPoint {
        if self.reversed {
            self.end
        } else {
            self.start
        }
    }

    /// Returns the endpoint pieces travel toward.
    #[must_use]
    pub const fn destination(&self) -> SlotPoint {
        if self.reversed {
            self.start
        } else {
            self.end
        }
    }

    /// Returns the Euclidean length of the line.
    #[must_use]
    pub fn length(&self) -> f32 {
        let dx = self.end.x - self.start.x;
        let dy = self.end.y - self.start.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Reports whether the line cannot carry pieces.
    ///
    /// Zero-length and non-finite lines leave the playable area
    /// undefined; pieces on such a line expire immediately.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        let length = self.length();
        !length.is_finite() || length <= f32::EPSILON
    }

    /// Returns the point reached after traveling `distance` from the
    /// origin, clamped to the destination.
    #[must_use]
    pub fn point_at(&self, distance: f32) -> SlotPoint {
        let length = self.length();
        if !length.is_finite() || length <= f32::EPSILON {
            return self.destination();
        }
        let t = (distance / length).clamp(0.0, 1.0);
        let origin = self.origin();
        let destination = self.destination();
        SlotPoint::new(
            origin.x + (destination.x - origin.x) * t,
            origin.y + (destination.y - origin.y) * t,
        )
    }
}

/// Puzzle arrangement applied to candidate pieces.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum PuzzleKind {
    /// Candidates sit still; no puzzle controller runs.
    None,
    /// Candidates rotate around fixed slots on a timer.
    Swap,
    /// Candidates ride conveyor lines and recycle through a pool.
    Conveyor,
}

/// Raised when a puzzle controller is driven without usable data.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error, Serialize, Deserialize)]
pub enum PuzzleError {
    /// No destination geometry exists for pieces to travel along.
    #[error("playable area is undefined")]
    UndefinedPlayArea,
    /// A spawn or rotation was requested with no candidate data.
    #[error("no candidate pieces are available")]
    EmptyCandidatePool,
}

/// Tunable parameters fixed when a session is configured.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Measurement family the session drills.
    pub family: MeasurementFamily,
    /// Difficulty tier scaling generated values.
    pub difficulty: DifficultyTier,
    /// Number of candidate slots presented per question.
    pub slot_count: usize,
    /// Puzzle arrangement applied to candidate pieces.
    pub puzzle: PuzzleKind,
    /// Shuffle candidate order after construction.
    pub randomize_order: bool,
    /// Time between swap-puzzle rotations.
    pub swap_interval: Duration,
    /// Time between conveyor spawns.
    pub conveyor_spawn_interval: Duration,
    /// Conveyor piece speed in layout units per second.
    pub conveyor_speed: f32,
    /// Time a target stays alive before expiring.
    pub target_lifetime: Duration,
    /// Health the player starts with.
    pub starting_health: Health,
    /// Points awarded per correct answer.
    pub reward_points: u32,
    /// Health lost per wrong answer or expired target.
    pub miss_penalty: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            family: MeasurementFamily::Length,
            difficulty: DifficultyTier::new(0),
            slot_count: 4,
            puzzle: PuzzleKind::Swap,
            randomize_order: true,
            swap_interval: Duration::from_millis(4000),
            conveyor_spawn_interval: Duration::from_millis(2000),
            conveyor_speed: 120.0,
            target_lifetime: Duration::from_secs(12),
            starting_health: Health::new(3),
            reward_points: 100,
            miss_penalty: 1,
        }
    }
}

/// Reason a `SpawnTarget` command was refused.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error, Serialize, Deserialize)]
pub enum TargetRejection {
    /// The record's units span measurement families.
    #[error("record units do not match the record family")]
    MismatchedFamily,
    /// The record's family differs from the session's configured family.
    #[error("record family does not match the session family")]
    WrongSessionFamily,
    /// The session has already ended.
    #[error("the session is over")]
    SessionOver,
}

/// Reason an `EngageTarget` command was refused.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error, Serialize, Deserialize)]
pub enum EngageRejection {
    /// No target with the requested identifier exists.
    #[error("no such target")]
    UnknownTarget,
    /// Another target is already engaged.
    #[error("a target is already engaged")]
    AlreadyEngaged,
    /// The session has already ended.
    #[error("the session is over")]
    SessionOver,
}

/// Reason a `PresentCandidates` command was refused.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error, Serialize, Deserialize)]
pub enum CandidateRejection {
    /// No target is engaged.
    #[error("no target is engaged")]
    NoEngagedTarget,
    /// The command names a target other than the engaged one.
    #[error("candidates answer a different target")]
    WrongTarget,
    /// The set violates the exactly-one-correct contract.
    #[error("invalid candidate set: {0}")]
    InvalidSet(CandidateError),
    /// The correct entry differs from the engaged question's answer.
    #[error("candidate answer does not match the question")]
    WrongCorrectValue,
}

/// Reason a `SubmitAnswer` command was refused.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error, Serialize, Deserialize)]
pub enum AnswerRejection {
    /// No candidates are on display.
    #[error("no candidates are available")]
    NoCandidates,
    /// The chosen slot index is out of range.
    #[error("choice {0} is out of range")]
    ChoiceOutOfRange(usize),
    /// The session has already ended.
    #[error("the session is over")]
    SessionOver,
}

/// How a target left play.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TargetOutcome {
    /// The player answered correctly.
    Hit,
    /// The player answered incorrectly.
    Missed,
    /// The target's lifetime ran out.
    Expired,
    /// The host released the engagement without judging an answer.
    Abandoned,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Adopts `config` and resets all session state.
    ConfigureSession {
        /// Parameters the session runs under.
        config: SessionConfig,
    },
    /// Advances time by one frame.
    Tick {
        /// Wall-clock time elapsed since the previous tick.
        dt: Duration,
    },
    /// Switches the play phase.
    SetPlayPhase {
        /// Phase the session enters.
        phase: PlayPhase,
    },
    /// Adjusts the slow-motion multiplier applied to target lifetimes.
    SetTimeScale {
        /// Requested multiplier; the world clamps it to a sane range.
        scale: f32,
    },
    /// Adds a falling target carrying `record`.
    SpawnTarget {
        /// Conversion the target challenges the player with.
        record: ConversionRecord,
    },
    /// Selects `target` as the active challenge.
    EngageTarget {
        /// Target the player engages.
        target: TargetId,
    },
    /// Installs the candidate options for the engaged target.
    PresentCandidates {
        /// Target the candidates answer.
        target: TargetId,
        /// Options produced by the candidate builder.
        candidates: CandidateSet,
    },
    /// Submits the player's pick among the displayed candidates.
    SubmitAnswer {
        /// Slot index of the chosen candidate.
        choice: usize,
    },
    /// Releases the engaged target without judging an answer.
    AbandonTarget,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// The session adopted a new configuration.
    SessionConfigured {
        /// Parameters now in force.
        config: SessionConfig,
    },
    /// Time advanced by one frame.
    TimeAdvanced {
        /// Wall-clock frame delta, never scaled by slow motion.
        dt: Duration,
    },
    /// The play phase switched.
    PlayPhaseChanged {
        /// Phase now in force.
        phase: PlayPhase,
    },
    /// The slow-motion multiplier changed.
    TimeScaleChanged {
        /// Multiplier now applied to target lifetimes.
        scale: f32,
    },
    /// A target entered play.
    TargetSpawned {
        /// Identifier assigned to the target.
        target: TargetId,
        /// Conversion the target carries.
        record: ConversionRecord,
    },
    /// A spawn request was refused.
    TargetRejected {
        /// Why the target was refused.
        reason: TargetRejection,
    },
    /// An engaged target's question is ready for display.
    QuestionPosed {
        /// Target the question belongs to.
        target: TargetId,
        /// Fully derived question.
        question: ConversionQuestion,
    },
    /// The engaged target awaits candidate options.
    CandidatesNeeded {
        /// Target awaiting options.
        target: TargetId,
        /// Answer the options must contain, bit for bit.
        correct_value: f32,
        /// Number of slots to fill.
        slot_count: usize,
        /// Shuffle the final order.
        randomize: bool,
    },
    /// Candidate options are on display.
    CandidatesReady {
        /// Target the options answer.
        target: TargetId,
        /// Options now selectable.
        candidates: CandidateSet,
    },
    /// A `PresentCandidates` command was refused.
    CandidatesRejected {
        /// Why the candidates were refused.
        reason: CandidateRejection,
    },
    /// An `EngageTarget` command was refused.
    EngagementRejected {
        /// Why the engagement was refused.
        reason: EngageRejection,
    },
    /// A `SubmitAnswer` command was refused.
    AnswerRejected {
        /// Why the answer was refused.
        reason: AnswerRejection,
    },
    /// The player's pick was judged against the exact correct value.
    AnswerJudged {
        /// Target the answer resolved.
        target: TargetId,
        /// Family the question drilled.
        family: MeasurementFamily,
        /// Whether the pick carried the exact correct value.
        correct: bool,
        /// Value the player picked.
        chosen: f32,
        /// Value the question expected.
        expected: f32,
        /// Signed difference between the pick and the expectation.
        delta: f32,
    },
    /// The score changed.
    ScoreChanged {
        /// Score after the change.
        score: Score,
    },
    /// The player's health changed.
    HealthChanged {
        /// Health after the change.
        health: Health,
    },
    /// A target ran out of time.
    TargetExpired {
        /// Target that expired.
        target: TargetId,
    },
    /// A target left play.
    TargetResolved {
        /// Target that was resolved.
        target: TargetId,
        /// How the target left play.
        outcome: TargetOutcome,
    },
    /// Health reached zero and the session ended.
    SessionEnded {
        /// Score at the end of the session.
        final_score: Score,
    },
}

/// Point-in-time copy of a target used by hosts and systems.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TargetSnapshot {
    /// Identifier of the target.
    pub id: TargetId,
    /// Conversion the target carries.
    pub record: ConversionRecord,
    /// Time left before the target expires.
    pub remaining_lifetime: Duration,
    /// Whether the target is the engaged challenge.
    pub engaged: bool,
}

/// Read-only snapshot describing all live targets.
#[derive(Clone, Debug, Default)]
pub struct TargetView {
    snapshots: Vec<TargetSnapshot>,
}

impl TargetView {
    /// Creates a view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TargetSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in deterministic order.
    #[must_use]
    pub fn iter(&self) -> impl Iterator<Item = &TargetSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TargetSnapshot> {
        self.snapshots
    }
}
