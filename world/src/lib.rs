#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative session state management for Unitfall.
//!
//! The world owns every piece of state a conversion session accumulates:
//! falling targets and the questions they carry, the engaged challenge and
//! its candidate options, score, health, play phase, and the slow-motion
//! multiplier. Mutation happens exclusively through [`apply`], which
//! executes one [`Command`] and appends the resulting [`Event`] values for
//! systems to react to.

mod targets;

use std::time::Duration;

use targets::TargetRegistry;
use unitfall_core::{
    units, AnswerRejection, CandidateRejection, CandidateSet, Command, ConversionQuestion,
    EngageRejection, Event, Health, PlayPhase, Score, SessionConfig, TargetId, TargetOutcome,
    TargetRejection, MAX_SLOT_COUNT, WELCOME_BANNER,
};

const MAX_TIME_SCALE: f32 = 4.0;

/// Represents the authoritative Unitfall session state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    config: SessionConfig,
    play_phase: PlayPhase,
    time_scale: f32,
    targets: TargetRegistry,
    engaged: Option<TargetId>,
    candidates: Option<CandidateSet>,
    score: Score,
    health: Health,
    session_over: bool,
    tick_index: u64,
}

impl World {
    /// Creates a new session running under the default configuration.
    #[must_use]
    pub fn new() -> Self {
        let config = SessionConfig::default();
        let health = config.starting_health;
        Self {
            banner: WELCOME_BANNER,
            config,
            play_phase: PlayPhase::Playing,
            time_scale: 1.0,
            targets: TargetRegistry::new(),
            engaged: None,
            candidates: None,
            score: Score::new(0),
            health,
            session_over: false,
            tick_index: 0,
        }
    }

    fn scaled(&self, dt: Duration) -> Duration {
        // time_scale is clamped to [0, MAX_TIME_SCALE] on assignment.
        dt.mul_f32(self.time_scale)
    }

    fn clear_engagement(&mut self, target: TargetId) {
        if self.engaged == Some(target) {
            self.engaged = None;
            self.candidates = None;
        }
    }

    fn end_session_if_depleted(&mut self, out_events: &mut Vec<Event>) {
        if self.health.is_depleted() && !self.session_over {
            self.session_over = true;
            out_events.push(Event::SessionEnded {
                final_score: self.score,
            });
        }
    }

    fn expire_overdue_targets(&mut self, elapsed: Duration, out_events: &mut Vec<Event>) {
        if elapsed.is_zero() {
            return;
        }
        let mut expired: Vec<TargetId> = Vec::new();
        for state in self.targets.iter_mut() {
            state.remaining_lifetime = state.remaining_lifetime.saturating_sub(elapsed);
            if state.remaining_lifetime.is_zero() {
                expired.push(state.id);
            }
        }
        for target in expired {
            let _ = self.targets.remove(target);
            self.clear_engagement(target);
            self.health = self.health.damaged(self.config.miss_penalty);
            out_events.push(Event::TargetExpired { target });
            out_events.push(Event::HealthChanged {
                health: self.health,
            });
            out_events.push(Event::TargetResolved {
                target,
                outcome: TargetOutcome::Expired,
            });
        }
        self.end_session_if_depleted(out_events);
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureSession { config } => {
            let mut config = config;
            config.slot_count = config.slot_count.clamp(1, MAX_SLOT_COUNT);
            world.health = config.starting_health;
            world.score = Score::new(0);
            world.targets = TargetRegistry::new();
            world.engaged = None;
            world.candidates = None;
            world.session_over = config.starting_health.is_depleted();
            world.time_scale = 1.0;
            world.tick_index = 0;
            world.config = config.clone();
            out_events.push(Event::SessionConfigured { config });
        }
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            out_events.push(Event::TimeAdvanced { dt });
            if world.play_phase == PlayPhase::Playing && !world.session_over {
                let elapsed = world.scaled(dt);
                world.expire_overdue_targets(elapsed, out_events);
            }
        }
        Command::SetPlayPhase { phase } => {
            if world.play_phase != phase {
                world.play_phase = phase;
                out_events.push(Event::PlayPhaseChanged { phase });
            }
        }
        Command::SetTimeScale { scale } => {
            let clamped = if scale.is_finite() {
                scale.clamp(0.0, MAX_TIME_SCALE)
            } else {
                1.0
            };
            if clamped != world.time_scale {
                world.time_scale = clamped;
                out_events.push(Event::TimeScaleChanged { scale: clamped });
            }
        }
        Command::SpawnTarget { record } => {
            if world.session_over {
                out_events.push(Event::TargetRejected {
                    reason: TargetRejection::SessionOver,
                });
                return;
            }
            let conversion = units::try_convert(
                record.input_value(),
                record.family(),
                record.input_unit(),
                record.output_unit(),
            );
            if conversion.is_err() {
                out_events.push(Event::TargetRejected {
                    reason: TargetRejection::MismatchedFamily,
                });
                return;
            }
            if record.family() != world.config.family {
                out_events.push(Event::TargetRejected {
                    reason: TargetRejection::WrongSessionFamily,
                });
                return;
            }
            let question = ConversionQuestion::derive(record);
            let target = world
                .targets
                .insert(record, question.clone(), world.config.target_lifetime);
            out_events.push(Event::TargetSpawned { target, record });
            out_events.push(Event::QuestionPosed { target, question });
        }
        Command::EngageTarget { target } => {
            if world.session_over {
                out_events.push(Event::EngagementRejected {
                    reason: EngageRejection::SessionOver,
                });
                return;
            }
            if world.engaged == Some(target) {
                out_events.push(Event::EngagementRejected {
                    reason: EngageRejection::AlreadyEngaged,
                });
                return;
            }
            let Some(state) = world.targets.get(target) else {
                out_events.push(Event::EngagementRejected {
                    reason: EngageRejection::UnknownTarget,
                });
                return;
            };
            let correct_value = state.question.correct_value();
            world.engaged = Some(target);
            world.candidates = None;
            out_events.push(Event::CandidatesNeeded {
                target,
                correct_value,
                slot_count: world.config.slot_count,
                randomize: world.config.randomize_order,
            });
        }
        Command::PresentCandidates { target, candidates } => {
            let Some(engaged) = world.engaged else {
                out_events.push(Event::CandidatesRejected {
                    reason: CandidateRejection::NoEngagedTarget,
                });
                return;
            };
            if engaged != target {
                out_events.push(Event::CandidatesRejected {
                    reason: CandidateRejection::WrongTarget,
                });
                return;
            }
            // Re-validate on arrival: sets may come from deserialized hosts.
            let validated = match CandidateSet::new(candidates.entries().to_vec()) {
                Ok(validated) => validated,
                Err(error) => {
                    out_events.push(Event::CandidatesRejected {
                        reason: CandidateRejection::InvalidSet(error),
                    });
                    return;
                }
            };
            let Some(state) = world.targets.get(target) else {
                out_events.push(Event::CandidatesRejected {
                    reason: CandidateRejection::NoEngagedTarget,
                });
                return;
            };
            if validated.correct_value() != state.question.correct_value() {
                out_events.push(Event::CandidatesRejected {
                    reason: CandidateRejection::WrongCorrectValue,
                });
                return;
            }
            world.candidates = Some(validated.clone());
            out_events.push(Event::CandidatesReady {
                target,
                candidates: validated,
            });
        }
        Command::SubmitAnswer { choice } => {
            if world.session_over {
                out_events.push(Event::AnswerRejected {
                    reason: AnswerRejection::SessionOver,
                });
                return;
            }
            let (Some(target), Some(candidates)) = (world.engaged, world.candidates.as_ref())
            else {
                out_events.push(Event::AnswerRejected {
                    reason: AnswerRejection::NoCandidates,
                });
                return;
            };
            let Some(candidate) = candidates.get(choice) else {
                out_events.push(Event::AnswerRejected {
                    reason: AnswerRejection::ChoiceOutOfRange(choice),
                });
                return;
            };
            let Some(state) = world.targets.remove(target) else {
                out_events.push(Event::AnswerRejected {
                    reason: AnswerRejection::NoCandidates,
                });
                return;
            };
            world.engaged = None;
            world.candidates = None;

            let chosen = candidate.value();
            let expected = state.question.correct_value();
            // Exact comparison: both values travel the same arithmetic path.
            let correct = chosen == expected;
            out_events.push(Event::AnswerJudged {
                target,
                family: state.record.family(),
                correct,
                chosen,
                expected,
                delta: chosen - expected,
            });
            if correct {
                world.score = world.score.rewarded(world.config.reward_points);
                out_events.push(Event::ScoreChanged {
                    score: world.score,
                });
                out_events.push(Event::TargetResolved {
                    target,
                    outcome: TargetOutcome::Hit,
                });
            } else {
                world.health = world.health.damaged(world.config.miss_penalty);
                out_events.push(Event::HealthChanged {
                    health: world.health,
                });
                out_events.push(Event::TargetResolved {
                    target,
                    outcome: TargetOutcome::Missed,
                });
                world.end_session_if_depleted(out_events);
            }
        }
        Command::AbandonTarget => {
            if let Some(target) = world.engaged.take() {
                world.candidates = None;
                let _ = world.targets.remove(target);
                out_events.push(Event::TargetResolved {
                    target,
                    outcome: TargetOutcome::Abandoned,
                });
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::World;
    use unitfall_core::{
        CandidateSet, ConversionQuestion, Health, PlayPhase, Score, SessionConfig, TargetId,
        TargetSnapshot, TargetView,
    };

    /// Retrieves the welcome banner that hosts may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Provides read-only access to the session configuration.
    #[must_use]
    pub fn session_config(world: &World) -> &SessionConfig {
        &world.config
    }

    /// Reports the phase the session is currently in.
    #[must_use]
    pub fn play_phase(world: &World) -> PlayPhase {
        world.play_phase
    }

    /// Reports the slow-motion multiplier applied to target lifetimes.
    #[must_use]
    pub fn time_scale(world: &World) -> f32 {
        world.time_scale
    }

    /// Captures a read-only view of the live targets.
    #[must_use]
    pub fn target_view(world: &World) -> TargetView {
        let snapshots: Vec<TargetSnapshot> = world
            .targets
            .iter()
            .map(|state| TargetSnapshot {
                id: state.id,
                record: state.record,
                remaining_lifetime: state.remaining_lifetime,
                engaged: world.engaged == Some(state.id),
            })
            .collect();
        TargetView::from_snapshots(snapshots)
    }

    /// Reports how many targets are currently in play.
    #[must_use]
    pub fn target_count(world: &World) -> usize {
        world.targets.len()
    }

    /// Returns the identifier of the engaged target, if any.
    #[must_use]
    pub fn engaged_target(world: &World) -> Option<TargetId> {
        world.engaged
    }

    /// Returns the question posed by the engaged target.
    #[must_use]
    pub fn engaged_question(world: &World) -> Option<&ConversionQuestion> {
        let engaged = world.engaged?;
        world.targets.get(engaged).map(|state| &state.question)
    }

    /// Returns the candidate options currently on display.
    #[must_use]
    pub fn displayed_candidates(world: &World) -> Option<&CandidateSet> {
        world.candidates.as_ref()
    }

    /// Reports the accumulated score.
    #[must_use]
    pub fn score(world: &World) -> Score {
        world.score
    }

    /// Reports the player's remaining health.
    #[must_use]
    pub fn health(world: &World) -> Health {
        world.health
    }

    /// Reports whether health has run out and the session has ended.
    #[must_use]
    pub fn session_over(world: &World) -> bool {
        world.session_over
    }

    /// Index of the current tick, advancing once per `Tick` command.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }
}
