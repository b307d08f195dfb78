use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use unitfall_core::{CandidateSet, Command, Event};
use unitfall_world::{query, World};

/// Scripted player driving a headless session.
///
/// The player engages the oldest live target, ponders a queued answer
/// for a fixed number of ticks and then picks the correct candidate
/// with the configured hit rate. All choices flow from a seeded stream,
/// so identical seeds replay identical sessions.
#[derive(Debug)]
pub(crate) struct ScriptedPlayer {
    rng: ChaCha8Rng,
    accuracy: u32,
    think_ticks: u32,
    pending: Option<PendingAnswer>,
    engage_pending: bool,
}

#[derive(Debug)]
struct PendingAnswer {
    choice: usize,
    ticks_left: u32,
}

impl ScriptedPlayer {
    /// Creates a player answering correctly `accuracy` percent of the time.
    #[must_use]
    pub(crate) fn new(seed: u64, accuracy: u32, think_ticks: u32) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            accuracy: accuracy.min(100),
            think_ticks,
            pending: None,
            engage_pending: false,
        }
    }

    /// Counts down the think delay and emits the queued answer once it
    /// expires. Called once at the start of every tick.
    pub(crate) fn poll(&mut self, out: &mut Vec<Command>) {
        if let Some(pending) = &mut self.pending {
            if pending.ticks_left == 0 {
                out.push(Command::SubmitAnswer {
                    choice: pending.choice,
                });
                self.pending = None;
            } else {
                pending.ticks_left -= 1;
            }
        }
    }

    /// Consumes events and the world view to emit play commands.
    pub(crate) fn handle(&mut self, events: &[Event], world: &World, out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::TargetSpawned { .. } => self.engage_next(world, out),
                Event::CandidatesReady { candidates, .. } => {
                    let choice = self.choose(candidates);
                    self.pending = Some(PendingAnswer {
                        choice,
                        ticks_left: self.think_ticks,
                    });
                }
                Event::TargetResolved { .. } => {
                    self.pending = None;
                    self.engage_pending = false;
                    self.engage_next(world, out);
                }
                Event::EngagementRejected { .. } => self.engage_pending = false,
                Event::SessionEnded { .. } => {
                    self.pending = None;
                    self.engage_pending = false;
                }
                _ => {}
            }
        }
    }

    fn engage_next(&mut self, world: &World, out: &mut Vec<Command>) {
        if self.engage_pending || query::engaged_target(world).is_some() {
            return;
        }
        let view = query::target_view(world);
        let Some(snapshot) = view.iter().next() else {
            return;
        };
        self.engage_pending = true;
        out.push(Command::EngageTarget {
            target: snapshot.id,
        });
    }

    fn choose(&mut self, candidates: &CandidateSet) -> usize {
        let correct = candidates.correct_index().unwrap_or(0);
        let roll = self.rng.gen_range(0..100_u32);
        if roll < self.accuracy || candidates.len() < 2 {
            correct
        } else {
            (correct + 1) % candidates.len()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use unitfall_core::{MeasurementFamily, SessionConfig, Unit};
    use unitfall_world::apply;

    fn playing_world() -> World {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::ConfigureSession {
                config: SessionConfig::default(),
            },
            &mut events,
        );
        world
    }

    fn spawn_target(world: &mut World) -> Vec<Event> {
        let record = unitfall_core::ConversionRecord::new(
            MeasurementFamily::Length,
            Unit::Inch,
            Unit::Foot,
            12.0,
        )
        .expect("length record is valid");
        let mut events = Vec::new();
        apply(world, Command::SpawnTarget { record }, &mut events);
        events
    }

    #[test]
    fn spawned_targets_are_engaged() {
        let mut world = playing_world();
        let events = spawn_target(&mut world);

        let mut player = ScriptedPlayer::new(1, 100, 0);
        let mut commands = Vec::new();
        player.handle(&events, &world, &mut commands);

        assert!(matches!(
            commands.as_slice(),
            [Command::EngageTarget { .. }]
        ));
    }

    #[test]
    fn one_engagement_is_issued_per_batch() {
        let mut world = playing_world();
        let mut events = spawn_target(&mut world);
        events.extend(spawn_target(&mut world));

        let mut player = ScriptedPlayer::new(1, 100, 0);
        let mut commands = Vec::new();
        player.handle(&events, &world, &mut commands);

        assert_eq!(commands.len(), 1);
    }

    #[test]
    fn perfect_accuracy_always_picks_the_correct_slot() {
        let world = playing_world();
        let set = CandidateSet::new(vec![
            unitfall_core::Candidate::new(3.0, false),
            unitfall_core::Candidate::new(1.0, true),
            unitfall_core::Candidate::new(4.0, false),
        ])
        .expect("set is valid");

        let mut player = ScriptedPlayer::new(5, 100, 0);
        for _ in 0..16 {
            let events = vec![Event::CandidatesReady {
                target: unitfall_core::TargetId::new(0),
                candidates: set.clone(),
            }];
            let mut commands = Vec::new();
            player.handle(&events, &world, &mut commands);
            player.poll(&mut commands);
            assert!(commands
                .iter()
                .any(|command| matches!(command, Command::SubmitAnswer { choice: 1 })));
        }
    }

    #[test]
    fn zero_accuracy_never_picks_the_correct_slot() {
        let world = playing_world();
        let set = CandidateSet::new(vec![
            unitfall_core::Candidate::new(3.0, false),
            unitfall_core::Candidate::new(1.0, true),
            unitfall_core::Candidate::new(4.0, false),
        ])
        .expect("set is valid");

        let mut player = ScriptedPlayer::new(5, 0, 0);
        for _ in 0..16 {
            let events = vec![Event::CandidatesReady {
                target: unitfall_core::TargetId::new(0),
                candidates: set.clone(),
            }];
            let mut commands = Vec::new();
            player.handle(&events, &world, &mut commands);
            player.poll(&mut commands);
            assert!(commands
                .iter()
                .all(|command| !matches!(command, Command::SubmitAnswer { choice: 1 })));
        }
    }

    #[test]
    fn answers_wait_out_the_think_delay() {
        let world = playing_world();
        let set = CandidateSet::solo(1.0);
        let events = vec![Event::CandidatesReady {
            target: unitfall_core::TargetId::new(0),
            candidates: set,
        }];

        let mut player = ScriptedPlayer::new(2, 100, 2);
        let mut commands = Vec::new();
        player.handle(&events, &world, &mut commands);
        assert!(commands.is_empty());

        player.poll(&mut commands);
        assert!(commands.is_empty());
        player.poll(&mut commands);
        assert!(commands.is_empty());
        player.poll(&mut commands);
        assert_eq!(commands.len(), 1);
    }

    #[test]
    fn identical_seeds_replay_identical_choices() {
        let world = playing_world();
        let set = CandidateSet::new(vec![
            unitfall_core::Candidate::new(3.0, false),
            unitfall_core::Candidate::new(1.0, true),
            unitfall_core::Candidate::new(4.0, false),
            unitfall_core::Candidate::new(2.0, false),
        ])
        .expect("set is valid");

        let run = |seed: u64| -> Vec<usize> {
            let mut player = ScriptedPlayer::new(seed, 50, 0);
            let mut choices = Vec::new();
            for _ in 0..32 {
                let events = vec![Event::CandidatesReady {
                    target: unitfall_core::TargetId::new(0),
                    candidates: set.clone(),
                }];
                let mut commands = Vec::new();
                player.handle(&events, &world, &mut commands);
                player.poll(&mut commands);
                for command in commands {
                    if let Command::SubmitAnswer { choice } = command {
                        choices.push(choice);
                    }
                }
            }
            choices
        };

        assert_eq!(run(77), run(77));
        assert_ne!(run(77), run(78));
    }

    #[test]
    fn engagements_resume_after_resolution() {
        let mut world = playing_world();
        let events = spawn_target(&mut world);
        let mut player = ScriptedPlayer::new(9, 100, 0);
        let mut commands = Vec::new();
        player.handle(&events, &world, &mut commands);
        assert_eq!(commands.len(), 1);

        // A second spawn while an engagement is pending stays untouched.
        let more = spawn_target(&mut world);
        commands.clear();
        player.handle(&more, &world, &mut commands);
        assert!(commands.is_empty());

        // Resolution frees the player to engage the remaining target.
        let resolved = vec![Event::TargetResolved {
            target: unitfall_core::TargetId::new(0),
            outcome: unitfall_core::TargetOutcome::Hit,
        }];
        commands.clear();
        player.handle(&resolved, &world, &mut commands);
        assert_eq!(commands.len(), 1);
    }
}
