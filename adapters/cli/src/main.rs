#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs headless Unitfall sessions.
//!
//! The host owns the frame loop: it ticks the world on a fixed cadence,
//! routes emitted events through the question, candidate and puzzle
//! systems, feeds their commands back until the frame is quiescent and
//! prints a transcript of everything the player would have seen.

mod autoplay;
mod challenge_code;
mod session_file;

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use unitfall_core::{
    units, CandidateSet, Command, DifficultyTier, Event, PuzzleKind, SessionConfig, SlotLayout,
    SlotPoint, TrackLine,
};
use unitfall_system_bootstrap::Bootstrap;
use unitfall_system_candidates::CandidateGeneration;
use unitfall_system_conveyor_puzzle::ConveyorPuzzle;
use unitfall_system_progression::Progression;
use unitfall_system_question::{Config as QuestionConfig, QuestionGeneration};
use unitfall_system_swap_puzzle::SwapPuzzle;
use unitfall_world::{apply, query, World};

use crate::autoplay::ScriptedPlayer;
use crate::challenge_code::ChallengeCode;

/// Wall-clock delta fed to the world on every simulated frame.
const TICK_DT: Duration = Duration::from_millis(250);
/// Cadence at which new questions drop into the session.
const QUESTION_INTERVAL: Duration = Duration::from_secs(2);
/// Ticks the scripted player ponders before submitting an answer.
const THINK_TICKS: u32 = 6;
/// Horizontal spacing between candidate slots in layout units.
const SLOT_SPACING: f32 = 96.0;
/// Length of the conveyor lines candidates ride along.
const CONVEYOR_LENGTH: f32 = 480.0;

/// Command-line arguments selecting the session to run.
#[derive(Debug, Parser)]
#[command(name = "unitfall", about = "Run headless Unitfall conversion sessions")]
struct Cli {
    /// Seed for every deterministic stream in the session.
    #[arg(long)]
    seed: Option<u64>,
    /// Measurement family to drill: length, weight, time or capacity.
    #[arg(long)]
    family: Option<String>,
    /// Difficulty tier scaling generated values.
    #[arg(long)]
    difficulty: Option<u32>,
    /// Number of candidate slots presented per question.
    #[arg(long)]
    slots: Option<usize>,
    /// Puzzle arrangement: none, swap or conveyor.
    #[arg(long)]
    puzzle: Option<String>,
    /// Number of frames to simulate.
    #[arg(long, default_value_t = 120)]
    ticks: u32,
    /// Shuffle candidate order after construction.
    #[arg(long)]
    randomize: Option<bool>,
    /// Percentage of answers the scripted player gets right.
    #[arg(long, default_value_t = 100)]
    accuracy: u32,
    /// TOML session file applied over a decoded challenge code.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Challenge code fixing the seed and configuration.
    #[arg(long)]
    challenge: Option<String>,
    /// Print the session's challenge code instead of playing it.
    #[arg(long)]
    emit_challenge: bool,
}

/// Entry point for the Unitfall command-line interface.
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .init();

    let cli = Cli::parse();
    let (seed, config) = resolve_session(&cli)?;

    if cli.emit_challenge {
        let challenge = ChallengeCode { seed, config };
        println!("{}", challenge.encode());
        return Ok(());
    }

    run_session(seed, config, cli.ticks, cli.accuracy);
    Ok(())
}

/// Folds the challenge code, the session file and individual flags into
/// one configuration. Later sources win: defaults, then `--challenge`,
/// then `--config`, then explicit flags.
fn resolve_session(cli: &Cli) -> Result<(u64, SessionConfig)> {
    let mut seed = 0;
    let mut config = SessionConfig::default();

    if let Some(code) = &cli.challenge {
        let challenge = ChallengeCode::decode(code).context("failed to decode challenge code")?;
        seed = challenge.seed;
        config = challenge.config;
    }

    if let Some(path) = &cli.config {
        let overrides = session_file::load_session(path)?;
        if let Some(file_seed) = overrides.seed {
            seed = file_seed;
        }
        overrides.apply_to(&mut config);
    }

    if let Some(flag_seed) = cli.seed {
        seed = flag_seed;
    }
    if let Some(name) = &cli.family {
        config.family = session_file::parse_family(name)?;
    }
    if let Some(tier) = cli.difficulty {
        config.difficulty = DifficultyTier::new(tier);
    }
    if let Some(slots) = cli.slots {
        config.slot_count = slots;
    }
    if let Some(name) = &cli.puzzle {
        config.puzzle = session_file::parse_puzzle(name)?;
    }
    if let Some(randomize) = cli.randomize {
        config.randomize_order = randomize;
    }

    Ok((seed, config))
}

fn run_session(seed: u64, config: SessionConfig, ticks: u32, accuracy: u32) {
    let mut world = World::new();
    let mut events: Vec<Event> = Vec::new();

    let mut bootstrap = Bootstrap::new(config);
    bootstrap.activate(&mut world, &mut events);
    println!("{}", bootstrap.welcome_banner(&world));

    // The world clamps out-of-range settings; report what actually runs.
    let session = query::session_config(&world).clone();
    println!(
        "session: family={} difficulty={} slots={} puzzle={} seed={seed}",
        session.family.label(),
        session.difficulty.get(),
        session.slot_count,
        puzzle_name(session.puzzle),
    );

    let mut question = QuestionGeneration::new(QuestionConfig::new(
        session.family,
        session.difficulty,
        QUESTION_INTERVAL,
        seed,
    ));
    let mut candidates = CandidateGeneration::new(seed);
    let mut player = ScriptedPlayer::new(seed, accuracy, THINK_TICKS);
    let mut progression = Progression::default();

    let mut swap = SwapPuzzle::new(session.swap_interval);
    let mut conveyor =
        ConveyorPuzzle::new(session.conveyor_spawn_interval, session.conveyor_speed);
    let layout = SlotLayout::row(session.slot_count, SLOT_SPACING);
    let lines = conveyor_lines();

    for tick in 0..ticks {
        events.clear();
        apply(&mut world, Command::Tick { dt: TICK_DT }, &mut events);

        let mut commands: Vec<Command> = Vec::new();
        let unlocked = progression.unlocked_units(session.family);
        question.handle(&events, query::play_phase(&world), &unlocked, &mut commands);
        player.handle(&events, &world, &mut commands);
        player.poll(&mut commands);

        // Feed emitted commands back until the frame settles.
        while !commands.is_empty() {
            let batch: Vec<Command> = commands.drain(..).collect();
            let mut produced = Vec::new();
            for command in batch {
                apply(&mut world, command, &mut produced);
            }
            candidates.handle(&produced, &mut commands);
            player.handle(&produced, &world, &mut commands);
            events.extend(produced);
        }

        // Timers charge the state that existed before this frame's
        // candidates appeared, so the controllers run first.
        match session.puzzle {
            PuzzleKind::Swap => swap.handle(&events, query::play_phase(&world)),
            PuzzleKind::Conveyor => conveyor.handle(&events),
            PuzzleKind::None => {}
        }
        for event in &events {
            match event {
                Event::CandidatesReady {
                    candidates: set, ..
                } => match session.puzzle {
                    PuzzleKind::Swap => {
                        swap.initialize(set, &layout);
                        swap.start();
                    }
                    PuzzleKind::Conveyor => {
                        conveyor.initialize(set, &lines);
                        conveyor.start();
                    }
                    PuzzleKind::None => {}
                },
                Event::TargetResolved { .. } => match session.puzzle {
                    PuzzleKind::Swap => swap.end(),
                    PuzzleKind::Conveyor => conveyor.destroy_all(),
                    PuzzleKind::None => {}
                },
                _ => {}
            }
        }

        progression.handle(&events);
        print_transcript(tick, &events);

        if query::session_over(&world) {
            break;
        }
    }

    print_summary(&world, &progression);
}

/// Two parallel belts, the second running in the opposite direction.
fn conveyor_lines() -> Vec<TrackLine> {
    vec![
        TrackLine::new(
            SlotPoint::new(0.0, 0.0),
            SlotPoint::new(CONVEYOR_LENGTH, 0.0),
            false,
        ),
        TrackLine::new(
            SlotPoint::new(0.0, SLOT_SPACING),
            SlotPoint::new(CONVEYOR_LENGTH, SLOT_SPACING),
            true,
        ),
    ]
}

const fn puzzle_name(puzzle: PuzzleKind) -> &'static str {
    match puzzle {
        PuzzleKind::None => "none",
        PuzzleKind::Swap => "swap",
        PuzzleKind::Conveyor => "conveyor",
    }
}

fn option_line(candidates: &CandidateSet) -> String {
    candidates
        .entries()
        .iter()
        .enumerate()
        .map(|(slot, entry)| format!("[{}] {}", slot + 1, entry.display_text()))
        .collect::<Vec<_>>()
        .join("  ")
}

fn print_transcript(tick: u32, events: &[Event]) {
    for event in events {
        match event {
            Event::TargetSpawned { target, record } => {
                println!(
                    "[t {tick:>3}] target #{} falls: {}",
                    target.get(),
                    record.display_text()
                );
            }
            Event::CandidatesReady { candidates, .. } => {
                println!("[t {tick:>3}] options: {}", option_line(candidates));
            }
            Event::AnswerJudged {
                target,
                correct,
                chosen,
                expected,
                delta,
                ..
            } => {
                if *correct {
                    println!(
                        "[t {tick:>3}] hit target #{}: {}",
                        target.get(),
                        units::format_value(*chosen)
                    );
                } else {
                    println!(
                        "[t {tick:>3}] miss target #{}: picked {}, expected {} (off by {})",
                        target.get(),
                        units::format_value(*chosen),
                        units::format_value(*expected),
                        units::format_value(delta.abs()),
                    );
                }
            }
            Event::TargetExpired { target } => {
                println!("[t {tick:>3}] target #{} expired", target.get());
            }
            Event::ScoreChanged { score } => {
                println!("[t {tick:>3}] score: {}", score.get());
            }
            Event::HealthChanged { health } => {
                println!("[t {tick:>3}] health: {}", health.get());
            }
            Event::SessionEnded { final_score } => {
                println!(
                    "[t {tick:>3}] session over: final score {}",
                    final_score.get()
                );
            }
            _ => {}
        }
    }
}

fn print_summary(world: &World, progression: &Progression) {
    println!(
        "final: score {} health {} targets left {}",
        query::score(world).get(),
        query::health(world).get(),
        query::target_count(world),
    );
    for row in progression.report().rows() {
        if row.attempts == 0 {
            continue;
        }
        let groups = row
            .unlocked_groups
            .iter()
            .map(|group| group.label())
            .collect::<Vec<_>>()
            .join(", ");
        println!(
            "progress {}: {}/{} hits, best streak {}, unlocked: {}",
            row.family.label(),
            row.hits,
            row.attempts,
            row.best_streak,
            groups,
        );
    }
}
