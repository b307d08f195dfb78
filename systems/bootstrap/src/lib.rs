#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure bootstrap system that prepares a Unitfall session.
//!
//! Construction stages a configuration; activation applies it to the
//! world exactly once before the first tick. Hosts that re-run their
//! setup path get a no-op instead of a session reset.

use unitfall_core::{Command, Event, SessionConfig};
use unitfall_world::{apply, query, World};

/// Two-phase initializer for a configured session.
#[derive(Debug)]
pub struct Bootstrap {
    config: SessionConfig,
    activated: bool,
}

impl Bootstrap {
    /// Stages `config` for activation.
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            activated: false,
        }
    }

    /// Applies the staged configuration to `world` exactly once.
    pub fn activate(&mut self, world: &mut World, out_events: &mut Vec<Event>) {
        if self.activated {
            return;
        }
        self.activated = true;
        apply(
            world,
            Command::ConfigureSession {
                config: self.config.clone(),
            },
            out_events,
        );
    }

    /// Reports whether activation has already run.
    #[must_use]
    pub fn is_activated(&self) -> bool {
        self.activated
    }

    /// Derives the banner that should be shown when the session starts.
    #[must_use]
    pub fn welcome_banner(&self, world: &World) -> &'static str {
        query::welcome_banner(world)
    }

    /// Exposes the configuration the session runs under.
    #[must_use]
    pub fn session_config<'world>(&self, world: &'world World) -> &'world SessionConfig {
        query::session_config(world)
    }
}
