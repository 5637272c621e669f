//! Host-facing session driver
//!
//! Converts real frame time into fixed simulation ticks, forwards decoded
//! input, and reports each frame (and the end of the run) to an observer.

use glam::Vec2;
use serde::Serialize;

use crate::config::{ConfigError, Playfield, SessionConfig};
use crate::consts::*;
use crate::sim::{
    Bullet, Enemy, Explosion, GameEvent, GamePhase, GameState, MoveInput, Player, Powerup,
    SessionStats, TickInput, tick,
};

/// Read-only view of a session for rendering
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot<'a> {
    pub phase: GamePhase,
    pub stats: SessionStats,
    pub player: &'a Player,
    pub enemies: &'a [Enemy],
    pub bullets: &'a [Bullet],
    pub powerups: &'a [Powerup],
    pub explosions: &'a [Explosion],
    pub fire_rate: f32,
    pub explosion_radius: f32,
}

impl<'a> Snapshot<'a> {
    pub fn of(state: &'a GameState) -> Self {
        Self {
            phase: state.phase,
            stats: state.stats(),
            player: &state.store.player,
            enemies: &state.store.enemies,
            bullets: &state.store.bullets,
            powerups: &state.store.powerups,
            explosions: &state.store.explosions,
            fire_rate: state.effects.fire_rate,
            explosion_radius: state.effects.explosion_radius,
        }
    }
}

/// Callbacks a host implements to follow a session
pub trait SessionObserver {
    /// Called once per host frame with the current state
    fn on_tick(&mut self, _snapshot: &Snapshot<'_>) {}
    /// Called with the events produced during the frame, before `on_tick`
    fn on_events(&mut self, _events: &[GameEvent]) {}
    /// Called exactly once when the player is caught
    fn on_game_over(&mut self, _stats: &SessionStats) {}
}

impl SessionObserver for () {}

/// A single run of the game, driven by the host's frame loop
pub struct Session {
    config: SessionConfig,
    state: Option<GameState>,
    input: TickInput,
    /// Real seconds not yet simulated
    accumulator: f32,
}

impl Session {
    pub fn new(config: SessionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            state: None,
            input: TickInput::default(),
            accumulator: 0.0,
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Begin a new run, discarding any previous one.
    /// `None` (or a non-finite position) starts the player at the center.
    pub fn start(&mut self, player_pos: Option<Vec2>) {
        if let Some(mut old) = self.state.take() {
            old.cancel_timers();
        }

        let field = self.config.playfield;
        let pos = match player_pos {
            Some(pos) if pos.is_finite() => pos,
            Some(pos) => {
                log::warn!("Ignoring non-finite start position {:?}", pos);
                field.center()
            }
            None => field.center(),
        };

        self.state = Some(GameState::new(self.config.seed, field, pos));
        self.input = TickInput::default();
        self.accumulator = 0.0;
        log::info!(
            "Session started: {}x{} playfield, seed {}",
            field.width,
            field.height,
            self.config.seed
        );
    }

    /// Directional input used by every tick until replaced
    pub fn set_movement_input(&mut self, movement: MoveInput) {
        self.input.movement = movement;
    }

    pub fn toggle_pause(&mut self) {
        if let Some(state) = self.state.as_mut() {
            state.toggle_pause();
            self.accumulator = 0.0;
        }
    }

    /// Resize the playfield. Malformed bounds are logged and ignored.
    pub fn set_playfield(&mut self, width: f32, height: f32) {
        match Playfield::new(width, height) {
            Ok(field) => {
                self.config.playfield = field;
                if let Some(state) = self.state.as_mut() {
                    state.playfield = field;
                }
            }
            Err(err) => log::warn!("Ignoring playfield resize: {}", err),
        }
    }

    /// Simulate `real_dt` seconds of host time and notify `observer`.
    /// Returns the number of ticks run.
    pub fn advance(&mut self, real_dt: f32, observer: &mut impl SessionObserver) -> u32 {
        let Some(state) = self.state.as_mut() else {
            return 0;
        };
        if !real_dt.is_finite() || real_dt < 0.0 {
            log::warn!("Ignoring frame time {}", real_dt);
            return 0;
        }

        if state.is_running() {
            self.accumulator += real_dt.min(MAX_FRAME_SECS);
        } else {
            self.accumulator = 0.0;
        }

        let tick_secs = TICK_MS as f32 / 1000.0;
        let mut substeps = 0;
        while self.accumulator >= tick_secs && substeps < self.config.max_substeps {
            tick(state, &self.input, TICK_MS);
            self.accumulator -= tick_secs;
            substeps += 1;

            if !state.is_running() {
                self.accumulator = 0.0;
                break;
            }
        }

        let events = state.drain_events();
        if !events.is_empty() {
            observer.on_events(&events);
        }
        for event in &events {
            if let GameEvent::GameOver(stats) = event {
                observer.on_game_over(stats);
            }
        }
        observer.on_tick(&Snapshot::of(state));

        substeps
    }

    /// Tear the session down: cancel every timer and stop ticking
    pub fn end(&mut self) {
        if let Some(mut state) = self.state.take() {
            state.cancel_timers();
            log::info!("Session ended at {}s", state.clock.game_secs());
        }
    }

    pub fn phase(&self) -> Option<GamePhase> {
        self.state.as_ref().map(|s| s.phase)
    }

    pub fn stats(&self) -> Option<SessionStats> {
        self.state.as_ref().map(GameState::stats)
    }

    pub fn snapshot(&self) -> Option<Snapshot<'_>> {
        self.state.as_ref().map(Snapshot::of)
    }
}
