//! Brr Survival headless runner
//!
//! Plays one session with a simple autopilot at a fixed 60 fps frame rate and
//! prints the result. Pass a JSON config path as the first argument to
//! override the defaults.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::error::Error;

    use glam::Vec2;

    use brr_survival::session::Snapshot;
    use brr_survival::sim::{GameEvent, GamePhase, MoveInput, SessionStats};
    use brr_survival::{HighScores, Session, SessionConfig, SessionObserver};

    /// Longest run the autopilot will play (seconds of game time)
    const MAX_RUN_SECS: u32 = 300;
    const FRAME_SECS: f32 = 1.0 / 60.0;

    /// Backs away from the closest enemy, which also points the gun at it.
    /// With no enemy nearby it heads for the closest power-up.
    #[derive(Default)]
    struct Autopilot {
        movement: MoveInput,
        final_stats: Option<SessionStats>,
        kills_logged: u32,
    }

    impl Autopilot {
        fn steer(delta: Vec2) -> MoveInput {
            const DEADZONE: f32 = 4.0;
            MoveInput {
                up: delta.y < -DEADZONE,
                down: delta.y > DEADZONE,
                left: delta.x < -DEADZONE,
                right: delta.x > DEADZONE,
            }
        }
    }

    impl SessionObserver for Autopilot {
        fn on_tick(&mut self, snapshot: &Snapshot<'_>) {
            let me = snapshot.player.pos;
            let nearest = |points: &mut dyn Iterator<Item = Vec2>| {
                points.min_by(|a, b| a.distance_squared(me).total_cmp(&b.distance_squared(me)))
            };

            let threat = nearest(&mut snapshot.enemies.iter().map(|e| e.pos))
                .filter(|pos| pos.distance(me) < 250.0);
            self.movement = match threat {
                Some(enemy) => Self::steer(me - enemy),
                None => nearest(&mut snapshot.powerups.iter().map(|p| p.pos))
                    .map(|p| Self::steer(p - me))
                    .unwrap_or_default(),
            };
        }

        fn on_events(&mut self, events: &[GameEvent]) {
            for event in events {
                match event {
                    GameEvent::EnemyKilled { .. } => self.kills_logged += 1,
                    GameEvent::PowerupCollected { id, buff } => {
                        log::info!("Autopilot grabbed power-up {} ({:?})", id, buff)
                    }
                    _ => {}
                }
            }
        }

        fn on_game_over(&mut self, stats: &SessionStats) {
            self.final_stats = Some(*stats);
        }
    }

    fn load_config() -> Result<SessionConfig, Box<dyn Error>> {
        match std::env::args().nth(1) {
            Some(path) => {
                let json = std::fs::read_to_string(&path)?;
                let config = SessionConfig::from_json(&json)?;
                log::info!("Loaded config from {}", path);
                Ok(config)
            }
            None => Ok(SessionConfig::default()),
        }
    }

    pub fn run() -> Result<(), Box<dyn Error>> {
        env_logger::init();
        log::info!("Brr Survival (headless) starting...");

        let config = load_config()?;
        let mut session = Session::new(config)?;
        let mut pilot = Autopilot::default();
        session.start(None);

        while session.phase() == Some(GamePhase::Running) {
            session.set_movement_input(pilot.movement);
            session.advance(FRAME_SECS, &mut pilot);
            if session.stats().is_some_and(|s| s.time >= MAX_RUN_SECS) {
                log::info!("Autopilot survived {}s, stopping", MAX_RUN_SECS);
                break;
            }
        }

        let stats = pilot
            .final_stats
            .or_else(|| session.stats())
            .unwrap_or_default();
        session.end();

        let mut scores = HighScores::new();
        let rank = scores.add(stats);
        println!(
            "Survived {}s, {} kills ({} seen by observer), {} power-ups",
            stats.time, stats.kills, pilot.kills_logged, stats.powerups
        );
        if let Some(rank) = rank {
            println!("Leaderboard rank {}: {}", rank, scores.to_json()?);
        }
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    native::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The simulation core is embedded by a web host; there is no wasm binary
}
