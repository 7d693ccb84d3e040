//! Per-frame simulation step and keyboard commands
//!
//! The host calls [`tick`] once per animation frame and [`apply_command`]
//! synchronously from its key handler. Both run on the same thread, so a
//! command is always fully applied before the next frame.

use super::particles::{add_burst, step_particles};
use super::physics::collision_detect;
use super::state::{Direction, GameEvent, GamePhase, GameState};

/// A keyboard command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Step the evil circle
    Move(Direction),
    /// Running <-> Paused
    TogglePause,
    /// Start a fresh session from any state
    Restart,
}

impl Command {
    /// Map a `KeyboardEvent.key` value to a command
    ///
    /// Movement keys match exactly; pause and restart ignore case.
    pub fn from_key(key: &str) -> Option<Self> {
        let cmd = match key {
            "a" | "ArrowLeft" => Command::Move(Direction::Left),
            "d" | "ArrowRight" => Command::Move(Direction::Right),
            "w" | "ArrowUp" => Command::Move(Direction::Up),
            "s" | "ArrowDown" => Command::Move(Direction::Down),
            k if k.eq_ignore_ascii_case("p") => Command::TogglePause,
            k if k.eq_ignore_ascii_case("r") => Command::Restart,
            _ => return None,
        };
        Some(cmd)
    }
}

/// Apply a command immediately
///
/// Movement works in every phase; the circle is re-clamped on the next tick.
pub fn apply_command(state: &mut GameState, cmd: Command, now: f64) {
    match cmd {
        Command::Move(dir) => state.evil.step_toward(dir),
        Command::TogglePause => {
            state.phase = match state.phase {
                GamePhase::Running => GamePhase::Paused,
                GamePhase::Paused => GamePhase::Running,
                GamePhase::GameOver => GamePhase::GameOver,
            };
            log::debug!("Phase now {:?}", state.phase);
        }
        Command::Restart => {
            state.restart(now);
            log::info!("Game restarted with {} balls", state.ball_count);
        }
    }
}

/// Advance the game by one frame
///
/// Order: particles, then (when running) each live ball's update followed by
/// its collision pass, then evil-circle bounds, then (when running) eating.
pub fn tick(state: &mut GameState, now: f64) {
    // Particles animate in every phase
    step_particles(&mut state.particles);

    let (width, height) = (state.width, state.height);
    let running = state.phase == GamePhase::Running;

    if running {
        for i in 0..state.balls.len() {
            if !state.balls[i].exists {
                continue;
            }
            state.balls[i].update(width, height, &mut state.events);
            collision_detect(&mut state.balls, i, &mut state.rng);
        }
    }

    state.evil.check_bounds(width, height);

    if running {
        eat_overlapping(state, now);
    }
}

fn eat_overlapping(state: &mut GameState, now: f64) {
    let GameState {
        balls,
        particles,
        evil,
        tint,
        alive,
        eaten,
        phase,
        finish_time,
        events,
        rng,
        fx_rng,
        ..
    } = state;
    let center = evil.pos;

    let count = evil.collision_detect(balls, rng, events, |balls| {
        *alive = alive.saturating_sub(1);
        *eaten += 1;

        // Tint follows the first survivor; kept as-is once none remain
        if let Some(survivor) = balls.iter().find(|b| b.exists) {
            *tint = survivor.color;
        }
        add_burst(particles, &mut *fx_rng, center, *tint);

        if *alive == 0 {
            *phase = GamePhase::GameOver;
            *finish_time = Some(now);
        }
    });

    if count > 0 {
        events.push(GameEvent::CountsChanged);
        log::debug!("Ate {} ball(s), {} left", count, *alive);
        if *phase == GamePhase::GameOver {
            log::info!("All balls eaten");
        }
    }
}
