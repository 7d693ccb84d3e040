//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One step per animation frame, no wall-clock reads
//! - Seeded RNG only
//! - Stable iteration order (balls are tombstoned, never removed)
//! - No rendering or platform dependencies

pub mod particles;
pub mod physics;
pub mod state;
pub mod tick;

pub use particles::{add_burst, step_particles};
pub use physics::collision_detect;
pub use state::{
    Ball, Direction, EvilCircle, GameEvent, GamePhase, GameState, INITIAL_TINT, Particle, Rgb,
};
pub use tick::{Command, apply_command, tick};
