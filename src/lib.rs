//! Evil Circle - bouncing balls and the circle that eats them
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, collisions, game state)
//! - `render`: Canvas 2D compositor (background tint, particles, overlays)
//! - `audio`: Sound playback with unlock state machine and fallback tiers
//! - `settings`: Player configuration

pub mod audio;
pub mod render;
pub mod settings;
pub mod sim;

pub use settings::{Settings, SettingsError};

/// Game configuration constants
pub mod consts {
    /// Balls spawned per session
    pub const BALL_COUNT: usize = 25;
    /// Ball radius range (inclusive, whole pixels)
    pub const BALL_MIN_SIZE: i32 = 10;
    pub const BALL_MAX_SIZE: i32 = 20;
    /// Initial per-axis speed range is [-7, 7], zero excluded
    pub const BALL_START_SPEED: i32 = 7;

    /// Speed-up along the axis of a wall hit
    pub const WALL_BOOST: f32 = 1.08;
    /// Speed-up along the other axis on a wall hit
    pub const WALL_CROSS_BOOST: f32 = 1.02;
    /// Per-frame velocity damping
    pub const DAMPING: f32 = 0.995;
    /// Per-axis speed floor (applied after damping)
    pub const BALL_MIN_SPEED: f32 = 3.5;
    /// Per-axis speed cap
    pub const BALL_MAX_SPEED: f32 = 24.0;
    /// Speed-up for both balls on a ball-ball overlap
    pub const COLLISION_BOOST: f32 = 1.05;

    /// Evil circle displacement per keypress
    pub const EVIL_STEP: f32 = 20.0;
    pub const EVIL_RADIUS: f32 = 18.0;
    /// Milliseconds per radian of ring spin
    pub const EVIL_SPIN_MS_PER_RAD: f64 = 400.0;

    /// Particles per eat burst
    pub const BURST_SIZE: usize = 12;
    /// Particle lifetime in frames
    pub const PARTICLE_LIFE: i32 = 22;
    /// Half-range of particle velocity per axis
    pub const PARTICLE_SPREAD: f32 = 2.5;

    /// Background gradient darkening factors (start, end)
    pub const TINT_DARK: f32 = 0.35;
    pub const TINT_LIGHT: f32 = 0.9;
}
