//! Game state and core simulation types
//!
//! Everything a session owns lives in [`GameState`]; restart rebuilds it in place.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::consts::*;

/// Background tint before anything has been eaten
pub const INITIAL_TINT: Rgb = Rgb::new(15, 15, 18);

/// An opaque RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Uniform random color, each channel in [0, 255]
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Self::new(rng.random(), rng.random(), rng.random())
    }

    /// Scale every channel by `factor`, flooring and clamping at 0
    pub fn darker(self, factor: f32) -> Self {
        let scale = |c: u8| (c as f32 * factor).floor().clamp(0.0, 255.0) as u8;
        Self::new(scale(self.r), scale(self.g), scale(self.b))
    }

    /// CSS `rgb()` string
    pub fn css(&self) -> String {
        format!("rgb({},{},{})", self.r, self.g, self.b)
    }

    /// CSS `rgba()` string
    pub fn css_alpha(&self, alpha: f32) -> String {
        format!("rgba({},{},{},{})", self.r, self.g, self.b, alpha)
    }
}

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GamePhase {
    /// Physics and collisions advance every frame
    #[default]
    Running,
    /// Frozen frame with overlay; particles keep animating
    Paused,
    /// Every ball eaten
    GameOver,
}

/// Side effects produced by a tick, drained by the platform layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// A ball hit a wall
    Bounce,
    /// The evil circle ate a ball
    Eat,
    /// Alive/eaten counters changed (eat or restart)
    CountsChanged,
}

/// Evil circle movement direction (one keypress = one step)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// A bouncing ball
#[derive(Debug, Clone, PartialEq)]
pub struct Ball {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Radius
    pub size: f32,
    pub color: Rgb,
    /// Cleared when eaten; eaten balls stay in the list
    pub exists: bool,
}

impl Ball {
    pub fn new(pos: Vec2, vel: Vec2, size: f32, color: Rgb) -> Self {
        Self {
            pos,
            vel,
            size,
            color,
            exists: true,
        }
    }

    /// Spawn a ball fully inside a `width` x `height` arena
    pub fn random<R: Rng>(rng: &mut R, width: f32, height: f32) -> Self {
        let size = rng.random_range(BALL_MIN_SIZE..=BALL_MAX_SIZE);
        let x = random_coord(rng, size, width);
        let y = random_coord(rng, size, height);

        // Zero speed on an axis would never reach a wall
        let vx = match rng.random_range(-BALL_START_SPEED..=BALL_START_SPEED) {
            0 => 1,
            v => v,
        };
        let vy = match rng.random_range(-BALL_START_SPEED..=BALL_START_SPEED) {
            0 => -1,
            v => v,
        };

        Self::new(
            Vec2::new(x, y),
            Vec2::new(vx as f32, vy as f32),
            size as f32,
            Rgb::random(rng),
        )
    }

    /// True if the two circles overlap (strictly closer than the sum of radii)
    #[inline]
    pub fn overlaps(&self, pos: Vec2, size: f32) -> bool {
        self.pos.distance(pos) < self.size + size
    }
}

/// Whole-pixel coordinate at least one radius away from both edges
fn random_coord<R: Rng>(rng: &mut R, size: i32, extent: f32) -> f32 {
    let hi = (extent as i32 - size).max(size);
    rng.random_range(size..=hi) as f32
}

/// The player-controlled circle
#[derive(Debug, Clone, PartialEq)]
pub struct EvilCircle {
    pub pos: Vec2,
    /// Displacement per keypress on each axis
    pub step: Vec2,
    pub size: f32,
    pub color: Rgb,
}

impl EvilCircle {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            step: Vec2::splat(EVIL_STEP),
            size: EVIL_RADIUS,
            color: Rgb::WHITE,
        }
    }

    /// Move one step; bounds are enforced by the next frame's `check_bounds`
    pub fn step_toward(&mut self, dir: Direction) {
        match dir {
            Direction::Left => self.pos.x -= self.step.x,
            Direction::Right => self.pos.x += self.step.x,
            Direction::Up => self.pos.y -= self.step.y,
            Direction::Down => self.pos.y += self.step.y,
        }
    }
}

/// A short-lived burst particle
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Frames remaining
    pub life: i32,
    pub color: Rgb,
}

impl Particle {
    /// Opacity fades linearly with remaining life
    pub fn alpha(&self) -> f32 {
        (self.life as f32 / PARTICLE_LIFE as f32).max(0.0)
    }
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Arena size (fixed at load)
    pub width: f32,
    pub height: f32,
    /// Balls per session
    pub ball_count: usize,
    /// All balls of the session, eaten ones included
    pub balls: Vec<Ball>,
    pub particles: Vec<Particle>,
    pub evil: EvilCircle,
    /// Background tint base color
    pub tint: Rgb,
    pub alive: usize,
    pub eaten: usize,
    pub phase: GamePhase,
    /// Host timestamps in milliseconds
    pub start_time: f64,
    pub finish_time: Option<f64>,
    /// Events since the last drain
    pub events: Vec<GameEvent>,
    /// Gameplay randomness (spawns, recolors)
    pub(crate) rng: Pcg32,
    /// Cosmetic randomness (particle spread)
    pub(crate) fx_rng: Pcg32,
}

impl GameState {
    /// Create a new session with the given seed
    pub fn new(width: f32, height: f32, ball_count: usize, seed: u64, now: f64) -> Self {
        let mut state = Self {
            width,
            height,
            ball_count,
            balls: Vec::with_capacity(ball_count),
            particles: Vec::new(),
            evil: EvilCircle::new(Vec2::new(width / 2.0, height / 2.0)),
            tint: INITIAL_TINT,
            alive: 0,
            eaten: 0,
            phase: GamePhase::Running,
            start_time: now,
            finish_time: None,
            events: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            fx_rng: Pcg32::seed_from_u64(seed.wrapping_add(0x9E37_79B9_7F4A_7C15)),
        };
        state.spawn_balls();
        state
    }

    /// Full reset: fresh balls, no particles, counters and timers cleared
    pub fn restart(&mut self, now: f64) {
        self.particles.clear();
        self.events.clear();
        self.spawn_balls();
        self.evil.pos = Vec2::new(self.width / 2.0, self.height / 2.0);
        self.tint = INITIAL_TINT;
        self.phase = GamePhase::Running;
        self.start_time = now;
        self.finish_time = None;
        self.events.push(GameEvent::CountsChanged);
    }

    fn spawn_balls(&mut self) {
        self.balls.clear();
        for _ in 0..self.ball_count {
            let ball = Ball::random(&mut self.rng, self.width, self.height);
            self.balls.push(ball);
        }
        self.alive = self.balls.len();
        self.eaten = 0;
    }

    /// Take all pending events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Seconds from start to finish, once the game is won
    pub fn elapsed_secs(&self) -> Option<f64> {
        self.finish_time
            .map(|finish| (finish - self.start_time) / 1000.0)
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_shape() {
        let state = GameState::new(800.0, 600.0, BALL_COUNT, 42, 1000.0);
        assert_eq!(state.balls.len(), BALL_COUNT);
        assert_eq!(state.alive, BALL_COUNT);
        assert_eq!(state.eaten, 0);
        assert_eq!(state.phase, GamePhase::Running);
        assert_eq!(state.evil.pos, Vec2::new(400.0, 300.0));
        assert_eq!(state.tint, INITIAL_TINT);
        assert!(state.particles.is_empty());
    }

    #[test]
    fn test_spawned_balls_inside_arena() {
        let state = GameState::new(800.0, 600.0, 200, 7, 0.0);
        for ball in &state.balls {
            assert!(ball.exists);
            assert!((10.0..=20.0).contains(&ball.size));
            assert!(ball.pos.x - ball.size >= 0.0 && ball.pos.x + ball.size <= 800.0);
            assert!(ball.pos.y - ball.size >= 0.0 && ball.pos.y + ball.size <= 600.0);
            assert!(ball.vel.x != 0.0 && ball.vel.y != 0.0);
            assert!(ball.vel.x.abs() <= 7.0 && ball.vel.y.abs() <= 7.0);
        }
    }

    #[test]
    fn test_tiny_arena_does_not_panic() {
        let state = GameState::new(10.0, 10.0, 5, 1, 0.0);
        assert_eq!(state.balls.len(), 5);
    }

    #[test]
    fn test_darker_floors_channels() {
        assert_eq!(Rgb::new(101, 15, 0).darker(0.5), Rgb::new(50, 7, 0));
        assert_eq!(INITIAL_TINT.darker(0.35), Rgb::new(5, 5, 6));
        assert_eq!(INITIAL_TINT.darker(0.9), Rgb::new(13, 13, 16));
    }

    #[test]
    fn test_css_strings() {
        assert_eq!(Rgb::new(1, 2, 3).css(), "rgb(1,2,3)");
        assert_eq!(Rgb::new(1, 2, 3).css_alpha(0.5), "rgba(1,2,3,0.5)");
    }

    #[test]
    fn test_evil_circle_steps() {
        let mut evil = EvilCircle::new(Vec2::new(100.0, 100.0));
        evil.step_toward(Direction::Left);
        evil.step_toward(Direction::Down);
        assert_eq!(evil.pos, Vec2::new(80.0, 120.0));
        evil.step_toward(Direction::Right);
        evil.step_toward(Direction::Up);
        assert_eq!(evil.pos, Vec2::new(100.0, 100.0));
    }

    #[test]
    fn test_same_seed_same_balls() {
        let a = GameState::new(640.0, 480.0, BALL_COUNT, 99, 0.0);
        let b = GameState::new(640.0, 480.0, BALL_COUNT, 99, 0.0);
        assert_eq!(a.balls, b.balls);
    }
}
