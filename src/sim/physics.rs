//! Ball physics and collision response
//!
//! Balls live in a rectangular arena with the origin at the top-left corner.
//! Overlaps are detected by center distance only; nothing separates
//! overlapping circles, so a pair can keep re-triggering across frames.

use rand::Rng;

use super::state::{Ball, EvilCircle, GameEvent, Rgb};
use crate::consts::*;

impl Ball {
    /// Advance one frame: wall reflection, damping, integration, speed clamp
    ///
    /// Walls are checked right, left, bottom, top. A ball touching a corner
    /// bounces off both walls in the same frame, emitting a [`GameEvent::Bounce`]
    /// for each and compounding the speed-ups.
    pub fn update(&mut self, width: f32, height: f32, events: &mut Vec<GameEvent>) {
        if self.pos.x + self.size >= width {
            self.vel.x = -self.vel.x.abs() * WALL_BOOST;
            self.vel.y *= WALL_CROSS_BOOST;
            events.push(GameEvent::Bounce);
        }

        if self.pos.x - self.size <= 0.0 {
            self.vel.x = self.vel.x.abs() * WALL_BOOST;
            self.vel.y *= WALL_CROSS_BOOST;
            events.push(GameEvent::Bounce);
        }

        if self.pos.y + self.size >= height {
            self.vel.y = -self.vel.y.abs() * WALL_BOOST;
            self.vel.x *= WALL_CROSS_BOOST;
            events.push(GameEvent::Bounce);
        }

        if self.pos.y - self.size <= 0.0 {
            self.vel.y = self.vel.y.abs() * WALL_BOOST;
            self.vel.x *= WALL_CROSS_BOOST;
            events.push(GameEvent::Bounce);
        }

        self.vel *= DAMPING;
        self.pos += self.vel;

        // Floor after damping keeps slow balls moving
        self.vel.x = clamp_speed(self.vel.x);
        self.vel.y = clamp_speed(self.vel.y);
    }
}

/// Sign-preserving clamp of one velocity component to [MIN, MAX] magnitude
///
/// Zero counts as positive.
#[inline]
pub fn clamp_speed(v: f32) -> f32 {
    let sign = if v < 0.0 { -1.0 } else { 1.0 };
    let mag = v.abs();
    if mag < BALL_MIN_SPEED {
        sign * BALL_MIN_SPEED
    } else if mag > BALL_MAX_SPEED {
        sign * BALL_MAX_SPEED
    } else {
        v
    }
}

/// Test ball `index` against every other live ball
///
/// Each overlapping pair gets a speed-up on both axes and a shared fresh color.
pub fn collision_detect<R: Rng>(balls: &mut [Ball], index: usize, rng: &mut R) {
    if !balls[index].exists {
        return;
    }

    for other in 0..balls.len() {
        if other == index || !balls[other].exists {
            continue;
        }

        let (pos, size) = (balls[other].pos, balls[other].size);
        if balls[index].overlaps(pos, size) {
            let color = Rgb::random(rng);
            for i in [index, other] {
                balls[i].vel *= COLLISION_BOOST;
                balls[i].color = color;
            }
        }
    }
}

impl EvilCircle {
    /// Keep the whole circle inside the arena
    pub fn check_bounds(&mut self, width: f32, height: f32) {
        if self.pos.x + self.size > width {
            self.pos.x = width - self.size;
        }
        if self.pos.x - self.size < 0.0 {
            self.pos.x = self.size;
        }
        if self.pos.y + self.size > height {
            self.pos.y = height - self.size;
        }
        if self.pos.y - self.size < 0.0 {
            self.pos.y = self.size;
        }
    }

    /// Eat every live ball the circle overlaps
    ///
    /// For each eaten ball: it is tombstoned, every remaining live ball gets
    /// its own new color, a [`GameEvent::Eat`] is queued and `on_eat` runs with
    /// the updated ball list. Returns the number of balls eaten.
    pub fn collision_detect<R, F>(
        &self,
        balls: &mut [Ball],
        rng: &mut R,
        events: &mut Vec<GameEvent>,
        mut on_eat: F,
    ) -> usize
    where
        R: Rng,
        F: FnMut(&[Ball]),
    {
        let mut eaten = 0;
        for i in 0..balls.len() {
            if !balls[i].exists || !balls[i].overlaps(self.pos, self.size) {
                continue;
            }

            balls[i].exists = false;
            for ball in balls.iter_mut().filter(|b| b.exists) {
                ball.color = Rgb::random(rng);
            }
            events.push(GameEvent::Eat);
            on_eat(&*balls);
            eaten += 1;
        }
        eaten
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const W: f32 = 800.0;
    const H: f32 = 600.0;

    fn ball(x: f32, y: f32, vx: f32, vy: f32, size: f32) -> Ball {
        Ball::new(Vec2::new(x, y), Vec2::new(vx, vy), size, Rgb::new(10, 20, 30))
    }

    fn bounces(events: &[GameEvent]) -> usize {
        events.iter().filter(|e| **e == GameEvent::Bounce).count()
    }

    #[test]
    fn test_right_wall_reflects() {
        let mut events = Vec::new();
        let mut b = ball(W - 15.0, 300.0, 5.0, 4.0, 15.0);
        b.update(W, H, &mut events);

        assert!(b.vel.x < 0.0);
        // Boost survives one frame of damping
        assert!(b.vel.x.abs() >= 5.0 * WALL_BOOST * DAMPING - 1e-4);
        assert!((b.vel.y - 4.0 * WALL_CROSS_BOOST * DAMPING).abs() < 1e-4);
        assert_eq!(bounces(&events), 1);
    }

    #[test]
    fn test_ball_one_pixel_from_wall_reflects_next_frame() {
        let mut events = Vec::new();
        let mut b = ball(W - 15.0 - 1.0, 300.0, 5.0, 4.0, 15.0);

        // Leading edge has not reached the wall yet
        b.update(W, H, &mut events);
        assert!(b.vel.x > 0.0);
        assert_eq!(bounces(&events), 0);

        b.update(W, H, &mut events);
        assert!(b.vel.x < 0.0);
        assert_eq!(bounces(&events), 1);
    }

    #[test]
    fn test_corner_bounces_twice() {
        let mut events = Vec::new();
        let mut b = ball(10.0, 10.0, -5.0, -5.0, 12.0);
        b.update(W, H, &mut events);

        assert!(b.vel.x > 0.0 && b.vel.y > 0.0);
        assert_eq!(bounces(&events), 2);
        // Both axes got WALL_BOOST and WALL_CROSS_BOOST
        let expected = 5.0 * WALL_BOOST * WALL_CROSS_BOOST * DAMPING;
        assert!((b.vel.x - expected).abs() < 1e-4);
        assert!((b.vel.y - expected).abs() < 1e-4);
    }

    #[test]
    fn test_speed_floor_and_cap() {
        let mut events = Vec::new();
        let mut slow = ball(400.0, 300.0, -1.0, 0.0, 10.0);
        slow.update(W, H, &mut events);
        assert_eq!(slow.vel, Vec2::new(-BALL_MIN_SPEED, BALL_MIN_SPEED));

        let mut fast = ball(400.0, 300.0, 100.0, -50.0, 10.0);
        fast.update(W, H, &mut events);
        assert_eq!(fast.vel, Vec2::new(BALL_MAX_SPEED, -BALL_MAX_SPEED));
        assert!(events.is_empty());
    }

    #[test]
    fn test_clamp_speed() {
        assert_eq!(clamp_speed(0.0), BALL_MIN_SPEED);
        assert_eq!(clamp_speed(-0.1), -BALL_MIN_SPEED);
        assert_eq!(clamp_speed(10.0), 10.0);
        assert_eq!(clamp_speed(-30.0), -BALL_MAX_SPEED);
    }

    #[test]
    fn test_ball_collision_is_symmetric() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut balls = vec![
            ball(100.0, 100.0, 4.0, 5.0, 10.0),
            ball(105.0, 100.0, -6.0, 3.0, 12.0),
        ];
        collision_detect(&mut balls, 0, &mut rng);

        assert_eq!(balls[0].vel, Vec2::new(4.0, 5.0) * COLLISION_BOOST);
        assert_eq!(balls[1].vel, Vec2::new(-6.0, 3.0) * COLLISION_BOOST);
        assert_eq!(balls[0].color, balls[1].color);
    }

    #[test]
    fn test_collision_ignores_distant_and_eaten() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut balls = vec![
            ball(100.0, 100.0, 4.0, 4.0, 10.0),
            ball(122.0, 100.0, 4.0, 4.0, 12.0), // touching exactly: no overlap
            ball(101.0, 100.0, 4.0, 4.0, 10.0),
        ];
        balls[2].exists = false;
        let before = balls.clone();
        collision_detect(&mut balls, 0, &mut rng);
        assert_eq!(balls, before);

        // A dead ball never initiates
        let mut balls = before.clone();
        collision_detect(&mut balls, 2, &mut rng);
        assert_eq!(balls, before);
    }

    #[test]
    fn test_evil_bounds() {
        let mut evil = EvilCircle::new(Vec2::new(-50.0, 1000.0));
        evil.check_bounds(W, H);
        assert_eq!(evil.pos, Vec2::new(EVIL_RADIUS, H - EVIL_RADIUS));

        evil.pos = Vec2::new(W + 3.0, -3.0);
        evil.check_bounds(W, H);
        assert_eq!(evil.pos, Vec2::new(W - EVIL_RADIUS, EVIL_RADIUS));
    }

    #[test]
    fn test_evil_eats_all_overlapping() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut events = Vec::new();
        let evil = EvilCircle::new(Vec2::new(200.0, 200.0));
        let mut balls = vec![
            ball(205.0, 200.0, 4.0, 4.0, 10.0),
            ball(600.0, 500.0, 4.0, 4.0, 10.0),
            ball(195.0, 210.0, 4.0, 4.0, 10.0),
        ];

        let mut calls = 0;
        let eaten = evil.collision_detect(&mut balls, &mut rng, &mut events, |remaining| {
            calls += 1;
            assert!(remaining.iter().filter(|b| b.exists).count() <= 2);
        });

        assert_eq!(eaten, 2);
        assert_eq!(calls, 2);
        assert!(!balls[0].exists && balls[1].exists && !balls[2].exists);
        assert_eq!(events, vec![GameEvent::Eat, GameEvent::Eat]);
    }

    proptest! {
        #[test]
        fn prop_speed_within_bounds_after_update(
            x in 0.0f32..800.0,
            y in 0.0f32..600.0,
            vx in -100.0f32..100.0,
            vy in -100.0f32..100.0,
            size in 10.0f32..20.0,
        ) {
            let mut events = Vec::new();
            let mut b = ball(x, y, vx, vy, size);
            b.update(W, H, &mut events);
            prop_assert!(b.vel.x.abs() >= BALL_MIN_SPEED && b.vel.x.abs() <= BALL_MAX_SPEED);
            prop_assert!(b.vel.y.abs() >= BALL_MIN_SPEED && b.vel.y.abs() <= BALL_MAX_SPEED);
            prop_assert!(events.len() <= 2);
        }
    }
}
