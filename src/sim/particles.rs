//! Eat-burst particles
//!
//! Purely cosmetic; they keep animating while the game is paused or over.

use glam::Vec2;
use rand::Rng;

use super::state::{Particle, Rgb};
use crate::consts::{BURST_SIZE, PARTICLE_LIFE, PARTICLE_SPREAD};

/// Spawn a burst of particles at `at`
pub fn add_burst<R: Rng>(particles: &mut Vec<Particle>, rng: &mut R, at: Vec2, color: Rgb) {
    particles.reserve(BURST_SIZE);
    for _ in 0..BURST_SIZE {
        let vel = Vec2::new(
            (rng.random::<f32>() - 0.5) * 2.0 * PARTICLE_SPREAD,
            (rng.random::<f32>() - 0.5) * 2.0 * PARTICLE_SPREAD,
        );
        particles.push(Particle {
            pos: at,
            vel,
            life: PARTICLE_LIFE,
            color,
        });
    }
}

/// Advance every particle one frame and drop the expired ones
pub fn step_particles(particles: &mut Vec<Particle>) {
    for p in particles.iter_mut() {
        p.pos += p.vel;
        p.life -= 1;
    }
    particles.retain(|p| p.life > 0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_burst_shape() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut particles = Vec::new();
        let color = Rgb::new(200, 100, 50);
        add_burst(&mut particles, &mut rng, Vec2::new(50.0, 60.0), color);

        assert_eq!(particles.len(), BURST_SIZE);
        for p in &particles {
            assert_eq!(p.pos, Vec2::new(50.0, 60.0));
            assert_eq!(p.life, PARTICLE_LIFE);
            assert_eq!(p.color, color);
            assert!(p.vel.x.abs() <= PARTICLE_SPREAD && p.vel.y.abs() <= PARTICLE_SPREAD);
            assert_eq!(p.alpha(), 1.0);
        }
    }

    #[test]
    fn test_particles_expire_after_lifetime() {
        let mut rng = Pcg32::seed_from_u64(6);
        let mut particles = Vec::new();
        add_burst(&mut particles, &mut rng, Vec2::ZERO, Rgb::WHITE);

        for _ in 0..PARTICLE_LIFE - 1 {
            step_particles(&mut particles);
        }
        assert_eq!(particles.len(), BURST_SIZE);
        assert!(particles.iter().all(|p| p.life == 1));
        assert!((particles[0].alpha() - 1.0 / PARTICLE_LIFE as f32).abs() < 1e-6);

        step_particles(&mut particles);
        assert!(particles.is_empty());
    }

    #[test]
    fn test_particles_move_by_velocity() {
        let mut particles = vec![Particle {
            pos: Vec2::new(1.0, 1.0),
            vel: Vec2::new(2.0, -1.0),
            life: 5,
            color: Rgb::WHITE,
        }];
        step_particles(&mut particles);
        assert_eq!(particles[0].pos, Vec2::new(3.0, 0.0));
        assert_eq!(particles[0].life, 4);
    }
}
