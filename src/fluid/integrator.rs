//! Velocity and position integration followed by wall collisions.
//!
//! Per particle and step:
//! 1. `v += down · gravity · dt · speed_factor`
//! 2. `v += a_pressure · dt`
//! 3. `x += v · dt`
//! 4. clamp against the box, reflecting and damping the crossed axes.
//!
//! Gravity and pressure both accumulate into the velocity before the position
//! update; neither overwrites the other.

use bevy::prelude::*;
use rayon::prelude::*;

use super::boundary::BoxBoundary;
use super::params::FluidParams;

/// Screen-space down.
pub const DOWN: Vec2 = Vec2::new(0.0, 1.0);

/// Semi-implicit Euler integrator with box collisions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Integrator {
    /// Gravity acceleration, speed factor included.
    pub gravity: Vec2,
    pub boundary: BoxBoundary,
}

impl Integrator {
    pub fn from_params(params: &FluidParams) -> Self {
        Self {
            gravity: DOWN * params.gravity * params.speed_factor,
            boundary: BoxBoundary::from_params(params),
        }
    }

    /// Advance one particle, returning its new position and velocity.
    #[inline]
    pub fn advance(&self, position: Vec2, velocity: Vec2, acceleration: Vec2, dt: f32) -> (Vec2, Vec2) {
        let mut velocity = velocity + self.gravity * dt;
        velocity += acceleration * dt;
        let mut position = position + velocity * dt;
        self.boundary.apply_collision(&mut position, &mut velocity);
        (position, velocity)
    }

    /// Advance every particle in parallel. Results go to the output buffers;
    /// the inputs are left untouched.
    pub fn advance_all(
        &self,
        positions: &[Vec2],
        velocities: &[Vec2],
        accelerations: &[Vec2],
        dt: f32,
        next_positions: &mut Vec<Vec2>,
        next_velocities: &mut Vec<Vec2>,
    ) {
        positions
            .par_iter()
            .zip(velocities.par_iter())
            .zip(accelerations.par_iter())
            .map(|((&x, &v), &a)| self.advance(x, v, a, dt))
            .unzip_into_vecs(next_positions, next_velocities);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weightless() -> Integrator {
        Integrator::from_params(&FluidParams::default().with_gravity(0.0))
    }

    #[test]
    fn test_gravity_accelerates_downwards() {
        let integrator = Integrator::from_params(&FluidParams::default());
        let (pos, vel) = integrator.advance(Vec2::new(300.0, 300.0), Vec2::ZERO, Vec2::ZERO, 0.01);
        assert!((vel.y - 10.0 * 400.0 * 0.01).abs() < 1e-3);
        assert_eq!(vel.x, 0.0);
        assert!(pos.y > 300.0);
    }

    #[test]
    fn test_pressure_and_gravity_accumulate() {
        let integrator = Integrator::from_params(&FluidParams::default());
        let accel = Vec2::new(0.0, -4000.0);
        let (_, vel) = integrator.advance(Vec2::new(300.0, 300.0), Vec2::ZERO, accel, 0.01);
        assert!(vel.y.abs() < 1e-3);
    }

    #[test]
    fn test_bounces_lose_speed() {
        let integrator = weightless();
        let mut pos = Vec2::new(300.0, 10.0);
        let mut vel = Vec2::new(0.0, -500.0);
        let mut last_speed = vel.length();
        let mut bounces = 0;

        for _ in 0..2000 {
            let before = vel;
            (pos, vel) = integrator.advance(pos, vel, Vec2::ZERO, 0.016);
            if before.y.signum() != vel.y.signum() {
                bounces += 1;
                assert!(vel.length() < last_speed);
                last_speed = vel.length();
            }
            if bounces >= 5 {
                break;
            }
        }
        assert_eq!(bounces, 5);
    }

    #[test]
    fn test_advance_all_keeps_order() {
        let integrator = weightless();
        let positions = vec![Vec2::new(10.0, 10.0), Vec2::new(20.0, 20.0)];
        let velocities = vec![Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0)];
        let accelerations = vec![Vec2::ZERO; 2];
        let mut next_pos = Vec::new();
        let mut next_vel = Vec::new();
        integrator.advance_all(&positions, &velocities, &accelerations, 1.0, &mut next_pos, &mut next_vel);

        assert_eq!(next_pos, vec![Vec2::new(11.0, 10.0), Vec2::new(20.0, 21.0)]);
        assert_eq!(next_vel, velocities);
    }

    #[test]
    fn test_advance_all_replaces_stale_output() {
        let integrator = weightless();
        let positions = vec![Vec2::new(10.0, 10.0)];
        let velocities = vec![Vec2::ZERO];
        let accelerations = vec![Vec2::ZERO];
        let mut next_pos = vec![Vec2::splat(-1.0); 4];
        let mut next_vel = vec![Vec2::splat(-1.0); 4];
        integrator.advance_all(&positions, &velocities, &accelerations, 0.5, &mut next_pos, &mut next_vel);

        assert_eq!(next_pos, positions);
        assert_eq!(next_vel, velocities);
    }
}
