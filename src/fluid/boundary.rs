//! Boundary handling for the bounding box.
//!
//! Particle positions are clamped to `[min, max]` per axis. `max` is the box
//! size minus one particle diameter, so the particle's drawn extent stays
//! inside the box.

use bevy::prelude::*;

use super::params::FluidParams;

/// Axis-aligned box the particles are contained in.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoxBoundary {
    /// Minimum allowed position.
    pub min: Vec2,
    /// Maximum allowed position.
    pub max: Vec2,
    /// Fraction of the normal velocity kept after a hit (0 = no bounce, 1 = perfect bounce).
    pub damping: f32,
}

impl Default for BoxBoundary {
    fn default() -> Self {
        Self::from_params(&FluidParams::default())
    }
}

impl BoxBoundary {
    /// Create a box boundary with custom bounds.
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self {
            min,
            max,
            damping: 1.0,
        }
    }

    /// Box described by the simulation parameters.
    pub fn from_params(params: &FluidParams) -> Self {
        Self {
            min: params.bounds_min(),
            max: params.bounds_max(),
            damping: params.collision_damping,
        }
    }

    /// Set damping.
    pub fn with_damping(mut self, damping: f32) -> Self {
        self.damping = damping;
        self
    }

    /// Clamp a particle into the box, reflecting and damping the velocity
    /// component of every axis it crossed.
    pub fn apply_collision(&self, position: &mut Vec2, velocity: &mut Vec2) {
        // Y axis
        if position.y > self.max.y {
            position.y = self.max.y;
            velocity.y *= -self.damping;
        }
        if position.y < self.min.y {
            position.y = self.min.y;
            velocity.y *= -self.damping;
        }

        // X axis
        if position.x > self.max.x {
            position.x = self.max.x;
            velocity.x *= -self.damping;
        }
        if position.x < self.min.x {
            position.x = self.min.x;
            velocity.x *= -self.damping;
        }
    }
}
