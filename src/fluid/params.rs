//! Fluid simulation parameters.
//!
//! These parameters control the behavior of the simulation. They are fixed for
//! the duration of a step and may be changed between steps through
//! [`FluidSimulation::apply_params`](super::simulation::FluidSimulation::apply_params).
//!
//! Units follow the screen-space front-ends: lengths are in pixels and +y
//! points down.

use bevy::log::warn;
use bevy::prelude::*;

use super::error::FluidError;

/// Parameters controlling the fluid simulation behavior.
///
/// The defaults match a 600x600 box holding 2000 particles.
#[derive(Resource, Clone, Debug, PartialEq)]
pub struct FluidParams {
    /// Number of particles laid out at setup.
    pub particle_count: u32,

    /// Mass of every particle.
    pub particle_mass: f32,

    /// Particle radius, used for the initial spacing and as the collision offset.
    pub particle_radius: f32,

    /// Requested distance between neighboring particles in the initial grid.
    /// Clamped to at least twice the particle radius.
    pub particle_spacing: f32,

    /// Smoothing kernel radius (h).
    /// Also the cell size of the spatial hash grid.
    pub smoothing_radius: f32,

    /// Density the pressure solver drives particles towards.
    pub target_density: f32,

    /// Converts density deviation into pressure.
    pub pressure_multiplier: f32,

    /// Gravity scalar, applied along +y (screen down).
    pub gravity: f32,

    /// Multiplier on the gravity impulse, carried over from the animation
    /// front-ends where it sets the pace of the fall.
    pub speed_factor: f32,

    /// Fraction of the normal velocity kept after hitting a wall.
    /// 0.0 = fully inelastic, 1.0 = fully elastic.
    pub collision_damping: f32,

    /// Half-extent of the bounding box. Particles live in
    /// `[0, 2 * half_bounds.x] x [0, 2 * half_bounds.y]`.
    pub half_bounds: Vec2,

    /// Number of slots in the spatial hash table.
    /// Use None to size it to the particle count.
    pub hash_table_size: Option<u32>,

    /// Timestep used by the plugin.
    /// Use None to use frame delta time.
    pub fixed_timestep: Option<f32>,

    /// Upper bound applied by the plugin to frame delta time.
    pub max_timestep: f32,
}

impl Default for FluidParams {
    fn default() -> Self {
        Self {
            particle_count: 2000,
            particle_mass: 1.0,
            particle_radius: 7.5,
            particle_spacing: 15.0,
            smoothing_radius: 35.0,
            target_density: 0.005,
            pressure_multiplier: 200_000.0,
            gravity: 10.0,
            speed_factor: 400.0,
            collision_damping: 0.7,
            half_bounds: Vec2::new(300.0, 300.0),
            hash_table_size: None,
            fixed_timestep: None,
            max_timestep: 1.0 / 30.0,
        }
    }
}

impl FluidParams {
    /// Parameters of the game-engine front-end (same as default).
    pub fn godot() -> Self {
        Self::default()
    }

    /// Parameters of the desktop front-end: a single drop, earth gravity,
    /// faster animation and no rebound.
    pub fn desktop() -> Self {
        Self {
            particle_count: 1,
            gravity: 9.81,
            speed_factor: 800.0,
            collision_damping: 0.0,
            ..Self::default()
        }
    }

    /// Set the particle count.
    pub fn with_particle_count(mut self, count: u32) -> Self {
        self.particle_count = count;
        self
    }

    /// Set the particle radius.
    pub fn with_particle_radius(mut self, radius: f32) -> Self {
        self.particle_radius = radius;
        self
    }

    /// Set the initial particle spacing.
    pub fn with_particle_spacing(mut self, spacing: f32) -> Self {
        self.particle_spacing = spacing;
        self
    }

    /// Set the smoothing radius.
    pub fn with_smoothing_radius(mut self, radius: f32) -> Self {
        self.smoothing_radius = radius;
        self
    }

    /// Set gravity.
    pub fn with_gravity(mut self, gravity: f32) -> Self {
        self.gravity = gravity;
        self
    }

    /// Set collision damping.
    pub fn with_collision_damping(mut self, damping: f32) -> Self {
        self.collision_damping = damping;
        self
    }

    /// Set target density and pressure multiplier together.
    pub fn with_pressure(mut self, target_density: f32, pressure_multiplier: f32) -> Self {
        self.target_density = target_density;
        self.pressure_multiplier = pressure_multiplier;
        self
    }

    /// Set the bounding half-extents.
    pub fn with_half_bounds(mut self, half_bounds: Vec2) -> Self {
        self.half_bounds = half_bounds;
        self
    }

    /// Set an explicit hash table size.
    pub fn with_hash_table_size(mut self, size: u32) -> Self {
        self.hash_table_size = Some(size);
        self
    }

    /// Set a fixed timestep for the plugin.
    pub fn with_fixed_timestep(mut self, dt: f32) -> Self {
        self.fixed_timestep = Some(dt);
        self
    }

    /// Number of slots the spatial hash table will have.
    pub fn resolved_table_size(&self) -> u32 {
        self.hash_table_size.unwrap_or(self.particle_count)
    }

    /// Spacing actually used by the initial layout.
    pub fn effective_spacing(&self) -> f32 {
        self.particle_spacing.max(2.0 * self.particle_radius)
    }

    /// Lower corner of the region particle positions are clamped to.
    pub fn bounds_min(&self) -> Vec2 {
        Vec2::ZERO
    }

    /// Upper corner of the region particle positions are clamped to.
    pub fn bounds_max(&self) -> Vec2 {
        2.0 * self.half_bounds - Vec2::splat(2.0 * self.particle_radius)
    }

    /// Whether changing from `other` to `self` requires laying the particles
    /// out again.
    pub fn changes_layout(&self, other: &FluidParams) -> bool {
        self.particle_count != other.particle_count
            || self.particle_radius != other.particle_radius
            || self.particle_spacing != other.particle_spacing
            || self.half_bounds != other.half_bounds
    }

    /// Reject configurations no step can run with. Cheap enough to call
    /// before every step.
    pub fn check_inputs(&self) -> Result<(), FluidError> {
        if self.particle_count == 0 {
            return Err(FluidError::NoParticles);
        }
        if !(self.smoothing_radius.is_finite() && self.smoothing_radius > 0.0) {
            return Err(FluidError::InvalidSmoothingRadius(self.smoothing_radius));
        }
        if !(self.particle_radius.is_finite() && self.particle_radius > 0.0) {
            return Err(FluidError::InvalidParticleRadius(self.particle_radius));
        }
        let max = self.bounds_max();
        if !(self.half_bounds.is_finite() && max.x > 0.0 && max.y > 0.0) {
            return Err(FluidError::InvalidBounds(self.half_bounds));
        }
        Ok(())
    }

    /// Full setup-time check: degenerate inputs, hash table sizing, and
    /// warnings for values that are legal but suspicious.
    pub fn validate(&self) -> Result<(), FluidError> {
        self.check_inputs()?;

        let table_size = self.resolved_table_size();
        if table_size < self.particle_count {
            return Err(FluidError::HashTableUndersize {
                table_size,
                particle_count: self.particle_count,
            });
        }

        if !(0.0..=1.0).contains(&self.collision_damping) {
            warn!(
                "collision damping {} is outside [0, 1], wall hits will gain energy or pass through",
                self.collision_damping
            );
        }
        if self.particle_mass <= 0.0 {
            warn!("particle mass {} is not positive", self.particle_mass);
        }

        Ok(())
    }
}
