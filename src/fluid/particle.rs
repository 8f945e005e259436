//! Particle storage and initial layout.
//!
//! Particles are kept as parallel arrays (structure of arrays). Index `i`
//! identifies the same particle in every array and never changes during a
//! step; neighbor search sorts its own index-keyed entries instead.

use bevy::prelude::*;

use super::params::FluidParams;

/// Position, velocity and density of every particle.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParticleSet {
    pub positions: Vec<Vec2>,
    pub velocities: Vec<Vec2>,
    pub densities: Vec<f32>,
}

impl ParticleSet {
    /// Create particle data with capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            positions: Vec::with_capacity(capacity),
            velocities: Vec::with_capacity(capacity),
            densities: Vec::with_capacity(capacity),
        }
    }

    /// Particles at rest at the given positions.
    pub fn from_positions(positions: Vec<Vec2>) -> Self {
        let n = positions.len();
        Self {
            positions,
            velocities: vec![Vec2::ZERO; n],
            densities: vec![0.0; n],
        }
    }

    /// Add a particle.
    pub fn push(&mut self, position: Vec2, velocity: Vec2) {
        self.positions.push(position);
        self.velocities.push(velocity);
        self.densities.push(0.0);
    }

    /// Get the number of particles.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Square-ish grid of particles centered in the bounding box.
///
/// Rows hold `floor(sqrt(count))` particles; the last row may be partial.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridLayout {
    pub count: u32,
    pub spacing: f32,
    pub center: Vec2,
}

impl GridLayout {
    /// Layout described by the simulation parameters. The spacing is clamped
    /// so neighboring particles never start overlapping.
    pub fn from_params(params: &FluidParams) -> Self {
        Self {
            count: params.particle_count,
            spacing: params.effective_spacing(),
            center: params.half_bounds,
        }
    }

    pub fn per_row(&self) -> u32 {
        ((self.count as f32).sqrt().floor() as u32).max(1)
    }

    pub fn per_column(&self) -> u32 {
        if self.count == 0 {
            return 0;
        }
        (self.count - 1) / self.per_row() + 1
    }

    /// Position of every particle in the grid.
    pub fn generate_positions(&self) -> Vec<Vec2> {
        let per_row = self.per_row();
        let per_column = self.per_column() as f32;

        (0..self.count)
            .map(|i| {
                let col = (i % per_row) as f32;
                let row = (i / per_row) as f32;
                let x = (col - per_row as f32 / 2.0 + 0.5) * self.spacing;
                let y = (row - per_column / 2.0 + 0.5) * self.spacing;
                Vec2::new(x, y) + self.center
            })
            .collect()
    }

    /// Particles at rest in this layout.
    pub fn build(&self) -> ParticleSet {
        ParticleSet::from_positions(self.generate_positions())
    }
}

/// Render-side snapshot of one particle, laid out for direct buffer upload.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ParticleInstance {
    pub position: [f32; 2],
    pub velocity: [f32; 2],
}

impl ParticleInstance {
    pub fn new(position: Vec2, velocity: Vec2) -> Self {
        Self {
            position: position.to_array(),
            velocity: velocity.to_array(),
        }
    }

    pub fn position(&self) -> Vec2 {
        Vec2::from_array(self.position)
    }

    pub fn velocity(&self) -> Vec2 {
        Vec2::from_array(self.velocity)
    }
}
