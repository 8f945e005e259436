//! Pressure from density deviation and the resulting pairwise forces.
//!
//! Pressure is linear in density error, `(ρ - ρ₀) · k`. The force on particle
//! i sums the pressure gradient contributed by every neighbor j:
//!
//! F_i = Σ_{j≠i} -P(ρ_j) · dir(j→i) · W'(|x_i - x_j|) · m / ρ_j
//!
//! With W' negative inside the radius, a neighbor above target density pushes
//! i away from it and one below target pulls i closer.

use std::f32::consts::TAU;

use bevy::prelude::*;
use rand::{rngs::SmallRng, Rng, SeedableRng};
use rayon::prelude::*;

use super::density::safe_density;
use super::kernel::KernelCoefficients;
use super::params::FluidParams;
use super::spatial::SpatialLookup;

/// Pressure solver over one step's snapshot of positions and densities.
#[derive(Clone, Copy, Debug)]
pub struct PressureSolver<'a> {
    pub lookup: &'a SpatialLookup,
    pub positions: &'a [Vec2],
    pub densities: &'a [f32],
    pub kernel: KernelCoefficients,
    pub mass: f32,
    pub target_density: f32,
    pub pressure_multiplier: f32,
    /// Mixed into the random directions picked for coincident particles.
    pub seed: u64,
}

impl<'a> PressureSolver<'a> {
    pub fn new(
        params: &FluidParams,
        lookup: &'a SpatialLookup,
        positions: &'a [Vec2],
        densities: &'a [f32],
        seed: u64,
    ) -> Self {
        Self {
            lookup,
            positions,
            densities,
            kernel: KernelCoefficients::new(params.smoothing_radius),
            mass: params.particle_mass,
            target_density: params.target_density,
            pressure_multiplier: params.pressure_multiplier,
            seed,
        }
    }

    /// Pressure for a density. Negative below the target density.
    #[inline]
    pub fn density_to_pressure(&self, density: f32) -> f32 {
        (density - self.target_density) * self.pressure_multiplier
    }

    /// Net pressure force acting on particle `i`.
    pub fn pressure_force(&self, i: usize) -> Vec2 {
        let pos_i = self.positions[i];
        let mut force = Vec2::ZERO;

        self.lookup.for_each_candidate(pos_i, |j| {
            if j == i {
                return;
            }
            let offset = pos_i - self.positions[j];
            let dst = offset.length();
            let slope = self.kernel.slope(dst);
            if slope == 0.0 && dst > 0.0 {
                return;
            }

            let dir = if dst > 0.0 {
                offset / dst
            } else {
                self.random_direction(i, j)
            };

            let density_j = safe_density(self.densities[j]);
            let pressure_j = self.density_to_pressure(self.densities[j]);
            force += -pressure_j * dir * slope * self.mass / density_j;
        });

        force
    }

    /// Pressure acceleration of particle `i`.
    #[inline]
    pub fn pressure_acceleration(&self, i: usize) -> Vec2 {
        self.pressure_force(i) / safe_density(self.densities[i])
    }

    /// Pressure acceleration of every particle, computed in parallel.
    pub fn compute_into(&self, accelerations: &mut Vec<Vec2>) {
        (0..self.positions.len())
            .into_par_iter()
            .map(|i| self.pressure_acceleration(i))
            .collect_into_vec(accelerations);
    }

    /// Unit vector with a uniformly random angle, reproducible for a given
    /// seed and particle pair.
    fn random_direction(&self, i: usize, j: usize) -> Vec2 {
        let pair = ((i as u64) << 32) ^ (j as u64);
        let mut rng = SmallRng::seed_from_u64(self.seed ^ pair.wrapping_mul(0x9E37_79B9_7F4A_7C15));
        let angle = rng.gen::<f32>() * TAU;
        Vec2::new(angle.cos(), angle.sin())
    }
}
