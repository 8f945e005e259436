//! Per-particle density estimation.
//!
//! density(x) = Σ_j mass · W(|x - x_j|, h), the particle itself included.

use bevy::prelude::*;
use rayon::prelude::*;

use super::kernel::KernelCoefficients;
use super::spatial::SpatialLookup;

/// Densities below this are clamped before being used as a divisor.
pub const MIN_DENSITY: f32 = 1e-12;

/// Density estimator over a built spatial lookup.
#[derive(Clone, Copy, Debug)]
pub struct DensityField<'a> {
    pub lookup: &'a SpatialLookup,
    pub positions: &'a [Vec2],
    pub kernel: KernelCoefficients,
    pub mass: f32,
}

impl<'a> DensityField<'a> {
    pub fn new(
        lookup: &'a SpatialLookup,
        positions: &'a [Vec2],
        smoothing_radius: f32,
        mass: f32,
    ) -> Self {
        Self {
            lookup,
            positions,
            kernel: KernelCoefficients::new(smoothing_radius),
            mass,
        }
    }

    /// Density at an arbitrary sample point.
    pub fn density_at(&self, point: Vec2) -> f32 {
        let mut density = 0.0;
        self.lookup.for_each_candidate(point, |j| {
            let dst = (self.positions[j] - point).length();
            density += self.mass * self.kernel.value(dst);
        });
        density
    }

    /// Density of every particle, computed in parallel. Every value is
    /// written before this returns.
    pub fn compute_into(&self, densities: &mut Vec<f32>) {
        self.positions
            .par_iter()
            .map(|&p| self.density_at(p))
            .collect_into_vec(densities);
    }
}

/// Density clamped away from zero for use as a divisor.
#[inline]
pub fn safe_density(density: f32) -> f32 {
    density.max(MIN_DENSITY)
}
