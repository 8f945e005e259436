//! Fluid simulation core logic.
//!
//! [`FluidSimulation::step`] is the single entry point external collaborators
//! drive. Each step runs these phases, each one fully completed before the
//! next starts:
//!
//! 1. rebuild the spatial lookup from current positions
//! 2. density of every particle
//! 3. pressure acceleration of every particle
//! 4. integrate gravity and pressure, move, resolve wall collisions
//!
//! Phases 2 and 4 write into scratch buffers that are swapped in only once every
//! particle is known to be finite, so readers never see a half-applied or
//! corrupted frame.

use bevy::log::{debug, error, trace};
use bevy::prelude::*;

use super::density::DensityField;
use super::error::FluidError;
use super::integrator::Integrator;
use super::params::FluidParams;
use super::particle::{GridLayout, ParticleInstance, ParticleSet};
use super::pressure::PressureSolver;
use super::spatial::SpatialLookup;

/// Summary of one completed step.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StepStats {
    /// Frame number after the step.
    pub frame: u64,
    /// Simulated time covered by the step.
    pub dt: f32,
    pub average_density: f32,
    /// Mean of |ρ - ρ₀| / ρ₀.
    pub average_density_error: f32,
    pub max_speed: f32,
}

/// Main fluid simulation resource.
///
/// Owns the particle arrays exclusively; a step takes `&mut self`, so no
/// reader can observe the arrays mid-step.
#[derive(Resource, Clone, Debug)]
pub struct FluidSimulation {
    params: FluidParams,
    particles: ParticleSet,
    lookup: SpatialLookup,
    /// Pressure accelerations of the current step.
    accelerations: Vec<Vec2>,
    /// Step outputs, swapped with the live arrays on success.
    next_densities: Vec<f32>,
    next_positions: Vec<Vec2>,
    next_velocities: Vec<Vec2>,
    frame: u64,
    time: f64,
    last_stats: StepStats,
}

impl FluidSimulation {
    /// Validate the parameters and lay the particles out in a centered grid.
    pub fn new(params: FluidParams) -> Result<Self, FluidError> {
        params.validate()?;
        let particles = GridLayout::from_params(&params).build();
        Ok(Self::assemble(params, particles))
    }

    /// Start from an explicit particle set instead of the grid layout.
    /// The particle count in `params` is replaced by the set's length.
    ///
    /// Every position needs a velocity. Densities are recomputed each step,
    /// so that array is resized to match.
    pub fn from_particles(mut params: FluidParams, mut particles: ParticleSet) -> Result<Self, FluidError> {
        if particles.velocities.len() != particles.positions.len() {
            return Err(FluidError::ParticleArrayMismatch {
                positions: particles.positions.len(),
                velocities: particles.velocities.len(),
            });
        }
        particles.densities.resize(particles.positions.len(), 0.0);

        params.particle_count = particles.len() as u32;
        params.validate()?;
        Ok(Self::assemble(params, particles))
    }

    fn assemble(params: FluidParams, particles: ParticleSet) -> Self {
        let n = particles.len();
        let lookup = SpatialLookup::new(params.resolved_table_size());
        debug!(
            "fluid simulation ready: {} particles, hash table {}",
            n,
            lookup.table_size()
        );
        Self {
            params,
            particles,
            lookup,
            accelerations: Vec::with_capacity(n),
            next_densities: Vec::with_capacity(n),
            next_positions: Vec::with_capacity(n),
            next_velocities: Vec::with_capacity(n),
            frame: 0,
            time: 0.0,
            last_stats: StepStats::default(),
        }
    }

    /// Advance the simulation by `dt` seconds.
    ///
    /// A non-positive or non-finite `dt` leaves the state untouched. On a
    /// non-finite result the whole frame is discarded and the previous state
    /// kept.
    pub fn step(&mut self, dt: f32) -> Result<StepStats, FluidError> {
        self.params.check_inputs()?;

        if !(dt.is_finite() && dt > 0.0) {
            return Ok(StepStats {
                frame: self.frame,
                dt: 0.0,
                ..self.last_stats
            });
        }

        let params = &self.params;
        let h = params.smoothing_radius;

        self.lookup.build(&self.particles.positions, h);

        DensityField::new(&self.lookup, &self.particles.positions, h, params.particle_mass)
            .compute_into(&mut self.next_densities);

        PressureSolver::new(
            params,
            &self.lookup,
            &self.particles.positions,
            &self.next_densities,
            self.frame,
        )
        .compute_into(&mut self.accelerations);

        Integrator::from_params(params).advance_all(
            &self.particles.positions,
            &self.particles.velocities,
            &self.accelerations,
            dt,
            &mut self.next_positions,
            &mut self.next_velocities,
        );

        if let Some(particle) = self
            .next_positions
            .iter()
            .zip(&self.next_velocities)
            .position(|(x, v)| !x.is_finite() || !v.is_finite())
        {
            error!(
                "frame {} discarded: particle {} is not finite (density {})",
                self.frame, particle, self.next_densities[particle]
            );
            return Err(FluidError::NonFiniteState { particle });
        }

        std::mem::swap(&mut self.particles.densities, &mut self.next_densities);
        std::mem::swap(&mut self.particles.positions, &mut self.next_positions);
        std::mem::swap(&mut self.particles.velocities, &mut self.next_velocities);

        self.frame += 1;
        self.time += dt as f64;
        self.last_stats = self.collect_stats(dt);

        trace!(
            "frame {}: avg density {:.6}, density error {:.2}%, max speed {:.1}",
            self.frame,
            self.last_stats.average_density,
            self.last_stats.average_density_error * 100.0,
            self.last_stats.max_speed
        );

        Ok(self.last_stats)
    }

    fn collect_stats(&self, dt: f32) -> StepStats {
        let n = self.particles.len().max(1) as f32;
        let average_density = self.particles.densities.iter().sum::<f32>() / n;
        let max_speed = self
            .particles
            .velocities
            .iter()
            .map(|v| v.length())
            .fold(0.0, f32::max);

        StepStats {
            frame: self.frame,
            dt,
            average_density,
            average_density_error: self.average_density_error(),
            max_speed,
        }
    }

    /// Replace the parameters between steps.
    ///
    /// Changing the particle count, radius, spacing or bounds lays the
    /// particles out again; everything else applies from the next step on.
    pub fn apply_params(&mut self, params: FluidParams) -> Result<(), FluidError> {
        params.validate()?;

        let relayout = params.changes_layout(&self.params);
        if params.resolved_table_size() != self.lookup.table_size() {
            self.lookup.resize(params.resolved_table_size());
        }
        self.params = params;

        if relayout {
            debug!(
                "layout changed, arranging {} particles again",
                self.params.particle_count
            );
            self.particles = GridLayout::from_params(&self.params).build();
        }
        Ok(())
    }

    /// Lay the particles out again and restart the clock.
    pub fn reset(&mut self) {
        self.particles = GridLayout::from_params(&self.params).build();
        self.frame = 0;
        self.time = 0.0;
        self.last_stats = StepStats::default();
    }

    pub fn params(&self) -> &FluidParams {
        &self.params
    }

    /// Returns the number of particles.
    pub fn num_particles(&self) -> usize {
        self.particles.len()
    }

    pub fn positions(&self) -> &[Vec2] {
        &self.particles.positions
    }

    pub fn velocities(&self) -> &[Vec2] {
        &self.particles.velocities
    }

    /// Densities computed by the last step.
    pub fn densities(&self) -> &[f32] {
        &self.particles.densities
    }

    pub fn particles(&self) -> &ParticleSet {
        &self.particles
    }

    /// Spatial lookup built by the last step.
    pub fn lookup(&self) -> &SpatialLookup {
        &self.lookup
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Total simulated time in seconds.
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn last_stats(&self) -> StepStats {
        self.last_stats
    }

    /// Get average density error (for debugging).
    pub fn average_density_error(&self) -> f32 {
        let rho0 = self.params.target_density;
        if self.particles.densities.is_empty() || rho0 <= 0.0 {
            return 0.0;
        }
        let sum: f32 = self
            .particles
            .densities
            .iter()
            .map(|&d| (d - rho0).abs() / rho0)
            .sum();
        sum / self.particles.densities.len() as f32
    }

    /// Snapshot of every particle for a renderer.
    pub fn instances(&self) -> Vec<ParticleInstance> {
        self.particles
            .positions
            .iter()
            .zip(&self.particles.velocities)
            .map(|(&p, &v)| ParticleInstance::new(p, v))
            .collect()
    }

    /// Snapshot as raw bytes, ready for a buffer upload.
    pub fn instance_bytes(&self) -> Vec<u8> {
        bytemuck::cast_slice(&self.instances()).to_vec()
    }
}
