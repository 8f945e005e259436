//! sph2d - 2D smoothed-particle hydrodynamics fluid solver
//!
//! This library simulates a fluid as a set of particles in a 2D box. Each step
//! estimates density with a smoothing kernel, turns density error into
//! pressure forces, integrates gravity and pressure, and bounces particles off
//! the box walls.
//!
//! # Features
//!
//! - **Spatial Hash**: Sorted cell-key lookup for near-constant-time neighbor search
//! - **Parallel Phases**: Density, pressure and integration fan out over rayon
//! - **Safe Stepping**: Bad configuration is rejected up front; non-finite frames are discarded
//! - **Bevy Integration**: Optional plugin that steps the simulation every update
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use sph2d::prelude::*;
//!
//! let params = FluidParams::default()
//!     .with_particle_count(2000)
//!     .with_gravity(10.0)
//!     .with_collision_damping(0.7);
//!
//! let mut simulation = FluidSimulation::new(params).unwrap();
//! simulation.step(0.016).unwrap();
//!
//! for position in simulation.positions() {
//!     // draw a particle at `position`
//! }
//! ```
//!
//! # Architecture
//!
//! - [`fluid`]: Core fluid simulation module
//!   - [`fluid::params`]: Simulation parameters
//!   - [`fluid::particle`]: Particle data structures
//!   - [`fluid::kernel`]: Smoothing kernel
//!   - [`fluid::spatial`]: Spatial hashing for neighbor search
//!   - [`fluid::density`]: Density estimation
//!   - [`fluid::pressure`]: Pressure forces
//!   - [`fluid::boundary`]: Boundary handling
//!   - [`fluid::integrator`]: Time integration
//!   - [`fluid::simulation`]: Step orchestration
//!   - [`fluid::plugin`]: Bevy plugin

pub mod fluid;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::fluid::prelude::*;
}
