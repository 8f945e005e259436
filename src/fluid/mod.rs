//! 2D smoothed-particle hydrodynamics (SPH) simulation module.
//!
//! # Architecture
//!
//! The simulation is structured in the following components:
//!
//! - [`params`]: Simulation parameters (gravity, damping, pressure, bounds)
//! - [`error`]: Configuration and numeric errors
//! - [`particle`]: Particle arrays, initial grid layout, render snapshot
//! - [`kernel`]: Smoothing kernel and its radial derivative
//! - [`spatial`]: Sorted spatial hash for neighbor search
//! - [`density`]: Per-particle density estimation
//! - [`pressure`]: Pressure from density and pairwise pressure forces
//! - [`boundary`]: Bounding box collisions
//! - [`integrator`]: Gravity, pressure and position integration
//! - [`simulation`]: Per-step orchestration ([`FluidSimulation::step`])
//! - [`plugin`]: Bevy plugin that drives the step from an app
//!
//! # Example
//!
//! ```rust,no_run
//! use sph2d::fluid::prelude::*;
//!
//! let mut simulation = FluidSimulation::new(FluidParams::godot()).unwrap();
//! for _ in 0..60 {
//!     simulation.step(1.0 / 60.0).unwrap();
//! }
//! let positions = simulation.positions();
//! ```

pub mod params;
pub mod error;
pub mod particle;
pub mod kernel;
pub mod spatial;
pub mod density;
pub mod pressure;
pub mod boundary;
pub mod integrator;
pub mod simulation;
pub mod plugin;

pub use simulation::FluidSimulation;

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::params::*;
    pub use super::error::*;
    pub use super::particle::*;
    pub use super::kernel::*;
    pub use super::spatial::*;
    pub use super::density::*;
    pub use super::pressure::*;
    pub use super::boundary::*;
    pub use super::integrator::*;
    pub use super::simulation::*;
    pub use super::plugin::*;
}
