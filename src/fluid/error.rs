//! Error type for simulation setup and stepping.

use bevy::prelude::*;

/// Errors reported by the fluid core.
///
/// Zero-distance neighbors are not an error: the pressure solver substitutes a
/// random direction and carries on.
#[derive(Debug, Clone, PartialEq)]
pub enum FluidError {
    /// The particle count is zero.
    NoParticles,
    /// Smoothing radius is zero, negative or not finite.
    InvalidSmoothingRadius(f32),
    /// One of the bounding half-extents is zero, negative or not finite.
    InvalidBounds(Vec2),
    /// Particle radius is zero, negative or not finite.
    InvalidParticleRadius(f32),
    /// The spatial hash table has fewer slots than there are particles.
    HashTableUndersize { table_size: u32, particle_count: u32 },
    /// A supplied particle set has fewer or more velocities than positions.
    ParticleArrayMismatch { positions: usize, velocities: usize },
    /// A step produced a NaN or infinite value; the frame was discarded.
    NonFiniteState { particle: usize },
}

impl std::fmt::Display for FluidError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FluidError::NoParticles => write!(f, "particle count must be greater than zero"),
            FluidError::InvalidSmoothingRadius(h) => {
                write!(f, "smoothing radius must be positive, got {h}")
            }
            FluidError::InvalidBounds(half) => {
                write!(f, "bounding half-extents must be positive, got {half:?}")
            }
            FluidError::InvalidParticleRadius(r) => {
                write!(f, "particle radius must be positive, got {r}")
            }
            FluidError::HashTableUndersize {
                table_size,
                particle_count,
            } => write!(
                f,
                "hash table size {table_size} is smaller than particle count {particle_count}"
            ),
            FluidError::ParticleArrayMismatch {
                positions,
                velocities,
            } => write!(
                f,
                "particle set has {positions} positions but {velocities} velocities"
            ),
            FluidError::NonFiniteState { particle } => {
                write!(f, "particle {particle} reached a non-finite state, frame discarded")
            }
        }
    }
}

impl std::error::Error for FluidError {}

impl FluidError {
    /// Whether the error comes from configuration rather than a running step.
    pub fn is_configuration(&self) -> bool {
        !matches!(self, FluidError::NonFiniteState { .. })
    }
}
