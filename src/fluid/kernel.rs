//! Smoothing kernel used for density estimation and pressure gradients.
//!
//! The kernel is the 2D poly6 shape normalized to integrate to one over the
//! disc of radius h:
//!
//! W(d, h) = (h² - d²)³ / (π h⁸ / 4)   for |d| ≤ h
//!
//! All functions are pure and are called from rayon workers.

use std::f32::consts::PI;

/// SPH kernel functions.
pub struct SphKernels;

impl SphKernels {
    /// Smoothing kernel value at distance `dst` from the sample.
    /// Zero outside the radius, maximal at the center.
    #[inline]
    pub fn smoothing(radius: f32, dst: f32) -> f32 {
        if dst.abs() >= radius {
            return 0.0;
        }
        let volume = PI * radius.powi(8) / 4.0;
        let diff = radius * radius - dst * dst;
        diff * diff * diff / volume
    }

    /// Smoothing kernel with a precomputed `1 / volume` coefficient.
    #[inline]
    pub fn smoothing_with_coeff(radius: f32, dst: f32, coeff: f32) -> f32 {
        if dst.abs() >= radius {
            return 0.0;
        }
        let diff = radius * radius - dst * dst;
        coeff * diff * diff * diff
    }

    /// Radial derivative dW/dd. Negative inside the radius: the kernel decays
    /// with distance, so callers multiply by a direction and negate.
    #[inline]
    pub fn smoothing_derivative(dst: f32, radius: f32) -> f32 {
        if dst.abs() >= radius {
            return 0.0;
        }
        let scale = -24.0 / (PI * radius.powi(8));
        let diff = radius * radius - dst * dst;
        scale * dst * diff * diff
    }

    /// Radial derivative with a precomputed scale.
    #[inline]
    pub fn smoothing_derivative_with_coeff(dst: f32, radius: f32, scale: f32) -> f32 {
        if dst.abs() >= radius {
            return 0.0;
        }
        let diff = radius * radius - dst * dst;
        scale * dst * diff * diff
    }
}

/// Kernel coefficients for a fixed smoothing radius, computed once per step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KernelCoefficients {
    pub radius: f32,
    /// 4 / (π h⁸)
    pub smoothing: f32,
    /// -24 / (π h⁸)
    pub derivative: f32,
}

impl KernelCoefficients {
    pub fn new(radius: f32) -> Self {
        let h8 = radius.powi(8);
        Self {
            radius,
            smoothing: 4.0 / (PI * h8),
            derivative: -24.0 / (PI * h8),
        }
    }

    #[inline]
    pub fn value(&self, dst: f32) -> f32 {
        SphKernels::smoothing_with_coeff(self.radius, dst, self.smoothing)
    }

    #[inline]
    pub fn slope(&self, dst: f32) -> f32 {
        SphKernels::smoothing_derivative_with_coeff(dst, self.radius, self.derivative)
    }
}
