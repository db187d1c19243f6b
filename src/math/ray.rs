//! Ray type and operations

use crate::core::types::Vec3;

/// Smallest magnitude kept for a direction component. Anything nearer zero is
/// replaced by this value with the original sign so per-axis reciprocals stay finite.
pub const RAY_EPSILON: f32 = 1e-20;

/// A ray defined by origin and direction
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Create a new ray, clamping near-zero direction components.
    ///
    /// The direction does not need to be normalized.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: Vec3::new(
                clamp_component(direction.x),
                clamp_component(direction.y),
                clamp_component(direction.z),
            ),
        }
    }

    /// Get point along ray at parameter t
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Per-axis reciprocal of the direction
    pub fn inv_direction(&self) -> Vec3 {
        self.direction.recip()
    }
}

fn clamp_component(v: f32) -> f32 {
    if v.abs() < RAY_EPSILON {
        // copysign keeps -0.0 negative
        RAY_EPSILON.copysign(v)
    } else {
        v
    }
}
