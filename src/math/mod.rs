//! Math utilities module
//!
//! Provides convenient re-exports from glam and the transform node shared by
//! chain links and scene objects.

mod transform;

pub use transform::Transform;

// Re-export commonly used glam types
pub use glam::{Mat3, Mat4, Quat, Vec3};

/// Lengths below this are treated as zero in cross/normalize operations.
pub const EPSILON: f32 = 1e-6;
