//! Hierarchical collision detection
//!
//! Per-mesh AABB trees, OBB separating-axis tests and the recursive tree/tree
//! traversal that combines them.

mod aabb;
mod bvh;
mod engine;
mod obb;

pub use aabb::Aabb;
pub use bvh::{AabbTree, BvhNode, TreeConfig};
pub use engine::{CollisionEngine, TraversalStats};
pub use obb::{Obb, AXIS_EPSILON};
