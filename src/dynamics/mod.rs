//! Ballistic motion of the free bodies in the arena.

mod motion;

pub use motion::{ArenaConfig, MotionIntegrator, TargetBody};
