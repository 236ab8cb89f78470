//! # snake-ik
//!
//! Simulation core of a snake-hunting game: an articulated chain pursued
//! toward moving targets by a damped cyclic-coordinate-descent solver,
//! hierarchical OBB collision between meshes, and a bouncing-ball integrator.
//!
//! ## Features
//! - Rigid chain model with per-link pivots, inversion and snapshots
//! - Per-tick damped pursuit with out-of-reach retraction and chain inversion
//! - Median-split AABB trees and 15-axis separating-axis OBB tests
//! - Gravity, floor bounce and wall reflection for targets
//! - Scoring and level progression in [`game::Session`]
//!
//! ## Example
//! ```rust,ignore
//! use snake_ik::ik::{Chain, PursuitSolver};
//! use glam::Vec3;
//!
//! let mut chain = Chain::builder().links(10).link_length(1.0).build()?;
//! let mut solver = PursuitSolver::default();
//! solver.acquire();
//!
//! let target = Vec3::new(3.0, 0.0, 4.0);
//! while solver.is_tracking() {
//!     let report = solver.step(&mut chain, target);
//!     println!("{:?} at distance {}", report.outcome, report.distance);
//! }
//! ```

pub mod collision;
pub mod dynamics;
pub mod error;
pub mod game;
pub mod ik;
pub mod math;
pub mod mesh;

pub use collision::{Aabb, AabbTree, CollisionEngine, Obb, TraversalStats, TreeConfig};
pub use dynamics::{ArenaConfig, MotionIntegrator, TargetBody};
pub use error::{ChainError, MeshError};
pub use game::{GameEvent, Session, SessionConfig};
pub use ik::{Chain, ChainBuilder, Link, PursuitSolver, SolverConfig, StepOutcome};
pub use math::Transform;
pub use mesh::{MeshData, MeshHandle};
