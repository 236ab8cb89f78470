//! Articulated chain model and the damped pursuit solver that bends it.

pub mod chain;
pub mod link;
pub mod solver;

pub use chain::{Chain, ChainBuilder, ChainSnapshot};
pub use link::Link;
pub use solver::{
    PursuitSolver, Retracted, Retraction, SolverConfig, StepOutcome, StepReport, Tracking,
};
