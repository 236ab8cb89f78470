//! Gameplay loop on top of the chain, solver, integrator and collision engine.

mod session;

pub use session::{GameEvent, LevelConfig, Scoreboard, Session, SessionConfig};
