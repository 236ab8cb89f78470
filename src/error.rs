//! Error types for input handed to the core by its collaborators.
//!
//! Broken internal invariants (a link index past the end of a chain, a tree
//! without a root) are bugs and panic instead of showing up here.

use thiserror::Error;

/// Malformed vertex/face buffers passed to [`crate::collision::AabbTree::build`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MeshError {
    #[error("mesh has no faces")]
    Empty,

    #[error("face {face} references vertex {vertex}, but the mesh has {vertex_count} vertices")]
    FaceIndexOutOfRange {
        face: usize,
        vertex: u32,
        vertex_count: usize,
    },

    #[error("vertex {index} is not finite")]
    NonFiniteVertex { index: usize },

    #[error("link {link} uses mesh {handle}, but only {registered} meshes are registered")]
    UnregisteredHandle {
        link: usize,
        handle: usize,
        registered: usize,
    },
}

/// Rejected chain construction or restore.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChainError {
    #[error("a chain needs at least one link")]
    NoLinks,

    #[error("link length must be positive and finite, got {0}")]
    InvalidLinkLength(f32),

    #[error("chain direction must be a non-zero vector")]
    ZeroDirection,

    #[error("snapshot holds {found} links, chain has {expected}")]
    SnapshotLengthMismatch { expected: usize, found: usize },
}
