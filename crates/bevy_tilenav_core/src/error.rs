//! Error types for level synthesis.

use thiserror::Error;

/// Errors produced while building a tile→world projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ProjectionError {
    /// A zero tile dimension collapses the projection and has no inverse.
    #[error("tile size {width}x{height} cannot be projected")]
    DegenerateTileSize { width: u32, height: u32 },
}

/// Errors produced by [`synthesize`](crate::synthesis::synthesize).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SynthesisError {
    #[error("Failed to project level: {0}")]
    Projection(#[from] ProjectionError),
}
