//! Errors raised while setting up a fluid simulation.
//!
//! Only configuration problems are errors. Numeric edge cases that show up
//! while stepping (coincident particles, a zero frame delta, particles that
//! left the grid) are absorbed by the simulation and reported in
//! [`StepReport`](super::simulation::StepReport) instead.

use thiserror::Error;

/// Configuration errors, raised before the first step.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FluidError {
    #[error("interaction radius must be positive, got {0}")]
    InvalidInteractionRadius(f32),

    #[error(
        "grid mode needs 1 to {max} cells per axis, got {0}",
        max = super::params::MAX_GRID_CELLS
    )]
    InvalidCellCount(u32),

    #[error("domain half-extent must be positive, got {0}")]
    InvalidHalfExtent(f32),

    #[error("wall inset {inset} must lie in (0, {half_extent})")]
    InvalidWallInset { inset: f32, half_extent: f32 },

    #[error("restitution must lie in [0, 1], got {0}")]
    InvalidRestitution(f32),

    #[error("spawn radius must be non-negative and finite, got {0}")]
    InvalidSpawnRadius(f32),
}

pub type FluidResult<T> = Result<T, FluidError>;
