use thiserror::Error;

use super::{Point3, Vec3};
use crate::stats::StatsError;

/// Result alias used by every surface kernel.
pub type SurfaceResult<T> = Result<T, SurfaceError>;

/// Failures of the geometric and descriptor kernels.
///
/// Precondition violations are returned to the caller. `OutOfGridBounds`,
/// `DegenerateTriangle` and `DegenerateVector` are also produced per item
/// during bulk accumulation, where they are counted and skipped instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SurfaceError {
    #[error("at least {required} points are required, got {provided}")]
    InsufficientPoints { provided: usize, required: usize },

    #[error("roughness must be finite and positive: {roughness}")]
    InvalidRoughness { roughness: f64 },

    #[error(
        "point {point_index} maps to fractional index ({i:.3}, {j:.3}), \
         more than one cell outside a {nx}x{ny} grid"
    )]
    OutOfGridBounds {
        point_index: usize,
        i: f64,
        j: f64,
        nx: usize,
        ny: usize,
    },

    #[error("triangle has coincident vertices: {vertices:?}")]
    DegenerateTriangle { vertices: [Point3; 3] },

    #[error("cannot normalize zero-length vector {vector:?}")]
    DegenerateVector { vector: Vec3 },

    #[error("{context}: no points to accumulate")]
    EmptyPointSet { context: &'static str },

    #[error("{dimension} extent must be finite and positive: {extent}")]
    InvalidExtent { dimension: &'static str, extent: f64 },

    #[error("invalid grid: {reason}")]
    InvalidGrid { reason: String },

    #[error("grid shapes differ: {left:?} vs {right:?}")]
    GridShapeMismatch {
        left: (usize, usize),
        right: (usize, usize),
    },

    #[error("point cloud has no {attribute} column")]
    MissingAttribute { attribute: &'static str },

    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error(transparent)]
    Stats(#[from] StatsError),
}
