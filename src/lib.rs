#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]

//! Surface descriptors for a smoothed surface fitted to a 3-D point cloud.
//!
//! Two topologies are supported: a planar height field `z(x, y)` over a
//! rectangular grid and a radial field `ρ(φ, θ)` over a spherical angular
//! grid. Every descriptor is a pure function over immutable per-frame input.
//!
//! - [`geom`]: vector and coordinate helpers, grids, fitting parameters,
//!   fit quality and surface metrology.
//! - [`analysis`]: density, order, thickness, topography and inertia.
//! - [`stats`]: moments, histograms and autocorrelation.
//!
//! The smoothing procedure that turns a point cloud into a grid field is
//! pluggable through [`geom::GridFitter`].

pub mod analysis;
pub mod geom;
pub mod stats;

pub use geom::{SurfaceError, SurfaceResult};
pub use stats::StatsError;
