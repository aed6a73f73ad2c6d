//! Grid-fitting control parameters derived from a point cloud.
//!
//! The smoothing procedure itself lives outside this crate behind
//! [`GridFitter`]; this module only derives the numbers it consumes: the
//! fitting radius, the smoothing strength `alpha` and the grid resolution.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use super::coords::cloud_to_spherical;
use super::grid::{PlanarExtent, SurfaceGrid};
use super::{PointCloud, Point3, SurfaceError, SurfaceResult};

/// Calibrated coefficients of the empirical `alpha` fit. They are part of
/// the model, not tunables.
pub const CARTESIAN_ALPHA_SLOPE: f64 = 0.4247;
pub const CARTESIAN_ALPHA_OFFSET: f64 = 1.3501;
pub const SPHERICAL_ALPHA_SLOPE: f64 = 0.4984;
pub const SPHERICAL_ALPHA_OFFSET: f64 = 1.060_161_102_29;

/// Roughness factors above this are outside the calibrated range.
pub const MAX_CALIBRATED_ROUGHNESS: f64 = 1.0;

/// Fitting radius and smoothing strength for one topology.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridParameters {
    pub fitting_radius: f64,
    pub smoothing_strength: f64,
    /// Points per unit area used for `smoothing_strength`.
    pub density: f64,
}

/// Everything a [`GridFitter`] needs besides the cloud.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitParameters {
    pub fitting_radius: f64,
    pub smoothing_strength: f64,
    pub bin_count: usize,
}

/// Options for [`estimate_fit_parameters_planar`] and
/// [`estimate_fit_parameters_spherical`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitParameterOptions {
    /// User roughness factor `r` (default 1.0).
    pub roughness: f64,
    /// Overrides the derived bin count.
    pub bin_count: Option<usize>,
}

impl Default for FitParameterOptions {
    fn default() -> Self {
        Self {
            roughness: 1.0,
            bin_count: None,
        }
    }
}

impl FitParameterOptions {
    #[must_use]
    pub fn with_roughness(mut self, roughness: f64) -> Self {
        self.roughness = roughness;
        self
    }

    #[must_use]
    pub fn with_bin_count(mut self, bin_count: usize) -> Self {
        self.bin_count = Some(bin_count);
        self
    }
}

/// Produces a populated grid from a cloud and its fit parameters.
///
/// The kernel regression behind a real fitter is not part of this crate;
/// callers plug their own implementation in here.
pub trait GridFitter {
    type Grid: SurfaceGrid;

    /// # Errors
    /// Implementation-defined; typically `InsufficientPoints` or
    /// `InvalidGrid`.
    fn fit(&self, cloud: &PointCloud, params: &FitParameters) -> SurfaceResult<Self::Grid>;
}

fn check_point_count(num_points: usize) -> SurfaceResult<()> {
    if num_points < 2 {
        return Err(SurfaceError::InsufficientPoints {
            provided: num_points,
            required: 2,
        });
    }
    Ok(())
}

fn check_roughness(roughness: f64) -> SurfaceResult<()> {
    if !roughness.is_finite() || roughness <= 0.0 {
        return Err(SurfaceError::InvalidRoughness { roughness });
    }
    if roughness > MAX_CALIBRATED_ROUGHNESS {
        log::warn!(
            "roughness {roughness} exceeds the calibrated range (0, {MAX_CALIBRATED_ROUGHNESS}]"
        );
    }
    Ok(())
}

fn smoothing_strength(slope: f64, offset: f64, roughness: f64, density: f64) -> f64 {
    (slope * roughness * density.ln() - offset / roughness).exp()
}

/// Planar parameters: `r_fit = 3·D/√(N−1)` with `D` the extent diagonal and
/// `alpha = exp(0.4247·r·ln(N/area) − 1.3501/r)`.
///
/// # Errors
/// `InsufficientPoints` for `num_points < 2`, `InvalidRoughness` for a
/// non-positive roughness, `InvalidExtent` for a degenerate extent.
pub fn grid_parameters_cartesian(
    extent: PlanarExtent,
    num_points: usize,
    roughness: f64,
) -> SurfaceResult<GridParameters> {
    check_point_count(num_points)?;
    check_roughness(roughness)?;
    let extent = extent.validate()?;

    let fitting_radius = 3.0 * extent.diagonal() / ((num_points - 1) as f64).sqrt();
    let density = num_points as f64 / extent.area();
    let params = GridParameters {
        fitting_radius,
        smoothing_strength: smoothing_strength(
            CARTESIAN_ALPHA_SLOPE,
            CARTESIAN_ALPHA_OFFSET,
            roughness,
            density,
        ),
        density,
    };
    log::debug!(
        "planar grid parameters: N={num_points} r={roughness} r_fit={:.4} alpha={:.6}",
        params.fitting_radius,
        params.smoothing_strength
    );
    Ok(params)
}

/// Spherical parameters for a cloud of mean radius `radius`:
/// `r_fit = 6·R·π/√(N−1)` and
/// `alpha = exp(0.4984·r·ln(N/4πR²) − 1.06016110229/r)`.
///
/// # Errors
/// As [`grid_parameters_cartesian`]; `InvalidExtent` for a non-positive
/// radius.
pub fn grid_parameters_spherical(
    radius: f64,
    num_points: usize,
    roughness: f64,
) -> SurfaceResult<GridParameters> {
    check_point_count(num_points)?;
    check_roughness(roughness)?;
    if !radius.is_finite() || radius <= 0.0 {
        return Err(SurfaceError::InvalidExtent {
            dimension: "radial",
            extent: radius,
        });
    }

    let fitting_radius = 6.0 * radius * PI / ((num_points - 1) as f64).sqrt();
    let density = num_points as f64 / (4.0 * PI * radius * radius);
    let params = GridParameters {
        fitting_radius,
        smoothing_strength: smoothing_strength(
            SPHERICAL_ALPHA_SLOPE,
            SPHERICAL_ALPHA_OFFSET,
            roughness,
            density,
        ),
        density,
    };
    log::debug!(
        "spherical grid parameters: N={num_points} R={radius:.4} r={roughness} r_fit={:.4} alpha={:.6}",
        params.fitting_radius,
        params.smoothing_strength
    );
    Ok(params)
}

/// Planar bins per axis: `round(√(n−1) − 1)`, at least 1.
///
/// # Errors
/// `InsufficientPoints` for `n_index < 2`.
pub fn bin_count_cartesian(n_index: usize) -> SurfaceResult<usize> {
    check_point_count(n_index)?;
    let bins = (((n_index - 1) as f64).sqrt() - 1.0).round();
    Ok((bins as usize).max(1))
}

/// Spherical bins per angle: `round(√(2(n−1)))`, at least 1.
///
/// # Errors
/// `InsufficientPoints` for `n_index < 2`.
pub fn bin_count_spherical(n_index: usize) -> SurfaceResult<usize> {
    check_point_count(n_index)?;
    let bins = (2.0 * (n_index - 1) as f64).sqrt().round();
    Ok((bins as usize).max(1))
}

/// Fit parameters for a planar surface, taking extent and count from the
/// cloud itself.
///
/// # Errors
/// As [`grid_parameters_cartesian`]; `EmptyPointSet` for an empty cloud.
pub fn estimate_fit_parameters_planar(
    cloud: &PointCloud,
    options: FitParameterOptions,
) -> SurfaceResult<FitParameters> {
    let extent = cloud.bounds().map(PlanarExtent::from_bbox).ok_or(
        SurfaceError::EmptyPointSet {
            context: "planar fit parameters",
        },
    )?;
    let grid = grid_parameters_cartesian(extent, cloud.len(), options.roughness)?;
    let bin_count = match options.bin_count {
        Some(bins) => bins.max(1),
        None => bin_count_cartesian(cloud.len())?,
    };
    Ok(FitParameters {
        fitting_radius: grid.fitting_radius,
        smoothing_strength: grid.smoothing_strength,
        bin_count,
    })
}

/// Fit parameters for a closed surface around `center`, using the cloud's
/// mean radius about it.
///
/// # Errors
/// As [`grid_parameters_spherical`]; `EmptyPointSet` for an empty cloud.
pub fn estimate_fit_parameters_spherical(
    cloud: &PointCloud,
    center: Point3,
    options: FitParameterOptions,
) -> SurfaceResult<FitParameters> {
    let spherical = cloud_to_spherical(cloud.positions(), center)?;
    let grid = grid_parameters_spherical(spherical.mean_radius, cloud.len(), options.roughness)?;
    let bin_count = match options.bin_count {
        Some(bins) => bins.max(1),
        None => bin_count_spherical(cloud.len())?,
    };
    Ok(FitParameters {
        fitting_radius: grid.fitting_radius,
        smoothing_strength: grid.smoothing_strength,
        bin_count,
    })
}
