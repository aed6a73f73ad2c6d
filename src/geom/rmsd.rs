//! Root-mean-square deviation between points and their fitted surface.
//!
//! One generic routine serves all three conventions; the grid decides how a
//! point maps to a node:
//! - planar: nearest `(x, y)` node, deviation in `z`;
//! - spherical: nearest `(φ, θ)` node, deviation in `ρ`;
//! - inertia-aligned: spherical with [`PolarBinning::Cosine`] rows, on a
//!   cloud rotated into its principal frame.

use serde::Serialize;

use super::diagnostics::AccumulationDiagnostics;
use super::grid::{PlanarGrid, PolarBinning, SphericalGrid, SurfaceGrid};
use super::reduce::map_indices;
use super::{Point3, SurfaceError, SurfaceResult};
use crate::analysis::PrincipalAxes;

/// Points paired with the surface fitted to them.
#[derive(Debug, Clone, Copy)]
pub struct FittedSurface<'a, G> {
    pub points: &'a [Point3],
    pub grid: &'a G,
}

impl<'a, G> FittedSurface<'a, G> {
    #[must_use]
    pub const fn new(points: &'a [Point3], grid: &'a G) -> Self {
        Self { points, grid }
    }
}

/// Fit quality over one or more surfaces.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitQuality {
    pub rmsd: f64,
    /// Points that contributed a deviation.
    pub used: usize,
    /// Points skipped: outside the grid or on a node without data.
    pub excluded: usize,
    pub diagnostics: AccumulationDiagnostics,
}

enum Deviation {
    Squared(f64),
    OutOfBounds(SurfaceError),
    Missing,
}

/// RMSD `√(Σ dev² / n)` pooled over every surface, where `n` counts the
/// points that contributed (`n₁ + n₂` for two leaflets).
///
/// # Errors
/// `EmptyPointSet` when no point contributed at all.
pub fn pooled_rmsd<G: SurfaceGrid>(surfaces: &[FittedSurface<'_, G>]) -> SurfaceResult<FitQuality> {
    let mut sum_sq = 0.0;
    let mut diagnostics = AccumulationDiagnostics::new();

    for surface in surfaces {
        let grid = surface.grid;
        let deviations = map_indices(surface.points.len(), |index| {
            let point = surface.points[index];
            match grid.locate(index, point) {
                Err(err) => Deviation::OutOfBounds(err),
                Ok((i, j)) => match grid.value(i, j) {
                    Some(field) => {
                        let dev = grid.sample(point) - field;
                        Deviation::Squared(dev * dev)
                    }
                    None => Deviation::Missing,
                },
            }
        });

        diagnostics.visited += deviations.len();
        for deviation in deviations {
            match deviation {
                Deviation::Squared(sq) => {
                    sum_sq += sq;
                    diagnostics.used += 1;
                }
                Deviation::OutOfBounds(err) => {
                    log::warn!("rmsd: excluding point: {err}");
                    diagnostics.out_of_bounds += 1;
                    diagnostics.add_warning(err.to_string());
                }
                Deviation::Missing => diagnostics.missing_data += 1,
            }
        }
    }

    if diagnostics.used == 0 {
        return Err(SurfaceError::EmptyPointSet { context: "rmsd" });
    }
    let rmsd = (sum_sq / diagnostics.used as f64).sqrt();
    log::debug!("rmsd {rmsd:.6} ({})", diagnostics.summary());
    Ok(FitQuality {
        rmsd,
        used: diagnostics.used,
        excluded: diagnostics.excluded(),
        diagnostics,
    })
}

/// RMSD of one planar surface.
///
/// # Errors
/// As [`pooled_rmsd`].
pub fn planar_rmsd(grid: &PlanarGrid, points: &[Point3]) -> SurfaceResult<FitQuality> {
    pooled_rmsd(&[FittedSurface::new(points, grid)])
}

/// RMSD of one spherical surface.
///
/// # Errors
/// As [`pooled_rmsd`].
pub fn spherical_rmsd(grid: &SphericalGrid, points: &[Point3]) -> SurfaceResult<FitQuality> {
    pooled_rmsd(&[FittedSurface::new(points, grid)])
}

/// RMSD of a surface fitted in the principal-inertia frame.
///
/// `points` are given in the lab frame and rotated with `axes` first. The
/// grid must use cosine polar binning and be centered on the principal
/// frame origin.
///
/// # Errors
/// `InvalidGrid` for a linearly binned grid, otherwise as [`pooled_rmsd`].
pub fn inertia_aligned_rmsd(
    grid: &SphericalGrid,
    points: &[Point3],
    axes: &PrincipalAxes,
) -> SurfaceResult<FitQuality> {
    if grid.binning() != PolarBinning::Cosine {
        return Err(SurfaceError::InvalidGrid {
            reason: "inertia-aligned rmsd needs cosine polar binning".to_string(),
        });
    }
    let rotated: Vec<Point3> = points.iter().map(|&p| axes.to_principal_frame(p)).collect();
    pooled_rmsd(&[FittedSurface::new(&rotated, grid)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_leaflets_pool_their_points() {
        let top = PlanarGrid::from_fn((0.0, 0.0), (1.0, 1.0), (3, 3), |_, _| 1.0).unwrap();
        let bottom = PlanarGrid::from_fn((0.0, 0.0), (1.0, 1.0), (3, 3), |_, _| -1.0).unwrap();
        let top_points = [Point3::new(0.0, 0.0, 2.0), Point3::new(1.0, 1.0, 1.0)];
        let bottom_points = [Point3::new(2.0, 2.0, -1.0), Point3::new(1.0, 0.0, -1.0)];

        let quality = pooled_rmsd(&[
            FittedSurface::new(&top_points, &top),
            FittedSurface::new(&bottom_points, &bottom),
        ])
        .unwrap();

        assert_eq!(quality.used, 4);
        assert!((quality.rmsd - 0.5).abs() < 1e-12);
    }

    #[test]
    fn missing_nodes_are_skipped() {
        let mut values = vec![0.0; 9];
        values[4] = f64::NAN;
        let grid = PlanarGrid::new((0.0, 0.0), (1.0, 1.0), (3, 3), values).unwrap();
        let points = [Point3::new(1.0, 1.0, 5.0), Point3::new(0.0, 0.0, 0.0)];
        let quality = planar_rmsd(&grid, &points).unwrap();
        assert_eq!(quality.used, 1);
        assert_eq!(quality.diagnostics.missing_data, 1);
        assert_eq!(quality.rmsd, 0.0);
    }

    #[test]
    fn linear_grid_rejected_for_inertia_alignment() {
        let grid =
            SphericalGrid::from_fn(Point3::ORIGIN, (4, 3), PolarBinning::Linear, |_, _| 1.0)
                .unwrap();
        let axes = PrincipalAxes::identity();
        assert!(matches!(
            inertia_aligned_rmsd(&grid, &[Point3::new(1.0, 0.0, 0.0)], &axes),
            Err(SurfaceError::InvalidGrid { .. })
        ));
    }
}
