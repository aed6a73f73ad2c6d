//! Radial density profiles of spherical point clouds.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use super::topography::mid_surface;
use super::{Profile, ProfileBin};
use crate::geom::{
    AccumulationDiagnostics, Point3, SphericalGrid, SurfaceError, SurfaceGrid, SurfaceResult,
    map_indices, spherical_area_volume,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DensityNormalization {
    /// Raw point counts per bin.
    #[default]
    Counts,
    /// Counts divided by the volume of the bin's shell.
    ShellVolume,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DensityProfileOptions {
    pub bin_count: usize,
    pub normalization: DensityNormalization,
    /// Outer edge of the last bin; the farthest point when `None`.
    pub max_radius: Option<f64>,
}

impl Default for DensityProfileOptions {
    fn default() -> Self {
        Self {
            bin_count: 50,
            normalization: DensityNormalization::Counts,
            max_radius: None,
        }
    }
}

impl DensityProfileOptions {
    #[must_use]
    pub fn with_bin_count(mut self, bin_count: usize) -> Self {
        self.bin_count = bin_count;
        self
    }

    #[must_use]
    pub fn with_normalization(mut self, normalization: DensityNormalization) -> Self {
        self.normalization = normalization;
        self
    }

    #[must_use]
    pub fn with_max_radius(mut self, max_radius: f64) -> Self {
        self.max_radius = Some(max_radius);
        self
    }
}

/// Options for [`relative_density_profile`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelativeDensityOptions {
    pub bin_count: usize,
    pub normalization: DensityNormalization,
    /// Upper edge of the last bin in units of the local mid-surface radius.
    pub max_ratio: f64,
    /// Volume the shell factors `k₂³ − k₁³` scale; the volume enclosed by the
    /// mid surface when `None`.
    pub reference_volume: Option<f64>,
}

impl Default for RelativeDensityOptions {
    fn default() -> Self {
        Self {
            bin_count: 50,
            normalization: DensityNormalization::Counts,
            max_ratio: 2.0,
            reference_volume: None,
        }
    }
}

impl RelativeDensityOptions {
    #[must_use]
    pub fn with_bin_count(mut self, bin_count: usize) -> Self {
        self.bin_count = bin_count;
        self
    }

    #[must_use]
    pub fn with_normalization(mut self, normalization: DensityNormalization) -> Self {
        self.normalization = normalization;
        self
    }

    #[must_use]
    pub fn with_max_ratio(mut self, max_ratio: f64) -> Self {
        self.max_ratio = max_ratio;
        self
    }

    #[must_use]
    pub fn with_reference_volume(mut self, volume: f64) -> Self {
        self.reference_volume = Some(volume);
        self
    }
}

enum RadialSample {
    Value(f64),
    Missing,
}

/// Bin radial samples over `[0, upper]` and apply the shell normalization.
fn radial_profile(
    samples: Vec<RadialSample>,
    bin_count: usize,
    upper: f64,
    normalization: DensityNormalization,
    shell_volume: impl Fn(f64, f64) -> f64,
) -> SurfaceResult<Profile> {
    if bin_count == 0 {
        return Err(SurfaceError::InvalidInput {
            reason: "density profile needs at least one bin".to_string(),
        });
    }
    if !upper.is_finite() || upper <= 0.0 {
        return Err(SurfaceError::InvalidExtent {
            dimension: "radial",
            extent: upper,
        });
    }

    let width = upper / bin_count as f64;
    let mut counts = vec![0usize; bin_count];
    let mut diagnostics = AccumulationDiagnostics::new();
    diagnostics.visited = samples.len();
    for sample in samples {
        match sample {
            RadialSample::Value(r) if r <= upper => {
                let k = ((r / width).floor() as usize).min(bin_count - 1);
                counts[k] += 1;
                diagnostics.used += 1;
            }
            RadialSample::Value(_) => diagnostics.out_of_bounds += 1,
            RadialSample::Missing => diagnostics.missing_data += 1,
        }
    }
    if diagnostics.excluded() > 0 {
        log::warn!("density profile: {}", diagnostics.summary());
    }

    let bins = counts
        .into_iter()
        .enumerate()
        .map(|(k, count)| {
            let lo = k as f64 * width;
            let hi = lo + width;
            let value = match normalization {
                DensityNormalization::Counts => count as f64,
                DensityNormalization::ShellVolume => count as f64 / shell_volume(lo, hi),
            };
            ProfileBin {
                center: lo + 0.5 * width,
                value,
                count,
            }
        })
        .collect();
    Ok(Profile { bins, diagnostics })
}

/// Histogram of point distance from `center`, optionally per shell volume
/// `4/3·π·(r₂³ − r₁³)`. Points beyond `max_radius` are counted as excluded.
///
/// # Errors
/// `EmptyPointSet` for no points, `InvalidInput` for zero bins,
/// `InvalidExtent` when every point sits on the center.
pub fn radial_density_profile(
    points: &[Point3],
    center: Point3,
    options: DensityProfileOptions,
) -> SurfaceResult<Profile> {
    if points.is_empty() {
        return Err(SurfaceError::EmptyPointSet {
            context: "radial density profile",
        });
    }
    let radii: Vec<f64> = points.iter().map(|p| p.distance_to(center)).collect();
    let upper = options
        .max_radius
        .unwrap_or_else(|| radii.iter().copied().fold(0.0, f64::max));
    let samples = radii.into_iter().map(RadialSample::Value).collect();
    radial_profile(
        samples,
        options.bin_count,
        upper,
        options.normalization,
        |lo, hi| 4.0 / 3.0 * PI * (hi.powi(3) - lo.powi(3)),
    )
}

/// Density against distance normalized by the local radius of the surface
/// midway between `outer` and `inner`, so a bin at ratio 1 follows the
/// mid surface even where it is not spherical.
///
/// # Errors
/// `EmptyPointSet` for no points, `GridShapeMismatch` or `InvalidGrid` when
/// the two grids do not share their geometry, `InvalidInput` for zero bins,
/// `InvalidExtent` for a non-positive `max_ratio`.
pub fn relative_density_profile(
    points: &[Point3],
    outer: &SphericalGrid,
    inner: &SphericalGrid,
    options: RelativeDensityOptions,
) -> SurfaceResult<Profile> {
    if points.is_empty() {
        return Err(SurfaceError::EmptyPointSet {
            context: "relative density profile",
        });
    }
    if outer.center() != inner.center() || outer.binning() != inner.binning() {
        return Err(SurfaceError::InvalidGrid {
            reason: "outer and inner surfaces must share center and binning".to_string(),
        });
    }
    let mid = mid_surface(outer, inner)?;
    let reference_volume = options
        .reference_volume
        .unwrap_or_else(|| spherical_area_volume(&mid).volume);

    let samples = map_indices(points.len(), |index| {
        let point = points[index];
        match mid.locate(index, point) {
            Ok((i, j)) => match mid.value(i, j) {
                Some(r_mid) if r_mid > 0.0 => RadialSample::Value(mid.sample(point) / r_mid),
                _ => RadialSample::Missing,
            },
            Err(_) => RadialSample::Missing,
        }
    });

    radial_profile(
        samples,
        options.bin_count,
        options.max_ratio,
        options.normalization,
        |lo, hi| reference_volume * (hi.powi(3) - lo.powi(3)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::PolarBinning;

    #[test]
    fn counts_per_shell() {
        let points = [
            Point3::new(0.5, 0.0, 0.0),
            Point3::new(0.0, 1.5, 0.0),
            Point3::new(0.0, 0.0, 1.6),
            Point3::new(0.0, 0.0, -2.0),
        ];
        let profile = radial_density_profile(
            &points,
            Point3::ORIGIN,
            DensityProfileOptions::default().with_bin_count(2),
        )
        .unwrap();
        assert_eq!(profile.bins.len(), 2);
        assert_eq!(profile.bins[0].count, 1);
        assert_eq!(profile.bins[1].count, 3);
        assert_eq!(profile.centers(), vec![0.5, 1.5]);
    }

    #[test]
    fn shell_volume_normalization() {
        let points = [Point3::new(0.5, 0.0, 0.0)];
        let profile = radial_density_profile(
            &points,
            Point3::ORIGIN,
            DensityProfileOptions::default()
                .with_bin_count(1)
                .with_max_radius(1.0)
                .with_normalization(DensityNormalization::ShellVolume),
        )
        .unwrap();
        assert!((profile.bins[0].value - 3.0 / (4.0 * PI)).abs() < 1e-12);
    }

    #[test]
    fn points_beyond_max_radius_are_excluded() {
        let points = [Point3::new(0.5, 0.0, 0.0), Point3::new(5.0, 0.0, 0.0)];
        let profile = radial_density_profile(
            &points,
            Point3::ORIGIN,
            DensityProfileOptions::default().with_bin_count(4).with_max_radius(1.0),
        )
        .unwrap();
        assert_eq!(profile.diagnostics.out_of_bounds, 1);
        assert_eq!(profile.bins.iter().map(|b| b.count).sum::<usize>(), 1);
    }

    #[test]
    fn relative_profile_tracks_the_mid_surface() {
        let outer =
            SphericalGrid::from_fn(Point3::ORIGIN, (12, 7), PolarBinning::Linear, |_, _| 12.0)
                .unwrap();
        let inner =
            SphericalGrid::from_fn(Point3::ORIGIN, (12, 7), PolarBinning::Linear, |_, _| 8.0)
                .unwrap();
        let points = [
            Point3::new(10.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 10.0),
            Point3::new(0.0, 15.0, 0.0),
        ];
        let profile = relative_density_profile(
            &points,
            &outer,
            &inner,
            RelativeDensityOptions::default().with_bin_count(4).with_max_ratio(2.0),
        )
        .unwrap();
        // ratios 1.0, 1.0, 1.5 with bins of width 0.5
        assert_eq!(profile.bins[2].count, 2);
        assert_eq!(profile.bins[3].count, 1);
    }
}
