//! Vector helpers and Cartesian/spherical conversion.
//!
//! Spherical coordinates follow the physics convention: `phi` is the
//! azimuth in the x-y plane measured from +x, normalized to `[0, 2π)`, and
//! `theta` is the polar angle measured from +z in `[0, π]`.

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use super::grid::{SphericalGrid, SurfaceGrid};
use super::{Point3, SurfaceError, SurfaceResult, Tolerance, Vec3};

#[must_use]
pub const fn cross(a: Vec3, b: Vec3) -> Vec3 {
    a.cross(b)
}

#[must_use]
pub const fn dot(a: Vec3, b: Vec3) -> f64 {
    a.dot(b)
}

#[must_use]
pub fn magnitude(v: Vec3) -> f64 {
    v.length()
}

/// Unit vector along `v`.
///
/// # Errors
/// `DegenerateVector` when `v` is shorter than [`Tolerance::ZERO_LENGTH`]
/// or not finite.
pub fn normalize(v: Vec3) -> SurfaceResult<Vec3> {
    v.normalized()
        .ok_or(SurfaceError::DegenerateVector { vector: v })
}

/// Spherical coordinates `(ρ, φ, θ)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SphericalCoord {
    pub rho: f64,
    pub phi: f64,
    pub theta: f64,
}

impl SphericalCoord {
    #[must_use]
    pub const fn new(rho: f64, phi: f64, theta: f64) -> Self {
        Self { rho, phi, theta }
    }

    /// Unit vector pointing along `(φ, θ)`.
    #[must_use]
    pub fn direction(self) -> Vec3 {
        direction(self.phi, self.theta)
    }
}

/// Unit vector for azimuth `phi` and polar angle `theta`.
#[must_use]
pub fn direction(phi: f64, theta: f64) -> Vec3 {
    let (sin_t, cos_t) = theta.sin_cos();
    let (sin_p, cos_p) = phi.sin_cos();
    Vec3::new(sin_t * cos_p, sin_t * sin_p, cos_t)
}

/// Wrap an azimuth into `[0, 2π)`.
#[must_use]
pub fn normalize_azimuth(phi: f64) -> f64 {
    let wrapped = phi.rem_euclid(TAU);
    // rem_euclid can round up to TAU for tiny negative inputs
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Convert a point to spherical coordinates about the origin.
///
/// At `ρ = 0` both angles are undefined and `(0, 0, 0)` is returned.
#[must_use]
pub fn cartesian_to_spherical(p: Point3) -> SphericalCoord {
    cartesian_to_spherical_about(p, Point3::ORIGIN)
}

/// Convert a point to spherical coordinates about `center`.
#[must_use]
pub fn cartesian_to_spherical_about(p: Point3, center: Point3) -> SphericalCoord {
    let r = p.sub_point(center);
    let rho = r.length();
    if rho <= Tolerance::TIGHT.eps {
        return SphericalCoord::new(0.0, 0.0, 0.0);
    }
    let phi = normalize_azimuth(r.y.atan2(r.x));
    let theta = r.x.hypot(r.y).atan2(r.z);
    SphericalCoord::new(rho, phi, theta)
}

#[must_use]
pub fn spherical_to_cartesian(s: SphericalCoord) -> Point3 {
    spherical_to_cartesian_about(s, Point3::ORIGIN)
}

#[must_use]
pub fn spherical_to_cartesian_about(s: SphericalCoord, center: Point3) -> Point3 {
    center.add_vec(s.direction().mul_scalar(s.rho))
}

/// Spherical coordinates of a whole cloud together with its mean radius.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SphericalCloud {
    pub center: Point3,
    pub coords: Vec<SphericalCoord>,
    pub mean_radius: f64,
}

/// Convert every point of a cloud to spherical coordinates about `center`.
///
/// # Errors
/// `EmptyPointSet` when `points` is empty.
pub fn cloud_to_spherical(points: &[Point3], center: Point3) -> SurfaceResult<SphericalCloud> {
    if points.is_empty() {
        return Err(SurfaceError::EmptyPointSet {
            context: "spherical conversion",
        });
    }
    let coords: Vec<SphericalCoord> = points
        .iter()
        .map(|&p| cartesian_to_spherical_about(p, center))
        .collect();
    let mean_radius = coords.iter().map(|c| c.rho).sum::<f64>() / coords.len() as f64;
    Ok(SphericalCloud {
        center,
        coords,
        mean_radius,
    })
}

/// Cartesian positions of every node of a spherical grid, row-major over
/// `(φ, θ)`. Nodes without data are `None`.
#[must_use]
pub fn spherical_grid_to_cartesian(grid: &SphericalGrid) -> Vec<Option<Point3>> {
    let (n_phi, n_theta) = grid.shape();
    (0..n_phi)
        .flat_map(|i| (0..n_theta).map(move |j| (i, j)))
        .map(|(i, j)| grid.node_position(i, j))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn normalize_zero_vector_is_an_error() {
        let err = normalize(Vec3::ZERO).unwrap_err();
        assert!(matches!(err, SurfaceError::DegenerateVector { .. }));
    }

    #[test]
    fn origin_maps_to_zero_angles() {
        let s = cartesian_to_spherical(Point3::ORIGIN);
        assert_eq!(s, SphericalCoord::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn azimuth_is_wrapped_into_positive_range() {
        let s = cartesian_to_spherical(Point3::new(0.0, -1.0, 0.0));
        assert!((s.phi - 1.5 * PI).abs() < 1e-12);
        assert!((s.theta - 0.5 * PI).abs() < 1e-12);
        assert_eq!(normalize_azimuth(-1e-300), 0.0);
        assert!((normalize_azimuth(-0.5 * PI) - 1.5 * PI).abs() < 1e-12);
    }

    #[test]
    fn poles_have_extreme_theta() {
        assert!(cartesian_to_spherical(Point3::new(0.0, 0.0, 2.0)).theta.abs() < 1e-15);
        assert!((cartesian_to_spherical(Point3::new(0.0, 0.0, -2.0)).theta - PI).abs() < 1e-15);
    }

    #[test]
    fn mean_radius_of_cloud() {
        let center = Point3::new(1.0, 1.0, 1.0);
        let points = [
            Point3::new(3.0, 1.0, 1.0),
            Point3::new(1.0, 5.0, 1.0),
        ];
        let cloud = cloud_to_spherical(&points, center).unwrap();
        assert!((cloud.mean_radius - 3.0).abs() < 1e-12);
        assert!(cloud_to_spherical(&[], center).is_err());
    }
}
