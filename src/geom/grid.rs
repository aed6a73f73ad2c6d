//! Regular grids carrying a fitted surface field.
//!
//! Both topologies store one scalar per node in a row-major `Vec<f64>`
//! indexed `i * n_j + j`, all indices 0-based. A non-finite value marks a
//! node the fitter produced no data for.
//!
//! [`SurfaceGrid`] is the topology strategy shared by every descriptor:
//! coordinate mapping, node positions, normals, neighbor stepping and the
//! per-node measure used for volume integrals.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use serde::{Deserialize, Serialize};

use super::coords::{cartesian_to_spherical_about, direction};
use super::solid_angle::{solid_angle, solid_angle_triangle};
use super::{BBox, Point3, SurfaceError, SurfaceResult, Vec3};

/// `(i, j)` node address.
pub type NodeIndex = (usize, usize);

/// The cosine band formula yields 1-based band numbers; subtract this once
/// to get the 0-based polar node index.
pub const ONE_BASED_OFFSET: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TopologyKind {
    Planar,
    Spherical,
}

/// Neighborhood used by local-average descriptors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Connectivity {
    /// Edge-sharing neighbors.
    #[default]
    Four,
    /// Edge- and corner-sharing neighbors.
    Eight,
}

impl Connectivity {
    #[must_use]
    pub fn offsets(self) -> &'static [(isize, isize)] {
        const FOUR: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
        const EIGHT: [(isize, isize); 8] = [
            (-1, -1),
            (-1, 0),
            (-1, 1),
            (0, -1),
            (0, 1),
            (1, -1),
            (1, 0),
            (1, 1),
        ];
        match self {
            Self::Four => &FOUR,
            Self::Eight => &EIGHT,
        }
    }
}

/// Topology strategy for a fitted surface grid.
pub trait SurfaceGrid: Send + Sync {
    fn kind(&self) -> TopologyKind;

    /// `(n_i, n_j)` node counts.
    fn shape(&self) -> (usize, usize);

    /// Raw field, row-major.
    fn values(&self) -> &[f64];

    /// Same geometry carrying a different field.
    ///
    /// # Errors
    /// `InvalidGrid` when `values` does not have one entry per node.
    fn with_values(&self, values: Vec<f64>) -> SurfaceResult<Self>
    where
        Self: Sized;

    /// Cartesian position of the fitted surface at a node.
    fn node_position(&self, i: usize, j: usize) -> Option<Point3>;

    /// Nearest node for a point. `point_index` only labels errors.
    ///
    /// # Errors
    /// `OutOfGridBounds` when the point lies more than one cell outside the
    /// grid.
    fn locate(&self, point_index: usize, point: Point3) -> SurfaceResult<NodeIndex>;

    /// The coordinate of `point` the field models: height for planar grids,
    /// distance from the center for spherical grids.
    fn sample(&self, point: Point3) -> f64;

    /// Node reached by moving `(di, dj)`, `None` past a non-periodic edge.
    fn step(&self, i: usize, j: usize, di: isize, dj: isize) -> Option<NodeIndex>;

    /// Normal of the undeformed reference surface: +z or radial.
    fn reference_normal(&self, i: usize, j: usize) -> Vec3;

    /// Normal against which per-point orientations are measured.
    fn local_normal(&self, i: usize, j: usize) -> Option<Vec3>;

    /// Volume between field values `a` and `b` over the area a node owns.
    fn shell_volume(&self, i: usize, j: usize, a: f64, b: f64) -> f64;

    fn node_count(&self) -> usize {
        let (n_i, n_j) = self.shape();
        n_i * n_j
    }

    fn flat_index(&self, i: usize, j: usize) -> usize {
        i * self.shape().1 + j
    }

    fn node_of(&self, flat: usize) -> NodeIndex {
        let n_j = self.shape().1;
        (flat / n_j, flat % n_j)
    }

    /// Field value at a node; `None` for missing data or an invalid index.
    fn value(&self, i: usize, j: usize) -> Option<f64> {
        let (n_i, n_j) = self.shape();
        if i >= n_i || j >= n_j {
            return None;
        }
        let v = self.values()[self.flat_index(i, j)];
        v.is_finite().then_some(v)
    }

    /// Unit normal of the fitted surface from central differences of node
    /// positions (one-sided at edges), oriented along the reference normal.
    fn fitted_normal(&self, i: usize, j: usize) -> Option<Vec3> {
        let center = self.node_position(i, j)?;
        let along_i = node_difference(self, i, j, (1, 0), center)?;
        let along_j = node_difference(self, i, j, (0, 1), center)?;
        let n = along_i.cross(along_j).normalized()?;
        if n.dot(self.reference_normal(i, j)) < 0.0 {
            Some(-n)
        } else {
            Some(n)
        }
    }

    /// Neighbors of a node that exist in the grid, never wrapping past an
    /// edge. Periodic axes have no edge.
    fn neighbors(&self, i: usize, j: usize, connectivity: Connectivity) -> Vec<NodeIndex> {
        let mut out = Vec::with_capacity(connectivity.offsets().len());
        for &(di, dj) in connectivity.offsets() {
            if let Some(node) = self.step(i, j, di, dj) {
                if node != (i, j) && !out.contains(&node) {
                    out.push(node);
                }
            }
        }
        out
    }
}

fn node_difference<G: SurfaceGrid + ?Sized>(
    grid: &G,
    i: usize,
    j: usize,
    (di, dj): (isize, isize),
    center: Point3,
) -> Option<Vec3> {
    let forward = grid
        .step(i, j, di, dj)
        .and_then(|(a, b)| grid.node_position(a, b));
    let backward = grid
        .step(i, j, -di, -dj)
        .and_then(|(a, b)| grid.node_position(a, b));
    match (forward, backward) {
        (Some(f), Some(b)) => Some(f - b),
        (Some(f), None) => Some(f - center),
        (None, Some(b)) => Some(center - b),
        (None, None) => None,
    }
}

fn check_values(values: &[f64], expected: usize) -> SurfaceResult<()> {
    if values.len() == expected {
        Ok(())
    } else {
        Err(SurfaceError::InvalidGrid {
            reason: format!("{} field values for {expected} nodes", values.len()),
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Planar
// ─────────────────────────────────────────────────────────────────────────────

/// Rectangular `(x, y)` extent of a planar point cloud.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlanarExtent {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl PlanarExtent {
    #[must_use]
    pub const fn new(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Self {
        Self {
            x_min,
            x_max,
            y_min,
            y_max,
        }
    }

    /// `(x, y)` footprint of a bounding box.
    #[must_use]
    pub const fn from_bbox(bbox: BBox) -> Self {
        Self::new(bbox.min.x, bbox.max.x, bbox.min.y, bbox.max.y)
    }

    #[must_use]
    pub fn width(self) -> f64 {
        self.x_max - self.x_min
    }

    #[must_use]
    pub fn height(self) -> f64 {
        self.y_max - self.y_min
    }

    #[must_use]
    pub fn area(self) -> f64 {
        self.width() * self.height()
    }

    #[must_use]
    pub fn diagonal(self) -> f64 {
        self.width().hypot(self.height())
    }

    /// # Errors
    /// `InvalidExtent` when a side is not finite and positive.
    pub fn validate(self) -> SurfaceResult<Self> {
        for (dimension, extent) in [("x", self.width()), ("y", self.height())] {
            if !extent.is_finite() || extent <= 0.0 {
                return Err(SurfaceError::InvalidExtent { dimension, extent });
            }
        }
        Ok(self)
    }
}

/// Height field `z[i][j]` at nodes `x = x_min + i·dx`, `y = y_min + j·dy`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanarGrid {
    x_min: f64,
    y_min: f64,
    dx: f64,
    dy: f64,
    nx: usize,
    ny: usize,
    values: Vec<f64>,
}

impl PlanarGrid {
    /// # Errors
    /// `InvalidGrid` when the spacing is not finite and positive, an axis has
    /// fewer than two nodes, or `values` does not hold `nx * ny` entries.
    pub fn new(
        origin: (f64, f64),
        spacing: (f64, f64),
        shape: (usize, usize),
        values: Vec<f64>,
    ) -> SurfaceResult<Self> {
        let (dx, dy) = spacing;
        let (nx, ny) = shape;
        if !(dx.is_finite() && dy.is_finite() && dx > 0.0 && dy > 0.0) {
            return Err(SurfaceError::InvalidGrid {
                reason: format!("spacing must be finite and positive, got ({dx}, {dy})"),
            });
        }
        if !(origin.0.is_finite() && origin.1.is_finite()) {
            return Err(SurfaceError::InvalidGrid {
                reason: format!("origin must be finite, got {origin:?}"),
            });
        }
        if nx < 2 || ny < 2 {
            return Err(SurfaceError::InvalidGrid {
                reason: format!("planar grid needs at least 2x2 nodes, got {nx}x{ny}"),
            });
        }
        check_values(&values, nx * ny)?;
        Ok(Self {
            x_min: origin.0,
            y_min: origin.1,
            dx,
            dy,
            nx,
            ny,
            values,
        })
    }

    /// Grid whose node values are `f(x, y)`.
    ///
    /// # Errors
    /// As [`PlanarGrid::new`].
    pub fn from_fn(
        origin: (f64, f64),
        spacing: (f64, f64),
        shape: (usize, usize),
        f: impl Fn(f64, f64) -> f64,
    ) -> SurfaceResult<Self> {
        let (nx, ny) = shape;
        let mut values = Vec::with_capacity(nx * ny);
        for i in 0..nx {
            for j in 0..ny {
                values.push(f(
                    origin.0 + i as f64 * spacing.0,
                    origin.1 + j as f64 * spacing.1,
                ));
            }
        }
        Self::new(origin, spacing, shape, values)
    }

    /// Zero-filled grid spanning `extent` with `bin_count` cells per axis,
    /// ready for a fitter to populate.
    ///
    /// # Errors
    /// `InvalidExtent` for a degenerate extent, `InvalidGrid` for a zero bin
    /// count.
    pub fn layout(extent: PlanarExtent, bin_count: usize) -> SurfaceResult<Self> {
        let extent = extent.validate()?;
        if bin_count == 0 {
            return Err(SurfaceError::InvalidGrid {
                reason: "bin count must be at least 1".to_string(),
            });
        }
        let cells = bin_count as f64;
        Self::new(
            (extent.x_min, extent.y_min),
            (extent.width() / cells, extent.height() / cells),
            (bin_count + 1, bin_count + 1),
            vec![0.0; (bin_count + 1) * (bin_count + 1)],
        )
    }

    #[must_use]
    pub const fn origin(&self) -> (f64, f64) {
        (self.x_min, self.y_min)
    }

    #[must_use]
    pub const fn spacing(&self) -> (f64, f64) {
        (self.dx, self.dy)
    }

    #[must_use]
    pub fn node_x(&self, i: usize) -> f64 {
        self.x_min + i as f64 * self.dx
    }

    #[must_use]
    pub fn node_y(&self, j: usize) -> f64 {
        self.y_min + j as f64 * self.dy
    }

    #[must_use]
    pub fn extent(&self) -> PlanarExtent {
        PlanarExtent::new(
            self.x_min,
            self.node_x(self.nx - 1),
            self.y_min,
            self.node_y(self.ny - 1),
        )
    }

    /// Continuous node coordinates of `(x, y)` under the affine map.
    #[must_use]
    pub fn fractional_index(&self, x: f64, y: f64) -> (f64, f64) {
        ((x - self.x_min) / self.dx, (y - self.y_min) / self.dy)
    }

    /// Trapezoid weight of a node: edge nodes own half a cell per axis.
    fn node_weight(&self, i: usize, j: usize) -> f64 {
        let wi = if i == 0 || i == self.nx - 1 { 0.5 } else { 1.0 };
        let wj = if j == 0 || j == self.ny - 1 { 0.5 } else { 1.0 };
        wi * wj
    }
}

impl SurfaceGrid for PlanarGrid {
    fn kind(&self) -> TopologyKind {
        TopologyKind::Planar
    }

    fn shape(&self) -> (usize, usize) {
        (self.nx, self.ny)
    }

    fn values(&self) -> &[f64] {
        &self.values
    }

    fn with_values(&self, values: Vec<f64>) -> SurfaceResult<Self> {
        check_values(&values, self.nx * self.ny)?;
        Ok(Self {
            values,
            ..self.clone()
        })
    }

    fn node_position(&self, i: usize, j: usize) -> Option<Point3> {
        self.value(i, j)
            .map(|z| Point3::new(self.node_x(i), self.node_y(j), z))
    }

    fn locate(&self, point_index: usize, point: Point3) -> SurfaceResult<NodeIndex> {
        let (fi, fj) = self.fractional_index(point.x, point.y);
        let max_i = (self.nx - 1) as f64;
        let max_j = (self.ny - 1) as f64;
        let inside = |f: f64, max: f64| f.is_finite() && f >= -1.0 && f <= max + 1.0;
        if !(inside(fi, max_i) && inside(fj, max_j)) {
            return Err(SurfaceError::OutOfGridBounds {
                point_index,
                i: fi,
                j: fj,
                nx: self.nx,
                ny: self.ny,
            });
        }
        Ok((
            fi.round().clamp(0.0, max_i) as usize,
            fj.round().clamp(0.0, max_j) as usize,
        ))
    }

    fn sample(&self, point: Point3) -> f64 {
        point.z
    }

    fn step(&self, i: usize, j: usize, di: isize, dj: isize) -> Option<NodeIndex> {
        let a = i.checked_add_signed(di).filter(|&a| a < self.nx)?;
        let b = j.checked_add_signed(dj).filter(|&b| b < self.ny)?;
        Some((a, b))
    }

    fn reference_normal(&self, _i: usize, _j: usize) -> Vec3 {
        Vec3::Z
    }

    fn local_normal(&self, i: usize, j: usize) -> Option<Vec3> {
        self.fitted_normal(i, j)
    }

    fn shell_volume(&self, i: usize, j: usize, a: f64, b: f64) -> f64 {
        (a - b).abs() * self.dx * self.dy * self.node_weight(i, j)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Spherical
// ─────────────────────────────────────────────────────────────────────────────

/// Placement of the polar nodes of a spherical grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PolarBinning {
    /// `θ_j = j·dθ` with `dθ = π/(n_θ−1)`; rows `0` and `n_θ−1` sit on the
    /// poles and own half-height sectors.
    #[default]
    Linear,
    /// Equal solid-angle bands of width `dz = 2/n_θ` in `cos θ`, node `j` at
    /// `cos θ = −1 + (j+½)·dz`. Used for clouds rotated into their principal
    /// inertia frame.
    Cosine,
}

/// Radial field `ρ[i][j]` over azimuth `φ_i = i·dφ` (periodic) and polar
/// rows placed by [`PolarBinning`], about `center`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SphericalGrid {
    center: Point3,
    n_phi: usize,
    n_theta: usize,
    binning: PolarBinning,
    values: Vec<f64>,
}

impl SphericalGrid {
    /// # Errors
    /// `InvalidGrid` for fewer than 3 azimuthal or 2 polar nodes, a
    /// non-finite center, or a field of the wrong length.
    pub fn new(
        center: Point3,
        shape: (usize, usize),
        binning: PolarBinning,
        values: Vec<f64>,
    ) -> SurfaceResult<Self> {
        let (n_phi, n_theta) = shape;
        if n_phi < 3 || n_theta < 2 {
            return Err(SurfaceError::InvalidGrid {
                reason: format!(
                    "spherical grid needs at least 3x2 nodes, got {n_phi}x{n_theta}"
                ),
            });
        }
        if !center.is_finite() {
            return Err(SurfaceError::InvalidGrid {
                reason: format!("center must be finite, got {center:?}"),
            });
        }
        check_values(&values, n_phi * n_theta)?;
        Ok(Self {
            center,
            n_phi,
            n_theta,
            binning,
            values,
        })
    }

    /// Grid whose node radii are `f(φ, θ)`.
    ///
    /// # Errors
    /// As [`SphericalGrid::new`].
    pub fn from_fn(
        center: Point3,
        shape: (usize, usize),
        binning: PolarBinning,
        f: impl Fn(f64, f64) -> f64,
    ) -> SurfaceResult<Self> {
        let grid = Self::new(center, shape, binning, vec![0.0; shape.0 * shape.1])?;
        let values = (0..grid.n_phi)
            .flat_map(|i| (0..grid.n_theta).map(move |j| (i, j)))
            .map(|(i, j)| f(grid.phi_at(i), grid.theta_at(j)))
            .collect();
        grid.with_values(values)
    }

    /// Zero-filled grid with `bin_count` nodes along each angle (at least
    /// 3 azimuthal and 2 polar), ready for a fitter to populate.
    ///
    /// # Errors
    /// `InvalidGrid` for a zero bin count or a non-finite center.
    pub fn layout(center: Point3, bin_count: usize, binning: PolarBinning) -> SurfaceResult<Self> {
        if bin_count == 0 {
            return Err(SurfaceError::InvalidGrid {
                reason: "bin count must be at least 1".to_string(),
            });
        }
        let shape = (bin_count.max(3), bin_count.max(2));
        Self::new(center, shape, binning, vec![0.0; shape.0 * shape.1])
    }

    #[must_use]
    pub const fn center(&self) -> Point3 {
        self.center
    }

    #[must_use]
    pub const fn binning(&self) -> PolarBinning {
        self.binning
    }

    #[must_use]
    pub fn dphi(&self) -> f64 {
        TAU / self.n_phi as f64
    }

    /// Polar step: `dθ` for linear binning, band width in `cos θ` for
    /// cosine binning.
    #[must_use]
    pub fn dtheta(&self) -> f64 {
        match self.binning {
            PolarBinning::Linear => PI / (self.n_theta - 1) as f64,
            PolarBinning::Cosine => 2.0 / self.n_theta as f64,
        }
    }

    #[must_use]
    pub fn phi_at(&self, i: usize) -> f64 {
        i as f64 * self.dphi()
    }

    #[must_use]
    pub fn theta_at(&self, j: usize) -> f64 {
        match self.binning {
            PolarBinning::Linear => j as f64 * self.dtheta(),
            PolarBinning::Cosine => {
                (-1.0 + (j as f64 + 0.5) * self.dtheta()).clamp(-1.0, 1.0).acos()
            }
        }
    }

    /// Polar interval `(θ_lo, θ_hi)` owned by row `j`, clipped to `[0, π]`.
    #[must_use]
    pub fn theta_bounds(&self, j: usize) -> (f64, f64) {
        let step = self.dtheta();
        match self.binning {
            PolarBinning::Linear => {
                let t = j as f64 * step;
                ((t - 0.5 * step).max(0.0), (t + 0.5 * step).min(PI))
            }
            PolarBinning::Cosine => {
                let z_lo = (-1.0 + j as f64 * step).clamp(-1.0, 1.0);
                let z_hi = (-1.0 + (j + 1) as f64 * step).clamp(-1.0, 1.0);
                (z_hi.acos(), z_lo.acos())
            }
        }
    }

    /// Rows `0` and `n_θ−1` touch a pole.
    #[must_use]
    pub fn is_pole_row(&self, j: usize) -> bool {
        j == 0 || j + 1 == self.n_theta
    }

    /// Solid angle owned by node `(i, j)`.
    ///
    /// Interior cells are spherical quadrilaterals through their four corner
    /// directions. Pole cells collapse to the triangle between the pole and
    /// the two corners on their inner boundary, so every cell shares its
    /// edges with its neighbors and the cells tile the sphere.
    #[must_use]
    pub fn cell_solid_angle(&self, i: usize, j: usize) -> f64 {
        let (lo, hi) = self.theta_bounds(j);
        let dphi = self.dphi();
        let phi_a = self.phi_at(i) - 0.5 * dphi;
        let phi_b = phi_a + dphi;
        if self.is_pole_row(j) {
            let (pole, edge) = if self.theta_at(j) < FRAC_PI_2 {
                (Vec3::Z, hi)
            } else {
                (-Vec3::Z, lo)
            };
            return solid_angle_triangle(pole, direction(phi_a, edge), direction(phi_b, edge));
        }
        solid_angle(
            direction(phi_a, lo),
            direction(phi_b, lo),
            direction(phi_b, hi),
            direction(phi_a, hi),
        )
    }

    /// Polar row of a polar angle under this grid's binning.
    #[must_use]
    pub fn polar_row(&self, theta: f64) -> usize {
        let last = self.n_theta - 1;
        match self.binning {
            PolarBinning::Linear => (theta / self.dtheta()).round().clamp(0.0, last as f64) as usize,
            PolarBinning::Cosine => {
                // 1-based band number; θ = 0 lands one past the last band
                let band = ((theta.cos() + 1.0) / self.dtheta() + 0.5).round().max(0.0) as usize;
                band.saturating_sub(ONE_BASED_OFFSET).min(last)
            }
        }
    }

    /// Azimuthal column of an azimuth in `[0, 2π)`.
    #[must_use]
    pub fn azimuth_column(&self, phi: f64) -> usize {
        ((phi / self.dphi()).round().max(0.0) as usize) % self.n_phi
    }
}

impl SurfaceGrid for SphericalGrid {
    fn kind(&self) -> TopologyKind {
        TopologyKind::Spherical
    }

    fn shape(&self) -> (usize, usize) {
        (self.n_phi, self.n_theta)
    }

    fn values(&self) -> &[f64] {
        &self.values
    }

    fn with_values(&self, values: Vec<f64>) -> SurfaceResult<Self> {
        check_values(&values, self.n_phi * self.n_theta)?;
        Ok(Self {
            values,
            ..self.clone()
        })
    }

    fn node_position(&self, i: usize, j: usize) -> Option<Point3> {
        let rho = self.value(i, j)?;
        let dir = direction(self.phi_at(i), self.theta_at(j));
        Some(self.center.add_vec(dir.mul_scalar(rho)))
    }

    fn locate(&self, point_index: usize, point: Point3) -> SurfaceResult<NodeIndex> {
        if !point.is_finite() {
            return Err(SurfaceError::OutOfGridBounds {
                point_index,
                i: f64::NAN,
                j: f64::NAN,
                nx: self.n_phi,
                ny: self.n_theta,
            });
        }
        let s = cartesian_to_spherical_about(point, self.center);
        Ok((self.azimuth_column(s.phi), self.polar_row(s.theta)))
    }

    fn sample(&self, point: Point3) -> f64 {
        point.distance_to(self.center)
    }

    fn step(&self, i: usize, j: usize, di: isize, dj: isize) -> Option<NodeIndex> {
        let n_phi = self.n_phi as isize;
        let a = ((i as isize + di).rem_euclid(n_phi)) as usize;
        let b = j.checked_add_signed(dj).filter(|&b| b < self.n_theta)?;
        Some((a, b))
    }

    fn reference_normal(&self, i: usize, j: usize) -> Vec3 {
        direction(self.phi_at(i), self.theta_at(j))
    }

    fn local_normal(&self, i: usize, j: usize) -> Option<Vec3> {
        Some(self.reference_normal(i, j))
    }

    fn shell_volume(&self, i: usize, j: usize, a: f64, b: f64) -> f64 {
        self.cell_solid_angle(i, j) * (a.powi(3) - b.powi(3)).abs() / 3.0
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Per-node results
// ─────────────────────────────────────────────────────────────────────────────

/// Per-node descriptor values on a grid's shape; `None` marks a node with no
/// defined value. `counts` records how many samples fed each node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellMap {
    shape: (usize, usize),
    values: Vec<Option<f64>>,
    counts: Vec<usize>,
}

impl CellMap {
    pub(crate) fn from_parts(
        shape: (usize, usize),
        values: Vec<Option<f64>>,
        counts: Vec<usize>,
    ) -> Self {
        debug_assert_eq!(values.len(), shape.0 * shape.1);
        debug_assert_eq!(counts.len(), values.len());
        Self {
            shape,
            values,
            counts,
        }
    }

    #[must_use]
    pub const fn shape(&self) -> (usize, usize) {
        self.shape
    }

    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        if i >= self.shape.0 || j >= self.shape.1 {
            return None;
        }
        self.values[i * self.shape.1 + j]
    }

    #[must_use]
    pub fn count(&self, i: usize, j: usize) -> usize {
        if i >= self.shape.0 || j >= self.shape.1 {
            return 0;
        }
        self.counts[i * self.shape.1 + j]
    }

    #[must_use]
    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    pub fn defined(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().filter_map(|v| *v)
    }

    #[must_use]
    pub fn defined_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    #[must_use]
    pub fn missing_count(&self) -> usize {
        self.values.len() - self.defined_count()
    }

    /// Field with missing nodes as NaN, for feeding back into a grid.
    #[must_use]
    pub fn to_field(&self) -> Vec<f64> {
        self.values.iter().map(|v| v.unwrap_or(f64::NAN)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Tolerance;

    #[test]
    fn planar_locate_clamps_within_one_cell() {
        let grid = PlanarGrid::from_fn((0.0, 0.0), (1.0, 1.0), (3, 3), |_, _| 0.0).unwrap();
        assert_eq!(grid.locate(0, Point3::new(-0.9, 2.6, 0.0)).unwrap(), (0, 2));
        assert_eq!(grid.locate(0, Point3::new(1.4, 1.6, 0.0)).unwrap(), (1, 2));
        let err = grid.locate(7, Point3::new(3.5, 1.0, 0.0)).unwrap_err();
        assert!(matches!(
            err,
            SurfaceError::OutOfGridBounds { point_index: 7, .. }
        ));
    }

    #[test]
    fn planar_grid_rejects_bad_geometry() {
        assert!(PlanarGrid::new((0.0, 0.0), (0.0, 1.0), (2, 2), vec![0.0; 4]).is_err());
        assert!(PlanarGrid::new((0.0, 0.0), (1.0, 1.0), (1, 2), vec![0.0; 2]).is_err());
        assert!(PlanarGrid::new((0.0, 0.0), (1.0, 1.0), (2, 2), vec![0.0; 3]).is_err());
    }

    #[test]
    fn missing_values_are_none() {
        let grid =
            PlanarGrid::new((0.0, 0.0), (1.0, 1.0), (2, 2), vec![0.0, f64::NAN, 1.0, 2.0]).unwrap();
        assert_eq!(grid.value(0, 0), Some(0.0));
        assert_eq!(grid.value(0, 1), None);
        assert_eq!(grid.value(5, 0), None);
        assert!(grid.node_position(0, 1).is_none());
    }

    #[test]
    fn tilted_plane_normal() {
        let grid = PlanarGrid::from_fn((0.0, 0.0), (1.0, 1.0), (4, 4), |x, _| x).unwrap();
        let n = grid.fitted_normal(0, 0).unwrap();
        let expected = Vec3::new(-1.0, 0.0, 1.0).normalized().unwrap();
        assert!(Tolerance::DEFAULT.approx_eq_f64(n.dot(expected), 1.0));
    }

    #[test]
    fn planar_neighbors_do_not_wrap() {
        let grid = PlanarGrid::from_fn((0.0, 0.0), (1.0, 1.0), (3, 3), |_, _| 0.0).unwrap();
        assert_eq!(grid.neighbors(0, 0, Connectivity::Four).len(), 2);
        assert_eq!(grid.neighbors(0, 0, Connectivity::Eight).len(), 3);
        assert_eq!(grid.neighbors(1, 1, Connectivity::Eight).len(), 8);
    }

    #[test]
    fn spherical_azimuth_is_periodic() {
        let grid =
            SphericalGrid::from_fn(Point3::ORIGIN, (8, 5), PolarBinning::Linear, |_, _| 1.0)
                .unwrap();
        assert_eq!(grid.step(0, 2, -1, 0), Some((7, 2)));
        assert_eq!(grid.step(0, 0, 0, -1), None);
        let near_two_pi = Point3::new(1.0, -1e-6, 0.0);
        assert_eq!(grid.locate(0, near_two_pi).unwrap().0, 0);
    }

    #[test]
    fn cosine_binning_maps_band_centers_to_their_rows() {
        let grid =
            SphericalGrid::from_fn(Point3::ORIGIN, (4, 6), PolarBinning::Cosine, |_, _| 1.0)
                .unwrap();
        for j in 0..6 {
            assert_eq!(grid.polar_row(grid.theta_at(j)), j);
        }
        assert_eq!(grid.polar_row(0.0), 5);
        assert_eq!(grid.polar_row(PI), 0);
    }

    #[test]
    fn cell_solid_angles_cover_the_sphere() {
        for binning in [PolarBinning::Linear, PolarBinning::Cosine] {
            for shape in [(3, 2), (36, 19), (72, 37), (200, 101)] {
                let grid = SphericalGrid::from_fn(Point3::ORIGIN, shape, binning, |_, _| 1.0)
                    .unwrap();
                let total: f64 = (0..grid.node_count())
                    .map(|flat| {
                        let (i, j) = grid.node_of(flat);
                        grid.cell_solid_angle(i, j)
                    })
                    .sum();
                assert!(
                    Tolerance::new(1e-6).approx_eq_relative(total, 4.0 * PI),
                    "{binning:?} {shape:?}: {total}"
                );
            }
        }
    }
}
