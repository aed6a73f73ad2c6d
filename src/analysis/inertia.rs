//! Moment of inertia, principal axes and radius of gyration.

use std::cmp::Ordering;

use nalgebra::Matrix3;
use serde::{Deserialize, Serialize};

use crate::geom::{Point3, PointCloud, SurfaceError, SurfaceGrid, SurfaceResult, Vec3, map_indices};

/// Point the inertia tensor is taken about.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum InertiaOrigin {
    /// Center of mass, or the centroid when masses are not used.
    #[default]
    CenterOfMass,
    Origin,
    Point(Point3),
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InertiaOptions {
    pub origin: InertiaOrigin,
    /// Weight points by the cloud's mass column instead of unit masses.
    pub mass_weighted: bool,
    /// Divide the tensor by the total mass.
    pub normalize: bool,
}

impl InertiaOptions {
    #[must_use]
    pub const fn with_origin(mut self, origin: InertiaOrigin) -> Self {
        self.origin = origin;
        self
    }

    #[must_use]
    pub const fn with_mass_weighted(mut self, mass_weighted: bool) -> Self {
        self.mass_weighted = mass_weighted;
        self
    }

    #[must_use]
    pub const fn with_normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }
}

/// Symmetric tensor `I_ab = Σ m (δ_ab |r|² − r_a r_b)`, `r` relative to
/// `origin`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct InertiaTensor {
    pub components: [[f64; 3]; 3],
    pub origin: Point3,
    pub total_mass: f64,
}

impl InertiaTensor {
    /// Eigen-decomposition with moments in ascending order.
    #[must_use]
    pub fn principal_axes(&self) -> PrincipalAxes {
        let matrix = Matrix3::from_fn(|r, c| self.components[r][c]);
        let eigen = matrix.symmetric_eigen();

        let mut order = [0usize, 1, 2];
        order.sort_by(|&a, &b| {
            eigen.eigenvalues[a]
                .partial_cmp(&eigen.eigenvalues[b])
                .unwrap_or(Ordering::Equal)
        });

        let axis = |k: usize| {
            let col = eigen.eigenvectors.column(k);
            Vec3::new(col[0], col[1], col[2])
        };
        let a0 = axis(order[0]);
        let a1 = axis(order[1]);
        let mut a2 = axis(order[2]);
        if a0.cross(a1).dot(a2) < 0.0 {
            a2 = -a2;
        }

        PrincipalAxes {
            moments: order.map(|k| eigen.eigenvalues[k]),
            axes: [a0, a1, a2],
            origin: self.origin,
        }
    }
}

/// Orthonormal right-handed frame of the principal axes, smallest moment
/// first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrincipalAxes {
    pub moments: [f64; 3],
    pub axes: [Vec3; 3],
    pub origin: Point3,
}

impl PrincipalAxes {
    /// Lab frame itself.
    #[must_use]
    pub const fn identity() -> Self {
        Self {
            moments: [0.0; 3],
            axes: [Vec3::X, Vec3::Y, Vec3::Z],
            origin: Point3::ORIGIN,
        }
    }

    /// Coordinates of a lab-frame point along the principal axes, relative
    /// to the origin.
    #[must_use]
    pub fn to_principal_frame(&self, p: Point3) -> Point3 {
        let d = p - self.origin;
        Point3::new(d.dot(self.axes[0]), d.dot(self.axes[1]), d.dot(self.axes[2]))
    }

    #[must_use]
    pub fn from_principal_frame(&self, q: Point3) -> Point3 {
        self.origin
            + self.axes[0] * q.x
            + self.axes[1] * q.y
            + self.axes[2] * q.z
    }
}

/// Inertia tensor of a point cloud.
///
/// # Errors
/// `EmptyPointSet` for an empty cloud, `MissingAttribute` when
/// `mass_weighted` is set on a cloud without masses, `InvalidInput` when the
/// total mass is zero.
pub fn inertia_tensor(cloud: &PointCloud, options: InertiaOptions) -> SurfaceResult<InertiaTensor> {
    if cloud.is_empty() {
        return Err(SurfaceError::EmptyPointSet {
            context: "inertia tensor",
        });
    }
    if options.mass_weighted && cloud.masses().is_none() {
        return Err(SurfaceError::MissingAttribute {
            attribute: "masses",
        });
    }
    let positions = cloud.positions();
    let mass = |i: usize| if options.mass_weighted { cloud.mass(i) } else { 1.0 };
    let total_mass: f64 = (0..positions.len()).map(mass).sum();
    if total_mass <= 0.0 {
        return Err(SurfaceError::InvalidInput {
            reason: format!("total mass must be positive: {total_mass}"),
        });
    }

    let origin = match options.origin {
        InertiaOrigin::CenterOfMass => {
            let weighted = positions
                .iter()
                .enumerate()
                .fold(Vec3::ZERO, |acc, (i, p)| acc + p.to_vec3() * mass(i));
            Point3::from(weighted / total_mass)
        }
        InertiaOrigin::Origin => Point3::ORIGIN,
        InertiaOrigin::Point(p) => p,
    };

    let contributions = map_indices(positions.len(), |i| {
        let r = (positions[i] - origin).to_array();
        let r2 = r[0] * r[0] + r[1] * r[1] + r[2] * r[2];
        let m = mass(i);
        let mut c = [[0.0; 3]; 3];
        for (a, row) in c.iter_mut().enumerate() {
            for (b, value) in row.iter_mut().enumerate() {
                let delta = if a == b { r2 } else { 0.0 };
                *value = m * (delta - r[a] * r[b]);
            }
        }
        c
    });

    let mut components = [[0.0; 3]; 3];
    for c in contributions {
        for a in 0..3 {
            for b in 0..3 {
                components[a][b] += c[a][b];
            }
        }
    }
    if options.normalize {
        for row in &mut components {
            for value in row.iter_mut() {
                *value /= total_mass;
            }
        }
    }

    log::debug!(
        "inertia tensor: {} points, total mass {total_mass}, origin {origin:?}",
        positions.len()
    );
    Ok(InertiaTensor {
        components,
        origin,
        total_mass,
    })
}

/// Inertia tensor of a fitted surface, treating each node with data as a
/// unit mass at its Cartesian position. `mass_weighted` is ignored.
///
/// # Errors
/// `EmptyPointSet` when no node carries data.
pub fn surface_inertia_tensor<G: SurfaceGrid>(
    grid: &G,
    options: InertiaOptions,
) -> SurfaceResult<InertiaTensor> {
    let positions: Vec<Point3> = (0..grid.node_count())
        .filter_map(|flat| {
            let (i, j) = grid.node_of(flat);
            grid.node_position(i, j)
        })
        .collect();
    inertia_tensor(
        &PointCloud::new(positions),
        options.with_mass_weighted(false),
    )
}

/// `√(Σ m |r − c|² / Σ m)` about the center of mass.
///
/// # Errors
/// `EmptyPointSet` for an empty cloud, `InvalidInput` when the total mass
/// is not positive.
pub fn radius_of_gyration(cloud: &PointCloud) -> SurfaceResult<f64> {
    let center = cloud.center_of_mass()?;
    let sum: f64 = cloud
        .positions()
        .iter()
        .enumerate()
        .map(|(i, p)| cloud.mass(i) * p.distance_squared_to(center))
        .sum();
    Ok((sum / cloud.total_mass()).sqrt())
}
