//! Orientational order of molecules against a fitted surface, and of the
//! surface against its reference plane or sphere.

use serde::Serialize;

use crate::geom::{
    AccumulationDiagnostics, CellMap, PointCloud, SurfaceError, SurfaceGrid, SurfaceResult,
    map_indices,
};
use crate::stats::{HistogramBin, mean, sample_std_dev};

/// Bins of the tilt-angle histogram, one degree each over 0–90°.
const TILT_BINS: usize = 90;

/// `P₂ = (3⟨cos²β⟩ − 1) / 2`.
#[must_use]
pub fn second_legendre(cos2_mean: f64) -> f64 {
    0.5 * (3.0 * cos2_mean - 1.0)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderMap {
    /// Per-node P₂ of the orientations of the points mapped to the node.
    pub p2: CellMap,
    /// P₂ over every contributing point.
    pub overall_p2: Option<f64>,
    pub diagnostics: AccumulationDiagnostics,
}

enum Alignment {
    Cos2 { node: usize, cos2: f64 },
    OutOfBounds(SurfaceError),
    Missing,
    Degenerate,
}

/// Per-node order parameter of per-point orientation vectors against the
/// grid's local normal.
///
/// # Errors
/// `MissingAttribute` when the cloud carries no orientations.
pub fn order_parameter_map<G: SurfaceGrid>(grid: &G, cloud: &PointCloud) -> SurfaceResult<OrderMap> {
    let orientations = cloud.orientations().ok_or(SurfaceError::MissingAttribute {
        attribute: "orientations",
    })?;
    let positions = cloud.positions();

    let alignments = map_indices(positions.len(), |index| {
        let (i, j) = match grid.locate(index, positions[index]) {
            Ok(node) => node,
            Err(err) => return Alignment::OutOfBounds(err),
        };
        let Some(orientation) = orientations[index].normalized() else {
            return Alignment::Degenerate;
        };
        match grid.local_normal(i, j) {
            Some(normal) => {
                let cos = orientation.dot(normal);
                Alignment::Cos2 {
                    node: grid.flat_index(i, j),
                    cos2: cos * cos,
                }
            }
            None => Alignment::Missing,
        }
    });

    let mut sums = vec![0.0; grid.node_count()];
    let mut counts = vec![0usize; grid.node_count()];
    let mut diagnostics = AccumulationDiagnostics::new();
    diagnostics.visited = positions.len();
    for alignment in alignments {
        match alignment {
            Alignment::Cos2 { node, cos2 } => {
                sums[node] += cos2;
                counts[node] += 1;
                diagnostics.used += 1;
            }
            Alignment::OutOfBounds(err) => {
                diagnostics.out_of_bounds += 1;
                diagnostics.add_warning(err.to_string());
            }
            Alignment::Missing => diagnostics.missing_data += 1,
            Alignment::Degenerate => diagnostics.degenerate_vectors += 1,
        }
    }
    if diagnostics.excluded() > 0 {
        log::warn!("order parameter: {}", diagnostics.summary());
    }

    let total: f64 = sums.iter().sum();
    let overall_p2 = (diagnostics.used > 0)
        .then(|| second_legendre(total / diagnostics.used as f64));
    let values = sums
        .iter()
        .zip(&counts)
        .map(|(&s, &c)| (c > 0).then(|| second_legendre(s / c as f64)))
        .collect();

    Ok(OrderMap {
        p2: CellMap::from_parts(grid.shape(), values, counts),
        overall_p2,
        diagnostics,
    })
}

/// Order of the fitted surface itself against its reference normal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SurfaceOrder {
    pub p2: CellMap,
    pub mean: Option<f64>,
    /// Needs at least two defined nodes.
    pub std_dev: Option<f64>,
    /// Tilt of the fitted normal from the reference normal, 1° bins.
    pub tilt_histogram: Vec<HistogramBin>,
}

/// Per-node P₂ of the fitted normal against the reference normal. Nodes
/// where the normal is undefined (missing data, collapsed pole rows) are
/// `None`.
#[must_use]
pub fn surface_order<G: SurfaceGrid>(grid: &G) -> SurfaceOrder {
    let cosines = map_indices(grid.node_count(), |flat| {
        let (i, j) = grid.node_of(flat);
        grid.fitted_normal(i, j)
            .map(|n| n.dot(grid.reference_normal(i, j)).clamp(-1.0, 1.0))
    });

    let mut tilt_counts = [0usize; TILT_BINS];
    let mut values = Vec::with_capacity(cosines.len());
    for cos in &cosines {
        values.push(cos.map(|c| second_legendre(c * c)));
        if let Some(c) = cos {
            let degrees = c.abs().acos().to_degrees();
            let bin = (degrees.floor().max(0.0) as usize).min(TILT_BINS - 1);
            tilt_counts[bin] += 1;
        }
    }

    let counts = cosines.iter().map(|c| usize::from(c.is_some())).collect();
    let p2 = CellMap::from_parts(grid.shape(), values, counts);
    let defined: Vec<f64> = p2.defined().collect();
    log::debug!("surface order: {} nodes with a normal", defined.len());

    SurfaceOrder {
        mean: mean(&defined).ok(),
        std_dev: sample_std_dev(&defined).ok(),
        tilt_histogram: tilt_counts
            .iter()
            .enumerate()
            .map(|(k, &count)| HistogramBin {
                center: k as f64 + 0.5,
                count,
            })
            .collect(),
        p2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::{PlanarGrid, Point3, PolarBinning, SphericalGrid, Vec3};

    fn flat_grid() -> PlanarGrid {
        PlanarGrid::from_fn((0.0, 0.0), (1.0, 1.0), (3, 3), |_, _| 0.0).unwrap()
    }

    #[test]
    fn legendre_limits() {
        assert_eq!(second_legendre(1.0), 1.0);
        assert_eq!(second_legendre(0.0), -0.5);
        assert!(second_legendre(1.0 / 3.0).abs() < 1e-15);
    }

    #[test]
    fn aligned_and_perpendicular_orientations() {
        let cloud = PointCloud::new(vec![Point3::new(0.0, 0.0, 0.1), Point3::new(2.0, 2.0, 0.0)])
            .with_orientations(vec![Vec3::new(0.0, 0.0, -3.0), Vec3::X])
            .unwrap();
        let map = order_parameter_map(&flat_grid(), &cloud).unwrap();
        assert!((map.p2.get(0, 0).unwrap() - 1.0).abs() < 1e-12);
        assert!((map.p2.get(2, 2).unwrap() + 0.5).abs() < 1e-12);
        assert_eq!(map.p2.get(1, 1), None);
        assert!((map.overall_p2.unwrap() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn orientations_are_required() {
        let cloud = PointCloud::new(vec![Point3::ORIGIN]);
        assert!(matches!(
            order_parameter_map(&flat_grid(), &cloud),
            Err(SurfaceError::MissingAttribute { attribute: "orientations" })
        ));
    }

    #[test]
    fn zero_vectors_and_outliers_are_counted() {
        let cloud = PointCloud::new(vec![
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(10.0, 1.0, 0.0),
        ])
        .with_orientations(vec![Vec3::ZERO, Vec3::Z, Vec3::Z])
        .unwrap();
        let map = order_parameter_map(&flat_grid(), &cloud).unwrap();
        assert_eq!(map.diagnostics.degenerate_vectors, 1);
        assert_eq!(map.diagnostics.out_of_bounds, 1);
        assert_eq!(map.diagnostics.used, 1);
        assert_eq!(map.p2.count(1, 1), 1);
    }

    #[test]
    fn radial_orientations_on_a_sphere() {
        let grid =
            SphericalGrid::from_fn(Point3::ORIGIN, (8, 5), PolarBinning::Linear, |_, _| 5.0)
                .unwrap();
        let positions = vec![Point3::new(5.0, 0.0, 0.0), Point3::new(0.0, -5.0, 0.0)];
        let orientations = positions.iter().map(|p| p.to_vec3()).collect();
        let cloud = PointCloud::new(positions).with_orientations(orientations).unwrap();
        let map = order_parameter_map(&grid, &cloud).unwrap();
        assert!((map.overall_p2.unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn tilted_plane_surface_order() {
        let grid = PlanarGrid::from_fn((0.0, 0.0), (1.0, 1.0), (4, 4), |x, _| 0.5 * x).unwrap();
        let order = surface_order(&grid);
        // cos²(tilt) = 1 / (1 + 0.25)
        assert!((order.mean.unwrap() - 0.7).abs() < 1e-12);
        assert!(order.std_dev.unwrap() < 1e-12);
        assert_eq!(order.tilt_histogram.len(), 90);
        assert_eq!(order.tilt_histogram[26].count, 16);
    }

    #[test]
    fn sphere_is_perfectly_ordered_away_from_the_poles() {
        let grid =
            SphericalGrid::from_fn(Point3::ORIGIN, (12, 7), PolarBinning::Linear, |_, _| 2.0)
                .unwrap();
        let order = surface_order(&grid);
        assert_eq!(order.p2.get(0, 0), None);
        assert!(order.p2.defined().all(|p| (p - 1.0).abs() < 1e-9));
        assert_eq!(order.tilt_histogram[0].count, order.p2.defined_count());
    }
}
