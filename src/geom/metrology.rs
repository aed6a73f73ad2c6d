//! Surface area and enclosed volume of fitted grids.

use serde::Serialize;

use super::diagnostics::AccumulationDiagnostics;
use super::grid::{NodeIndex, PlanarGrid, SphericalGrid, SurfaceGrid};
use super::reduce::map_indices;
use super::triangulation::{Triangle, triangulate_grid, triangulate_grid_wrapped};
use super::{Point3, SurfaceError, SurfaceResult};

/// Heron area of a triangle given by its corners.
///
/// # Errors
/// `DegenerateTriangle` when two corners coincide exactly.
pub fn triangle_area(a: Point3, b: Point3, c: Point3) -> SurfaceResult<f64> {
    Triangle::new(a, b, c).area()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanarMetrology {
    /// Triangulated area of the fitted height field.
    pub area: f64,
    /// Area of the `(x, y)` footprint of the cells that were summed.
    pub projected_area: f64,
    pub triangle_count: usize,
    pub diagnostics: AccumulationDiagnostics,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SphericalMetrology {
    /// `Σ Ω·ρ²` over nodes with data.
    pub area: f64,
    /// `Σ Ω·ρ³/3` over nodes with data.
    pub volume: f64,
    /// Solid angle covered by the nodes with data; `4π` for a complete grid.
    pub solid_angle: f64,
    /// Heron area of the triangulated node surface.
    pub triangulated_area: f64,
    pub diagnostics: AccumulationDiagnostics,
}

enum TriangleArea {
    Area(f64),
    Degenerate(SurfaceError),
    Missing,
}

fn triangle_areas<G: SurfaceGrid>(grid: &G, triangles: &[[NodeIndex; 3]]) -> Vec<TriangleArea> {
    map_indices(triangles.len(), |t| {
        let [p, q, r] = triangles[t];
        let corners = (
            grid.node_position(p.0, p.1),
            grid.node_position(q.0, q.1),
            grid.node_position(r.0, r.1),
        );
        match corners {
            (Some(a), Some(b), Some(c)) => match triangle_area(a, b, c) {
                Ok(area) => TriangleArea::Area(area),
                Err(err) => TriangleArea::Degenerate(err),
            },
            _ => TriangleArea::Missing,
        }
    })
}

fn sum_triangle_areas(
    areas: Vec<TriangleArea>,
    diagnostics: &mut AccumulationDiagnostics,
) -> (f64, usize) {
    let mut total = 0.0;
    let mut counted = 0;
    diagnostics.visited += areas.len();
    for area in areas {
        match area {
            TriangleArea::Area(a) => {
                total += a;
                counted += 1;
                diagnostics.used += 1;
            }
            TriangleArea::Degenerate(err) => {
                log::debug!("metrology: zero-area triangle: {err}");
                diagnostics.degenerate_triangles += 1;
                diagnostics.used += 1;
                counted += 1;
            }
            TriangleArea::Missing => diagnostics.missing_data += 1,
        }
    }
    (total, counted)
}

/// Triangulated area of a planar height field.
///
/// Each cell is split along its `(i−1, j−1)`–`(i, j)` diagonal and both
/// triangles are measured with Heron's formula. Triangles touching a node
/// without data are skipped; triangles with coincident corners count as
/// zero area.
#[must_use]
pub fn planar_surface_area(grid: &PlanarGrid) -> PlanarMetrology {
    let (nx, ny) = grid.shape();
    let (dx, dy) = grid.spacing();
    let triangles = triangulate_grid(nx, ny);
    let mut diagnostics = AccumulationDiagnostics::new();
    let (area, triangle_count) = sum_triangle_areas(triangle_areas(grid, &triangles), &mut diagnostics);

    if diagnostics.missing_data > 0 {
        log::warn!(
            "planar area: {} triangles skipped for missing data",
            diagnostics.missing_data
        );
    }
    log::debug!("planar area {area:.6} ({})", diagnostics.summary());

    PlanarMetrology {
        area,
        projected_area: triangle_count as f64 * 0.5 * dx * dy,
        triangle_count,
        diagnostics,
    }
}

/// Area and enclosed volume of a spherical radial field by solid-angle
/// integration.
///
/// Every node owns the solid angle Ω of its angular cell (see
/// [`SphericalGrid::cell_solid_angle`]). Its area contribution is `Ω·ρ²` and
/// its volume contribution is the spherical sector `Ω·ρ³/3`, i.e. area
/// times `ρ/3`. Nodes without data are skipped and counted.
#[must_use]
pub fn spherical_area_volume(grid: &SphericalGrid) -> SphericalMetrology {
    let node_count = grid.node_count();
    let cells = map_indices(node_count, |flat| {
        let (i, j) = grid.node_of(flat);
        grid.value(i, j).map(|rho| {
            let omega = grid.cell_solid_angle(i, j);
            (omega, omega * rho * rho, omega * rho.powi(3) / 3.0)
        })
    });

    let mut diagnostics = AccumulationDiagnostics::new();
    let mut solid_angle = 0.0;
    let mut area = 0.0;
    let mut volume = 0.0;
    diagnostics.visited += cells.len();
    for cell in cells {
        match cell {
            Some((omega, a, v)) => {
                solid_angle += omega;
                area += a;
                volume += v;
                diagnostics.used += 1;
            }
            None => diagnostics.missing_data += 1,
        }
    }
    if diagnostics.missing_data > 0 {
        log::warn!(
            "spherical metrology: {} nodes without data",
            diagnostics.missing_data
        );
    }

    let (n_phi, n_theta) = grid.shape();
    let triangles = triangulate_grid_wrapped(n_phi, n_theta, true);
    // pole rows of a linear grid collapse onto one point; those triangles
    // are expected to be degenerate and are not reported
    let mut mesh_diagnostics = AccumulationDiagnostics::new();
    let (triangulated_area, _) =
        sum_triangle_areas(triangle_areas(grid, &triangles), &mut mesh_diagnostics);

    log::debug!(
        "spherical area {area:.6} volume {volume:.6} Ω {solid_angle:.6} ({})",
        diagnostics.summary()
    );

    SphericalMetrology {
        area,
        volume,
        solid_angle,
        triangulated_area,
        diagnostics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tilted_plane_area_scales_with_slope() {
        // z = x over a 2x2 footprint: true area 2·2·√2
        let grid = PlanarGrid::from_fn((0.0, 0.0), (1.0, 1.0), (3, 3), |x, _| x).unwrap();
        let metrology = planar_surface_area(&grid);
        assert!((metrology.area - 4.0 * 2.0_f64.sqrt()).abs() < 1e-12);
        assert!((metrology.projected_area - 4.0).abs() < 1e-12);
        assert_eq!(metrology.triangle_count, 8);
    }

    #[test]
    fn missing_node_drops_its_triangles() {
        let mut values = vec![0.0; 9];
        values[0] = f64::NAN;
        let grid = PlanarGrid::new((0.0, 0.0), (1.0, 1.0), (3, 3), values).unwrap();
        let metrology = planar_surface_area(&grid);
        // node (0,0) belongs to both triangles of the first cell
        assert_eq!(metrology.diagnostics.missing_data, 2);
        assert!((metrology.area - 3.0).abs() < 1e-12);
    }
}
