use serde::{Deserialize, Serialize};

use super::topography::mid_surface;
use crate::geom::{
    AccumulationDiagnostics, CellMap, SurfaceError, SurfaceGrid, SurfaceResult, TopologyKind,
    map_indices,
};
use crate::stats::{mean, sample_std_dev};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ThicknessMode {
    /// `|top − bottom|` of the field: height for planar grids, radius for
    /// spherical grids.
    #[default]
    FieldDifference,
    /// Height difference projected on the normal of the mid surface. Planar
    /// grids only.
    NormalProjected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ThicknessOptions {
    pub mode: ThicknessMode,
}

impl ThicknessOptions {
    #[must_use]
    pub const fn with_mode(mut self, mode: ThicknessMode) -> Self {
        self.mode = mode;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThicknessMap {
    pub thickness: CellMap,
    pub mean: Option<f64>,
    pub std_dev: Option<f64>,
    /// Volume enclosed between the two surfaces over nodes with data.
    pub volume: f64,
    pub diagnostics: AccumulationDiagnostics,
}

/// Per-node separation of two surfaces fitted on the same geometry.
///
/// # Errors
/// `GridShapeMismatch` when the grids differ in shape, `InvalidInput` for
/// [`ThicknessMode::NormalProjected`] on a spherical grid.
pub fn thickness_map<G: SurfaceGrid>(
    top: &G,
    bottom: &G,
    options: ThicknessOptions,
) -> SurfaceResult<ThicknessMap> {
    let mid = mid_surface(top, bottom)?;
    if options.mode == ThicknessMode::NormalProjected && top.kind() != TopologyKind::Planar {
        return Err(SurfaceError::InvalidInput {
            reason: "normal-projected thickness is defined for planar grids only".to_string(),
        });
    }

    let cells = map_indices(top.node_count(), |flat| {
        let (i, j) = top.node_of(flat);
        let (a, b) = (top.value(i, j)?, bottom.value(i, j)?);
        let difference = (a - b).abs();
        let thickness = match options.mode {
            ThicknessMode::FieldDifference => difference,
            ThicknessMode::NormalProjected => difference * mid.fitted_normal(i, j)?.z.abs(),
        };
        Some((thickness, top.shell_volume(i, j, a, b)))
    });

    let mut diagnostics = AccumulationDiagnostics::new();
    diagnostics.visited = cells.len();
    let mut volume = 0.0;
    let mut values = Vec::with_capacity(cells.len());
    let mut counts = Vec::with_capacity(cells.len());
    for cell in cells {
        match cell {
            Some((thickness, shell)) => {
                volume += shell;
                diagnostics.used += 1;
                values.push(Some(thickness));
                counts.push(1);
            }
            None => {
                diagnostics.missing_data += 1;
                values.push(None);
                counts.push(0);
            }
        }
    }
    if diagnostics.missing_data > 0 {
        log::warn!("thickness: {}", diagnostics.summary());
    }

    let thickness = CellMap::from_parts(top.shape(), values, counts);
    let defined: Vec<f64> = thickness.defined().collect();
    Ok(ThicknessMap {
        mean: mean(&defined).ok(),
        std_dev: sample_std_dev(&defined).ok(),
        thickness,
        volume,
        diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::{PlanarGrid, Point3, PolarBinning, SphericalGrid, spherical_area_volume};

    #[test]
    fn slab_thickness_and_volume() {
        let top = PlanarGrid::from_fn((0.0, 0.0), (0.5, 0.5), (3, 3), |_, _| 2.0).unwrap();
        let bottom = PlanarGrid::from_fn((0.0, 0.0), (0.5, 0.5), (3, 3), |_, _| -1.0).unwrap();
        let map = thickness_map(&top, &bottom, ThicknessOptions::default()).unwrap();
        assert!(map.thickness.defined().all(|t| (t - 3.0).abs() < 1e-12));
        assert_eq!(map.mean, Some(3.0));
        // 1×1 footprint
        assert!((map.volume - 3.0).abs() < 1e-12);
    }

    #[test]
    fn missing_nodes_are_none() {
        let top = PlanarGrid::new((0.0, 0.0), (1.0, 1.0), (2, 2), vec![1.0, f64::NAN, 1.0, 1.0])
            .unwrap();
        let bottom = PlanarGrid::from_fn((0.0, 0.0), (1.0, 1.0), (2, 2), |_, _| 0.0).unwrap();
        let map = thickness_map(&top, &bottom, ThicknessOptions::default()).unwrap();
        assert_eq!(map.thickness.get(0, 1), None);
        assert_eq!(map.diagnostics.missing_data, 1);
        assert_eq!(map.thickness.defined_count(), 3);
    }

    #[test]
    fn normal_projection_on_a_tilted_bilayer() {
        let top = PlanarGrid::from_fn((0.0, 0.0), (1.0, 1.0), (4, 4), |x, _| x + 1.0).unwrap();
        let bottom = PlanarGrid::from_fn((0.0, 0.0), (1.0, 1.0), (4, 4), |x, _| x - 1.0).unwrap();
        let options = ThicknessOptions::default().with_mode(ThicknessMode::NormalProjected);
        let map = thickness_map(&top, &bottom, options).unwrap();
        let expected = 2.0 / 2.0_f64.sqrt();
        assert!(map.thickness.defined().all(|t| (t - expected).abs() < 1e-12));
    }

    #[test]
    fn spherical_shell() {
        let outer = SphericalGrid::from_fn(Point3::ORIGIN, (24, 13), PolarBinning::Linear, |_, _| 3.0)
            .unwrap();
        let inner = SphericalGrid::from_fn(Point3::ORIGIN, (24, 13), PolarBinning::Linear, |_, _| 2.0)
            .unwrap();
        let map = thickness_map(&outer, &inner, ThicknessOptions::default()).unwrap();
        assert!(map.thickness.defined().all(|t| (t - 1.0).abs() < 1e-12));
        let expected = spherical_area_volume(&outer).volume - spherical_area_volume(&inner).volume;
        assert!((map.volume - expected).abs() < 1e-9 * expected);

        let options = ThicknessOptions::default().with_mode(ThicknessMode::NormalProjected);
        assert!(matches!(
            thickness_map(&outer, &inner, options),
            Err(SurfaceError::InvalidInput { .. })
        ));
    }
}
