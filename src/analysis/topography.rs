use serde::{Deserialize, Serialize};

use crate::geom::{CellMap, Connectivity, SurfaceError, SurfaceGrid, SurfaceResult, map_indices};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TopographyOptions {
    pub connectivity: Connectivity,
}

impl TopographyOptions {
    #[must_use]
    pub const fn with_connectivity(mut self, connectivity: Connectivity) -> Self {
        self.connectivity = connectivity;
        self
    }
}

/// Local roughness: each node's field value minus the mean of its neighbors
/// that carry data. The per-node count is the number of neighbors averaged.
///
/// A node is `None` when it has no data itself or no neighbor with data.
#[must_use]
pub fn topography_map<G: SurfaceGrid>(grid: &G, options: TopographyOptions) -> CellMap {
    let cells = map_indices(grid.node_count(), |flat| {
        let (i, j) = grid.node_of(flat);
        let Some(value) = grid.value(i, j) else {
            return (None, 0);
        };
        let (sum, count) = grid
            .neighbors(i, j, options.connectivity)
            .into_iter()
            .filter_map(|(a, b)| grid.value(a, b))
            .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
        if count == 0 {
            (None, 0)
        } else {
            (Some(value - sum / count as f64), count)
        }
    });

    let (values, counts): (Vec<_>, Vec<_>) = cells.into_iter().unzip();
    let map = CellMap::from_parts(grid.shape(), values, counts);
    log::debug!(
        "topography: {} of {} nodes defined",
        map.defined_count(),
        grid.node_count()
    );
    map
}

/// Surface halfway between two fields on the same geometry. Nodes missing
/// in either input are missing in the result.
///
/// # Errors
/// `GridShapeMismatch` when the grids differ in shape.
pub fn mid_surface<G: SurfaceGrid>(top: &G, bottom: &G) -> SurfaceResult<G> {
    if top.shape() != bottom.shape() {
        return Err(SurfaceError::GridShapeMismatch {
            left: top.shape(),
            right: bottom.shape(),
        });
    }
    let values = top
        .values()
        .iter()
        .zip(bottom.values())
        .map(|(&a, &b)| {
            if a.is_finite() && b.is_finite() {
                0.5 * (a + b)
            } else {
                f64::NAN
            }
        })
        .collect();
    top.with_values(values)
}
