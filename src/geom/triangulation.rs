use serde::{Deserialize, Serialize};

use super::grid::NodeIndex;
use super::{Point3, SurfaceError, SurfaceResult};

/// Split every cell of an `n_i x n_j` node grid into two triangles.
///
/// Cell `(i-1, j-1)..(i, j)` is cut along its `(i-1, j-1)`–`(i, j)`
/// diagonal.
#[must_use]
pub fn triangulate_grid(n_i: usize, n_j: usize) -> Vec<[NodeIndex; 3]> {
    triangulate_grid_wrapped(n_i, n_j, false)
}

/// As [`triangulate_grid`], optionally closing the `i` axis so the last
/// column connects back to the first (azimuth of a spherical grid).
#[must_use]
pub fn triangulate_grid_wrapped(n_i: usize, n_j: usize, wrap_i: bool) -> Vec<[NodeIndex; 3]> {
    let min_i = if wrap_i { 3 } else { 2 };
    if n_i < min_i || n_j < 2 {
        return Vec::new();
    }

    let quad_i = if wrap_i { n_i } else { n_i - 1 };
    let quad_j = n_j - 1;
    let mut triangles = Vec::with_capacity(quad_i * quad_j * 2);

    for j in 1..=quad_j {
        let j0 = j - 1;
        for i in 1..=quad_i {
            let i0 = i - 1;
            let i1 = if wrap_i { i % n_i } else { i };

            let lower = (i0, j0);
            let upper = (i1, j);
            triangles.push([lower, (i1, j0), upper]);
            triangles.push([lower, upper, (i0, j)]);
        }
    }

    triangles
}

/// Three vertices taken from adjacent grid nodes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Triangle {
    pub a: Point3,
    pub b: Point3,
    pub c: Point3,
}

impl Triangle {
    #[must_use]
    pub const fn new(a: Point3, b: Point3, c: Point3) -> Self {
        Self { a, b, c }
    }

    #[must_use]
    pub fn edge_lengths(&self) -> [f64; 3] {
        [
            self.a.distance_to(self.b),
            self.b.distance_to(self.c),
            self.c.distance_to(self.a),
        ]
    }

    /// Heron's formula on the three edge lengths.
    ///
    /// The radicand is clamped at zero, so collinear and nearly collinear
    /// triangles return `0.0` or a tiny area rather than NaN.
    ///
    /// # Errors
    /// `DegenerateTriangle` when two vertices coincide exactly.
    pub fn area(&self) -> SurfaceResult<f64> {
        let [a, b, c] = self.edge_lengths();
        if a == 0.0 || b == 0.0 || c == 0.0 {
            return Err(SurfaceError::DegenerateTriangle {
                vertices: [self.a, self.b, self.c],
            });
        }
        let s = 0.5 * (a + b + c);
        Ok((s * (s - a) * (s - b) * (s - c)).max(0.0).sqrt())
    }
}
