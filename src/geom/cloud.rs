use serde::{Deserialize, Serialize};

use super::{BBox, Point3, SurfaceError, SurfaceResult, Vec3};

/// Immutable snapshot of the points of one frame.
///
/// Positions are required; orientation vectors (for order parameters) and
/// masses (for inertia and gyration) are optional columns of the same
/// length. Points without a mass column weigh `1.0`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PointCloud {
    positions: Vec<Point3>,
    orientations: Option<Vec<Vec3>>,
    masses: Option<Vec<f64>>,
}

impl PointCloud {
    #[must_use]
    pub fn new(positions: Vec<Point3>) -> Self {
        Self {
            positions,
            orientations: None,
            masses: None,
        }
    }

    /// Attach one orientation vector per point.
    ///
    /// # Errors
    /// `InvalidInput` when the column length differs from the point count.
    pub fn with_orientations(mut self, orientations: Vec<Vec3>) -> SurfaceResult<Self> {
        check_column_len("orientations", orientations.len(), self.positions.len())?;
        self.orientations = Some(orientations);
        Ok(self)
    }

    /// Attach one mass per point.
    ///
    /// # Errors
    /// `InvalidInput` when the column length differs from the point count or
    /// a mass is negative or not finite.
    pub fn with_masses(mut self, masses: Vec<f64>) -> SurfaceResult<Self> {
        check_column_len("masses", masses.len(), self.positions.len())?;
        if let Some((index, mass)) = masses
            .iter()
            .enumerate()
            .find(|(_, m)| !m.is_finite() || **m < 0.0)
        {
            return Err(SurfaceError::InvalidInput {
                reason: format!("mass of point {index} must be finite and non-negative: {mass}"),
            });
        }
        self.masses = Some(masses);
        Ok(self)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    #[must_use]
    pub fn positions(&self) -> &[Point3] {
        &self.positions
    }

    #[must_use]
    pub fn orientations(&self) -> Option<&[Vec3]> {
        self.orientations.as_deref()
    }

    #[must_use]
    pub fn masses(&self) -> Option<&[f64]> {
        self.masses.as_deref()
    }

    /// Mass of point `index`, `1.0` without a mass column.
    #[must_use]
    pub fn mass(&self, index: usize) -> f64 {
        self.masses
            .as_ref()
            .and_then(|m| m.get(index).copied())
            .unwrap_or(1.0)
    }

    #[must_use]
    pub fn total_mass(&self) -> f64 {
        match &self.masses {
            Some(m) => m.iter().sum(),
            None => self.positions.len() as f64,
        }
    }

    /// Axis-aligned bounds of the positions, `None` for an empty cloud.
    #[must_use]
    pub fn bounds(&self) -> Option<BBox> {
        BBox::from_points(&self.positions)
    }

    /// Mass-weighted center (plain centroid without a mass column).
    ///
    /// # Errors
    /// `EmptyPointSet` for an empty cloud, `InvalidInput` when the total mass
    /// is zero.
    pub fn center_of_mass(&self) -> SurfaceResult<Point3> {
        if self.is_empty() {
            return Err(SurfaceError::EmptyPointSet {
                context: "center of mass",
            });
        }
        let total = self.total_mass();
        if total <= 0.0 {
            return Err(SurfaceError::InvalidInput {
                reason: format!("total mass must be positive: {total}"),
            });
        }
        let weighted = self
            .positions
            .iter()
            .enumerate()
            .fold(Vec3::ZERO, |acc, (i, p)| acc + p.to_vec3() * self.mass(i));
        Ok(Point3::from(weighted / total))
    }
}

fn check_column_len(attribute: &str, len: usize, expected: usize) -> SurfaceResult<()> {
    if len == expected {
        Ok(())
    } else {
        Err(SurfaceError::InvalidInput {
            reason: format!("{attribute} column has {len} entries for {expected} points"),
        })
    }
}
