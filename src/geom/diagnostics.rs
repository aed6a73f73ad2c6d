//! Accumulation diagnostics for bulk descriptor computations.
//!
//! Kernels that sum over many points or grid cells recover from per-item
//! anomalies instead of aborting: a point outside the grid, a node without
//! fitted data or a triangle with coincident vertices is skipped and counted
//! here. The diagnostics travel with the result so callers can decide
//! whether a frame is trustworthy.
//!
//! # Example
//!
//! ```ignore
//! use suave_engine::geom::{planar_rmsd, AccumulationDiagnostics};
//!
//! let quality = planar_rmsd(&grid, cloud.positions())?;
//! if !quality.diagnostics.is_clean() {
//!     log::warn!("frame {frame}: {}", quality.diagnostics.summary());
//! }
//! ```

use std::fmt;

use serde::Serialize;

/// Upper bound on stored warning messages; further ones are only counted.
pub const MAX_WARNINGS: usize = 32;

/// Counts of items visited, used and skipped during one accumulation.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct AccumulationDiagnostics {
    /// Points or cells offered to the accumulation.
    pub visited: usize,

    /// Items that contributed to the result.
    pub used: usize,

    /// Points more than one cell outside the grid.
    pub out_of_bounds: usize,

    /// Items that landed on a node or cell without fitted data.
    pub missing_data: usize,

    /// Triangles with coincident vertices, counted with zero area.
    pub degenerate_triangles: usize,

    /// Zero-length direction vectors that could not be normalized.
    pub degenerate_vectors: usize,

    /// Warnings beyond [`MAX_WARNINGS`] that were dropped.
    pub suppressed_warnings: usize,

    /// Human-readable detail for the first anomalies, e.g.
    /// "point 17 maps to fractional index (-3.2, 4.0) ...".
    pub warnings: Vec<String>,
}

impl AccumulationDiagnostics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Items that were visited but did not contribute.
    #[must_use]
    pub fn excluded(&self) -> usize {
        self.out_of_bounds + self.missing_data + self.degenerate_vectors
    }

    /// Returns `true` if nothing was skipped or recovered.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.excluded() == 0 && self.degenerate_triangles == 0 && self.warnings.is_empty()
    }

    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty() || self.suppressed_warnings > 0
    }

    /// Adds a warning message, keeping at most [`MAX_WARNINGS`].
    pub fn add_warning(&mut self, warning: impl Into<String>) {
        if self.warnings.len() < MAX_WARNINGS {
            self.warnings.push(warning.into());
        } else {
            self.suppressed_warnings += 1;
        }
    }

    /// Merges another diagnostics struct into this one. Counts are summed,
    /// warnings appended up to the cap.
    pub fn merge(&mut self, other: &AccumulationDiagnostics) {
        self.visited += other.visited;
        self.used += other.used;
        self.out_of_bounds += other.out_of_bounds;
        self.missing_data += other.missing_data;
        self.degenerate_triangles += other.degenerate_triangles;
        self.degenerate_vectors += other.degenerate_vectors;
        self.suppressed_warnings += other.suppressed_warnings;
        for warning in &other.warnings {
            self.add_warning(warning.clone());
        }
    }

    /// Short summary for logging: `"visited:{n} used:{n} [issues...]"`.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut parts = vec![format!("visited:{} used:{}", self.visited, self.used)];

        if self.out_of_bounds > 0 {
            parts.push(format!("out-of-bounds:{}", self.out_of_bounds));
        }
        if self.missing_data > 0 {
            parts.push(format!("missing:{}", self.missing_data));
        }
        if self.degenerate_triangles > 0 {
            parts.push(format!("degenerate-triangles:{}", self.degenerate_triangles));
        }
        if self.degenerate_vectors > 0 {
            parts.push(format!("degenerate-vectors:{}", self.degenerate_vectors));
        }

        parts.join(" ")
    }
}

impl fmt::Display for AccumulationDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Accumulation Diagnostics:")?;
        writeln!(f, "  Visited: {}", self.visited)?;
        writeln!(f, "  Used: {}", self.used)?;

        if self.excluded() > 0 {
            writeln!(f, "  Excluded:")?;
            if self.out_of_bounds > 0 {
                writeln!(f, "    - Outside grid: {}", self.out_of_bounds)?;
            }
            if self.missing_data > 0 {
                writeln!(f, "    - Missing data: {}", self.missing_data)?;
            }
            if self.degenerate_vectors > 0 {
                writeln!(f, "    - Zero-length vectors: {}", self.degenerate_vectors)?;
            }
        }

        if self.degenerate_triangles > 0 {
            writeln!(f, "  Degenerate triangles: {}", self.degenerate_triangles)?;
        }

        if self.has_warnings() {
            writeln!(f, "  Warnings:")?;
            for warning in &self.warnings {
                writeln!(f, "    - {warning}")?;
            }
            if self.suppressed_warnings > 0 {
                writeln!(f, "    ... and {} more", self.suppressed_warnings)?;
            }
        }

        let status = if self.is_clean() { "CLEAN" } else { "RECOVERED" };
        writeln!(f, "  Status: {status}")
    }
}
