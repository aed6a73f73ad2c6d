//! Scalar descriptors of fitted surfaces and their point clouds.

mod density;
mod inertia;
mod order;
mod thickness;
mod topography;

use serde::Serialize;

use crate::geom::AccumulationDiagnostics;

pub use density::{
    DensityNormalization, DensityProfileOptions, RelativeDensityOptions,
    radial_density_profile, relative_density_profile,
};
pub use inertia::{
    InertiaOptions, InertiaOrigin, InertiaTensor, PrincipalAxes, inertia_tensor,
    radius_of_gyration, surface_inertia_tensor,
};
pub use order::{OrderMap, SurfaceOrder, order_parameter_map, second_legendre, surface_order};
pub use thickness::{ThicknessMap, ThicknessMode, ThicknessOptions, thickness_map};
pub use topography::{TopographyOptions, mid_surface, topography_map};

/// One bin of a profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProfileBin {
    pub center: f64,
    pub value: f64,
    /// Samples that fell into the bin.
    pub count: usize,
}

/// Descriptor values ordered by bin center.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Profile {
    pub bins: Vec<ProfileBin>,
    pub diagnostics: AccumulationDiagnostics,
}

impl Profile {
    #[must_use]
    pub fn centers(&self) -> Vec<f64> {
        self.bins.iter().map(|b| b.center).collect()
    }

    #[must_use]
    pub fn values(&self) -> Vec<f64> {
        self.bins.iter().map(|b| b.value).collect()
    }
}
