mod cloud;
mod coords;
mod core;
mod diagnostics;
mod error;
mod grid;
mod metrology;
mod params;
mod reduce;
mod rmsd;
mod solid_angle;
mod triangulation;

pub use cloud::PointCloud;
pub use coords::{
    SphericalCloud, SphericalCoord, cartesian_to_spherical, cartesian_to_spherical_about,
    cloud_to_spherical, cross, direction, dot, magnitude, normalize, normalize_azimuth,
    spherical_grid_to_cartesian, spherical_to_cartesian, spherical_to_cartesian_about,
};
pub use self::core::{BBox, Point3, Tolerance, Vec3};
pub use diagnostics::{AccumulationDiagnostics, MAX_WARNINGS};
pub use error::{SurfaceError, SurfaceResult};
pub use grid::{
    CellMap, Connectivity, NodeIndex, ONE_BASED_OFFSET, PlanarExtent, PlanarGrid, PolarBinning,
    SphericalGrid, SurfaceGrid, TopologyKind,
};
pub use metrology::{
    PlanarMetrology, SphericalMetrology, planar_surface_area, spherical_area_volume,
    triangle_area,
};
pub use params::{
    CARTESIAN_ALPHA_OFFSET, CARTESIAN_ALPHA_SLOPE, FitParameterOptions, FitParameters,
    GridFitter, GridParameters, MAX_CALIBRATED_ROUGHNESS, SPHERICAL_ALPHA_OFFSET,
    SPHERICAL_ALPHA_SLOPE, bin_count_cartesian, bin_count_spherical,
    estimate_fit_parameters_planar, estimate_fit_parameters_spherical,
    grid_parameters_cartesian, grid_parameters_spherical,
};
pub use rmsd::{
    FitQuality, FittedSurface, inertia_aligned_rmsd, planar_rmsd, pooled_rmsd, spherical_rmsd,
};
pub use solid_angle::{solid_angle, solid_angle_triangle};
pub use triangulation::{Triangle, triangulate_grid, triangulate_grid_wrapped};

pub(crate) use reduce::map_indices;

#[cfg(test)]
mod tests;
