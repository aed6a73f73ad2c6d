use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::geom::{
    Point3, SphericalCoord, Vec3, cartesian_to_spherical, cartesian_to_spherical_about,
    cloud_to_spherical, normalize, normalize_azimuth, spherical_to_cartesian,
    spherical_to_cartesian_about,
};

fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
    (a - b).abs() <= eps
}

#[test]
fn spherical_round_trip_random_points() {
    let mut rng = StdRng::seed_from_u64(7);
    let center = Point3::new(1.5, -2.0, 0.25);
    for _ in 0..500 {
        let p = Point3::new(
            rng.random_range(-20.0..20.0),
            rng.random_range(-20.0..20.0),
            rng.random_range(-20.0..20.0),
        );
        let s = cartesian_to_spherical_about(p, center);
        assert!(s.phi >= 0.0 && s.phi < std::f64::consts::TAU);
        assert!(s.theta >= 0.0 && s.theta <= std::f64::consts::PI);
        let back = spherical_to_cartesian_about(s, center);
        assert!(back.distance_to(p) < 1e-10, "{p:?} -> {back:?}");
    }
}

fn angle_gap(a: f64, b: f64) -> f64 {
    let d = (a - b).rem_euclid(std::f64::consts::TAU);
    d.min(std::f64::consts::TAU - d)
}

fn assert_spherical_round_trip(s: SphericalCoord) {
    let back = cartesian_to_spherical(spherical_to_cartesian(s));
    assert!(approx_eq(back.rho, s.rho, 1e-10), "{s:?} -> {back:?}");
    assert!(approx_eq(back.theta, s.theta, 1e-10), "{s:?} -> {back:?}");
    assert!(angle_gap(back.phi, s.phi) <= 1e-10, "{s:?} -> {back:?}");
}

#[test]
fn cartesian_round_trip_recovers_angles() {
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..500 {
        assert_spherical_round_trip(SphericalCoord::new(
            rng.random_range(0.1..50.0),
            rng.random_range(0.0..std::f64::consts::TAU),
            rng.random_range(0.0..std::f64::consts::PI),
        ));
    }
}

#[test]
fn polar_angle_is_exact_next_to_the_poles() {
    let pi = std::f64::consts::PI;
    for theta in [1e-12, 1e-8, 1e-6, 1e-3, pi - 1e-3, pi - 1e-7, pi - 1e-9] {
        assert_spherical_round_trip(SphericalCoord::new(3.0, 1.0, theta));
    }
}

#[test]
fn poles_and_origin_have_defined_angles() {
    let north = cartesian_to_spherical(Point3::new(0.0, 0.0, 5.0));
    assert_eq!(north.theta, 0.0);
    assert_eq!(north.phi, 0.0);
    let south = cartesian_to_spherical(Point3::new(0.0, 0.0, -5.0));
    assert!(approx_eq(south.theta, std::f64::consts::PI, 1e-15));

    let origin = cartesian_to_spherical(Point3::ORIGIN);
    assert_eq!(origin, SphericalCoord::new(0.0, 0.0, 0.0));
    assert_eq!(spherical_to_cartesian(origin), Point3::ORIGIN);
}

#[test]
fn negative_azimuths_wrap_into_range() {
    let s = cartesian_to_spherical(Point3::new(1.0, -1.0, 0.0));
    assert!(approx_eq(s.phi, 1.75 * std::f64::consts::PI, 1e-12));
    assert_eq!(normalize_azimuth(-1e-300), 0.0);
}

#[test]
fn cloud_mean_radius() {
    let points = [
        Point3::new(2.0, 0.0, 0.0),
        Point3::new(0.0, 4.0, 0.0),
        Point3::new(0.0, 0.0, -3.0),
    ];
    let cloud = cloud_to_spherical(&points, Point3::ORIGIN).unwrap();
    assert_eq!(cloud.coords.len(), 3);
    assert!(approx_eq(cloud.mean_radius, 3.0, 1e-12));
    assert!(cloud_to_spherical(&[], Point3::ORIGIN).is_err());
}

#[test]
fn zero_vector_cannot_be_normalized() {
    assert!(normalize(Vec3::ZERO).is_err());
    let n = normalize(Vec3::new(0.0, 3.0, 4.0)).unwrap();
    assert!(approx_eq(n.length(), 1.0, 1e-15));
}
