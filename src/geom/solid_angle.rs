//! Solid angles subtended at the origin by spherical polygons.

use std::f64::consts::PI;

use super::{Tolerance, Vec3};

/// Solid angle of the spherical triangle spanned by three direction vectors.
///
/// Uses the Van Oosterom–Strackee expression
/// `tan(Ω/2) = |a·(b×c)| / (abc + (a·b)c + (b·c)a + (c·a)b)`; the inputs do
/// not need to be unit length. A zero-length corner gives `0.0`.
#[must_use]
pub fn solid_angle_triangle(a: Vec3, b: Vec3, c: Vec3) -> f64 {
    let la = a.length();
    let lb = b.length();
    let lc = c.length();
    let tol = Tolerance::ZERO_LENGTH.eps;
    if la <= tol || lb <= tol || lc <= tol {
        return 0.0;
    }
    let numerator = a.dot(b.cross(c)).abs();
    let denominator = la * lb * lc + a.dot(b) * lc + b.dot(c) * la + c.dot(a) * lb;
    let omega = 2.0 * numerator.atan2(denominator);
    if omega.is_finite() { omega.max(0.0) } else { 0.0 }
}

/// Solid angle of a spherical quadrilateral, split along `v1`–`v3`.
///
/// Corners are taken in order around the cell. Coincident corners (a
/// quadrilateral collapsed onto a pole) contribute a zero-area triangle.
/// The result lies in `[0, 4π]`.
#[must_use]
pub fn solid_angle(v1: Vec3, v2: Vec3, v3: Vec3, v4: Vec3) -> f64 {
    let omega = solid_angle_triangle(v1, v2, v3) + solid_angle_triangle(v1, v3, v4);
    omega.clamp(0.0, 4.0 * PI)
}
