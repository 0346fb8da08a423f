//! Angle normalization and great-circle distance on the celestial sphere.
//!
//! All angles are in degrees.

use core::f64::consts::PI;

/// Degrees to radians.
pub const DEG_TO_RAD: f64 = PI / 180.0;

/// Radians to degrees.
pub const RAD_TO_DEG: f64 = 180.0 / PI;

/// Map a right ascension into `[0, 360)`.
pub fn normalize_ra(ra: f64) -> f64 {
    let wrapped = libm::fmod(ra, 360.0);
    let wrapped = if wrapped < 0.0 { wrapped + 360.0 } else { wrapped };
    // -1e-17 + 360.0 rounds to 360.0
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Clamp a declination into `[-90, 90]`.
pub fn validate_declination(dec: f64) -> f64 {
    dec.clamp(-90.0, 90.0)
}

/// Great-circle separation between two (RA, Dec) positions, using the
/// haversine formula.
///
/// Stable for small separations, across the RA seam, and near the poles.
pub fn angular_separation(ra1: f64, dec1: f64, ra2: f64, dec2: f64) -> f64 {
    let phi1 = dec1 * DEG_TO_RAD;
    let phi2 = dec2 * DEG_TO_RAD;
    let half_dphi = (phi2 - phi1) / 2.0;
    let half_dlambda = (ra2 - ra1) * DEG_TO_RAD / 2.0;

    let a = libm::sin(half_dphi) * libm::sin(half_dphi)
        + libm::cos(phi1) * libm::cos(phi2) * libm::sin(half_dlambda) * libm::sin(half_dlambda);
    2.0 * libm::asin(libm::sqrt(a).min(1.0)) * RAD_TO_DEG
}
