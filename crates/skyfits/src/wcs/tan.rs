//! TAN (gnomonic) projection between the sky and the tangent plane.
//!
//! Sky positions and tangent-plane offsets are both expressed in degrees.
//! The tangent plane touches the sphere at the reference point `(ra0, dec0)`;
//! `xi` grows towards east and `eta` towards north.

use alloc::format;

use super::sphere::{normalize_ra, validate_declination, DEG_TO_RAD, RAD_TO_DEG};
use crate::error::{Error, Result};

/// Project a sky position onto the tangent plane at `(ra0, dec0)`.
///
/// Fails with [`Error::ProjectionSingularity`] when the position is 90 degrees
/// or more from the reference point, where the gnomonic projection is
/// undefined.
pub fn project(ra: f64, dec: f64, ra0: f64, dec0: f64) -> Result<(f64, f64)> {
    let (sin_d, cos_d) = libm::sincos(dec * DEG_TO_RAD);
    let (sin_d0, cos_d0) = libm::sincos(dec0 * DEG_TO_RAD);
    let (sin_da, cos_da) = libm::sincos((ra - ra0) * DEG_TO_RAD);

    let cos_c = sin_d0 * sin_d + cos_d0 * cos_d * cos_da;
    if cos_c <= 0.0 {
        return Err(Error::ProjectionSingularity(format!(
            "({ra:.6}, {dec:.6}) is at least 90 deg from the tangent point ({ra0:.6}, {dec0:.6})"
        )));
    }

    let xi = cos_d * sin_da / cos_c;
    let eta = (cos_d0 * sin_d - sin_d0 * cos_d * cos_da) / cos_c;
    Ok((xi * RAD_TO_DEG, eta * RAD_TO_DEG))
}

/// Map tangent-plane offsets back to a sky position.
///
/// A zero offset returns the reference point exactly. RA is normalized into
/// `[0, 360)` and Dec into `[-90, 90]`.
pub fn deproject(xi: f64, eta: f64, ra0: f64, dec0: f64) -> (f64, f64) {
    if xi == 0.0 && eta == 0.0 {
        return (normalize_ra(ra0), validate_declination(dec0));
    }

    let x = xi * DEG_TO_RAD;
    let y = eta * DEG_TO_RAD;
    let (sin_d0, cos_d0) = libm::sincos(dec0 * DEG_TO_RAD);

    let rho = libm::hypot(x, y);
    let c = libm::atan(rho);
    let (sin_c, cos_c) = libm::sincos(c);

    let sin_dec = (cos_c * sin_d0 + y * sin_c * cos_d0 / rho).clamp(-1.0, 1.0);
    let dec = libm::asin(sin_dec);
    let dra = libm::atan2(x * sin_c, rho * cos_d0 * cos_c - y * sin_d0 * sin_c);

    (
        normalize_ra(ra0 + dra * RAD_TO_DEG),
        validate_declination(dec * RAD_TO_DEG),
    )
}
