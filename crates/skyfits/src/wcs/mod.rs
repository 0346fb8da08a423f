//! World Coordinate System: mapping image pixels to celestial coordinates.
//!
//! Only the TAN projection is implemented. Pixel arguments are 0-based; the
//! 1-based FITS reference pixel (CRPIX) is converted internally.

pub mod sphere;
pub mod tan;
pub mod transform;
mod validate;

use alloc::string::String;
use alloc::vec::Vec;

use crate::error::Result;

pub use sphere::{angular_separation, normalize_ra, validate_declination};
pub use transform::LinearTransform;
pub use validate::ValidationLimits;

/// Celestial WCS of a two-dimensional image.
#[derive(Debug, Clone, PartialEq)]
pub struct WcsParameters {
    /// Reference pixel, 1-based as written in the header.
    pub crpix: [f64; 2],
    /// Sky position of the reference pixel, `[ra, dec]` in degrees.
    pub crval: [f64; 2],
    pub transform: LinearTransform,
    /// CTYPE1 and CTYPE2.
    pub ctype: [String; 2],
    /// Three-letter projection code taken from CTYPE1, e.g. `TAN`.
    pub projection: String,
    /// RADESYS, e.g. `ICRS` or `FK5`.
    pub radesys: Option<String>,
    pub equinox: Option<f64>,
}

/// Angular extent of an image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldOfView {
    pub width_deg: f64,
    pub height_deg: f64,
    pub diagonal_deg: f64,
}

impl WcsParameters {
    /// An equatorial TAN WCS. The reference position is normalized.
    pub fn new(crpix: [f64; 2], crval: [f64; 2], transform: LinearTransform) -> Self {
        Self {
            crpix,
            crval: [normalize_ra(crval[0]), validate_declination(crval[1])],
            transform,
            ctype: [String::from("RA---TAN"), String::from("DEC--TAN")],
            projection: String::from("TAN"),
            radesys: None,
            equinox: None,
        }
    }

    /// Sky position `(ra, dec)` in degrees of a 0-based pixel position.
    pub fn pixel_to_world(&self, x: f64, y: f64) -> (f64, f64) {
        let dx = x + 1.0 - self.crpix[0];
        let dy = y + 1.0 - self.crpix[1];
        let (xi, eta) = self.transform.apply(dx, dy);
        tan::deproject(xi, eta, self.crval[0], self.crval[1])
    }

    /// 0-based pixel position of a sky position.
    ///
    /// Fails with [`crate::Error::ProjectionSingularity`] for positions 90
    /// degrees or more from the reference point.
    pub fn world_to_pixel(&self, ra: f64, dec: f64) -> Result<(f64, f64)> {
        let (xi, eta) = tan::project(ra, dec, self.crval[0], self.crval[1])?;
        let (dx, dy) = self.transform.invert(xi, eta);
        Ok((dx + self.crpix[0] - 1.0, dy + self.crpix[1] - 1.0))
    }

    /// Pixel scale `(x, y)` in arcseconds per pixel.
    pub fn pixel_scale_arcsec(&self) -> (f64, f64) {
        let (sx, sy) = self.transform.pixel_scale();
        (sx * 3600.0, sy * 3600.0)
    }

    /// Rotation of the image axes in degrees.
    pub fn rotation_deg(&self) -> f64 {
        self.transform.rotation_deg()
    }

    /// Angular size of a `width` x `height` image.
    pub fn field_of_view(&self, width: usize, height: usize) -> FieldOfView {
        let (sx, sy) = self.transform.pixel_scale();
        let width_deg = width as f64 * sx;
        let height_deg = height as f64 * sy;
        FieldOfView {
            width_deg,
            height_deg,
            diagonal_deg: libm::hypot(width_deg, height_deg),
        }
    }

    /// Sky position of the image center.
    pub fn center(&self, width: usize, height: usize) -> (f64, f64) {
        self.pixel_to_world(
            (width as f64 - 1.0) / 2.0,
            (height as f64 - 1.0) / 2.0,
        )
    }

    /// Sky positions of the four corner pixels, counter-clockwise from
    /// pixel (0, 0).
    pub fn corners(&self, width: usize, height: usize) -> [(f64, f64); 4] {
        let x1 = width.saturating_sub(1) as f64;
        let y1 = height.saturating_sub(1) as f64;
        [
            self.pixel_to_world(0.0, 0.0),
            self.pixel_to_world(x1, 0.0),
            self.pixel_to_world(x1, y1),
            self.pixel_to_world(0.0, y1),
        ]
    }

    /// Advisory warnings using the default [`ValidationLimits`].
    pub fn validate(&self) -> Vec<String> {
        self.validate_with(&ValidationLimits::default())
    }

    /// Advisory warnings for implausible parameters. Never fails.
    pub fn validate_with(&self, limits: &ValidationLimits) -> Vec<String> {
        validate::check(self, limits)
    }
}
