//! Advisory plausibility checks for WCS parameters.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use super::WcsParameters;

/// Bounds applied by [`WcsParameters::validate_with`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidationLimits {
    /// Smallest plausible pixel scale, arcseconds per pixel.
    pub min_arcsec_per_pixel: f64,
    /// Largest plausible pixel scale, arcseconds per pixel.
    pub max_arcsec_per_pixel: f64,
}

impl Default for ValidationLimits {
    fn default() -> Self {
        Self {
            min_arcsec_per_pixel: 0.1,
            max_arcsec_per_pixel: 600.0,
        }
    }
}

pub(super) fn check(wcs: &WcsParameters, limits: &ValidationLimits) -> Vec<String> {
    let mut warnings = Vec::new();

    let [ctype1, ctype2] = &wcs.ctype;
    if !(ctype1.contains("RA") || ctype1.contains("GLON")) {
        warnings.push(format!(
            "CTYPE1 '{ctype1}' does not name a longitude axis (RA or GLON)"
        ));
    }
    if !(ctype2.contains("DEC") || ctype2.contains("GLAT")) {
        warnings.push(format!(
            "CTYPE2 '{ctype2}' does not name a latitude axis (DEC or GLAT)"
        ));
    }

    let (sx, sy) = wcs.pixel_scale_arcsec();
    for (axis, scale) in [(1, sx), (2, sy)] {
        if !(limits.min_arcsec_per_pixel..=limits.max_arcsec_per_pixel).contains(&scale) {
            warnings.push(format!(
                "pixel scale {scale:.4} arcsec/px on axis {axis} is outside [{}, {}]",
                limits.min_arcsec_per_pixel, limits.max_arcsec_per_pixel
            ));
        }
    }

    let [ra, dec] = wcs.crval;
    if !(0.0..360.0).contains(&ra) {
        warnings.push(format!("reference RA {ra} is outside [0, 360)"));
    }
    if !(-90.0..=90.0).contains(&dec) {
        warnings.push(format!("reference Dec {dec} is outside [-90, 90]"));
    }

    if wcs.projection != "TAN" {
        warnings.push(format!(
            "projection '{}' is not supported; coordinates use TAN",
            wcs.projection
        ));
    }

    warnings
}
