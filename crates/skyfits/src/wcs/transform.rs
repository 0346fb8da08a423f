//! The linear part of a WCS: pixel offsets to intermediate world coordinates.

use super::sphere::{DEG_TO_RAD, RAD_TO_DEG};

/// Determinants smaller than this are treated as singular.
pub const SINGULAR_DETERMINANT: f64 = 1e-15;

/// Maps pixel offsets from CRPIX to tangent-plane offsets in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LinearTransform {
    /// An explicit CD matrix, `[[cd1_1, cd1_2], [cd2_1, cd2_2]]`.
    Cd([[f64; 2]; 2]),
    /// Per-axis increments plus a rotation angle in degrees.
    Scale {
        cdelt1: f64,
        cdelt2: f64,
        rotation_deg: f64,
    },
}

impl LinearTransform {
    /// The equivalent 2x2 matrix.
    pub fn matrix(&self) -> [[f64; 2]; 2] {
        match *self {
            LinearTransform::Cd(cd) => cd,
            LinearTransform::Scale {
                cdelt1,
                cdelt2,
                rotation_deg,
            } => {
                let (sin_r, cos_r) = libm::sincos(rotation_deg * DEG_TO_RAD);
                [
                    [cdelt1 * cos_r, -cdelt2 * sin_r],
                    [cdelt1 * sin_r, cdelt2 * cos_r],
                ]
            }
        }
    }

    pub fn determinant(&self) -> f64 {
        let m = self.matrix();
        m[0][0] * m[1][1] - m[0][1] * m[1][0]
    }

    /// Pixel offset to tangent-plane offset.
    pub fn apply(&self, dx: f64, dy: f64) -> (f64, f64) {
        let m = self.matrix();
        (m[0][0] * dx + m[0][1] * dy, m[1][0] * dx + m[1][1] * dy)
    }

    /// Tangent-plane offset back to a pixel offset.
    ///
    /// A near-singular matrix (`|det| < 1e-15`) falls back to dividing by the
    /// diagonal terms alone; a zero diagonal term yields a zero offset.
    pub fn invert(&self, x: f64, y: f64) -> (f64, f64) {
        let m = self.matrix();
        let det = m[0][0] * m[1][1] - m[0][1] * m[1][0];
        if det.abs() < SINGULAR_DETERMINANT {
            let dx = if m[0][0] != 0.0 { x / m[0][0] } else { 0.0 };
            let dy = if m[1][1] != 0.0 { y / m[1][1] } else { 0.0 };
            return (dx, dy);
        }
        (
            (m[1][1] * x - m[0][1] * y) / det,
            (-m[1][0] * x + m[0][0] * y) / det,
        )
    }

    /// Magnitude of the step along each pixel axis, in degrees per pixel.
    pub fn pixel_scale(&self) -> (f64, f64) {
        match *self {
            LinearTransform::Scale { cdelt1, cdelt2, .. } => (cdelt1.abs(), cdelt2.abs()),
            LinearTransform::Cd(m) => (
                libm::hypot(m[0][0], m[1][0]),
                libm::hypot(m[0][1], m[1][1]),
            ),
        }
    }

    /// Rotation of the second pixel axis from north, in degrees.
    pub fn rotation_deg(&self) -> f64 {
        match *self {
            LinearTransform::Scale { rotation_deg, .. } => rotation_deg,
            LinearTransform::Cd(m) => libm::atan2(-m[0][1], m[1][1]) * RAD_TO_DEG,
        }
    }
}
