use alloc::string::String;

use crate::region::PixelRegion;

/// All errors that can occur while decoding a FITS image or projecting
/// coordinates.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// A mandatory image keyword (NAXIS, BITPIX, NAXISn) is absent or not an integer.
    #[error("missing required keyword: {0}")]
    MissingRequiredKeyword(String),
    /// The header blocks could not be decoded.
    #[error("malformed FITS header: {0}")]
    MalformedHeader(String),
    /// Fewer payload bytes remain than the header declares.
    #[error("invalid data size: expected {expected} bytes, found {actual}")]
    InvalidDataSize { expected: usize, actual: usize },
    /// BITPIX is not one of 8, 16, 32, -32, -64.
    #[error("unsupported BITPIX value: {0}")]
    UnsupportedBitDepth(i64),
    /// The requested region does not lie fully inside the image.
    #[error("region {0} is outside the image bounds")]
    RegionOutOfBounds(PixelRegion),
    /// The sky position cannot be projected onto the tangent plane.
    #[error("projection singularity: {0}")]
    ProjectionSingularity(String),
    /// Sample data is inconsistent with its declared layout.
    #[error("corrupted data: {0}")]
    CorruptedData(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;
