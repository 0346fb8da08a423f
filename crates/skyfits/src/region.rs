//! Bounds-checked extraction of rectangular pixel regions.

use alloc::format;
use alloc::vec::Vec;
use core::fmt;

use crate::error::{Error, Result};
use crate::metadata::ImageMetadata;
use crate::sample::Samples;

/// A rectangle of pixels, 0-based from the first pixel of the data unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelRegion {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl PixelRegion {
    pub const fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The region covering a whole `width` x `height` image.
    pub const fn full(width: usize, height: usize) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Returns `true` if the region lies entirely inside a `width` x `height`
    /// image.
    pub fn fits_within(&self, width: usize, height: usize) -> bool {
        let right = self.x.checked_add(self.width);
        let bottom = self.y.checked_add(self.height);
        matches!((right, bottom), (Some(r), Some(b)) if r <= width && b <= height)
    }
}

impl fmt::Display for PixelRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}+{}+{}", self.width, self.height, self.x, self.y)
    }
}

/// Copy the bytes of `region` out of a row-major image buffer.
///
/// `bytes` holds `planes` consecutive planes of `image_width` x
/// `image_height` samples, each `bytes_per_sample` wide. The result holds the
/// region's rows for every plane, concatenated in plane order.
pub fn extract_region_bytes(
    bytes: &[u8],
    bytes_per_sample: usize,
    image_width: usize,
    image_height: usize,
    planes: usize,
    region: PixelRegion,
) -> Result<Vec<u8>> {
    if !region.fits_within(image_width, image_height) {
        return Err(Error::RegionOutOfBounds(region));
    }

    let row_len = image_width * bytes_per_sample;
    let plane_len = row_len * image_height;
    if bytes.len() != plane_len * planes {
        return Err(Error::CorruptedData(format!(
            "image buffer is {} bytes, expected {} for {} plane(s) of {}x{}",
            bytes.len(),
            plane_len * planes,
            planes,
            image_width,
            image_height
        )));
    }

    let span = region.width * bytes_per_sample;
    let mut out = Vec::with_capacity(span * region.height * planes);
    for plane in bytes.chunks_exact(plane_len.max(1)).take(planes) {
        for row in region.y..region.y + region.height {
            let start = row * row_len + region.x * bytes_per_sample;
            out.extend_from_slice(&plane[start..start + span]);
        }
    }
    Ok(out)
}

/// Extract a region from decoded, unscaled samples and apply the image's
/// scaling.
///
/// The result equals the matching slice of [`extract_image`] exactly.
pub fn extract_region(
    samples: &Samples,
    metadata: &ImageMetadata,
    region: PixelRegion,
) -> Result<Samples> {
    let bytes = extract_region_bytes(
        samples.as_bytes(),
        metadata.bytes_per_sample(),
        metadata.width,
        metadata.height,
        metadata.planes(),
        region,
    )?;
    let raw = Samples::from_native_bytes(&bytes, samples.sample_type())?;
    Ok(metadata.scaling.apply(&raw))
}

/// Apply the image's scaling to every decoded sample.
pub fn extract_image(samples: &Samples, metadata: &ImageMetadata) -> Result<Samples> {
    let expected = metadata.sample_count()?;
    if samples.len() != expected {
        return Err(Error::CorruptedData(format!(
            "decoded image holds {} samples, expected {}",
            samples.len(),
            expected
        )));
    }
    Ok(metadata.scaling.apply(samples))
}
