//! One-call decoding of a FITS primary image.
//!
//! [`FitsImage::decode`] runs the whole pipeline over an in-memory file:
//! header parsing, metadata, the data unit, and sample decoding. Pixel access
//! applies BSCALE/BZERO on demand; the decoded samples are kept unscaled.

use alloc::vec::Vec;

use log::debug;

use crate::block::pad_data_unit;
use crate::data::read_data_unit;
use crate::endian::{decode_samples, encode_samples};
use crate::error::Result;
use crate::header::{parse_header, serialize_header, HeaderRecord};
use crate::histogram::{Histogram, HistogramConfig, HistogramEngine};
use crate::metadata::{build_metadata, ImageMetadata};
use crate::region::{extract_image, extract_region, PixelRegion};
use crate::sample::Samples;
use crate::wcs::WcsParameters;

/// A decoded primary image.
#[derive(Debug, Clone, PartialEq)]
pub struct FitsImage {
    metadata: ImageMetadata,
    raw: Samples,
    data_end: usize,
}

impl FitsImage {
    /// Decode the primary header and data unit at the start of `bytes`.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let parsed = parse_header(bytes)?;
        let metadata = build_metadata(parsed.header)?;
        let unit = read_data_unit(bytes, parsed.data_offset, &metadata.shape())?;
        let raw = decode_samples(unit.payload, metadata.sample_type)?;
        debug!(
            "decoded {}x{}x{} image of {} samples",
            metadata.width,
            metadata.height,
            metadata.planes(),
            raw.len()
        );
        Ok(Self {
            metadata,
            raw,
            data_end: unit.next_offset,
        })
    }

    pub fn metadata(&self) -> &ImageMetadata {
        &self.metadata
    }

    pub fn wcs(&self) -> Option<&WcsParameters> {
        self.metadata.wcs.as_ref()
    }

    /// Samples as stored, before BSCALE/BZERO.
    pub fn raw_samples(&self) -> &Samples {
        &self.raw
    }

    /// Offset just past the primary data unit and its padding.
    pub fn data_end(&self) -> usize {
        self.data_end
    }

    /// Every sample with scaling applied.
    pub fn pixels(&self) -> Result<Samples> {
        extract_image(&self.raw, &self.metadata)
    }

    /// The samples of `region`, scaled, for every plane.
    pub fn region(&self, region: PixelRegion) -> Result<Samples> {
        extract_region(&self.raw, &self.metadata, region)
    }

    /// Histogram of every scaled sample.
    pub fn histogram(&self, config: HistogramConfig) -> Result<Histogram> {
        Ok(HistogramEngine::new(config).compute(&self.pixels()?))
    }

    /// Histogram of the scaled samples in `region`.
    pub fn region_histogram(
        &self,
        region: PixelRegion,
        config: HistogramConfig,
    ) -> Result<Histogram> {
        Ok(HistogramEngine::new(config).compute(&self.region(region)?))
    }

    /// Sky position of a 0-based pixel, when the image has a WCS.
    pub fn world_at(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        self.wcs().map(|wcs| wcs.pixel_to_world(x, y))
    }

    /// Scaled samples as an array shaped `[NAXISn, ..., NAXIS2, NAXIS1]`.
    #[cfg(feature = "array")]
    pub fn to_array(&self) -> Result<ndarray::ArrayD<f64>> {
        use alloc::string::ToString;

        let values = self.metadata.scaling.physical_values(&self.raw);
        let shape: Vec<usize> = self.metadata.axes.iter().rev().copied().collect();
        ndarray::ArrayD::from_shape_vec(ndarray::IxDyn(&shape), values)
            .map_err(|e| crate::error::Error::CorruptedData(e.to_string()))
    }
}

/// Encode header records and samples as a single-HDU FITS file.
///
/// The records should describe `samples` (SIMPLE, BITPIX, NAXIS, ...); END
/// and all padding are added here.
pub fn encode_image(records: &[HeaderRecord], samples: &Samples) -> Vec<u8> {
    let mut out = serialize_header(records);
    let mut data = encode_samples(samples);
    pad_data_unit(&mut data);
    out.extend_from_slice(&data);
    out
}

/// Standard primary-header records for an image of `samples` with the given
/// axis sizes.
pub fn primary_records(samples: &Samples, axes: &[usize]) -> Vec<HeaderRecord> {
    let mut records = Vec::with_capacity(3 + axes.len());
    records.push(HeaderRecord::new("SIMPLE", "T").with_comment("conforms to FITS standard"));
    records.push(HeaderRecord::new("BITPIX", samples.sample_type().bitpix()));
    records.push(HeaderRecord::new("NAXIS", axes.len()));
    for (i, n) in axes.iter().enumerate() {
        records.push(HeaderRecord::new(&alloc::format!("NAXIS{}", i + 1), n));
    }
    records
}
