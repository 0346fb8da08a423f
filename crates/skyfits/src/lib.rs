//! Decoding of FITS images and their celestial coordinate systems.
//!
//! The crate works on in-memory byte buffers; reading files is left to the
//! caller. [`FitsImage::decode`] is the usual entry point, and the modules
//! expose each stage of the pipeline on its own.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod block;
pub mod data;
pub mod endian;
pub mod error;
pub mod header;
pub mod histogram;
pub mod image;
pub mod metadata;
pub mod physical;
pub mod region;
pub mod sample;
pub mod value;
pub mod wcs;

pub use block::{BLOCK_SIZE, CARDS_PER_BLOCK, CARD_SIZE};
pub use error::{Error, Result};
pub use header::{parse_header, Header, HeaderRecord};
pub use histogram::{
    FloatRange, Histogram, HistogramConfig, HistogramEngine, HistogramStatistics,
};
pub use image::FitsImage;
pub use metadata::{build_metadata, ImageMetadata, ObservationInfo};
pub use physical::Scaling;
pub use region::PixelRegion;
pub use sample::{SampleType, Samples};
pub use wcs::{FieldOfView, LinearTransform, ValidationLimits, WcsParameters};
