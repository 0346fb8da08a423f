//! The fixed table of supported sample types.

use alloc::vec::Vec;
use core::fmt;

use bytemuck::{cast_slice, pod_collect_to_vec};

use crate::endian::check_sample_len;
use crate::error::{Error, Result};

/// Storage type of one data sample, as declared by BITPIX.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleType {
    U8,
    I16,
    I32,
    F32,
    F64,
}

impl SampleType {
    /// Map a BITPIX value to its sample type.
    ///
    /// Only 8, 16, 32, -32, and -64 are supported. Anything else, including
    /// the 64-bit integer type, fails with [`Error::UnsupportedBitDepth`].
    pub fn from_bitpix(bitpix: i64) -> Result<Self> {
        match bitpix {
            8 => Ok(SampleType::U8),
            16 => Ok(SampleType::I16),
            32 => Ok(SampleType::I32),
            -32 => Ok(SampleType::F32),
            -64 => Ok(SampleType::F64),
            other => Err(Error::UnsupportedBitDepth(other)),
        }
    }

    /// The BITPIX value that declares this type.
    pub const fn bitpix(self) -> i64 {
        match self {
            SampleType::U8 => 8,
            SampleType::I16 => 16,
            SampleType::I32 => 32,
            SampleType::F32 => -32,
            SampleType::F64 => -64,
        }
    }

    /// Width of one sample in bytes (`|BITPIX| / 8`).
    pub const fn bytes_per_sample(self) -> usize {
        match self {
            SampleType::U8 => 1,
            SampleType::I16 => 2,
            SampleType::I32 | SampleType::F32 => 4,
            SampleType::F64 => 8,
        }
    }

    /// Returns `true` for the IEEE floating-point types.
    pub const fn is_float(self) -> bool {
        matches!(self, SampleType::F32 | SampleType::F64)
    }
}

impl fmt::Display for SampleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SampleType::U8 => "uint8",
            SampleType::I16 => "int16",
            SampleType::I32 => "int32",
            SampleType::F32 => "float32",
            SampleType::F64 => "float64",
        };
        f.write_str(name)
    }
}

/// Decoded samples in host byte order, typed by BITPIX.
///
/// Row-major with NAXIS1 varying fastest. Unsigned 16-bit data (BZERO = 32768)
/// keeps its bit pattern in the `I16` variant after scaling.
#[derive(Debug, Clone, PartialEq)]
pub enum Samples {
    U8(Vec<u8>),
    I16(Vec<i16>),
    I32(Vec<i32>),
    F32(Vec<f32>),
    F64(Vec<f64>),
}

impl Samples {
    /// Reinterpret host-order bytes as samples of `sample_type`.
    ///
    /// Fails with [`Error::CorruptedData`] when the length is not a multiple
    /// of the sample width.
    pub fn from_native_bytes(bytes: &[u8], sample_type: SampleType) -> Result<Self> {
        check_sample_len(bytes.len(), sample_type.bytes_per_sample())?;
        Ok(match sample_type {
            SampleType::U8 => Samples::U8(bytes.to_vec()),
            SampleType::I16 => Samples::I16(pod_collect_to_vec(bytes)),
            SampleType::I32 => Samples::I32(pod_collect_to_vec(bytes)),
            SampleType::F32 => Samples::F32(pod_collect_to_vec(bytes)),
            SampleType::F64 => Samples::F64(pod_collect_to_vec(bytes)),
        })
    }

    /// The type of every sample in the buffer.
    pub fn sample_type(&self) -> SampleType {
        match self {
            Samples::U8(_) => SampleType::U8,
            Samples::I16(_) => SampleType::I16,
            Samples::I32(_) => SampleType::I32,
            Samples::F32(_) => SampleType::F32,
            Samples::F64(_) => SampleType::F64,
        }
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        match self {
            Samples::U8(v) => v.len(),
            Samples::I16(v) => v.len(),
            Samples::I32(v) => v.len(),
            Samples::F32(v) => v.len(),
            Samples::F64(v) => v.len(),
        }
    }

    /// Returns `true` if the buffer holds no samples.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// View the samples as host-order bytes.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Samples::U8(v) => v,
            Samples::I16(v) => cast_slice(v),
            Samples::I32(v) => cast_slice(v),
            Samples::F32(v) => cast_slice(v),
            Samples::F64(v) => cast_slice(v),
        }
    }

    /// Every sample widened to `f64`.
    pub fn to_f64_vec(&self) -> Vec<f64> {
        match self {
            Samples::U8(v) => v.iter().map(|&x| f64::from(x)).collect(),
            Samples::I16(v) => v.iter().map(|&x| f64::from(x)).collect(),
            Samples::I32(v) => v.iter().map(|&x| f64::from(x)).collect(),
            Samples::F32(v) => v.iter().map(|&x| f64::from(x)).collect(),
            Samples::F64(v) => v.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn bitpix_table() {
        for (bitpix, ty, width) in [
            (8, SampleType::U8, 1),
            (16, SampleType::I16, 2),
            (32, SampleType::I32, 4),
            (-32, SampleType::F32, 4),
            (-64, SampleType::F64, 8),
        ] {
            let parsed = SampleType::from_bitpix(bitpix).unwrap();
            assert_eq!(parsed, ty);
            assert_eq!(parsed.bitpix(), bitpix);
            assert_eq!(parsed.bytes_per_sample(), width);
        }
    }

    #[test]
    fn unsupported_bitpix() {
        for bitpix in [0, 7, 64, -16, 24] {
            assert_eq!(
                SampleType::from_bitpix(bitpix),
                Err(Error::UnsupportedBitDepth(bitpix))
            );
        }
    }

    #[test]
    fn display_names() {
        assert_eq!(SampleType::U8.to_string(), "uint8");
        assert_eq!(SampleType::F64.to_string(), "float64");
    }

    #[test]
    fn native_bytes_view_and_back() {
        let samples = Samples::I32(alloc::vec![1, -2, i32::MAX]);
        let bytes = samples.as_bytes().to_vec();
        assert_eq!(bytes.len(), 12);
        let back = Samples::from_native_bytes(&bytes, SampleType::I32).unwrap();
        assert_eq!(back, samples);
    }

    #[test]
    fn native_bytes_length_checked() {
        assert!(matches!(
            Samples::from_native_bytes(&[0u8; 7], SampleType::F64),
            Err(Error::CorruptedData(_))
        ));
    }

    #[test]
    fn widening_to_f64() {
        let samples = Samples::F32(alloc::vec![1.5, -2.0]);
        assert_eq!(samples.to_f64_vec(), alloc::vec![1.5, -2.0]);
        assert_eq!(samples.len(), 2);
        assert!(Samples::U8(alloc::vec![]).is_empty());
    }

    #[test]
    fn float_flag() {
        assert!(SampleType::F32.is_float());
        assert!(!SampleType::I32.is_float());
    }
}
