//! Big-endian byte conversion for FITS data.
//!
//! FITS stores every multi-byte sample most-significant byte first. The
//! routines here are length-checked: a buffer that is not a whole number of
//! samples is reported as [`Error::CorruptedData`] instead of being truncated.

use alloc::format;
use alloc::vec::Vec;

use bytemuck::pod_collect_to_vec;

use crate::error::{Error, Result};
use crate::sample::{SampleType, Samples};

/// Check that `len` bytes hold a whole number of `width`-byte samples and
/// return the sample count.
pub fn check_sample_len(len: usize, width: usize) -> Result<usize> {
    if width == 0 || !len.is_multiple_of(width) {
        return Err(Error::CorruptedData(format!(
            "buffer length {len} is not a multiple of {width}"
        )));
    }
    Ok(len / width)
}

/// Reverse the byte order of every `width`-byte sample in place.
///
/// Applying this twice restores the original bytes. A width of 1 is a no-op.
pub fn swap_sample_bytes(buf: &mut [u8], width: usize) -> Result<()> {
    check_sample_len(buf.len(), width)?;
    if width > 1 {
        for chunk in buf.chunks_exact_mut(width) {
            chunk.reverse();
        }
    }
    Ok(())
}

/// Convert a buffer of big-endian samples to host order in place.
///
/// On big-endian hosts only the length check is performed.
pub fn be_to_native(buf: &mut [u8], sample_type: SampleType) -> Result<()> {
    let width = sample_type.bytes_per_sample();
    if cfg!(target_endian = "little") {
        swap_sample_bytes(buf, width)
    } else {
        check_sample_len(buf.len(), width).map(|_| ())
    }
}

/// Convert a buffer of host-order samples to big-endian in place.
pub fn native_to_be(buf: &mut [u8], sample_type: SampleType) -> Result<()> {
    be_to_native(buf, sample_type)
}

/// Decode raw big-endian payload bytes into typed host-order samples.
///
/// Float bit patterns, NaN payloads included, are preserved exactly.
pub fn decode_samples(raw: &[u8], sample_type: SampleType) -> Result<Samples> {
    check_sample_len(raw.len(), sample_type.bytes_per_sample())?;

    let samples = match sample_type {
        SampleType::U8 => Samples::U8(raw.to_vec()),
        SampleType::I16 => {
            let mut pixels: Vec<i16> = pod_collect_to_vec(raw);
            for v in &mut pixels {
                *v = i16::from_be(*v);
            }
            Samples::I16(pixels)
        }
        SampleType::I32 => {
            let mut pixels: Vec<i32> = pod_collect_to_vec(raw);
            for v in &mut pixels {
                *v = i32::from_be(*v);
            }
            Samples::I32(pixels)
        }
        SampleType::F32 => {
            let mut pixels: Vec<f32> = pod_collect_to_vec(raw);
            for v in &mut pixels {
                *v = f32::from_bits(u32::from_be(v.to_bits()));
            }
            Samples::F32(pixels)
        }
        SampleType::F64 => {
            let mut pixels: Vec<f64> = pod_collect_to_vec(raw);
            for v in &mut pixels {
                *v = f64::from_bits(u64::from_be(v.to_bits()));
            }
            Samples::F64(pixels)
        }
    };
    Ok(samples)
}

/// Encode typed samples as big-endian payload bytes.
pub fn encode_samples(samples: &Samples) -> Vec<u8> {
    match samples {
        Samples::U8(v) => v.clone(),
        Samples::I16(v) => v.iter().flat_map(|x| x.to_be_bytes()).collect(),
        Samples::I32(v) => v.iter().flat_map(|x| x.to_be_bytes()).collect(),
        Samples::F32(v) => v.iter().flat_map(|x| x.to_be_bytes()).collect(),
        Samples::F64(v) => v.iter().flat_map(|x| x.to_be_bytes()).collect(),
    }
}
