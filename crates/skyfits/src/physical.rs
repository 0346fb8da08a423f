//! BSCALE/BZERO conversion from stored sample values to physical values.

use alloc::vec::Vec;

use crate::sample::{SampleType, Samples};

/// The linear scaling `physical = bscale * raw + bzero` declared by a header.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scaling {
    pub bzero: f64,
    pub bscale: f64,
}

impl Default for Scaling {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Offset that maps signed 16-bit storage onto the unsigned range.
const UNSIGNED_16_OFFSET: f64 = 32768.0;

impl Scaling {
    /// `bzero = 0`, `bscale = 1`.
    pub const IDENTITY: Scaling = Scaling {
        bzero: 0.0,
        bscale: 1.0,
    };

    pub fn new(bzero: f64, bscale: f64) -> Self {
        Self { bzero, bscale }
    }

    /// Returns `true` when scaling leaves values unchanged.
    pub fn is_identity(&self) -> bool {
        self.bscale == 1.0 && self.bzero == 0.0
    }

    /// Returns `true` for the unsigned 16-bit convention (BITPIX 16 with
    /// BZERO 32768 and BSCALE 1), whose stored results use the full
    /// `[0, 65535]` range.
    pub fn is_unsigned_16(&self, sample_type: SampleType) -> bool {
        sample_type == SampleType::I16 && self.bscale == 1.0 && self.bzero == UNSIGNED_16_OFFSET
    }

    /// The physical value of one raw sample, without clamping.
    pub fn physical_value(&self, raw: f64) -> f64 {
        if self.is_identity() {
            return raw;
        }
        self.bscale * raw + self.bzero
    }

    /// Scale every sample and store the result back in the declared type.
    ///
    /// Integer results are rounded and clamped to the range of their type
    /// (`[0, 65535]` stored as raw bits for unsigned 16-bit data). Float
    /// results are not clamped. Identity scaling returns a plain copy.
    pub fn apply(&self, samples: &Samples) -> Samples {
        if self.is_identity() {
            return samples.clone();
        }
        match samples {
            Samples::U8(v) => Samples::U8(
                v.iter()
                    .map(|&x| clamp_round(self.physical_value(f64::from(x)), 0.0, 255.0) as u8)
                    .collect(),
            ),
            Samples::I16(v) if self.is_unsigned_16(SampleType::I16) => Samples::I16(
                v.iter()
                    .map(|&x| {
                        let stored = clamp_round(self.physical_value(f64::from(x)), 0.0, 65535.0);
                        stored as u16 as i16
                    })
                    .collect(),
            ),
            Samples::I16(v) => Samples::I16(
                v.iter()
                    .map(|&x| {
                        clamp_round(
                            self.physical_value(f64::from(x)),
                            f64::from(i16::MIN),
                            f64::from(i16::MAX),
                        ) as i16
                    })
                    .collect(),
            ),
            Samples::I32(v) => Samples::I32(
                v.iter()
                    .map(|&x| {
                        clamp_round(
                            self.physical_value(f64::from(x)),
                            f64::from(i32::MIN),
                            f64::from(i32::MAX),
                        ) as i32
                    })
                    .collect(),
            ),
            Samples::F32(v) => Samples::F32(
                v.iter()
                    .map(|&x| self.physical_value(f64::from(x)) as f32)
                    .collect(),
            ),
            Samples::F64(v) => Samples::F64(v.iter().map(|&x| self.physical_value(x)).collect()),
        }
    }

    /// Physical values of every sample as `f64`, without clamping.
    pub fn physical_values(&self, samples: &Samples) -> Vec<f64> {
        let mut values = samples.to_f64_vec();
        if !self.is_identity() {
            for v in &mut values {
                *v = self.physical_value(*v);
            }
        }
        values
    }
}

/// Round to nearest and clamp into `[lo, hi]`. NaN maps to `lo`.
fn clamp_round(value: f64, lo: f64, hi: f64) -> f64 {
    if value.is_nan() {
        return lo;
    }
    libm::round(value).clamp(lo, hi)
}
