//! Locating and reading the data unit that follows a header.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use log::{debug, warn};

use crate::block::padded_len;
use crate::error::{Error, Result};
use crate::header::Header;
use crate::sample::SampleType;

/// Highest axis count allowed by the FITS standard.
const MAX_NAXIS: i64 = 999;

/// Sample type and axis sizes declared by the mandatory image keywords.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataShape {
    pub sample_type: SampleType,
    /// NAXIS1, NAXIS2, ... in header order.
    pub axes: Vec<usize>,
}

impl DataShape {
    /// Read BITPIX, NAXIS, and every NAXISn.
    ///
    /// A missing or non-integer keyword fails with
    /// [`Error::MissingRequiredKeyword`]; an unsupported BITPIX fails with
    /// [`Error::UnsupportedBitDepth`].
    pub fn from_header(header: &Header) -> Result<Self> {
        let bitpix = required_int(header, "BITPIX")?;
        let naxis = required_int(header, "NAXIS")?;
        if !(0..=MAX_NAXIS).contains(&naxis) {
            return Err(Error::MalformedHeader(format!(
                "NAXIS = {naxis} is outside 0..={MAX_NAXIS}"
            )));
        }

        let mut axes = Vec::with_capacity(naxis as usize);
        for i in 1..=naxis {
            let keyword = format!("NAXIS{i}");
            let size = required_int(header, &keyword)?;
            let size = usize::try_from(size)
                .map_err(|_| Error::MalformedHeader(format!("{keyword} = {size} is negative")))?;
            axes.push(size);
        }

        let sample_type = SampleType::from_bitpix(bitpix)?;
        Ok(Self { sample_type, axes })
    }

    /// Number of samples: the product of all axis sizes, or 0 without axes.
    pub fn sample_count(&self) -> Result<usize> {
        if self.axes.is_empty() {
            return Ok(0);
        }
        self.axes.iter().try_fold(1usize, |acc, &n| {
            acc.checked_mul(n)
                .ok_or_else(|| Error::MalformedHeader(String::from("axis sizes overflow")))
        })
    }

    /// Number of payload bytes before padding.
    pub fn payload_len(&self) -> Result<usize> {
        self.sample_count()?
            .checked_mul(self.sample_type.bytes_per_sample())
            .ok_or_else(|| Error::MalformedHeader(String::from("payload size overflows")))
    }
}

fn required_int(header: &Header, keyword: &str) -> Result<i64> {
    header
        .get_i64(keyword)
        .ok_or_else(|| Error::MissingRequiredKeyword(String::from(keyword)))
}

/// A data unit borrowed from the input buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataUnit<'a> {
    /// Exactly the declared payload bytes, padding excluded.
    pub payload: &'a [u8],
    /// Offset just past the padding that follows the payload.
    pub next_offset: usize,
}

/// Read the data unit that starts at `offset`.
///
/// Fails with [`Error::InvalidDataSize`] when fewer bytes remain than the
/// shape declares, or when `offset` lies past the end of `data`. Padding up
/// to the next block boundary is skipped; if the buffer ends before that
/// boundary the shortfall is tolerated.
pub fn read_data_unit<'a>(
    data: &'a [u8],
    offset: usize,
    shape: &DataShape,
) -> Result<DataUnit<'a>> {
    let expected = shape.payload_len()?;
    let available = data.len().saturating_sub(offset);
    if offset > data.len() || available < expected {
        return Err(Error::InvalidDataSize {
            expected,
            actual: available,
        });
    }

    let payload = &data[offset..offset + expected];
    let padded_end = offset + padded_len(expected);
    let next_offset = if padded_end > data.len() {
        warn!(
            "data unit padding truncated: buffer ends {} bytes before the block boundary",
            padded_end - data.len()
        );
        data.len()
    } else {
        padded_end
    };

    debug!(
        "data unit of {} bytes ({} samples of {}) at offset {}",
        expected,
        expected / shape.sample_type.bytes_per_sample(),
        shape.sample_type,
        offset
    );
    Ok(DataUnit {
        payload,
        next_offset,
    })
}
