//! Structured image metadata assembled from a parsed header.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use log::{debug, warn};

use crate::data::DataShape;
use crate::error::Result;
use crate::header::Header;
use crate::physical::Scaling;
use crate::sample::SampleType;
use crate::wcs::{LinearTransform, WcsParameters};

/// Mandatory image description plus optional observation and WCS records.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageMetadata {
    /// NAXIS1, or 0 without axes.
    pub width: usize,
    /// NAXIS2, 1 for a single axis, or 0 without axes.
    pub height: usize,
    /// Every NAXISn in order.
    pub axes: Vec<usize>,
    pub sample_type: SampleType,
    pub scaling: Scaling,
    pub observation: ObservationInfo,
    /// The complete header the metadata was built from.
    pub header: Header,
    pub wcs: Option<WcsParameters>,
}

/// Provenance keywords written by telescopes and camera drivers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObservationInfo {
    pub telescope: Option<String>,
    pub instrument: Option<String>,
    pub filter: Option<String>,
    pub object: Option<String>,
    pub observer: Option<String>,
    pub date_obs: Option<String>,
    /// Seconds.
    pub exposure_time: Option<f64>,
    /// Sensor temperature in degrees Celsius.
    pub temperature: Option<f64>,
    /// Electrons per ADU.
    pub gain: Option<f64>,
    /// `(x, y)` binning factors.
    pub binning: Option<(u32, u32)>,
    pub bayer_pattern: Option<String>,
    /// Millimetres.
    pub focal_length: Option<f64>,
}

impl ImageMetadata {
    /// Number of image planes: the product of NAXIS3 and beyond.
    pub fn planes(&self) -> usize {
        if self.axes.is_empty() {
            return 0;
        }
        self.axes.iter().skip(2).product()
    }

    pub fn bytes_per_sample(&self) -> usize {
        self.sample_type.bytes_per_sample()
    }

    /// Sample type and axes in the form the data reader expects.
    pub fn shape(&self) -> DataShape {
        DataShape {
            sample_type: self.sample_type,
            axes: self.axes.clone(),
        }
    }

    /// Number of samples in the data unit.
    pub fn sample_count(&self) -> Result<usize> {
        self.shape().sample_count()
    }

    /// Size of the data unit in bytes, padding excluded.
    pub fn payload_len(&self) -> Result<usize> {
        self.shape().payload_len()
    }
}

/// Build metadata from a parsed header.
///
/// BITPIX, NAXIS, and each NAXISn are required. Scaling, observation, and WCS
/// keywords are optional; an incomplete WCS yields `wcs: None` rather than an
/// error.
pub fn build_metadata(header: Header) -> Result<ImageMetadata> {
    let shape = DataShape::from_header(&header)?;
    let width = shape.axes.first().copied().unwrap_or(0);
    let height = match shape.axes.len() {
        0 => 0,
        1 => 1,
        _ => shape.axes[1],
    };

    let scaling = Scaling::new(
        header.get_f64("BZERO").unwrap_or(0.0),
        header.get_f64("BSCALE").unwrap_or(1.0),
    );
    let observation = observation_info(&header);
    let wcs = extract_wcs(&header);

    debug!(
        "image {}x{} ({} axes) of {}, scaling {:?}, wcs: {}",
        width,
        height,
        shape.axes.len(),
        shape.sample_type,
        scaling,
        wcs.is_some()
    );

    Ok(ImageMetadata {
        width,
        height,
        axes: shape.axes,
        sample_type: shape.sample_type,
        scaling,
        observation,
        header,
        wcs,
    })
}

fn owned_str(header: &Header, keywords: &[&str]) -> Option<String> {
    header.get_str_any(keywords).map(String::from)
}

fn observation_info(header: &Header) -> ObservationInfo {
    let binning = header.get_i64("XBINNING").and_then(|x| {
        let y = header.get_i64("YBINNING").unwrap_or(x);
        Some((u32::try_from(x).ok()?, u32::try_from(y).ok()?))
    });

    ObservationInfo {
        telescope: owned_str(header, &["TELESCOP"]),
        instrument: owned_str(header, &["INSTRUME"]),
        filter: owned_str(header, &["FILTER"]),
        object: owned_str(header, &["OBJECT"]),
        observer: owned_str(header, &["OBSERVER"]),
        date_obs: owned_str(header, &["DATE-OBS"]),
        exposure_time: header.get_f64_any(&["EXPTIME", "EXPOSURE"]),
        temperature: header.get_f64_any(&["CCD-TEMP", "TEMP"]),
        gain: header.get_f64_any(&["GAIN", "EGAIN"]),
        binning,
        bayer_pattern: owned_str(header, &["BAYERPAT"]),
        focal_length: header.get_f64("FOCALLEN"),
    }
}

// ── WCS extraction ──

const CD_KEYWORDS: [[&str; 2]; 2] = [["CD1_1", "CD1_2"], ["CD2_1", "CD2_2"]];
const PC_KEYWORDS: [[&str; 2]; 2] = [["PC1_1", "PC1_2"], ["PC2_1", "PC2_2"]];

/// Extract the celestial WCS, or `None` when CRPIX1/2 and CRVAL1/2 are not
/// all present and numeric.
///
/// A CD matrix takes precedence over PC + CDELT, which takes precedence over
/// CDELT + CROTA2 (or CROTA1). Missing CD elements are 0, missing PC
/// elements follow the identity, and a missing CDELT is 1.
pub fn extract_wcs(header: &Header) -> Option<WcsParameters> {
    let reference = ["CRPIX1", "CRPIX2", "CRVAL1", "CRVAL2"].map(|k| header.get_f64(k));
    let [Some(crpix1), Some(crpix2), Some(crval1), Some(crval2)] = reference else {
        if reference.iter().any(Option::is_some) {
            warn!("incomplete WCS reference keywords; ignoring WCS");
        }
        return None;
    };
    if ![crpix1, crpix2, crval1, crval2].iter().all(|v| v.is_finite()) {
        warn!("non-finite WCS reference values; ignoring WCS");
        return None;
    }

    let transform = linear_transform(header);
    let mut wcs = WcsParameters::new([crpix1, crpix2], [crval1, crval2], transform);
    if let Some(note) = reference_adjustment([crval1, crval2], wcs.crval) {
        warn!("{note}");
    }

    let ctype1 = owned_str(header, &["CTYPE1"]).unwrap_or_default();
    let ctype2 = owned_str(header, &["CTYPE2"]).unwrap_or_default();
    wcs.projection = projection_code(&ctype1);
    wcs.ctype = [ctype1, ctype2];
    wcs.radesys = owned_str(header, &["RADESYS", "RADECSYS"]);
    wcs.equinox = header.get_f64_any(&["EQUINOX", "EPOCH"]);

    Some(wcs)
}

/// Describes how normalization moved the header's CRVAL, if it did.
fn reference_adjustment(raw: [f64; 2], normalized: [f64; 2]) -> Option<String> {
    if raw == normalized {
        return None;
    }
    Some(format!(
        "CRVAL ({}, {}) outside RA [0, 360) / Dec [-90, 90]; using ({}, {})",
        raw[0], raw[1], normalized[0], normalized[1]
    ))
}

fn linear_transform(header: &Header) -> LinearTransform {
    if let Some(cd) = matrix(header, &CD_KEYWORDS, [[0.0, 0.0], [0.0, 0.0]]) {
        return LinearTransform::Cd(cd);
    }

    let cdelt1 = header.get_f64("CDELT1").unwrap_or(1.0);
    let cdelt2 = header.get_f64("CDELT2").unwrap_or(1.0);

    if let Some(pc) = matrix(header, &PC_KEYWORDS, [[1.0, 0.0], [0.0, 1.0]]) {
        return LinearTransform::Cd([
            [cdelt1 * pc[0][0], cdelt1 * pc[0][1]],
            [cdelt2 * pc[1][0], cdelt2 * pc[1][1]],
        ]);
    }

    LinearTransform::Scale {
        cdelt1,
        cdelt2,
        rotation_deg: header.get_f64_any(&["CROTA2", "CROTA1"]).unwrap_or(0.0),
    }
}

/// Read a 2x2 matrix, or `None` when none of its keywords are present.
/// Absent elements take their value from `missing`.
fn matrix(
    header: &Header,
    keywords: &[[&str; 2]; 2],
    missing: [[f64; 2]; 2],
) -> Option<[[f64; 2]; 2]> {
    let values = keywords.map(|row| row.map(|k| header.get_f64(k)));
    if values.iter().flatten().all(Option::is_none) {
        return None;
    }
    let mut m = missing;
    for (i, row) in values.iter().enumerate() {
        for (j, v) in row.iter().enumerate() {
            if let Some(v) = v {
                m[i][j] = *v;
            }
        }
    }
    Some(m)
}

/// The projection code of a CTYPE value: `RA---TAN` gives `TAN`, and
/// `RA---TAN-SIP` also gives `TAN`. An empty CTYPE is treated as TAN.
fn projection_code(ctype: &str) -> String {
    if ctype.is_empty() {
        return String::from("TAN");
    }
    if let Some(code) = ctype.get(5..8) {
        return String::from(code.trim_matches('-').trim());
    }
    String::from(ctype.rsplit('-').next().unwrap_or(ctype).trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::header::HeaderRecord;
    use alloc::vec;
    use approx::assert_abs_diff_eq;

    fn base_records() -> Vec<HeaderRecord> {
        vec![
            HeaderRecord::new("SIMPLE", "T"),
            HeaderRecord::new("BITPIX", 16),
            HeaderRecord::new("NAXIS", 2),
            HeaderRecord::new("NAXIS1", 3008),
            HeaderRecord::new("NAXIS2", 2000),
        ]
    }

    fn with(extra: Vec<HeaderRecord>) -> Header {
        let mut records = base_records();
        records.extend(extra);
        Header::from_records(records)
    }

    fn wcs_reference() -> Vec<HeaderRecord> {
        vec![
            HeaderRecord::string("CTYPE1", "RA---TAN"),
            HeaderRecord::string("CTYPE2", "DEC--TAN"),
            HeaderRecord::new("CRPIX1", "512.5"),
            HeaderRecord::new("CRPIX2", "512.5"),
            HeaderRecord::new("CRVAL1", "185.0"),
            HeaderRecord::new("CRVAL2", "12.0"),
        ]
    }

    #[test]
    fn mandatory_fields() {
        let meta = build_metadata(with(vec![])).unwrap();
        assert_eq!(meta.width, 3008);
        assert_eq!(meta.height, 2000);
        assert_eq!(meta.sample_type, SampleType::I16);
        assert_eq!(meta.scaling, Scaling::IDENTITY);
        assert_eq!(meta.planes(), 1);
        assert_eq!(meta.payload_len().unwrap(), 3008 * 2000 * 2);
        assert!(meta.wcs.is_none());
        assert_eq!(meta.observation, ObservationInfo::default());
    }

    #[test]
    fn missing_naxis_fails() {
        let header = Header::from_records(vec![HeaderRecord::new("BITPIX", 8)]);
        assert_eq!(
            build_metadata(header),
            Err(Error::MissingRequiredKeyword(String::from("NAXIS")))
        );
    }

    #[test]
    fn unrecognized_bitpix_fails() {
        let mut records = base_records();
        records[1] = HeaderRecord::new("BITPIX", 12);
        assert_eq!(
            build_metadata(Header::from_records(records)),
            Err(Error::UnsupportedBitDepth(12))
        );
    }

    #[test]
    fn scaling_keywords() {
        let meta = build_metadata(with(vec![
            HeaderRecord::new("BZERO", 32768),
            HeaderRecord::new("BSCALE", 1),
        ]))
        .unwrap();
        assert_eq!(meta.scaling, Scaling::new(32768.0, 1.0));
    }

    #[test]
    fn cube_planes() {
        let header = Header::from_records(vec![
            HeaderRecord::new("BITPIX", 8),
            HeaderRecord::new("NAXIS", 3),
            HeaderRecord::new("NAXIS1", 4),
            HeaderRecord::new("NAXIS2", 5),
            HeaderRecord::new("NAXIS3", 3),
        ]);
        let meta = build_metadata(header).unwrap();
        assert_eq!(meta.planes(), 3);
        assert_eq!(meta.sample_count().unwrap(), 60);
    }

    #[test]
    fn observation_fields_with_aliases() {
        let meta = build_metadata(with(vec![
            HeaderRecord::string("TELESCOP", "RASA 8"),
            HeaderRecord::string("INSTRUME", "ZWO ASI2600MC"),
            HeaderRecord::string("FILTER", "L-eNhance"),
            HeaderRecord::string("OBJECT", "M 101"),
            HeaderRecord::string("OBSERVER", "Night Owl"),
            HeaderRecord::string("DATE-OBS", "2024-03-01T22:15:03"),
            HeaderRecord::new("EXPOSURE", "180.0"),
            HeaderRecord::new("TEMP", "-10.2"),
            HeaderRecord::new("EGAIN", "0.78"),
            HeaderRecord::new("XBINNING", 2),
            HeaderRecord::string("BAYERPAT", "RGGB"),
            HeaderRecord::new("FOCALLEN", "400"),
        ]))
        .unwrap();
        let obs = meta.observation;
        assert_eq!(obs.telescope.as_deref(), Some("RASA 8"));
        assert_eq!(obs.instrument.as_deref(), Some("ZWO ASI2600MC"));
        assert_eq!(obs.filter.as_deref(), Some("L-eNhance"));
        assert_eq!(obs.object.as_deref(), Some("M 101"));
        assert_eq!(obs.observer.as_deref(), Some("Night Owl"));
        assert_eq!(obs.date_obs.as_deref(), Some("2024-03-01T22:15:03"));
        assert_eq!(obs.exposure_time, Some(180.0));
        assert_eq!(obs.temperature, Some(-10.2));
        assert_eq!(obs.gain, Some(0.78));
        assert_eq!(obs.binning, Some((2, 2)));
        assert_eq!(obs.bayer_pattern.as_deref(), Some("RGGB"));
        assert_eq!(obs.focal_length, Some(400.0));
    }

    #[test]
    fn primary_keyword_beats_alias() {
        let meta = build_metadata(with(vec![
            HeaderRecord::new("EXPOSURE", "10"),
            HeaderRecord::new("EXPTIME", "20"),
            HeaderRecord::new("CCD-TEMP", "-5"),
            HeaderRecord::new("TEMP", "25"),
        ]))
        .unwrap();
        assert_eq!(meta.observation.exposure_time, Some(20.0));
        assert_eq!(meta.observation.temperature, Some(-5.0));
    }

    #[test]
    fn wcs_from_cdelt() {
        let mut extra = wcs_reference();
        extra.push(HeaderRecord::new("CDELT1", "-0.0002777"));
        extra.push(HeaderRecord::new("CDELT2", "0.0002777"));
        extra.push(HeaderRecord::string("RADECSYS", "FK5"));
        extra.push(HeaderRecord::new("EPOCH", "2000.0"));
        let wcs = build_metadata(with(extra)).unwrap().wcs.unwrap();
        assert_eq!(wcs.crpix, [512.5, 512.5]);
        assert_eq!(wcs.crval, [185.0, 12.0]);
        assert_eq!(
            wcs.transform,
            LinearTransform::Scale {
                cdelt1: -0.0002777,
                cdelt2: 0.0002777,
                rotation_deg: 0.0
            }
        );
        assert_eq!(wcs.projection, "TAN");
        assert_eq!(wcs.radesys.as_deref(), Some("FK5"));
        assert_eq!(wcs.equinox, Some(2000.0));
        assert!(wcs.validate().is_empty());
    }

    #[test]
    fn cd_matrix_is_authoritative() {
        let mut extra = wcs_reference();
        extra.push(HeaderRecord::new("CDELT1", "5.0"));
        extra.push(HeaderRecord::new("CROTA2", "45.0"));
        extra.push(HeaderRecord::new("CD1_1", "-2.0E-4"));
        extra.push(HeaderRecord::new("CD2_2", "2.0E-4"));
        let wcs = extract_wcs(&with(extra)).unwrap();
        assert_eq!(
            wcs.transform,
            LinearTransform::Cd([[-2.0e-4, 0.0], [0.0, 2.0e-4]])
        );
    }

    #[test]
    fn pc_matrix_scaled_by_cdelt() {
        let mut extra = wcs_reference();
        extra.push(HeaderRecord::new("CDELT1", "-0.001"));
        extra.push(HeaderRecord::new("CDELT2", "0.002"));
        extra.push(HeaderRecord::new("PC1_2", "0.5"));
        let wcs = extract_wcs(&with(extra)).unwrap();
        assert_eq!(
            wcs.transform,
            LinearTransform::Cd([[-0.001, -0.0005], [0.0, 0.002]])
        );
    }

    #[test]
    fn crota1_fallback() {
        let mut extra = wcs_reference();
        extra.push(HeaderRecord::new("CROTA1", "12.5"));
        let wcs = extract_wcs(&with(extra)).unwrap();
        assert_abs_diff_eq!(wcs.rotation_deg(), 12.5);
    }

    #[test]
    fn incomplete_reference_means_no_wcs() {
        let mut extra = wcs_reference();
        extra.retain(|r| r.keyword != "CRVAL2");
        assert!(build_metadata(with(extra)).unwrap().wcs.is_none());
    }

    #[test]
    fn non_numeric_reference_means_no_wcs() {
        let mut extra = wcs_reference();
        extra.push(HeaderRecord::string("CRPIX1", "center"));
        assert!(extract_wcs(&with(extra)).is_none());
    }

    #[test]
    fn reference_is_normalized() {
        let header = with(vec![
            HeaderRecord::new("CRPIX1", 1),
            HeaderRecord::new("CRPIX2", 1),
            HeaderRecord::new("CRVAL1", "-30.0"),
            HeaderRecord::new("CRVAL2", "12.0"),
        ]);
        assert_eq!(extract_wcs(&header).unwrap().crval, [330.0, 12.0]);
    }

    #[test]
    fn projection_codes() {
        assert_eq!(projection_code("RA---TAN"), "TAN");
        assert_eq!(projection_code("RA---TAN-SIP"), "TAN");
        assert_eq!(projection_code("GLON-SIN"), "SIN");
        assert_eq!(projection_code("RA--SIN"), "SIN");
        assert_eq!(projection_code(""), "TAN");
    }

    #[test]
    fn non_tan_projection_is_recorded() {
        let mut extra = wcs_reference();
        extra.push(HeaderRecord::string("CTYPE1", "RA---ZEA"));
        extra.push(HeaderRecord::new("CDELT1", "-0.0002777"));
        extra.push(HeaderRecord::new("CDELT2", "0.0002777"));
        let wcs = extract_wcs(&with(extra)).unwrap();
        assert_eq!(wcs.projection, "ZEA");
        assert_eq!(wcs.validate().len(), 1);
    }

    #[test]
    fn out_of_range_reference_is_normalized_and_reported() {
        let header = with(vec![
            HeaderRecord::new("CRPIX1", "1.0"),
            HeaderRecord::new("CRPIX2", "1.0"),
            HeaderRecord::new("CRVAL1", "-30.0"),
            HeaderRecord::new("CRVAL2", "95.0"),
        ]);
        assert_eq!(extract_wcs(&header).unwrap().crval, [330.0, 90.0]);

        let note = reference_adjustment([-30.0, 95.0], [330.0, 90.0]).unwrap();
        assert!(note.contains("(-30, 95)"));
        assert!(note.contains("(330, 90)"));
        assert_eq!(reference_adjustment([185.0, 12.0], [185.0, 12.0]), None);
    }
}
