//! Text reports behind the `fitsinfo` binary.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, info};
use skyfits::{
    FitsImage, Histogram, HistogramConfig, ImageMetadata, PixelRegion, ValidationLimits,
    WcsParameters,
};

/// What to include in a report beyond the metadata.
#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    pub histogram: HistogramConfig,
    pub limits: ValidationLimits,
    pub region: Option<PixelRegion>,
    /// 0-based pixel positions to convert to sky coordinates.
    pub pixels: Vec<(f64, f64)>,
}

/// Read and decode the primary image of a FITS file.
pub fn load(path: &Path) -> Result<FitsImage> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    debug!("read {} bytes from {}", bytes.len(), path.display());
    FitsImage::decode(&bytes).with_context(|| format!("decoding {}", path.display()))
}

/// Full report for the file at `path`.
pub fn report(path: &Path, options: &ReportOptions) -> Result<String> {
    let image = load(path)?;
    let mut out = format!("File: {}\n", path.display());
    out.push_str(&format_metadata(image.metadata()));

    let metadata = image.metadata();
    match image.wcs() {
        Some(wcs) => {
            let summary = format_wcs(wcs, metadata.width, metadata.height, &options.limits);
            out.push_str(&summary);
        }
        None => out.push_str("WCS: none\n"),
    }

    if !image.raw_samples().is_empty() {
        let histogram = image.histogram(options.histogram)?;
        out.push_str(&format_statistics("Statistics", &histogram));
    }

    if let Some(region) = options.region {
        info!("computing statistics for region {region}");
        let histogram = image
            .region_histogram(region, options.histogram)
            .with_context(|| format!("region {region}"))?;
        out.push_str(&format_statistics(&format!("Region {region}"), &histogram));
    }

    for &(x, y) in &options.pixels {
        match image.world_at(x, y) {
            Some((ra, dec)) => {
                let _ = writeln!(out, "Pixel ({x}, {y}): RA {ra:.6} Dec {dec:+.6}");
            }
            None => {
                let _ = writeln!(out, "Pixel ({x}, {y}): no WCS");
            }
        }
    }

    Ok(out)
}

pub fn format_metadata(metadata: &ImageMetadata) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Type: {} (BITPIX {})",
        metadata.sample_type,
        metadata.sample_type.bitpix()
    );
    let _ = writeln!(out, "Dimensions: {:?}", metadata.axes);
    if metadata.planes() > 1 {
        let _ = writeln!(out, "Planes: {}", metadata.planes());
    }
    if let Ok(len) = metadata.payload_len() {
        let _ = writeln!(out, "Data size: {len} bytes");
    }
    if !metadata.scaling.is_identity() {
        let _ = writeln!(
            out,
            "Scaling: BZERO {} BSCALE {}",
            metadata.scaling.bzero, metadata.scaling.bscale
        );
    }

    let obs = &metadata.observation;
    let strings = [
        ("Object", &obs.object),
        ("Telescope", &obs.telescope),
        ("Instrument", &obs.instrument),
        ("Filter", &obs.filter),
        ("Observer", &obs.observer),
        ("Date", &obs.date_obs),
        ("Bayer pattern", &obs.bayer_pattern),
    ];
    for (label, value) in strings {
        if let Some(v) = value {
            let _ = writeln!(out, "{label}: {v}");
        }
    }
    if let Some(t) = obs.exposure_time {
        let _ = writeln!(out, "Exposure: {t} s");
    }
    if let Some(t) = obs.temperature {
        let _ = writeln!(out, "Temperature: {t} C");
    }
    if let Some(g) = obs.gain {
        let _ = writeln!(out, "Gain: {g} e-/ADU");
    }
    if let Some((bx, by)) = obs.binning {
        let _ = writeln!(out, "Binning: {bx}x{by}");
    }
    if let Some(f) = obs.focal_length {
        let _ = writeln!(out, "Focal length: {f} mm");
    }
    out
}

pub fn format_wcs(
    wcs: &WcsParameters,
    width: usize,
    height: usize,
    limits: &ValidationLimits,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "WCS: {} / {} ({})", wcs.ctype[0], wcs.ctype[1], wcs.projection);
    if let Some(system) = &wcs.radesys {
        let _ = writeln!(out, "  Frame: {system}");
    }
    if let Some(equinox) = wcs.equinox {
        let _ = writeln!(out, "  Equinox: {equinox}");
    }
    let (ra, dec) = wcs.center(width, height);
    let _ = writeln!(out, "  Center: RA {ra:.6} Dec {dec:+.6}");
    let (sx, sy) = wcs.pixel_scale_arcsec();
    let _ = writeln!(out, "  Pixel scale: {sx:.4} x {sy:.4} arcsec");
    let _ = writeln!(out, "  Rotation: {:.3} deg", wcs.rotation_deg());
    let fov = wcs.field_of_view(width, height);
    let _ = writeln!(
        out,
        "  Field of view: {:.4} x {:.4} deg (diagonal {:.4})",
        fov.width_deg, fov.height_deg, fov.diagonal_deg
    );
    for warning in wcs.validate_with(limits) {
        let _ = writeln!(out, "  Warning: {warning}");
    }
    out
}

pub fn format_statistics(label: &str, histogram: &Histogram) -> String {
    let s = &histogram.statistics;
    let mut out = format!("{label}:\n");
    let _ = writeln!(out, "  Count: {}", s.count);
    let _ = writeln!(out, "  Min/Max: {} / {}", s.min, s.max);
    let _ = writeln!(out, "  Mean: {:.3}  Std dev: {:.3}", s.mean, s.std_dev);
    if s.count > 0 {
        let _ = writeln!(
            out,
            "  Median: {}  99th percentile: {}",
            histogram.quantile(0.5),
            histogram.quantile(0.99)
        );
    }
    out
}

/// Parse `x,y,width,height`.
pub fn parse_region(s: &str) -> Result<PixelRegion, String> {
    let parts = s
        .split(',')
        .map(|p| p.trim().parse::<usize>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid region '{s}': {e}"))?;
    match parts[..] {
        [x, y, width, height] => Ok(PixelRegion::new(x, y, width, height)),
        _ => Err(format!("region '{s}' must be x,y,width,height")),
    }
}

/// Parse `x,y` as a 0-based pixel position.
pub fn parse_pixel(s: &str) -> Result<(f64, f64), String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("pixel '{s}' must be x,y"))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<f64>()
            .map_err(|e| format!("invalid pixel '{s}': {e}"))
    };
    Ok((parse(x)?, parse(y)?))
}
