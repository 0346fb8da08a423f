//! Print metadata, WCS and pixel statistics of FITS images.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use log::{error, LevelFilter};
use skyfits::{HistogramConfig, PixelRegion, ValidationLimits};
use skyfits_tools::{parse_pixel, parse_region, report, ReportOptions};

#[derive(Parser, Debug)]
#[command(name = "fitsinfo")]
#[command(about = "Describe the primary image of FITS files")]
#[command(version)]
struct Args {
    /// FITS files to describe
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Also report statistics for a region, as x,y,width,height
    #[arg(short, long, value_parser = parse_region)]
    region: Option<PixelRegion>,

    /// Convert a 0-based pixel position x,y to RA/Dec (repeatable)
    #[arg(short, long = "pixel", value_parser = parse_pixel)]
    pixels: Vec<(f64, f64)>,

    /// Number of histogram bins
    #[arg(long, default_value_t = 256)]
    bins: usize,

    /// Smallest plausible pixel scale in arcsec
    #[arg(long, default_value_t = 0.1)]
    min_scale: f64,

    /// Largest plausible pixel scale in arcsec
    #[arg(long, default_value_t = 600.0)]
    max_scale: f64,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let options = ReportOptions {
        histogram: HistogramConfig { bins: args.bins },
        limits: ValidationLimits {
            min_arcsec_per_pixel: args.min_scale,
            max_arcsec_per_pixel: args.max_scale,
        },
        region: args.region,
        pixels: args.pixels,
    };

    let mut failed = 0;
    for (i, path) in args.files.iter().enumerate() {
        if i > 0 {
            println!();
        }
        match report(path, &options) {
            Ok(text) => print!("{text}"),
            Err(e) => {
                error!("{e:#}");
                failed += 1;
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{failed} of {} files could not be read", args.files.len());
    }
    Ok(())
}
