//! Histograms and summary statistics at a 16-bit presentation depth.
//!
//! Every sample type is first mapped onto `0..=65535`:
//!
//! - 8-bit values are widened unchanged.
//! - 16-bit values are reinterpreted as unsigned, so unsigned 16-bit data
//!   stored with BZERO = 32768 keeps its true value.
//! - 32-bit integers keep the top 16 bits of their offset-binary form.
//! - Floats are rescaled linearly over a [`FloatRange`], by default the finite
//!   range of the samples; NaN and infinite samples are skipped. A constant
//!   float image maps to its value, clamped.
//!
//! The 32-bit and float mappings are approximations for display stretching,
//! not exact transforms.
//!
//! Statistics accumulate in integers, so splitting the input into chunks and
//! merging the partial results gives exactly the same answer in any order.
//! Float chunks must be mapped over one shared range for this to hold: take
//! the [`FloatRange::union`] of every chunk and pass it to
//! [`HistogramEngine::accumulate_with_range`].

use alloc::vec;
use alloc::vec::Vec;

use log::debug;

use crate::sample::Samples;

/// Bit depth of the presentation values.
pub const PRESENTATION_BIT_DEPTH: u8 = 16;

const LEVELS: usize = 1 << PRESENTATION_BIT_DEPTH;

/// Histogram output settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistogramConfig {
    /// Number of equal-width bins spanning `0..=65535`, clamped to
    /// `1..=65536`.
    pub bins: usize,
}

impl Default for HistogramConfig {
    fn default() -> Self {
        Self { bins: 256 }
    }
}

/// Summary statistics of presentation values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramStatistics {
    pub count: u64,
    pub min: u16,
    pub max: u16,
    pub mean: f64,
    /// Population standard deviation.
    pub std_dev: f64,
    /// Always [`PRESENTATION_BIT_DEPTH`].
    pub bit_depth: u8,
}

/// Exact, mergeable accumulator of presentation values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistogramAccumulator {
    levels: Vec<u64>,
    count: u64,
    sum: u128,
    sum_sq: u128,
    min: u16,
    max: u16,
}

impl Default for HistogramAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl HistogramAccumulator {
    pub fn new() -> Self {
        Self {
            levels: vec![0; LEVELS],
            count: 0,
            sum: 0,
            sum_sq: 0,
            min: u16::MAX,
            max: 0,
        }
    }

    /// Record one value.
    pub fn push(&mut self, value: u16) {
        self.levels[usize::from(value)] += 1;
        self.count += 1;
        let v = u128::from(value);
        self.sum += v;
        self.sum_sq += v * v;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    /// Fold another accumulator into this one.
    pub fn merge(&mut self, other: &Self) {
        for (a, b) in self.levels.iter_mut().zip(&other.levels) {
            *a += b;
        }
        self.count += other.count;
        self.sum += other.sum;
        self.sum_sq += other.sum_sq;
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    /// Summary statistics; all zero when nothing was recorded.
    pub fn statistics(&self) -> HistogramStatistics {
        if self.count == 0 {
            return HistogramStatistics {
                count: 0,
                min: 0,
                max: 0,
                mean: 0.0,
                std_dev: 0.0,
                bit_depth: PRESENTATION_BIT_DEPTH,
            };
        }
        let n = u128::from(self.count);
        let mean = self.sum as f64 / self.count as f64;
        // n * sum_sq >= sum^2 by Cauchy-Schwarz
        let numerator = n * self.sum_sq - self.sum * self.sum;
        let variance = numerator as f64 / (self.count as f64 * self.count as f64);
        HistogramStatistics {
            count: self.count,
            min: self.min,
            max: self.max,
            mean,
            std_dev: libm::sqrt(variance),
            bit_depth: PRESENTATION_BIT_DEPTH,
        }
    }

    /// Finish into a histogram with the configured bin count.
    pub fn finish(self, config: &HistogramConfig) -> Histogram {
        let bin_count = config.bins.clamp(1, LEVELS);
        let mut bins = vec![0u64; bin_count];
        for (level, &n) in self.levels.iter().enumerate() {
            bins[level * bin_count / LEVELS] += n;
        }
        Histogram {
            statistics: self.statistics(),
            bins,
            levels: self.levels,
        }
    }
}

/// Binned distribution of presentation values with summary statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub statistics: HistogramStatistics,
    /// Counts per equal-width bin.
    pub bins: Vec<u64>,
    levels: Vec<u64>,
}

impl Histogram {
    /// Width of each bin in presentation levels.
    pub fn bin_width(&self) -> f64 {
        LEVELS as f64 / self.bins.len() as f64
    }

    /// Value at percentile `p` (0 to 100) interpolated linearly between the
    /// minimum and maximum. This ignores the shape of the distribution; use
    /// [`Histogram::quantile`] for an order statistic.
    pub fn percentile(&self, p: f64) -> f64 {
        let s = &self.statistics;
        let fraction = p.clamp(0.0, 100.0) / 100.0;
        f64::from(s.min) + (f64::from(s.max) - f64::from(s.min)) * fraction
    }

    /// Smallest presentation value whose cumulative count reaches fraction
    /// `q` (0 to 1) of all samples. Returns 0 for an empty histogram.
    pub fn quantile(&self, q: f64) -> u16 {
        let total = self.statistics.count;
        if total == 0 {
            return 0;
        }
        let target = libm::ceil(q.clamp(0.0, 1.0) * total as f64).max(1.0) as u64;
        let mut seen = 0u64;
        for (level, &n) in self.levels.iter().enumerate() {
            seen += n;
            if seen >= target {
                return level as u16;
            }
        }
        self.statistics.max
    }
}

/// Finite span used to map float samples onto the presentation depth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloatRange {
    pub lo: f64,
    pub hi: f64,
}

impl FloatRange {
    /// Finite range of float samples. `None` for integer samples or when no
    /// sample is finite.
    pub fn of(samples: &Samples) -> Option<Self> {
        match samples {
            Samples::F32(v) => finite_range(v.iter().map(|&x| f64::from(x))),
            Samples::F64(v) => finite_range(v.iter().copied()),
            _ => None,
        }
    }

    /// Smallest range covering both.
    pub fn union(self, other: Self) -> Self {
        Self {
            lo: self.lo.min(other.lo),
            hi: self.hi.max(other.hi),
        }
    }

    fn level(&self, v: f64) -> u16 {
        let top = (LEVELS - 1) as f64;
        let span = self.hi - self.lo;
        let level = if span > 0.0 {
            (v - self.lo) / span * top
        } else {
            v
        };
        libm::round(level).clamp(0.0, top) as u16
    }
}

/// Computes histograms of decoded samples.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HistogramEngine {
    pub config: HistogramConfig,
}

impl HistogramEngine {
    pub fn new(config: HistogramConfig) -> Self {
        Self { config }
    }

    /// Accumulate every sample without binning. Floats map over their own
    /// finite range.
    pub fn accumulate(&self, samples: &Samples) -> HistogramAccumulator {
        match FloatRange::of(samples) {
            Some(range) => self.accumulate_with_range(samples, range),
            None => {
                let mut acc = HistogramAccumulator::new();
                for_each_presentation_value(samples, None, |v| acc.push(v));
                acc
            }
        }
    }

    /// Accumulate with floats mapped over `range`. Integer samples ignore it.
    pub fn accumulate_with_range(
        &self,
        samples: &Samples,
        range: FloatRange,
    ) -> HistogramAccumulator {
        let mut acc = HistogramAccumulator::new();
        for_each_presentation_value(samples, Some(range), |v| acc.push(v));
        acc
    }

    /// Histogram and statistics of every sample.
    pub fn compute(&self, samples: &Samples) -> Histogram {
        let histogram = self.accumulate(samples).finish(&self.config);
        debug!(
            "histogram of {} samples into {} bins: {:?}",
            samples.len(),
            histogram.bins.len(),
            histogram.statistics
        );
        histogram
    }
}

fn for_each_presentation_value(
    samples: &Samples,
    range: Option<FloatRange>,
    mut f: impl FnMut(u16),
) {
    match samples {
        Samples::U8(v) => v.iter().for_each(|&x| f(u16::from(x))),
        Samples::I16(v) => v.iter().for_each(|&x| f(x as u16)),
        Samples::I32(v) => v
            .iter()
            .for_each(|&x| f((((x as u32) ^ 0x8000_0000) >> 16) as u16)),
        Samples::F32(v) => {
            if let Some(range) = range {
                v.iter()
                    .filter(|x| x.is_finite())
                    .for_each(|&x| f(range.level(f64::from(x))));
            }
        }
        Samples::F64(v) => {
            if let Some(range) = range {
                v.iter()
                    .filter(|x| x.is_finite())
                    .for_each(|&x| f(range.level(x)));
            }
        }
    }
}

fn finite_range(values: impl Iterator<Item = f64>) -> Option<FloatRange> {
    values.filter(|v| v.is_finite()).fold(None, |range, v| match range {
        None => Some(FloatRange { lo: v, hi: v }),
        Some(r) => Some(FloatRange {
            lo: r.lo.min(v),
            hi: r.hi.max(v),
        }),
    })
}
