//! Descriptive Statistics and Histograms

/// Number of bins in the `_Bin10_*` histogram features
pub const HISTOGRAM_BINS: usize = 10;

/// Descriptive statistics of a sample
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SampleStatistics {
    /// Number of values
    pub count: usize,
    /// Arithmetic mean
    pub mean: f64,
    /// Population standard deviation
    pub std_dev: f64,
    /// Minimum value
    pub min: f64,
    /// Maximum value
    pub max: f64,
}

impl SampleStatistics {
    /// Compute statistics from a slice of values
    pub fn compute(values: &[f64]) -> Self {
        Self::from_iter(values.iter().copied())
    }

    /// Compute statistics from 8-bit pixels
    pub fn from_pixels<'a>(pixels: impl IntoIterator<Item = &'a u8>) -> Self {
        Self::from_iter(pixels.into_iter().map(|&p| p as f64))
    }

    fn from_iter(values: impl Iterator<Item = f64>) -> Self {
        // Welford's update keeps the variance stable for large images
        let mut count = 0usize;
        let mut mean = 0.0;
        let mut m2 = 0.0;
        let mut min = f64::MAX;
        let mut max = f64::MIN;

        for v in values {
            count += 1;
            let delta = v - mean;
            mean += delta / count as f64;
            m2 += delta * (v - mean);
            min = min.min(v);
            max = max.max(v);
        }

        if count == 0 {
            return Self::default();
        }

        Self {
            count,
            mean,
            std_dev: (m2 / count as f64).max(0.0).sqrt(),
            min,
            max,
        }
    }
}

/// Fraction of values falling into each tenth of `[low, high]`
///
/// Values at or beyond `high` land in the last bin, values below `low` in
/// the first. An empty sample yields all zeros.
pub fn bin10_fractions(values: &[f64], low: f64, high: f64) -> [f64; HISTOGRAM_BINS] {
    let mut bins = [0.0; HISTOGRAM_BINS];
    if values.is_empty() || high <= low {
        return bins;
    }

    let width = (high - low) / HISTOGRAM_BINS as f64;
    for &v in values {
        let idx = ((v - low) / width).floor();
        let idx = if idx.is_nan() || idx < 0.0 {
            0
        } else {
            (idx as usize).min(HISTOGRAM_BINS - 1)
        };
        bins[idx] += 1.0;
    }

    let n = values.len() as f64;
    for bin in &mut bins {
        *bin /= n;
    }
    bins
}
