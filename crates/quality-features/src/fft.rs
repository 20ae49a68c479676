//! FFT-based Ridge Signature Analysis

use rustfft::{num_complex::Complex, FftPlanner};

/// Weight of the two bins neighbouring the dominant frequency
pub const NEIGHBOUR_WEIGHT: f64 = 0.3;

/// Dominant-frequency analysis of 1-D ridge signatures
pub struct RidgeSpectrum {
    /// FFT planner, reused across blocks of equal size
    planner: FftPlanner<f64>,
}

/// Power spectrum summary of one signature
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SpectralPeak {
    /// Index of the strongest non-DC bin
    pub dominant_bin: usize,
    /// Share of non-DC power concentrated around the dominant bin
    pub concentration: f64,
}

impl Default for RidgeSpectrum {
    fn default() -> Self {
        Self::new()
    }
}

impl RidgeSpectrum {
    pub fn new() -> Self {
        Self {
            planner: FftPlanner::new(),
        }
    }

    /// Analyze a signature; `None` when it carries no AC power
    pub fn analyze(&mut self, signal: &[f64]) -> Option<SpectralPeak> {
        let n = signal.len();
        if n < 4 {
            return None;
        }

        // Remove DC so the peak search sees ridge structure only
        let mean = signal.iter().sum::<f64>() / n as f64;
        let mut buffer: Vec<Complex<f64>> = signal
            .iter()
            .map(|&v| Complex::new(v - mean, 0.0))
            .collect();

        let fft = self.planner.plan_fft_forward(n);
        fft.process(&mut buffer);

        let half = n / 2;
        let power: Vec<f64> = buffer[..half].iter().map(|c| c.norm_sqr()).collect();
        let total_power: f64 = power[1..].iter().sum();
        if total_power <= f64::EPSILON {
            return None;
        }

        let mut dominant_bin = 1;
        for i in 2..half {
            if power[i] > power[dominant_bin] {
                dominant_bin = i;
            }
        }

        let below = if dominant_bin > 1 { power[dominant_bin - 1] } else { 0.0 };
        let above = power.get(dominant_bin + 1).copied().unwrap_or(0.0);
        let concentration = (power[dominant_bin] + NEIGHBOUR_WEIGHT * (below + above)) / total_power;

        Some(SpectralPeak {
            dominant_bin,
            concentration: concentration.clamp(0.0, 1.0),
        })
    }
}
