//! Whole-clip fundamental frequency estimation by normalized autocorrelation.
//!
//! A centered window of the clip is center-clipped at a fraction of its RMS,
//! which flattens formant ripple and leaves the glottal periodicity. The
//! normalized autocorrelation of the clipped signal is then scanned from the
//! shortest lag upwards, and the first strong periodicity wins rather than
//! the global maximum, which tends to land on a multiple of the period.

use tracing::trace;

use crate::config::EstimatorConfig;
use crate::detector::internals::{DetectorInternals, Pitch};
use crate::error::EstimateError;
use crate::utils::buffer::{mean_square, new_real_buffer};
use crate::utils::peak::{choose_peak, correct_peak, local_maxima, PeakCorrection};

/// Relative slack of the range check, so tones sitting exactly on a limit
/// survive refinement error.
const RANGE_TOLERANCE: f32 = 1e-3;

pub struct AutocorrelationDetector {
    internals: DetectorInternals<f32>,
    config: EstimatorConfig,
}

impl Default for AutocorrelationDetector {
    fn default() -> Self {
        Self::new(EstimatorConfig::default())
    }
}

impl AutocorrelationDetector {
    pub fn new(config: EstimatorConfig) -> Self {
        AutocorrelationDetector {
            internals: DetectorInternals::new(),
            config,
        }
    }

    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    /// Estimate the pitch of `signal`. At most `window_len` samples from the
    /// middle of the signal are analyzed.
    pub fn get_pitch(
        &mut self,
        signal: &[f32],
        sample_rate: u32,
    ) -> Result<Pitch<f32>, EstimateError> {
        let config = &self.config;
        let len = signal.len().min(config.window_len);
        let start = (signal.len() - len) / 2;
        let window = &signal[start..start + len];

        let energy = mean_square(window);
        if len == 0 || energy < config.energy_threshold {
            return Err(EstimateError::LowEnergy { energy });
        }

        let clip_level = config.clip_ratio * energy.sqrt();
        let clipped: Vec<f32> = window
            .iter()
            .map(|&s| {
                if s > clip_level {
                    s - clip_level
                } else if s < -clip_level {
                    s + clip_level
                } else {
                    0.0
                }
            })
            .collect();

        let sample_rate = sample_rate as f32;
        let min_lag = (sample_rate / config.max_frequency).floor() as usize;
        let max_lag = ((sample_rate / config.min_frequency).ceil() as usize).min(len / 2);
        if min_lag + 2 > max_lag {
            return Err(EstimateError::NoPeak);
        }

        // One lag past `max_lag` so a peak sitting on the limit still has a
        // right neighbor.
        let mut nacf = new_real_buffer(max_lag + 2);
        self.internals.normalized_autocorrelation(&clipped, &mut nacf);

        let peaks = local_maxima(&nacf, min_lag.max(1)..max_lag + 1);
        let peak = choose_peak(
            peaks,
            config.peak_threshold,
            config.strong_peak_threshold,
        )
        .ok_or(EstimateError::NoPeak)?;
        let (lag, clarity) = correct_peak(peak, &nacf, PeakCorrection::Quadratic);
        let frequency = sample_rate / lag;
        trace!(lag, clarity, frequency, "autocorrelation peak");

        let lowest = config.min_frequency * (1.0 - RANGE_TOLERANCE);
        let highest = config.max_frequency * (1.0 + RANGE_TOLERANCE);
        if !(lowest..=highest).contains(&frequency) {
            return Err(EstimateError::OutOfRange { frequency });
        }
        Ok(Pitch {
            frequency: frequency.clamp(config.min_frequency, config.max_frequency),
            clarity: clarity.clamp(0.0, 1.0),
        })
    }
}

/// Estimate the F0 of `signal` in Hz with the default configuration.
pub fn estimate_f0(signal: &[f32], sample_rate: u32) -> Result<f32, EstimateError> {
    AutocorrelationDetector::default()
        .get_pitch(signal, sample_rate)
        .map(|pitch| pitch.frequency)
}
