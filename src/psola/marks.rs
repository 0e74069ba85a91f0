//! Pitch mark placement.
//!
//! A window of a few seed periods slides over the clip. Quiet or aperiodic
//! windows produce unvoiced marks at the seed period. Periodic windows get a
//! local period estimate, and the mark is snapped to the first strong rising
//! zero crossing near where the previous mark predicts the next cycle starts.

use tracing::debug;

use crate::config::MarkerConfig;
use crate::detector::internals::DetectorInternals;
use crate::error::{Error, Result};
use crate::utils::buffer::{mean_square, new_real_buffer};
use crate::utils::peak::{choose_dominant_peak, correct_peak, local_maxima, PeakCorrection};

/// Crossings whose slope reaches this fraction of the steepest one qualify.
const STRONG_CROSSING_RATIO: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct PitchMark {
    /// Sample index, possibly fractional.
    pub position: f64,
    /// Local period in samples.
    pub period: f64,
    pub is_voiced: bool,
    /// Mean energy of the scan window that produced the mark.
    pub energy: f32,
    /// Peak normalized autocorrelation of the local period search, in `[0, 1]`.
    pub confidence: f32,
}

/// Place pitch marks over `signal`, seeded with an F0 estimate in Hz.
///
/// Returns [Error::InsufficientPitchMarks] when fewer than two marks fit in
/// the signal.
pub fn find_pitch_marks(
    signal: &[f32],
    sample_rate: u32,
    seed_f0: f32,
    config: &MarkerConfig,
) -> Result<Vec<PitchMark>> {
    if sample_rate == 0 {
        return Err(Error::InvalidParameter("sample rate must be positive".into()));
    }
    if !(seed_f0 > 0.0) {
        return Err(Error::InvalidParameter(format!(
            "seed frequency must be positive, got {}",
            seed_f0
        )));
    }
    let seed_period = sample_rate as f64 / seed_f0 as f64;
    if seed_period < 2.0 {
        return Err(Error::InvalidParameter(format!(
            "seed frequency {} Hz is above the Nyquist limit",
            seed_f0
        )));
    }

    let mut marks = PitchMarker::new(seed_period, config).scan(signal);
    smooth_periods(&mut marks, config.smoothing_tolerance);

    if marks.len() < 2 {
        return Err(Error::InsufficientPitchMarks { found: marks.len() });
    }
    debug!(
        marks = marks.len(),
        voiced = marks.iter().filter(|m| m.is_voiced).count(),
        "placed pitch marks"
    );
    Ok(marks)
}

/// Replace the period of a voiced mark between two voiced neighbors with the
/// mean of its two intervals when it deviates from that mean by more than
/// `tolerance`.
pub fn smooth_periods(marks: &mut [PitchMark], tolerance: f64) {
    for i in 1..marks.len().saturating_sub(1) {
        if !(marks[i - 1].is_voiced && marks[i].is_voiced && marks[i + 1].is_voiced) {
            continue;
        }
        let average = (marks[i + 1].position - marks[i - 1].position) / 2.0;
        if average > 0.0 && (marks[i].period - average).abs() > tolerance * average {
            marks[i].period = average;
        }
    }
}

struct PitchMarker<'a> {
    config: &'a MarkerConfig,
    seed_period: f64,
    window: usize,
    hop: usize,
    internals: DetectorInternals<f32>,
    acf: Vec<f32>,
}

impl<'a> PitchMarker<'a> {
    fn new(seed_period: f64, config: &'a MarkerConfig) -> Self {
        let window = ((config.window_periods * seed_period).round() as usize).max(8);
        PitchMarker {
            config,
            seed_period,
            window,
            hop: ((seed_period / 6.0).round() as usize).max(1),
            internals: DetectorInternals::new(),
            acf: new_real_buffer(window / 2),
        }
    }

    fn scan(&mut self, signal: &[f32]) -> Vec<PitchMark> {
        let config = self.config;
        let window = self.window;
        let unvoiced_advance = ((config.unvoiced_advance * self.seed_period).round() as usize).max(1);

        let mut marks: Vec<PitchMark> = Vec::new();
        let mut expected_next: Option<f64> = None;
        let mut pos = 0;

        while pos + window <= signal.len() {
            let frame = &signal[pos..pos + window];
            let energy = mean_square(frame);
            let last = marks.last().map(|m| m.position);

            let candidate = if energy >= config.energy_threshold {
                self.local_period(frame)
            } else {
                None
            };

            match candidate {
                Some((period, confidence)) if confidence > config.voicing_threshold => {
                    let window_start = pos as f64;
                    let anchor = expected_next
                        .filter(|&a| a >= window_start && a < window_start + window as f64)
                        .unwrap_or(window_start + window as f64 / 3.0);
                    let earliest = last.map(|l| l + config.min_spacing * period);

                    let position = match locate_mark(
                        signal,
                        anchor,
                        config.crossing_search * period,
                        earliest,
                    ) {
                        Some(position) => position,
                        None => {
                            pos += self.hop;
                            continue;
                        }
                    };

                    if let Some(last) = last {
                        let distance = position - last;
                        if distance < config.min_spacing * period {
                            pos += self.hop;
                            continue;
                        }
                        if expected_next.is_some() && distance > config.max_spacing * period {
                            // The voiced run lost track; restart it from the window.
                            expected_next = None;
                            pos += self.hop;
                            continue;
                        }
                    }

                    marks.push(PitchMark {
                        position,
                        period,
                        is_voiced: true,
                        energy,
                        confidence,
                    });
                    expected_next = Some(position + period);

                    let next = position + config.voiced_advance * period - window as f64 / 3.0;
                    pos = (next.max(0.0).round() as usize).max(pos + self.hop);
                }
                _ => {
                    expected_next = None;
                    let center = pos as f64 + window as f64 / 2.0;
                    let spaced =
                        last.map_or(true, |l| center - l >= config.min_spacing * self.seed_period);
                    if spaced {
                        marks.push(PitchMark {
                            position: center,
                            period: self.seed_period,
                            is_voiced: false,
                            energy,
                            confidence: candidate.map_or(0.0, |c| c.1),
                        });
                    }
                    pos += unvoiced_advance;
                }
            }
        }
        marks
    }

    /// Period (in samples) and confidence of the strongest periodicity within
    /// `period_search` of the seed period.
    fn local_period(&mut self, frame: &[f32]) -> Option<(f64, f32)> {
        let half = frame.len() / 2;
        self.internals
            .normalized_windowed_autocorrelation(frame, half, &mut self.acf[..half]);
        let acf = &self.acf[..half];

        let search = self.config.period_search;
        let min_lag = (((1.0 - search) * self.seed_period).ceil() as usize).max(2);
        let max_lag = ((1.0 + search) * self.seed_period).floor() as usize;

        let peaks = local_maxima(acf, min_lag..max_lag + 1);
        let peak = choose_dominant_peak(peaks, self.config.dominant_peak_ratio)?;
        let (lag, value) = correct_peak(peak, acf, PeakCorrection::Quadratic);
        Some((lag as f64, value.clamp(0.0, 1.0)))
    }
}

/// Position of the first strong rising zero crossing within `radius` of
/// `anchor` (and not before `earliest`), refined linearly between samples.
/// Falls back to the loudest sample of the range when no crossing qualifies.
fn locate_mark(signal: &[f32], anchor: f64, radius: f64, earliest: Option<f64>) -> Option<f64> {
    let lo = earliest.map_or(anchor - radius, |e| (anchor - radius).max(e));
    let hi = anchor + radius;
    let first = (lo.ceil().max(1.0)) as usize;
    let last = (hi.floor().max(0.0) as usize).min(signal.len().saturating_sub(1));
    if signal.len() < 2 || first > last {
        return None;
    }

    let crossings: Vec<(f64, f32)> = (first..=last)
        .filter(|&i| signal[i - 1] < 0.0 && signal[i] >= 0.0)
        .map(|i| {
            let slope = signal[i] - signal[i - 1];
            let position = (i - 1) as f64 + (-signal[i - 1] / slope) as f64;
            (position, slope)
        })
        .filter(|&(position, _)| position >= lo)
        .collect();

    let steepest = crossings.iter().map(|c| c.1).fold(0.0f32, f32::max);
    if let Some(&(position, _)) = crossings
        .iter()
        .find(|c| steepest > 0.0 && c.1 >= STRONG_CROSSING_RATIO * steepest)
    {
        return Some(position);
    }

    (first..=last)
        .max_by(|&a, &b| signal[a].abs().total_cmp(&signal[b].abs()))
        .map(|i| i as f64)
}
