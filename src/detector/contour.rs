//! Frame-by-frame pitch track for display.

use crate::config::EstimatorConfig;
use crate::detector::autocorrelation::AutocorrelationDetector;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct ContourPoint {
    /// Center of the analysis frame in seconds.
    pub time: f64,
    /// Estimated F0 in Hz, `None` where the frame is silent or aperiodic.
    pub frequency: Option<f32>,
}

/// Run the F0 estimator on frames spaced `time_step` seconds apart. Each frame
/// spans three periods of the lowest detectable frequency.
pub fn pitch_contour(
    signal: &[f32],
    sample_rate: u32,
    time_step: f64,
    config: &EstimatorConfig,
) -> Vec<ContourPoint> {
    if sample_rate == 0 || time_step <= 0.0 || config.min_frequency <= 0.0 {
        return Vec::new();
    }
    let frame_len = ((3.0 * sample_rate as f32 / config.min_frequency).ceil() as usize)
        .min(config.window_len);
    let hop = ((time_step * sample_rate as f64).round() as usize).max(1);
    if signal.len() < frame_len {
        return Vec::new();
    }

    let mut detector = AutocorrelationDetector::new(config.clone());
    (0..=(signal.len() - frame_len) / hop)
        .map(|i| {
            let start = i * hop;
            let frame = &signal[start..start + frame_len];
            let time = (start as f64 + frame_len as f64 / 2.0) / sample_rate as f64;
            let frequency = detector
                .get_pitch(frame, sample_rate)
                .ok()
                .map(|pitch| pitch.frequency);
            ContourPoint { time, frequency }
        })
        .collect()
}
