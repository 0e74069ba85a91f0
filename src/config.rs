//! Tunable thresholds for estimation, marking and synthesis.
//!
//! The defaults work well on speech and sung vowels recorded at common sample
//! rates. They are heuristics, so every value can be overridden.

/// Whole-clip F0 estimation parameters.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct EstimatorConfig {
    /// Maximum number of samples analyzed, taken from the center of the clip.
    pub window_len: usize,
    /// Minimum mean energy of the analysis window.
    pub energy_threshold: f32,
    /// Center-clipping level as a fraction of the window RMS.
    pub clip_ratio: f32,
    pub min_frequency: f32,
    pub max_frequency: f32,
    /// Normalized autocorrelation a peak must exceed to be considered.
    pub peak_threshold: f32,
    /// A peak above this value ends the lag scan immediately.
    pub strong_peak_threshold: f32,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            window_len: 8192,
            energy_threshold: 1e-3,
            clip_ratio: 0.3,
            min_frequency: 80.0,
            max_frequency: 500.0,
            peak_threshold: 0.3,
            strong_peak_threshold: 0.7,
        }
    }
}

/// Pitch mark scan parameters. Distances are in multiples of the local period.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct MarkerConfig {
    /// Seed frequency used when the estimator declines to produce one.
    pub default_f0: f32,
    /// Scan window length in seed periods.
    pub window_periods: f64,
    /// Mean energy below which a window is treated as unvoiced.
    pub energy_threshold: f32,
    /// Correlation a local period candidate needs to be voiced.
    pub voicing_threshold: f32,
    /// Width of the local period search around the seed period.
    pub period_search: f64,
    /// Candidates within this fraction of the best local peak are eligible;
    /// the one with the smallest lag wins.
    pub dominant_peak_ratio: f32,
    /// Zero-crossing search radius around the expected mark.
    pub crossing_search: f64,
    pub min_spacing: f64,
    pub max_spacing: f64,
    /// Scan advance after a voiced mark.
    pub voiced_advance: f64,
    /// Scan advance after an unvoiced mark.
    pub unvoiced_advance: f64,
    /// Relative deviation from neighboring intervals that triggers smoothing.
    pub smoothing_tolerance: f64,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            default_f0: 150.0,
            window_periods: 3.0,
            energy_threshold: 1e-4,
            voicing_threshold: 0.35,
            period_search: 0.5,
            dominant_peak_ratio: 0.9,
            crossing_search: 0.4,
            min_spacing: 0.4,
            max_spacing: 2.0,
            voiced_advance: 0.6,
            unvoiced_advance: 0.7,
            smoothing_tolerance: 0.3,
        }
    }
}

/// Frame extraction and overlap-add parameters.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct SynthesisConfig {
    /// Frame length in local periods for voiced marks.
    pub voiced_frame_periods: f64,
    /// Frame length in local periods for unvoiced marks.
    pub unvoiced_frame_periods: f64,
    pub min_frame_secs: f64,
    pub max_frame_secs: f64,
    /// Window mass above which output samples are fully normalized.
    pub mass_threshold: f32,
    /// Window mass at or below which output samples are silenced.
    pub mass_floor: f32,
    /// Input/output energy ratio that triggers loudness restoration.
    pub energy_ratio_limit: f32,
    /// Scale applied to the square-root energy ratio when restoring loudness.
    pub energy_restore_factor: f32,
    pub fade_fraction: f32,
    pub min_fade: usize,
    pub max_fade: usize,
    /// Magnitude above which the soft limiter engages.
    pub limiter_knee: f32,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            voiced_frame_periods: 2.5,
            unvoiced_frame_periods: 2.0,
            min_frame_secs: 0.010,
            max_frame_secs: 0.050,
            mass_threshold: 0.1,
            mass_floor: 0.001,
            energy_ratio_limit: 1.2,
            energy_restore_factor: 0.9,
            fade_fraction: 0.015,
            min_fade: 64,
            max_fade: 2048,
            limiter_knee: 0.9,
        }
    }
}

/// Complete configuration of a pitch-shifting run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct ShiftConfig {
    pub estimator: EstimatorConfig,
    pub marker: MarkerConfig,
    pub synthesis: SynthesisConfig,
    /// Smallest accepted target/source F0 ratio. Output length grows with the
    /// inverse of the ratio.
    pub min_pitch_ratio: f64,
    /// Largest accepted target/source F0 ratio.
    pub max_pitch_ratio: f64,
}

impl Default for ShiftConfig {
    fn default() -> Self {
        Self {
            estimator: EstimatorConfig::default(),
            marker: MarkerConfig::default(),
            synthesis: SynthesisConfig::default(),
            min_pitch_ratio: 0.25,
            max_pitch_ratio: 4.0,
        }
    }
}
