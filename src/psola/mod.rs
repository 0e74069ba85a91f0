//! TD-PSOLA pitch shifting.
//!
//! The input is cut into short frames centered on pitch marks, one per glottal
//! cycle. Respacing the frames at a shorter or longer period and summing them
//! back together changes the pitch while keeping the spectral envelope, and
//! with it the character of the voice.
//!
//! [PsolaShifter] runs the stages in order:
//!
//!   1. whole-clip F0 estimate ([crate::detector::autocorrelation]),
//!      unless the caller supplies a seed;
//!   2. pitch marks ([marks]);
//!   3. analysis frames ([frames]);
//!   4. synthesis positions ([schedule]);
//!   5. overlap-add ([synthesis]).

use tracing::{debug, warn};

use crate::audio::AudioBuffer;
use crate::config::ShiftConfig;
use crate::detector::autocorrelation::AutocorrelationDetector;
use crate::detector::semitones_to_hz_delta;
use crate::error::{Error, Result};

pub mod frames;
pub mod marks;
pub mod schedule;
pub mod synthesis;

/// Pipeline checkpoints reported to a progress callback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Stage {
    /// The F0 used to seed the pitch marker, estimated or supplied.
    F0Estimated { f0: f32 },
    PitchMarked { marks: usize },
    FramesExtracted { frames: usize },
    Scheduled,
    Synthesized { samples: usize },
}

/// The TD-PSOLA pitch-shifting engine.
///
/// A shifter holds only configuration, so one instance can serve any number
/// of clips, including from several threads at once.
#[derive(Debug, Clone, Default)]
pub struct PsolaShifter {
    config: ShiftConfig,
}

impl PsolaShifter {
    pub fn new(config: ShiftConfig) -> Self {
        PsolaShifter { config }
    }

    pub fn config(&self) -> &ShiftConfig {
        &self.config
    }

    /// Shift the pitch of `pcm` by `hz_delta` Hz.
    ///
    /// The first channel is processed and the result is a mono buffer at the
    /// input sample rate; use [AudioBuffer::duplicated] for more channels.
    /// Without `seed_f0` the F0 is estimated from the clip, and if that fails
    /// the configured default is used instead.
    pub fn shift_pitch(
        &self,
        pcm: &AudioBuffer,
        hz_delta: f32,
        seed_f0: Option<f32>,
    ) -> Result<AudioBuffer> {
        self.shift_pitch_with_progress(pcm, hz_delta, seed_f0, &mut |_| {})
    }

    /// Same as [PsolaShifter::shift_pitch], calling `progress` after each stage.
    pub fn shift_pitch_with_progress(
        &self,
        pcm: &AudioBuffer,
        hz_delta: f32,
        seed_f0: Option<f32>,
        progress: &mut dyn FnMut(Stage),
    ) -> Result<AudioBuffer> {
        let signal = pcm.primary();
        let sample_rate = pcm.sample_rate();

        let f0 = self.resolve_f0(signal, sample_rate, seed_f0)?;
        progress(Stage::F0Estimated { f0 });

        let target_f0 = f0 + hz_delta;
        if !(target_f0 > 0.0) {
            return Err(Error::InvalidParameter(format!(
                "target frequency {} Hz ({} Hz {:+} Hz) must be positive",
                target_f0, f0, hz_delta
            )));
        }
        let pitch_ratio = target_f0 as f64 / f0 as f64;
        let (min_ratio, max_ratio) = (self.config.min_pitch_ratio, self.config.max_pitch_ratio);
        if !(min_ratio..=max_ratio).contains(&pitch_ratio) {
            return Err(Error::InvalidParameter(format!(
                "pitch ratio {:.4} ({} Hz to {} Hz) is outside {}..={}",
                pitch_ratio, f0, target_f0, min_ratio, max_ratio
            )));
        }
        debug!(f0, target_f0, pitch_ratio, "shifting pitch");

        let marks = marks::find_pitch_marks(signal, sample_rate, f0, &self.config.marker)?;
        progress(Stage::PitchMarked { marks: marks.len() });

        let frames = frames::extract_frames(signal, &marks, sample_rate, &self.config.synthesis);
        debug!(
            frames = frames.len(),
            dropped = marks.len() - frames.len(),
            "extracted analysis frames"
        );
        progress(Stage::FramesExtracted {
            frames: frames.len(),
        });

        let positions = schedule::synthesis_positions(&marks, pitch_ratio);
        progress(Stage::Scheduled);

        let output = synthesis::overlap_add(
            &frames,
            &positions,
            signal.len(),
            sample_rate,
            &self.config.synthesis,
        );
        progress(Stage::Synthesized {
            samples: output.len(),
        });

        AudioBuffer::mono(output, sample_rate)
    }

    /// Shift the pitch of `pcm` by a musical interval. The Hz offset is taken
    /// relative to the resolved F0, so the same interval sounds the same for
    /// low and high voices.
    pub fn shift_semitones(
        &self,
        pcm: &AudioBuffer,
        semitones: f32,
        seed_f0: Option<f32>,
    ) -> Result<AudioBuffer> {
        let f0 = self.resolve_f0(pcm.primary(), pcm.sample_rate(), seed_f0)?;
        let hz_delta = semitones_to_hz_delta(f0, semitones);
        self.shift_pitch(pcm, hz_delta, Some(f0))
    }

    fn resolve_f0(&self, signal: &[f32], sample_rate: u32, seed_f0: Option<f32>) -> Result<f32> {
        if let Some(seed) = seed_f0 {
            if !(seed > 0.0) {
                return Err(Error::InvalidParameter(format!(
                    "seed frequency must be positive, got {}",
                    seed
                )));
            }
            return Ok(seed);
        }

        let mut detector = AutocorrelationDetector::new(self.config.estimator.clone());
        match detector.get_pitch(signal, sample_rate) {
            Ok(pitch) => {
                debug!(
                    f0 = pitch.frequency,
                    clarity = pitch.clarity,
                    "estimated clip F0"
                );
                Ok(pitch.frequency)
            }
            Err(err) => {
                let fallback = self.config.marker.default_f0;
                warn!(error = %err, fallback, "F0 estimation failed, using default");
                Ok(fallback)
            }
        }
    }
}

/// Shift the pitch of `pcm` by `hz_delta` Hz with the default configuration.
pub fn shift_pitch(pcm: &AudioBuffer, hz_delta: f32, seed_f0: Option<f32>) -> Result<AudioBuffer> {
    PsolaShifter::default().shift_pitch(pcm, hz_delta, seed_f0)
}
