//! # Voice PSOLA
//! *voice_psola* estimates the fundamental frequency of a recorded voice clip
//! and shifts its pitch by a given number of Hz with TD-PSOLA (time-domain
//! pitch-synchronous overlap-add). Because whole glottal cycles are moved
//! rather than resampled, the formants, and with them the identity of the
//! voice, survive the shift.
//!
//! # Pipeline
//!   * [F0 estimation][detector::autocorrelation] by center-clipped, normalized
//!     autocorrelation over the whole clip.
//!   * [Pitch marking][psola::marks], one mark per glottal cycle.
//!   * [Frame extraction][psola::frames] around every mark.
//!   * [Scheduling][psola::schedule] of the marks on the output timeline.
//!   * [Overlap-add][psola::synthesis] with window-mass normalization.
//!
//! [PsolaShifter] runs all of them. It also implements
//! [PitchShifter][engine::PitchShifter], the interface shared with other
//! engines for side-by-side comparison.
//!
//! # Examples
//! ```
//! use voice_psola::detector::autocorrelation::estimate_f0;
//! use voice_psola::{AudioBuffer, PsolaShifter};
//!
//! fn main() {
//!     const SAMPLE_RATE: u32 = 16000;
//!
//!     // Signal coming from some source (microphone, decoded file, etc...)
//!     let dt = 1.0 / SAMPLE_RATE as f32;
//!     let freq = 200.0;
//!     let signal: Vec<f32> = (0..SAMPLE_RATE / 2)
//!         .map(|x| 0.5 * (2.0 * std::f32::consts::PI * x as f32 * dt * freq).sin())
//!         .collect();
//!     let pcm = AudioBuffer::mono(signal, SAMPLE_RATE).unwrap();
//!
//!     let shifted = PsolaShifter::default().shift_pitch(&pcm, 50.0, None).unwrap();
//!     let f0 = estimate_f0(shifted.primary(), SAMPLE_RATE).unwrap();
//!
//!     println!("Shifted frequency: {}", f0);
//! }
//! ```

pub use audio::AudioBuffer;
pub use config::{EstimatorConfig, MarkerConfig, ShiftConfig, SynthesisConfig};
pub use detector::internals::Pitch;
pub use error::{EstimateError, Error, Result};
pub use psola::{shift_pitch, PsolaShifter, Stage};

pub mod audio;
pub mod config;
pub mod detector;
pub mod engine;
pub mod error;
pub mod float;
pub mod psola;
pub mod utils;
pub mod wav;
