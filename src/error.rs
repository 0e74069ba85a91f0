//! Error types for pitch estimation and pitch shifting.
//!
//! F0 estimation failures ([EstimateError]) are recoverable: the pipeline logs
//! them and continues with a default seed frequency. Everything in [Error] is
//! surfaced to the caller.

use thiserror::Error;

/// Result type alias using this crate's [Error] type.
pub type Result<T> = std::result::Result<T, Error>;

/// Reasons the whole-clip F0 estimator can decline to produce an estimate.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum EstimateError {
    /// Mean energy of the analysis window is below the estimation threshold.
    #[error("signal energy {energy} is below the estimation threshold")]
    LowEnergy { energy: f32 },

    /// No autocorrelation peak in the search range exceeded the clarity threshold.
    #[error("no periodicity found in the supported pitch range")]
    NoPeak,

    /// The refined estimate landed outside the supported pitch range.
    #[error("estimated frequency {frequency} Hz is outside the supported range")]
    OutOfRange { frequency: f32 },
}

/// Errors surfaced by the pitch-shifting pipeline and its I/O boundary.
#[derive(Error, Debug)]
pub enum Error {
    /// Fewer than two pitch marks were found, so no period can be characterized.
    #[error("found {found} pitch marks, at least 2 are required")]
    InsufficientPitchMarks { found: usize },

    /// A caller-supplied value is unusable (zero sample rate, empty buffer,
    /// non-positive frequency).
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The input bytes could not be decoded into PCM samples.
    #[error("Failed to decode audio: {0}")]
    Decode(#[source] hound::Error),

    /// The output samples could not be written as a WAV container.
    #[error("Failed to encode audio: {0}")]
    Encode(#[source] hound::Error),

    /// A peer pitch-shifting engine reported a failure.
    #[error("Engine {engine} failed: {message}")]
    Engine { engine: String, message: String },
}
