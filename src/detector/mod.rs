pub use crate::detector::internals::Pitch;

pub mod autocorrelation;
pub mod contour;
pub mod internals;

/// MIDI note number of `frequency`, with A4 = 440 Hz = 69. Fractional values
/// are cents / 100 away from the nearest note.
pub fn hz_to_midi(frequency: f32) -> f32 {
    12.0 * (frequency / 440.0).log2() + 69.0
}

/// Frequency ratio of an interval of `semitones`.
pub fn semitones_to_ratio(semitones: f32) -> f32 {
    (semitones / 12.0).exp2()
}

/// Hz offset that moves `f0` by `semitones`.
pub fn semitones_to_hz_delta(f0: f32, semitones: f32) -> f32 {
    f0 * (semitones_to_ratio(semitones) - 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn midi_reference_points() {
        assert_abs_diff_eq!(hz_to_midi(440.0), 69.0, epsilon = 1e-4);
        assert_abs_diff_eq!(hz_to_midi(261.6256), 60.0, epsilon = 1e-3);
    }

    #[test]
    fn octave_doubles_frequency() {
        assert_abs_diff_eq!(semitones_to_ratio(12.0), 2.0, epsilon = 1e-6);
        assert_abs_diff_eq!(semitones_to_hz_delta(200.0, 12.0), 200.0, epsilon = 1e-3);
        assert_abs_diff_eq!(semitones_to_hz_delta(200.0, -12.0), -100.0, epsilon = 1e-3);
    }
}
