//! Interchangeable pitch-shifting engines.
//!
//! Every engine takes raw mono samples and an Hz offset and returns new
//! samples, so hosts can swap TD-PSOLA for another algorithm or run several
//! side by side to compare them.

use rayon::prelude::*;
use tracing::debug;

use crate::audio::AudioBuffer;
use crate::error::{Error, Result};
use crate::psola::PsolaShifter;

pub trait PitchShifter: Send + Sync {
    /// Short, human readable name of the algorithm.
    fn name(&self) -> &str;

    /// Shift the pitch of mono `samples` by `hz_delta` Hz.
    fn shift_pitch(&self, samples: &[f32], sample_rate: u32, hz_delta: f32) -> Result<Vec<f32>>;
}

impl PitchShifter for PsolaShifter {
    fn name(&self) -> &str {
        "td-psola"
    }

    fn shift_pitch(&self, samples: &[f32], sample_rate: u32, hz_delta: f32) -> Result<Vec<f32>> {
        let pcm = AudioBuffer::mono(samples.to_vec(), sample_rate)?;
        let output = PsolaShifter::shift_pitch(self, &pcm, hz_delta, None)?;
        Ok(output.into_channels().into_iter().next().unwrap_or_default())
    }
}

/// Adapts a closure to [PitchShifter], for engines implemented outside this
/// crate. Failures are reported as [Error::Engine] under the adapter's name.
pub struct ExternalShifter<F> {
    name: String,
    shift: F,
}

impl<F> ExternalShifter<F>
where
    F: Fn(&[f32], u32, f32) -> std::result::Result<Vec<f32>, String> + Send + Sync,
{
    pub fn new(name: impl Into<String>, shift: F) -> Self {
        ExternalShifter {
            name: name.into(),
            shift,
        }
    }
}

impl<F> PitchShifter for ExternalShifter<F>
where
    F: Fn(&[f32], u32, f32) -> std::result::Result<Vec<f32>, String> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn shift_pitch(&self, samples: &[f32], sample_rate: u32, hz_delta: f32) -> Result<Vec<f32>> {
        (self.shift)(samples, sample_rate, hz_delta).map_err(|message| Error::Engine {
            engine: self.name.clone(),
            message,
        })
    }
}

/// Run every engine on the same input in parallel. Results come back in the
/// order of `engines`, each paired with the engine's name.
pub fn compare_engines(
    engines: &[Box<dyn PitchShifter>],
    samples: &[f32],
    sample_rate: u32,
    hz_delta: f32,
) -> Vec<(String, Result<Vec<f32>>)> {
    debug!(engines = engines.len(), hz_delta, "comparing engines");
    engines
        .par_iter()
        .map(|engine| {
            let result = engine.shift_pitch(samples, sample_rate, hz_delta);
            (engine.name().to_string(), result)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sin_wave(freq: f32, size: usize, sample_rate: u32) -> Vec<f32> {
        let dx = 2.0 * std::f32::consts::PI * freq / sample_rate as f32;
        (0..size).map(|i| 0.5 * (i as f32 * dx).sin()).collect()
    }

    #[test]
    fn psola_through_trait_object() {
        let engine: Box<dyn PitchShifter> = Box::new(PsolaShifter::default());
        let signal = sin_wave(200.0, 4000, 16000);
        let output = engine.shift_pitch(&signal, 16000, 25.0).unwrap();
        assert_eq!(engine.name(), "td-psola");
        assert!(output.len() >= signal.len());
    }

    #[test]
    fn external_engine_errors_carry_its_name() {
        let engine = ExternalShifter::new("broken", |_: &[f32], _: u32, _: f32| {
            Err("not implemented".to_string())
        });
        match engine.shift_pitch(&[0.0; 16], 16000, 10.0) {
            Err(Error::Engine { engine, message }) => {
                assert_eq!(engine, "broken");
                assert_eq!(message, "not implemented");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn comparison_keeps_engine_order() {
        let engines: Vec<Box<dyn PitchShifter>> = vec![
            Box::new(ExternalShifter::new("copy", |s: &[f32], _: u32, _: f32| {
                Ok(s.to_vec())
            })),
            Box::new(PsolaShifter::default()),
            Box::new(ExternalShifter::new("fail", |_: &[f32], _: u32, _: f32| {
                Err("nope".to_string())
            })),
        ];
        let signal = sin_wave(200.0, 4000, 16000);
        let results = compare_engines(&engines, &signal, 16000, 30.0);

        let names: Vec<&str> = results.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["copy", "td-psola", "fail"]);
        assert_eq!(results[0].1.as_ref().unwrap(), &signal);
        assert!(results[1].1.is_ok());
        assert!(results[2].1.is_err());
    }
}
