//! Overlap-add resynthesis of analysis frames at new positions.
//!
//! Frames are windowed and summed into an output buffer alongside the sum of
//! the windows themselves (the window mass). Dividing by the mass undoes the
//! uneven overlap of frames spaced at a new period. The result is then matched
//! to the loudness of the input frames, faded at both ends, and soft-limited.

use tracing::{debug, warn};

use crate::config::SynthesisConfig;
use crate::psola::frames::AnalysisFrame;
use crate::utils::filters::{fade_length, raised_cosine_fade, soft_limit};
use crate::utils::window::WindowCache;

/// Overlap-add `frames`, placing each frame's mark at
/// `positions[frame.mark_index]`. The output is never shorter than `input_len`.
///
/// `positions` must hold one entry per pitch mark the frames were cut from.
/// A schedule too short for some frame yields silence.
pub fn overlap_add(
    frames: &[AnalysisFrame],
    positions: &[f64],
    input_len: usize,
    sample_rate: u32,
    config: &SynthesisConfig,
) -> Vec<f32> {
    if frames.is_empty() {
        warn!("no analysis frames to synthesize, returning silence");
        return vec![0.0; input_len];
    }
    if let Some(frame) = frames.iter().find(|f| f.mark_index >= positions.len()) {
        warn!(
            mark = frame.mark_index,
            positions = positions.len(),
            "schedule does not cover every frame, returning silence"
        );
        return vec![0.0; input_len];
    }

    let margin = (config.min_frame_secs * sample_rate as f64).ceil() as usize + 2;
    let reach = frames
        .iter()
        .map(|f| positions[f.mark_index] + f.len() as f64 / 2.0)
        .fold(0.0, f64::max);
    let len = (reach.ceil() as usize + margin).max(input_len);

    let mut output = vec![0.0f32; len];
    let mut mass = vec![0.0f32; len];
    let mut windows = WindowCache::new();

    for frame in frames {
        let window = windows.get(frame.len(), frame.is_voiced);
        // Split each sample between the two output samples around its
        // fractional position.
        let origin = positions[frame.mark_index] - frame.center_offset();
        let base = origin.floor();
        let frac = (origin - base) as f32;
        let base = base as isize;

        for (j, (&sample, &w)) in frame.data.iter().zip(window.iter()).enumerate() {
            let i = base + j as isize;
            for (index, weight) in [(i, 1.0 - frac), (i + 1, frac)] {
                if index >= 0 && (index as usize) < len && weight > 0.0 {
                    output[index as usize] += weight * w * sample;
                    mass[index as usize] += weight * w;
                }
            }
        }
    }
    debug!(
        frames = frames.len(),
        windows = windows.len(),
        len,
        "overlap-added frames"
    );

    normalize_by_mass(&mut output, &mass, config);

    let original_energy = frames.iter().map(|f| f.energy).sum::<f32>() / frames.len() as f32;
    restore_energy(&mut output, &mass, original_energy, config);

    let fade = fade_length(len, config.fade_fraction, config.min_fade, config.max_fade);
    raised_cosine_fade(&mut output, fade);
    soft_limit(&mut output, config.limiter_knee);
    output
}

/// Divide by the window mass where it is large, fade toward silence where it is
/// small, and silence samples with (almost) no window coverage.
fn normalize_by_mass(output: &mut [f32], mass: &[f32], config: &SynthesisConfig) {
    let threshold = config.mass_threshold;
    let floor = config.mass_floor;
    for (sample, &m) in output.iter_mut().zip(mass) {
        if m > threshold {
            *sample /= m;
        } else if m > floor {
            let taper = (m - floor) / (threshold - floor);
            *sample = *sample / m * taper;
        } else {
            *sample = 0.0;
        }
    }
}

/// Scale the output up when it is noticeably quieter than the input frames.
/// Returns the gain applied.
fn restore_energy(
    output: &mut [f32],
    mass: &[f32],
    original_energy: f32,
    config: &SynthesisConfig,
) -> f32 {
    let (sum, count) = output
        .iter()
        .zip(mass)
        .filter(|pair| *pair.1 > config.mass_threshold)
        .fold((0.0f32, 0usize), |(sum, count), (&s, _)| (sum + s * s, count + 1));
    if count == 0 {
        return 1.0;
    }
    let synthesized_energy = sum / count as f32;
    if synthesized_energy <= 0.0 {
        return 1.0;
    }

    let ratio = original_energy / synthesized_energy;
    if ratio <= config.energy_ratio_limit {
        return 1.0;
    }
    let gain = ratio.sqrt() * config.energy_restore_factor;
    debug!(ratio, gain, "restoring output energy");
    output.iter_mut().for_each(|s| *s *= gain);
    gain
}
