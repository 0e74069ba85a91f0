//! Analysis frame extraction around pitch marks.

use tracing::debug;

use crate::config::SynthesisConfig;
use crate::psola::marks::PitchMark;
use crate::utils::buffer::mean_square;

/// A slice of the input centered on one pitch mark.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisFrame {
    /// Index of the mark this frame was cut around.
    pub mark_index: usize,
    /// Mark position in input samples.
    pub center: f64,
    /// Input index of `data[0]`. Negative when the frame starts before the clip.
    pub start: isize,
    pub data: Vec<f32>,
    pub is_voiced: bool,
    pub period: f64,
    /// Mean energy of `data`.
    pub energy: f32,
    pub confidence: f32,
}

impl AnalysisFrame {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Distance from `data[0]` to the mark, in samples.
    pub fn center_offset(&self) -> f64 {
        self.center - self.start as f64
    }
}

/// Period around mark `index`: the mean of its intervals to both neighbors,
/// the single neighboring interval at either end, or the mark's own period
/// when it has no neighbors. Clamped to the 50-500 Hz range.
pub fn local_period(marks: &[PitchMark], index: usize, sample_rate: u32) -> f64 {
    let before = index
        .checked_sub(1)
        .map(|prev| marks[index].position - marks[prev].position);
    let after = marks
        .get(index + 1)
        .map(|next| next.position - marks[index].position);
    let period = match (before, after) {
        (Some(b), Some(a)) => (a + b) / 2.0,
        (Some(interval), None) | (None, Some(interval)) => interval,
        (None, None) => marks[index].period,
    };
    let sample_rate = sample_rate as f64;
    period.clamp(sample_rate / 500.0, sample_rate / 50.0)
}

/// Frame length for a mark: a multiple of the local period, bounded in time,
/// rounded to an even number of samples.
pub fn frame_length(period: f64, is_voiced: bool, sample_rate: u32, config: &SynthesisConfig) -> usize {
    let periods = if is_voiced {
        config.voiced_frame_periods
    } else {
        config.unvoiced_frame_periods
    };
    let sample_rate = sample_rate as f64;
    let len = (periods * period).clamp(
        config.min_frame_secs * sample_rate,
        config.max_frame_secs * sample_rate,
    );
    (((len / 2.0).round() as usize) * 2).max(2)
}

/// Cut one frame per mark. Frames overrunning either end of `signal` by more
/// than half their length are dropped; smaller overruns read as silence.
pub fn extract_frames(
    signal: &[f32],
    marks: &[PitchMark],
    sample_rate: u32,
    config: &SynthesisConfig,
) -> Vec<AnalysisFrame> {
    let total = signal.len() as isize;
    let mut frames = Vec::with_capacity(marks.len());

    for (index, mark) in marks.iter().enumerate() {
        let period = local_period(marks, index, sample_rate);
        let len = frame_length(period, mark.is_voiced, sample_rate, config);
        let start = mark.position.round() as isize - (len / 2) as isize;
        let end = start + len as isize;

        let overrun = (-start).max(0).max(end - total);
        if overrun as usize * 2 > len {
            debug!(
                mark = index,
                position = mark.position,
                len,
                "dropping frame that overruns the clip edge"
            );
            continue;
        }

        let data: Vec<f32> = (start..end)
            .map(|i| {
                if i >= 0 && i < total {
                    signal[i as usize]
                } else {
                    0.0
                }
            })
            .collect();

        frames.push(AnalysisFrame {
            mark_index: index,
            center: mark.position,
            start,
            energy: mean_square(&data),
            data,
            is_voiced: mark.is_voiced,
            period,
            confidence: mark.confidence,
        });
    }
    frames
}
