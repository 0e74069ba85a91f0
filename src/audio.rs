//! In-memory PCM clips.

use crate::error::{Error, Result};

/// A planar PCM clip. Samples are nominally in `[-1, 1]`; every channel has the
/// same length. Processing stages read from a buffer and return a new one.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    channels: Vec<Vec<f32>>,
    sample_rate: u32,
}

impl AudioBuffer {
    /// Create a buffer from planar channel data.
    pub fn new(channels: Vec<Vec<f32>>, sample_rate: u32) -> Result<Self> {
        if sample_rate == 0 {
            return Err(Error::InvalidParameter("sample rate must be positive".into()));
        }
        if channels.is_empty() {
            return Err(Error::InvalidParameter("at least one channel is required".into()));
        }
        let len = channels[0].len();
        if channels.iter().any(|c| c.len() != len) {
            return Err(Error::InvalidParameter(
                "all channels must have the same length".into(),
            ));
        }
        Ok(Self {
            channels,
            sample_rate,
        })
    }

    /// Create a single-channel buffer.
    pub fn mono(samples: Vec<f32>, sample_rate: u32) -> Result<Self> {
        Self::new(vec![samples], sample_rate)
    }

    /// Split interleaved frames into channels. The sample count must be a
    /// whole number of frames.
    pub fn from_interleaved(samples: &[f32], channels: u16, sample_rate: u32) -> Result<Self> {
        let n = channels as usize;
        if n == 0 {
            return Err(Error::InvalidParameter("at least one channel is required".into()));
        }
        if samples.len() % n != 0 {
            return Err(Error::InvalidParameter(format!(
                "{} interleaved samples do not fill whole frames of {} channels",
                samples.len(),
                n
            )));
        }
        let frames = samples.len() / n;
        let planar = (0..n)
            .map(|c| (0..frames).map(|f| samples[f * n + c]).collect())
            .collect();
        Self::new(planar, sample_rate)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    /// Number of samples per channel.
    pub fn len(&self) -> usize {
        self.channels[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn duration_secs(&self) -> f64 {
        self.len() as f64 / self.sample_rate as f64
    }

    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.channels.get(index).map(|c| c.as_slice())
    }

    /// The channel the pitch engine analyzes.
    pub fn primary(&self) -> &[f32] {
        &self.channels[0]
    }

    pub fn rms(&self) -> f32 {
        crate::utils::buffer::mean_square(self.primary()).sqrt()
    }

    /// Copy the primary channel into `channels` identical channels.
    pub fn duplicated(&self, channels: usize) -> Self {
        Self {
            channels: vec![self.channels[0].clone(); channels.max(1)],
            sample_rate: self.sample_rate,
        }
    }

    /// Frames with one sample per channel, channel 0 first.
    pub fn interleaved(&self) -> Vec<f32> {
        let n = self.channels.len();
        let mut out = Vec::with_capacity(self.len() * n);
        for i in 0..self.len() {
            out.extend(self.channels.iter().map(|c| c[i]));
        }
        out
    }

    pub fn into_channels(self) -> Vec<Vec<f32>> {
        self.channels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_mismatched_channels() {
        let result = AudioBuffer::new(vec![vec![0.0; 4], vec![0.0; 3]], 44100);
        assert!(matches!(result, Err(Error::InvalidParameter(_))));
        assert!(AudioBuffer::mono(vec![0.0], 0).is_err());
        assert!(AudioBuffer::new(vec![], 44100).is_err());
    }

    #[test]
    fn interleave_round_trip() {
        let buffer = AudioBuffer::new(vec![vec![1.0, 2.0], vec![-1.0, -2.0]], 8000).unwrap();
        let frames = buffer.interleaved();
        assert_eq!(frames, vec![1.0, -1.0, 2.0, -2.0]);
        let back = AudioBuffer::from_interleaved(&frames, 2, 8000).unwrap();
        assert_eq!(back, buffer);
    }

    #[test]
    fn partial_interleaved_frame_is_rejected() {
        let result = AudioBuffer::from_interleaved(&[0.1, 0.2, 0.3], 2, 8000);
        assert!(matches!(result, Err(Error::InvalidParameter(_))));
        assert!(AudioBuffer::from_interleaved(&[], 2, 8000).is_ok());
    }

    #[test]
    fn duplicate_copies_primary_channel() {
        let buffer = AudioBuffer::mono(vec![0.25, 0.5], 16000).unwrap();
        let stereo = buffer.duplicated(2);
        assert_eq!(stereo.num_channels(), 2);
        assert_eq!(stereo.channel(1), Some(&[0.25, 0.5][..]));
        assert_eq!(stereo.duration_secs(), 2.0 / 16000.0);
    }
}
