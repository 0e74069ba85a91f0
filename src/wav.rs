//! RIFF/WAVE encoding and decoding of in-memory clips.
//!
//! Output is always 16-bit integer PCM. Input may be 8, 16, 24 or 32-bit
//! integer PCM or 32-bit float.

use std::io::Cursor;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use tracing::debug;

use crate::audio::AudioBuffer;
use crate::error::{Error, Result};

/// Encode `pcm` as a 16-bit PCM WAV file, channels interleaved.
pub fn encode_wav(pcm: &AudioBuffer) -> Result<Vec<u8>> {
    encode_wav_samples(&pcm.interleaved(), pcm.sample_rate(), pcm.num_channels() as u16)
}

/// Encode interleaved `samples` as a 16-bit PCM WAV file. Samples are clamped
/// to `[-1, 1]` first.
pub fn encode_wav_samples(samples: &[f32], sample_rate: u32, channels: u16) -> Result<Vec<u8>> {
    if sample_rate == 0 || channels == 0 {
        return Err(Error::InvalidParameter(format!(
            "cannot encode {} channels at {} Hz",
            channels, sample_rate
        )));
    }

    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut bytes = Vec::new();
    let mut writer = WavWriter::new(Cursor::new(&mut bytes), spec).map_err(Error::Encode)?;
    for &sample in samples {
        writer
            .write_sample(to_i16(sample))
            .map_err(Error::Encode)?;
    }
    writer.finalize().map_err(Error::Encode)?;

    debug!(samples = samples.len(), bytes = bytes.len(), "encoded WAV");
    Ok(bytes)
}

/// Decode a WAV file into a planar buffer with samples in `[-1, 1]`.
pub fn decode_wav(bytes: &[u8]) -> Result<AudioBuffer> {
    let reader = WavReader::new(Cursor::new(bytes)).map_err(Error::Decode)?;
    let spec = reader.spec();

    let samples: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<_, _>>()
            .map_err(Error::Decode)?,
        SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<std::result::Result<_, _>>()
                .map_err(Error::Decode)?
        }
    };
    debug!(
        channels = spec.channels,
        sample_rate = spec.sample_rate,
        bits = spec.bits_per_sample,
        samples = samples.len(),
        "decoded WAV"
    );

    AudioBuffer::from_interleaved(&samples, spec.channels, spec.sample_rate)
}

fn to_i16(sample: f32) -> i16 {
    let s = sample.clamp(-1.0, 1.0);
    if s < 0.0 {
        (s * 32768.0) as i16
    } else {
        (s * 32767.0) as i16
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u16_at(bytes: &[u8], offset: usize) -> u16 {
        u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
    }

    fn u32_at(bytes: &[u8], offset: usize) -> u32 {
        u32::from_le_bytes([
            bytes[offset],
            bytes[offset + 1],
            bytes[offset + 2],
            bytes[offset + 3],
        ])
    }

    #[test]
    fn header_layout() {
        let pcm = AudioBuffer::mono(vec![0.0; 100], 48000).unwrap().duplicated(2);
        let bytes = encode_wav(&pcm).unwrap();

        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(u32_at(&bytes, 4) as usize, bytes.len() - 8);
        assert_eq!(&bytes[8..12], b"WAVE");
        assert_eq!(&bytes[12..16], b"fmt ");
        assert_eq!(u32_at(&bytes, 16), 16);
        assert_eq!(u16_at(&bytes, 20), 1);
        assert_eq!(u16_at(&bytes, 22), 2);
        assert_eq!(u32_at(&bytes, 24), 48000);
        assert_eq!(u32_at(&bytes, 28), 48000 * 4);
        assert_eq!(u16_at(&bytes, 32), 4);
        assert_eq!(u16_at(&bytes, 34), 16);
        assert_eq!(&bytes[36..40], b"data");
        assert_eq!(u32_at(&bytes, 40), 400);
        assert_eq!(bytes.len(), 44 + 400);
    }

    #[test]
    fn samples_are_clamped_and_scaled() {
        assert_eq!(to_i16(1.0), 32767);
        assert_eq!(to_i16(-1.0), -32768);
        assert_eq!(to_i16(2.5), 32767);
        assert_eq!(to_i16(-7.0), -32768);
        assert_eq!(to_i16(0.5), 16383);
        assert_eq!(to_i16(-0.5), -16384);
        assert_eq!(to_i16(0.0), 0);
    }

    #[test]
    fn round_trip_16_bit() {
        let samples: Vec<f32> = (0..256).map(|i| (i as f32 * 0.1).sin() * 0.8).collect();
        let pcm = AudioBuffer::mono(samples.clone(), 22050).unwrap();
        let decoded = decode_wav(&encode_wav(&pcm).unwrap()).unwrap();

        assert_eq!(decoded.sample_rate(), 22050);
        assert_eq!(decoded.num_channels(), 1);
        for (a, b) in samples.iter().zip(decoded.primary()) {
            assert!((a - b).abs() <= 1.0 / 16384.0);
        }
    }

    #[test]
    fn decodes_24_bit_and_float() {
        for (bits, format) in [(24, SampleFormat::Int), (32, SampleFormat::Float)] {
            let spec = WavSpec {
                channels: 2,
                sample_rate: 44100,
                bits_per_sample: bits,
                sample_format: format,
            };
            let mut bytes = Vec::new();
            let mut writer = WavWriter::new(Cursor::new(&mut bytes), spec).unwrap();
            for _ in 0..10 {
                match format {
                    SampleFormat::Int => {
                        writer.write_sample(1i32 << 22).unwrap();
                        writer.write_sample(-(1i32 << 22)).unwrap();
                    }
                    SampleFormat::Float => {
                        writer.write_sample(0.5f32).unwrap();
                        writer.write_sample(-0.5f32).unwrap();
                    }
                }
            }
            writer.finalize().unwrap();

            let decoded = decode_wav(&bytes).unwrap();
            assert_eq!(decoded.num_channels(), 2);
            assert_eq!(decoded.len(), 10);
            assert_eq!(decoded.channel(0).unwrap()[0], 0.5);
            assert_eq!(decoded.channel(1).unwrap()[0], -0.5);
        }
    }

    #[test]
    fn garbage_is_a_decode_error() {
        assert!(matches!(
            decode_wav(b"definitely not a wav file"),
            Err(Error::Decode(_))
        ));
    }

    #[test]
    fn invalid_layout_is_rejected() {
        assert!(matches!(
            encode_wav_samples(&[0.0], 0, 1),
            Err(Error::InvalidParameter(_))
        ));
    }
}
