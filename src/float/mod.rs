//! Generic [Float] type which acts as a stand-in for `f32` or `f64`.
use rustfft::num_traits::float::FloatCore as NumFloatCore;
use rustfft::FftNum;
use std::fmt::{Debug, Display};
use std::iter::Sum;

/// Correlation buffers are processed as arrays of [Float]s. A [Float] is normally `f32` or `f64`.
pub trait Float: Display + Debug + NumFloatCore + FftNum + Sum {
    /// Convert a buffer length or index into this float type.
    fn from_len(n: usize) -> Self;

    fn sqrt(self) -> Self;
}

impl Float for f64 {
    fn from_len(n: usize) -> Self {
        n as f64
    }

    fn sqrt(self) -> Self {
        f64::sqrt(self)
    }
}

impl Float for f32 {
    fn from_len(n: usize) -> Self {
        n as f32
    }

    fn sqrt(self) -> Self {
        f32::sqrt(self)
    }
}
