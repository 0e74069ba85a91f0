//! Analysis windows for overlap-add resynthesis.
use std::collections::HashMap;
use std::f32::consts::PI;

/// Symmetric Hann window of `size` samples. Both endpoints are zero.
pub fn hann_window(size: usize) -> Vec<f32> {
    if size < 2 {
        return vec![1.0; size];
    }
    let denom = (size - 1) as f32;
    (0..size)
        .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f32 / denom).cos()))
        .collect()
}

/// Symmetric triangular window of `size` samples peaking at the center.
pub fn triangular_window(size: usize) -> Vec<f32> {
    if size < 2 {
        return vec![1.0; size];
    }
    let denom = (size - 1) as f32;
    (0..size)
        .map(|i| 1.0 - (2.0 * i as f32 / denom - 1.0).abs())
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowKey {
    pub len: usize,
    pub voiced: bool,
}

/// Windows computed during one synthesis run, keyed by frame length and
/// voicing. Voiced frames get a Hann window, unvoiced frames a triangle.
#[derive(Debug, Default)]
pub struct WindowCache {
    windows: HashMap<WindowKey, Vec<f32>>,
}

impl WindowCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&mut self, len: usize, voiced: bool) -> &[f32] {
        self.windows
            .entry(WindowKey { len, voiced })
            .or_insert_with(|| {
                if voiced {
                    hann_window(len)
                } else {
                    triangular_window(len)
                }
            })
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}
