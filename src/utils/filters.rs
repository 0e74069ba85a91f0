use std::f32::consts::PI;

/// Apply a raised-cosine fade-in over the first `len` samples of `signal` and a
/// matching fade-out over the last `len`. `len` is capped at half the signal.
pub fn raised_cosine_fade(signal: &mut [f32], len: usize) {
    let len = len.min(signal.len() / 2);
    if len == 0 {
        return;
    }
    let total = signal.len();
    for i in 0..len {
        let gain = 0.5 * (1.0 - (PI * i as f32 / len as f32).cos());
        signal[i] *= gain;
        signal[total - 1 - i] *= gain;
    }
}

/// Fade length covering `fraction` of `total` samples, bounded to `[min, max]`.
pub fn fade_length(total: usize, fraction: f32, min: usize, max: usize) -> usize {
    let len = (total as f32 * fraction).round() as usize;
    len.clamp(min, max.max(min))
}

/// Compress samples above `knee` along a tanh curve so the output never
/// exceeds `knee + (1 - knee)`.
pub fn soft_limit(signal: &mut [f32], knee: f32) {
    let headroom = 1.0 - knee;
    for s in signal.iter_mut() {
        let magnitude = s.abs();
        if magnitude > knee {
            *s = s.signum() * (knee + headroom * (5.0 * (magnitude - knee)).tanh());
        }
    }
}
