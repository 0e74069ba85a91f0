use std::sync::Arc;

use rustfft::num_complex::Complex;
use rustfft::num_traits::Zero;
use rustfft::{Fft, FftPlanner};

use crate::float::Float;
use crate::utils::buffer::{
    copy_complex_to_real, copy_real_to_complex, cumulative_energy, modulus_squared, square_sum,
    ComplexComponent,
};

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Pitch<T>
where
    T: Float,
{
    pub frequency: T,
    pub clarity: T,
}

/// FFT planner and scratch space shared by the correlation routines. Plans and
/// buffers are kept between calls, since the pitch marker runs one correlation
/// per scan position over windows of identical length.
pub struct DetectorInternals<T>
where
    T: Float,
{
    planner: FftPlanner<T>,
    signal_complex: Vec<Complex<T>>,
    truncated_complex: Vec<Complex<T>>,
    scratch: Vec<Complex<T>>,
}

impl<T> Default for DetectorInternals<T>
where
    T: Float,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> DetectorInternals<T>
where
    T: Float,
{
    pub fn new() -> Self {
        DetectorInternals {
            planner: FftPlanner::new(),
            signal_complex: Vec::new(),
            truncated_complex: Vec::new(),
            scratch: Vec::new(),
        }
    }

    fn plan(&mut self, fft_len: usize) -> (Arc<dyn Fft<T>>, Arc<dyn Fft<T>>) {
        let fft = self.planner.plan_fft_forward(fft_len);
        let inv_fft = self.planner.plan_fft_inverse(fft_len);
        let scratch_len = fft
            .get_inplace_scratch_len()
            .max(inv_fft.get_inplace_scratch_len());

        self.signal_complex.resize(fft_len, Complex::zero());
        self.truncated_complex.resize(fft_len, Complex::zero());
        self.scratch.resize(scratch_len, Complex::zero());
        (fft, inv_fft)
    }

    /// Compute the linear autocorrelation of `signal` into `result`,
    ///
    /// > r(t) = sum_{i=0}^{N-1-t} x_i*x_{i+t}
    ///
    /// for `t` in `0..result.len()`. The signal is zero-padded to avoid circular wrap.
    pub fn autocorrelation(&mut self, signal: &[T], result: &mut [T]) {
        assert!(
            result.len() <= signal.len(),
            "Autocorrelation is only defined for lags shorter than the signal"
        );
        let fft_len = (2 * signal.len()).next_power_of_two();
        let (fft, inv_fft) = self.plan(fft_len);
        let signal_complex = &mut self.signal_complex[..];
        let scratch = &mut self.scratch[..];

        copy_real_to_complex(signal, signal_complex, ComplexComponent::Re);
        fft.process_with_scratch(signal_complex, scratch);
        modulus_squared(signal_complex);
        inv_fft.process_with_scratch(signal_complex, scratch);
        copy_complex_to_real(signal_complex, result, ComplexComponent::Re);

        // rustfft leaves the forward/inverse pair scaled by the transform length.
        let normalization_const = T::one() / T::from_len(fft_len);
        result
            .iter_mut()
            .for_each(|r| *r = *r * normalization_const);
    }

    /// Autocorrelation normalized by the energy of the two overlapping parts,
    ///
    /// > n(t) = r(t) / sqrt(sum_{i<N-t} x_i^2 * sum_{i>=t} x_i^2)
    ///
    /// so a perfectly periodic signal scores `1` at its period regardless of lag.
    pub fn normalized_autocorrelation(&mut self, signal: &[T], result: &mut [T]) {
        self.autocorrelation(signal, result);

        let energy = cumulative_energy(signal);
        let n = signal.len();
        let total = energy[n];
        result.iter_mut().enumerate().for_each(|(lag, r)| {
            let head = energy[n - lag];
            let tail = total - energy[lag];
            let denom = (head * tail).sqrt();
            *r = if denom > T::zero() {
                *r / denom
            } else {
                T::zero()
            };
        });
    }

    /// Compute the windowed autocorrelation of `signal` and put the result in `result`.
    /// For a signal _x=(x_0,x_1,...)_, the windowed autocorrelation with window size _w_ is
    /// the function
    ///
    /// > r(t) = sum_{i=0}^{w-1} x_i*x_{i+t}
    ///
    /// This function assumes `window_size` is at most half of the length of `signal`.
    pub fn windowed_autocorrelation(&mut self, signal: &[T], window_size: usize, result: &mut [T]) {
        assert!(
            2 * window_size <= signal.len(),
            "The window size cannot be more than half the signal length"
        );
        assert!(result.len() <= window_size);

        let (fft, inv_fft) = self.plan(signal.len());
        let signal_complex = &mut self.signal_complex[..];
        let truncated_signal_complex = &mut self.truncated_complex[..];
        let scratch = &mut self.scratch[..];

        // To achieve the windowed autocorrelation, we compute the cross correlation between
        // the original signal and the signal truncated to lie in `0..window_size`
        copy_real_to_complex(signal, signal_complex, ComplexComponent::Re);
        copy_real_to_complex(
            &signal[..window_size],
            truncated_signal_complex,
            ComplexComponent::Re,
        );
        fft.process_with_scratch(signal_complex, scratch);
        fft.process_with_scratch(truncated_signal_complex, scratch);
        // rustfft doesn't normalize when it computes the fft, so we need to normalize ourselves by
        // dividing by `sqrt(signal.len())` each time we take an fft or inverse fft.
        // Since the fft is linear and we are doing fft -> inverse fft, we can just divide by
        // `signal.len()` once.
        let normalization_const = T::one() / T::from_len(signal.len());
        signal_complex
            .iter_mut()
            .zip(truncated_signal_complex.iter())
            .for_each(|(a, b)| {
                *a = *a * normalization_const * b.conj();
            });
        inv_fft.process_with_scratch(signal_complex, scratch);

        copy_complex_to_real(signal_complex, result, ComplexComponent::Re);
    }

    /// Windowed autocorrelation divided by the geometric mean of the power in
    /// `0..w` and `t..t+w`. The power of the shifted window is updated
    /// incrementally, as in the square error computation of YIN.
    pub fn normalized_windowed_autocorrelation(
        &mut self,
        signal: &[T],
        window_size: usize,
        result: &mut [T],
    ) {
        self.windowed_autocorrelation(signal, window_size, result);

        let power = square_sum(&signal[..window_size]);
        let mut windowed_power = power;
        result.iter_mut().enumerate().for_each(|(i, a)| {
            let denom = (power * windowed_power).sqrt();
            *a = if denom > T::zero() {
                *a / denom
            } else {
                T::zero()
            };
            windowed_power = windowed_power - signal[i] * signal[i]
                + signal[i + window_size] * signal[i + window_size];
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn windowed_autocorrelation_test() {
        let signal: Vec<f64> = vec![0., 1., 2., 0., -1., -2.];
        let window_size: usize = 3;

        let mut internals = DetectorInternals::new();

        let result: Vec<f64> = (0..window_size)
            .map(|i| {
                signal[..window_size]
                    .iter()
                    .zip(signal[i..(i + window_size)].iter())
                    .map(|(a, b)| *a * *b)
                    .sum()
            })
            .collect();

        let mut computed_result = vec![0.; window_size];
        internals.windowed_autocorrelation(&signal, window_size, &mut computed_result);
        // Using an FFT loses precision; we don't care that much, so round generously.
        computed_result
            .iter_mut()
            .for_each(|x| *x = (*x * 100.).round() / 100.);

        assert_eq!(result, computed_result);
    }

    #[test]
    fn autocorrelation_matches_direct_sum() {
        let signal: Vec<f64> = vec![0.5, -1., 2., 0.25, -0.75, 1.5, -2.];
        let mut internals = DetectorInternals::new();

        let mut computed = vec![0.; signal.len()];
        internals.autocorrelation(&signal, &mut computed);

        for lag in 0..signal.len() {
            let expected: f64 = signal[..signal.len() - lag]
                .iter()
                .zip(signal[lag..].iter())
                .map(|(a, b)| a * b)
                .sum();
            assert_abs_diff_eq!(computed[lag], expected, epsilon = 1e-9);
        }
    }

    #[test]
    fn normalized_autocorrelation_peaks_at_period() {
        let period = 20;
        let signal: Vec<f64> = (0..400)
            .map(|i| (2.0 * std::f64::consts::PI * i as f64 / period as f64).sin())
            .collect();
        let mut internals = DetectorInternals::new();
        let mut result = vec![0.; 100];
        internals.normalized_autocorrelation(&signal, &mut result);

        assert_abs_diff_eq!(result[0], 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(result[period], 1.0, epsilon = 1e-6);
        assert!(result[period / 2] < -0.9);
    }

    #[test]
    fn normalized_windowed_autocorrelation_is_bounded() {
        let signal: Vec<f32> = (0..240)
            .map(|i| (2.0 * std::f32::consts::PI * i as f32 / 40.0).sin() * (1.0 + i as f32 / 240.0))
            .collect();
        let mut internals = DetectorInternals::new();
        let mut result = vec![0.; 120];
        internals.normalized_windowed_autocorrelation(&signal, 120, &mut result);

        assert_abs_diff_eq!(result[0], 1.0, epsilon = 1e-4);
        assert!(result[40] > 0.99);
        assert!(result.iter().all(|r| *r <= 1.0 + 1e-4 && *r >= -1.0 - 1e-4));
    }
}
