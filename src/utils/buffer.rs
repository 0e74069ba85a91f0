use rustfft::num_complex::Complex;
use rustfft::num_traits::Zero;

use crate::float::Float;

pub enum ComplexComponent {
    Re,
    Im,
}

pub fn new_real_buffer<T: Float>(size: usize) -> Vec<T> {
    vec![T::zero(); size]
}

pub fn copy_real_to_complex<T: Float>(
    input: &[T],
    output: &mut [Complex<T>],
    component: ComplexComponent,
) {
    assert!(input.len() <= output.len());
    match component {
        ComplexComponent::Re => input.iter().zip(output.iter_mut()).for_each(|(i, o)| {
            o.re = *i;
            o.im = T::zero();
        }),
        ComplexComponent::Im => input.iter().zip(output.iter_mut()).for_each(|(i, o)| {
            o.im = *i;
            o.re = T::zero();
        }),
    }
    output[input.len()..]
        .iter_mut()
        .for_each(|o| *o = Complex::zero())
}

/// Copy one component of `input` into `output`. Only `output.len()` values are
/// copied when `input` is longer (the tail of a zero-padded transform is discarded).
pub fn copy_complex_to_real<T: Float>(
    input: &[Complex<T>],
    output: &mut [T],
    component: ComplexComponent,
) {
    let n = input.len().min(output.len());
    match component {
        ComplexComponent::Re => input[..n]
            .iter()
            .map(|c| c.re)
            .zip(output.iter_mut())
            .for_each(|(i, o)| *o = i),
        ComplexComponent::Im => input[..n]
            .iter()
            .map(|c| c.im)
            .zip(output.iter_mut())
            .for_each(|(i, o)| *o = i),
    }

    output[n..].iter_mut().for_each(|o| *o = T::zero());
}

/// Computes |x|^2 for each complex value x in `arr`. This function
/// modifies `arr` in place and leaves the complex component zero.
pub fn modulus_squared<T: Float>(arr: &mut [Complex<T>]) {
    for s in arr.iter_mut() {
        s.re = s.re * s.re + s.im * s.im;
        s.im = T::zero();
    }
}

/// Compute the sum of the square of each element of `arr`.
pub fn square_sum<T: Float>(arr: &[T]) -> T {
    arr.iter().map(|&s| s * s).sum::<T>()
}

/// Mean of the squared samples, `0` for an empty slice.
pub fn mean_square(arr: &[f32]) -> f32 {
    if arr.is_empty() {
        return 0.0;
    }
    square_sum(arr) / arr.len() as f32
}

/// Running sum of squares: `result[i]` holds the energy of `arr[..i]`, so the
/// returned vector has one more element than `arr`.
pub fn cumulative_energy<T: Float>(arr: &[T]) -> Vec<T> {
    let mut result = Vec::with_capacity(arr.len() + 1);
    let mut acc = T::zero();
    result.push(acc);
    for &s in arr {
        acc = acc + s * s;
        result.push(acc);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copy_round_trip_zero_fills_tail() {
        let input = [1.0f32, 2.0, 3.0];
        let mut complex = vec![Complex::<f32>::zero(); 5];
        copy_real_to_complex(&input, &mut complex, ComplexComponent::Re);
        assert_eq!(complex[2].re, 3.0);
        assert_eq!(complex[4], Complex::zero());

        let mut output = vec![9.0f32; 4];
        copy_complex_to_real(&complex[..2], &mut output, ComplexComponent::Re);
        assert_eq!(output, vec![1.0, 2.0, 0.0, 0.0]);
    }

    #[test]
    fn cumulative_energy_matches_square_sum() {
        let signal = [0.5f64, -1.0, 2.0, 0.0];
        let energy = cumulative_energy(&signal);
        assert_eq!(energy.len(), signal.len() + 1);
        assert_eq!(energy[0], 0.0);
        assert_eq!(energy[4], square_sum(&signal));
        assert_eq!(energy[2] - energy[1], 1.0);
    }

    #[test]
    fn mean_square_of_empty_is_zero() {
        assert_eq!(mean_square(&[]), 0.0);
        assert_eq!(mean_square(&[1.0, -1.0]), 1.0);
    }
}
