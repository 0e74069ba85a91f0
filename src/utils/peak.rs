use std::ops::Range;

use crate::float::Float;

pub enum PeakCorrection {
    Quadratic,
    None,
}

struct Point<T: Float> {
    x: T,
    y: T,
}

/// Local maxima of `arr` whose index lies in `range`. A local maximum rises
/// strictly from its left neighbor and does not fall below its right one. The
/// range is clipped so every reported index has both neighbors.
pub fn local_maxima<T: Float>(
    arr: &[T],
    range: Range<usize>,
) -> impl Iterator<Item = (usize, T)> + '_ {
    let start = range.start.max(1);
    let end = range.end.min(arr.len().saturating_sub(1));
    (start..end)
        .filter(move |&i| arr[i] > arr[i - 1] && arr[i] >= arr[i + 1])
        .map(move |i| (i, arr[i]))
}

/// Scan `peaks` in order and keep the best one above `threshold`, stopping at
/// the first peak above `strong_threshold`. Favoring the earliest strong
/// periodicity keeps octave-down errors out of the estimate.
pub fn choose_peak<I: Iterator<Item = (usize, T)>, T: Float>(
    peaks: I,
    threshold: T,
    strong_threshold: T,
) -> Option<(usize, T)> {
    let mut best: Option<(usize, T)> = None;
    for peak in peaks {
        if peak.1 <= threshold {
            continue;
        }
        if best.map_or(true, |b| peak.1 > b.1) {
            best = Some(peak);
        }
        if peak.1 > strong_threshold {
            break;
        }
    }
    best
}

/// The first of `peaks` reaching `ratio` times the largest peak value.
pub fn choose_dominant_peak<I: Iterator<Item = (usize, T)>, T: Float>(
    peaks: I,
    ratio: T,
) -> Option<(usize, T)> {
    let peaks: Vec<(usize, T)> = peaks.collect();
    let max = peaks
        .iter()
        .map(|p| p.1)
        .fold(T::neg_infinity(), |a, b| if b > a { b } else { a });
    peaks.into_iter().find(|p| p.1 >= ratio * max)
}

pub fn correct_peak<T: Float>(peak: (usize, T), data: &[T], correction: PeakCorrection) -> (T, T) {
    match correction {
        PeakCorrection::Quadratic if peak.0 >= 1 && peak.0 + 1 < data.len() => {
            let idx = peak.0;
            let point = quadratic_interpolation(
                Point {
                    x: T::from_len(idx - 1),
                    y: data[idx - 1],
                },
                Point {
                    x: T::from_len(idx),
                    y: data[idx],
                },
                Point {
                    x: T::from_len(idx + 1),
                    y: data[idx + 1],
                },
            );
            (point.x, point.y)
        }
        _ => (T::from_len(peak.0), peak.1),
    }
}

fn quadratic_interpolation<T: Float>(
    left: Point<T>,
    center: Point<T>,
    right: Point<T>,
) -> Point<T> {
    let two = T::one() + T::one();
    let half = T::one() / two;
    let quarter = half * half;
    let curvature = two * center.y - left.y - right.y;
    if curvature == T::zero() {
        return center;
    }
    let shift = half * (right.y - left.y) / curvature;
    let x = center.x + shift;
    let y = center.y + quarter * (right.y - left.y) * shift;
    Point { x, y }
}
