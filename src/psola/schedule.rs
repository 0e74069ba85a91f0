use crate::psola::marks::PitchMark;

/// Output timeline position for every mark. Intervals between two voiced marks
/// are divided by `pitch_ratio`; any interval touching an unvoiced mark keeps
/// its original length, since aperiodic segments carry no pitch.
pub fn synthesis_positions(marks: &[PitchMark], pitch_ratio: f64) -> Vec<f64> {
    let mut positions = Vec::with_capacity(marks.len());
    let first = match marks.first() {
        Some(mark) => mark.position,
        None => return positions,
    };
    positions.push(first);

    let mut current = first;
    for pair in marks.windows(2) {
        let interval = pair[1].position - pair[0].position;
        current += if pair[0].is_voiced && pair[1].is_voiced {
            interval / pitch_ratio
        } else {
            interval
        };
        positions.push(current);
    }
    positions
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mark(position: f64, is_voiced: bool) -> PitchMark {
        PitchMark {
            position,
            period: 100.0,
            is_voiced,
            energy: 0.1,
            confidence: 0.5,
        }
    }

    #[test]
    fn voiced_intervals_are_scaled() {
        let marks = vec![mark(50.0, true), mark(150.0, true), mark(250.0, true)];
        assert_eq!(synthesis_positions(&marks, 1.25), vec![50.0, 130.0, 210.0]);
        assert_eq!(synthesis_positions(&marks, 1.0), vec![50.0, 150.0, 250.0]);
    }

    #[test]
    fn unvoiced_intervals_are_copied() {
        let marks = vec![
            mark(0.0, false),
            mark(70.0, false),
            mark(140.0, true),
            mark(240.0, true),
            mark(300.0, false),
        ];
        let positions = synthesis_positions(&marks, 2.0);
        assert_eq!(positions, vec![0.0, 70.0, 140.0, 190.0, 250.0]);
        assert_eq!(positions.len(), marks.len());
    }

    #[test]
    fn positions_never_decrease() {
        let marks: Vec<PitchMark> = (0..50)
            .map(|i| mark(i as f64 * 37.5, i % 4 != 0))
            .collect();
        for ratio in [0.5, 0.8, 1.0, 1.5, 3.0] {
            let positions = synthesis_positions(&marks, ratio);
            assert_eq!(positions[0], marks[0].position);
            assert!(positions.windows(2).all(|w| w[1] >= w[0]));
        }
    }

    #[test]
    fn empty_marks_give_empty_schedule() {
        assert!(synthesis_positions(&[], 1.5).is_empty());
    }
}
