use criterion::{black_box, criterion_group, criterion_main, Criterion};
use voice_psola::{
    detector::autocorrelation::AutocorrelationDetector,
    psola::marks::find_pitch_marks,
    utils::peak::{choose_peak, local_maxima},
    AudioBuffer, MarkerConfig, PsolaShifter,
};

const SAMPLE_RATE: u32 = 48000;

fn voice_like(size: usize) -> Vec<f32> {
    // Signal coming from some source (microphone, decoded file, etc...)
    let dt = 1.0 / SAMPLE_RATE as f32;
    let freq = 200.0;
    (0..size)
        .map(|x| {
            let t = x as f32 * dt;
            let phase = 2.0 * std::f32::consts::PI * freq * t;
            0.4 * phase.sin() + 0.2 * (2.0 * phase).sin() + 0.1 * (3.0 * phase).sin()
        })
        .collect()
}

pub fn utils_benchmark(c: &mut Criterion) {
    let v = (0..1024)
        .map(|v| ((v as f32) / std::f32::consts::PI / 30.).sin())
        .collect::<Vec<f32>>();
    let vv = v.as_slice();

    c.bench_function("choose_peak", |b| {
        b.iter(|| choose_peak(local_maxima(black_box(vv), 1..vv.len()), 0.3, 0.7))
    });
}

pub fn pitch_benchmark(c: &mut Criterion) {
    let signal = voice_like(SAMPLE_RATE as usize);
    let mut detector = AutocorrelationDetector::default();

    c.bench_function("Autocorrelation get_pitch", |b| {
        b.iter(|| detector.get_pitch(black_box(&signal), SAMPLE_RATE).unwrap())
    });

    c.bench_function("find_pitch_marks", |b| {
        b.iter(|| {
            find_pitch_marks(
                black_box(&signal),
                SAMPLE_RATE,
                200.0,
                &MarkerConfig::default(),
            )
            .unwrap()
        })
    });
}

pub fn shift_benchmark(c: &mut Criterion) {
    let pcm = AudioBuffer::mono(voice_like(SAMPLE_RATE as usize), SAMPLE_RATE).unwrap();
    let shifter = PsolaShifter::default();

    c.bench_function("shift_pitch 1s +50 Hz", |b| {
        b.iter(|| shifter.shift_pitch(black_box(&pcm), 50.0, None).unwrap())
    });
}

criterion_group!(benches, utils_benchmark, pitch_benchmark, shift_benchmark);
criterion_main!(benches);
