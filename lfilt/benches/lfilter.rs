use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use lfilt::kernel::KernelLifecycle;
use lfilt::signal::filter::{lfilter, LFilter, LFilterConfig, LFilterKernel};
use lfilt::signal::traits::LFilter1D;
use ndarray::{Array1, Array2, ArrayView1, Axis};
use rand::rngs::ThreadRng;
use std::num::NonZeroUsize;

// butter(4, 0.1)
const BUTTER4_B: [f64; 5] = [
    4.165_992_044_065_786e-4,
    1.666_396_817_626_314_4e-3,
    2.499_595_226_439_471_6e-3,
    1.666_396_817_626_314_4e-3,
    4.165_992_044_065_786e-4,
];
const BUTTER4_A: [f64; 5] = [
    1.0,
    -3.180_638_548_874_721,
    3.861_194_348_994_213_3,
    -2.112_155_355_110_969,
    0.438_265_142_261_979_77,
];

/// Sum of a few random sinusoids on top of a decaying offset.
fn randomized_signal(mut rng: ThreadRng, num_freqs: NonZeroUsize, n: NonZeroUsize) -> Array1<f64> {
    use rand::Rng;

    let nf: usize = num_freqs.into();
    let n: usize = n.into();
    let t: Array1<f64> = Array1::linspace(0.0, 15.0, n);
    let mut result = t.mapv(|ti| 7.0 * (-ti / 2.0).exp());
    for i in 0..nf {
        let ampl = rng.random_range(0.5..1.5) / 1.1f64.powi(i as i32);
        let freq = 1.2 * rng.random_range(1.0..40.0);
        let phase = rng.random_range(0.0..std::f64::consts::PI);
        result += &t.mapv(|ti| ampl * (freq * ti + phase).sin());
    }
    result
}

fn lfilter_1d(c: &mut Criterion) {
    let b = Array1::from(BUTTER4_B.to_vec());
    let a = Array1::from(BUTTER4_A.to_vec());
    let mut group = c.benchmark_group("lfilter_1d");
    for exp in [10usize, 14, 18] {
        let signal = randomized_signal(
            rand::rng(),
            NonZeroUsize::new(14).unwrap(),
            NonZeroUsize::new(1 << exp).unwrap(),
        );
        group.bench_with_input(BenchmarkId::new("iir4", 1 << exp), &signal, |bench, sig| {
            bench.iter(|| {
                ArrayView1::lfilter(
                    black_box(b.view()),
                    black_box(a.view()),
                    black_box(sig.view()),
                    None,
                    None,
                )
            })
        });
    }
    group.finish();
}

fn lfilter_2d_axes(c: &mut Criterion) {
    let b = Array1::from(BUTTER4_B.to_vec());
    let a = Array1::from(BUTTER4_A.to_vec());
    let column = randomized_signal(
        rand::rng(),
        NonZeroUsize::new(8).unwrap(),
        NonZeroUsize::new(1 << 12).unwrap(),
    );
    let x: Array2<f64> = ndarray::stack(Axis(1), &[column.view(); 64]).unwrap();
    let zi = Array2::<f64>::zeros((4, 1));

    let mut group = c.benchmark_group("lfilter_2d");
    group.bench_function("contiguous_lanes", |bench| {
        let xt = x.t().to_owned();
        bench.iter(|| lfilter(black_box(b.view()), black_box(a.view()), xt.view(), Some(1), None))
    });
    group.bench_function("strided_lanes", |bench| {
        bench.iter(|| lfilter(black_box(b.view()), black_box(a.view()), x.view(), Some(0), None))
    });
    group.bench_function("broadcast_zi", |bench| {
        bench.iter(|| {
            lfilter(
                black_box(b.view()),
                black_box(a.view()),
                x.view(),
                Some(0),
                Some(zi.view()),
            )
        })
    });
    #[cfg(feature = "rayon")]
    group.bench_function("strided_lanes_par", |bench| {
        bench.iter(|| {
            lfilt::signal::filter::lfilter_par(
                black_box(b.view()),
                black_box(a.view()),
                x.view(),
                Some(0),
                None,
            )
        })
    });
    group.finish();
}

fn lfilter_stream(c: &mut Criterion) {
    let signal = randomized_signal(
        rand::rng(),
        NonZeroUsize::new(14).unwrap(),
        NonZeroUsize::new(1 << 16).unwrap(),
    );
    let signal = signal.to_vec();
    let mut kernel = LFilterKernel::try_new(LFilterConfig {
        b: BUTTER4_B.to_vec(),
        a: BUTTER4_A.to_vec(),
        zi: None,
    })
    .expect("butterworth coefficients should be valid");
    let mut out = vec![0.0; 1024];

    c.bench_function("lfilter_stream_1024", |bench| {
        bench.iter(|| {
            for chunk in signal.chunks_exact(1024) {
                kernel
                    .run_into(black_box(chunk), &mut out)
                    .expect("chunk length matches");
            }
        })
    });
}

criterion_group!(benches, lfilter_1d, lfilter_2d_axes, lfilter_stream);
criterion_main!(benches);
