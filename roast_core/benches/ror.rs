use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use roast_core::ror::calculate_ror;
use roast_core::series::{RoastCurve, TimeSeries};
use roast_core::smooth::{median, smooth};
use roast_core::snapshot::RoastSnapshot;
use roast_core::{AnalysisCfg, Analyzer};

// Synthetic roast: dip to a turning point then a slowing climb, jittered
// sample times and a little probe noise.
fn synth_roast(n: usize, seed: u32) -> (Vec<f64>, Vec<Option<f64>>) {
    let mut state = seed.max(1);
    let mut next = || {
        let mut x = state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        state = x;
        f64::from(x) / (f64::from(u32::MAX) + 1.0)
    };
    let mut t = 0.0;
    let mut times = Vec::with_capacity(n);
    let mut bt = Vec::with_capacity(n);
    for _ in 0..n {
        t += 0.8 + next() * 0.4;
        let m = t / 60.0;
        let v = 200.0 - 110.0 * (-m).exp() * 1.0_f64.min(m * 2.0) + 12.0 * m.sqrt() * m;
        times.push(t);
        bt.push(Some(v + (next() * 2.0 - 1.0) * 0.3));
    }
    (times, bt)
}

pub fn bench_ror(c: &mut Criterion) {
    let mut g = c.benchmark_group("ror");
    if let Ok(ss) = std::env::var("BENCH_SAMPLE_SIZE") {
        if let Ok(n) = ss.parse::<usize>() {
            g.sample_size(n.max(1));
        }
    } else {
        g.sample_size(50);
    }
    for n in [900usize, 3_600] {
        let (times, bt) = synth_roast(n, 7);
        g.bench_function(format!("calculate_ror_{n}"), |b| {
            b.iter(|| calculate_ror(black_box(&bt), black_box(&times), 30))
        });
        let ror = calculate_ror(&bt, &times, 30).unwrap_or_default();
        g.bench_function(format!("median5_smooth3_{n}"), |b| {
            b.iter(|| smooth(&median(black_box(&ror), 5), 3))
        });
    }
    g.finish();
}

pub fn bench_analyze(c: &mut Criterion) {
    let analyzer = Analyzer::new(AnalysisCfg::default()).unwrap();
    let (times, bt) = synth_roast(900, 11);
    c.bench_function("analyze_900", |b| {
        b.iter_batched(
            || {
                let series = TimeSeries::from_bt(times.clone(), bt.clone()).unwrap();
                RoastSnapshot::from_curve(RoastCurve::new(series))
            },
            |snap| analyzer.analyze(&snap),
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_ror, bench_analyze);
criterion_main!(benches);
