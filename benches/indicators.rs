#[path = "../tests/fixtures/mod.rs"]
mod fixtures;

use crate::fixtures::{RefBar, load_reference_bars};

use criterion::{BatchSize, Criterion, Throughput, criterion_group, criterion_main};
use quantedge_series::{
    Bands, BandsConfig, Engine, Fdi, FdiConfig, IndicatorConfig, IndicatorConfigBuilder, MaMethod,
    Tick,
};
use std::{hint::black_box, time::Duration};

fn bands(periods: usize, method: MaMethod) -> BandsConfig {
    BandsConfig::builder()
        .periods(periods)
        .method(method)
        .build()
}

fn full_benchmarks(c: &mut Criterion) {
    let bars = load_reference_bars();
    let mut group = c.benchmark_group("full");
    group.throughput(Throughput::Elements(bars.len() as u64));
    group.warm_up_time(Duration::from_secs(5));
    group.measurement_time(Duration::from_secs(10));

    macro_rules! full_bench {
        ($name:expr, $ind_type:ty, $config:expr) => {
            group.bench_function($name, |b| {
                b.iter_batched(
                    || Engine::<$ind_type>::init($config),
                    |mut engine| {
                        black_box(engine.on_update(&Tick::full(bars.len()), &bars))
                    },
                    BatchSize::SmallInput,
                );
            });
        };
    }

    full_bench!("sma20", Bands, bands(20, MaMethod::Sma));
    full_bench!("ema20", Bands, bands(20, MaMethod::Ema));
    full_bench!("lwma20", Bands, bands(20, MaMethod::Lwma));
    full_bench!("alma20", Bands, bands(20, MaMethod::Alma));
    full_bench!("alma100", Bands, bands(100, MaMethod::Alma));
    full_bench!("fdi30", Fdi, FdiConfig::close(30));
    full_bench!("fdi100", Fdi, FdiConfig::close(100));

    group.finish();
}

fn new_bar_benchmarks(c: &mut Criterion) {
    let bars = load_reference_bars();
    let mut group = c.benchmark_group("new_bar");
    group.sample_size(200);
    group.noise_threshold(0.03);
    group.warm_up_time(Duration::from_secs(5));
    group.measurement_time(Duration::from_secs(10));

    // Full load of all bars except the last, then benchmark the cycle that
    // appends it.
    let warmup = &bars[..bars.len() - 1];

    macro_rules! new_bar_bench {
        ($name:expr, $ind_type:ty, $config:expr) => {
            group.bench_function($name, |b| {
                b.iter_batched(
                    || {
                        let mut engine = Engine::<$ind_type>::init($config);
                        let _ = engine.on_update(&Tick::full(warmup.len()), warmup);
                        engine
                    },
                    |mut engine| {
                        black_box(engine.on_update(&Tick::new_bars(1, bars.len()), &bars))
                    },
                    BatchSize::SmallInput,
                );
            });
        };
    }

    new_bar_bench!("sma20", Bands, bands(20, MaMethod::Sma));
    new_bar_bench!("ema20", Bands, bands(20, MaMethod::Ema));
    new_bar_bench!("alma100", Bands, bands(100, MaMethod::Alma));
    new_bar_bench!("fdi30", Fdi, FdiConfig::close(30));

    group.finish();
}

fn repaint_benchmarks(c: &mut Criterion) {
    let bars = load_reference_bars();
    let mut group = c.benchmark_group("repaint");
    group.sample_size(200);
    group.noise_threshold(0.03);
    group.warm_up_time(Duration::from_secs(5));
    group.measurement_time(Duration::from_secs(10));

    // Full load, then benchmark a single repaint of the newest bar.
    let mut repainted: Vec<RefBar> = bars.clone();
    if let Some(last) = repainted.last_mut() {
        last.close *= 1.001;
    }

    macro_rules! repaint_bench {
        ($name:expr, $ind_type:ty, $config:expr) => {
            group.bench_function($name, |b| {
                b.iter_batched(
                    || {
                        let mut engine = Engine::<$ind_type>::init($config);
                        let _ = engine.on_update(&Tick::full(bars.len()), &bars);
                        engine
                    },
                    |mut engine| {
                        black_box(engine.on_update(&Tick::repaint(repainted.len()), &repainted))
                    },
                    BatchSize::SmallInput,
                );
            });
        };
    }

    repaint_bench!("sma20", Bands, bands(20, MaMethod::Sma));
    repaint_bench!("ema20", Bands, bands(20, MaMethod::Ema));
    repaint_bench!("alma100", Bands, bands(100, MaMethod::Alma));
    repaint_bench!("fdi30", Fdi, FdiConfig::close(30));

    group.finish();
}

criterion_group!(
    benches,
    full_benchmarks,
    new_bar_benchmarks,
    repaint_benchmarks
);
criterion_main!(benches);
