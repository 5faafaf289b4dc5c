use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use spikecat::spikes::{BurstinessMetric, IsiCv, PopulationBurstiness, SpikeTrains};
use spikecat::windows::{split_phases, WindowPartitioner};

/// Regular trains with a unit-specific period and a shared burst every 5 s
fn synthetic_trains(units: usize, duration_ms: f64) -> SpikeTrains {
    let trains = (0..units)
        .map(|u| {
            let period = 50.0 + (u % 13) as f64 * 10.0;
            let mut times: Vec<f64> = (0..)
                .map(|k| k as f64 * period + (u % 7) as f64)
                .take_while(|t| *t < duration_ms)
                .collect();
            let mut burst = 2500.0;
            while burst < duration_ms {
                times.extend((0..4).map(|s| burst + s as f64 * 3.0));
                burst += 5000.0;
            }
            times
        })
        .collect();
    SpikeTrains::from_trains(trains).unwrap()
}

/// Benchmark firing rates across collection sizes
fn bench_firing_rates(c: &mut Criterion) {
    let mut group = c.benchmark_group("firing_rates");

    for units in [16, 64, 256] {
        let spikes = synthetic_trains(units, 600_000.0);
        group.throughput(Throughput::Elements(spikes.total_spikes() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(units), &spikes, |b, spikes| {
            b.iter(|| black_box(spikes.firing_rates().unwrap()))
        });
    }

    group.finish();
}

/// Benchmark the burstiness strategies on a 10-minute recording
fn bench_burstiness(c: &mut Criterion) {
    let mut group = c.benchmark_group("burstiness");
    let spikes = synthetic_trains(64, 600_000.0);
    group.throughput(Throughput::Elements(spikes.total_spikes() as u64));

    let strategies: [(&str, Box<dyn BurstinessMetric>); 3] = [
        ("population_40ms", Box::new(PopulationBurstiness::default())),
        ("population_10ms", Box::new(PopulationBurstiness::new(10.0))),
        ("isi_cv", Box::new(IsiCv)),
    ];
    for (name, metric) in &strategies {
        group.bench_function(*name, |b| {
            b.iter(|| black_box(metric.compute(black_box(&spikes))))
        });
    }

    group.finish();
}

/// Benchmark cutting a 30-minute recording into its three phases
fn bench_phase_split(c: &mut Criterion) {
    let spikes = synthetic_trains(64, 1_800_000.0);
    let windows = WindowPartitioner::new().default_windows();

    c.bench_function("split_phases", |b| {
        b.iter(|| black_box(split_phases(&spikes, &windows).unwrap()))
    });
}

criterion_group!(benches, bench_firing_rates, bench_burstiness, bench_phase_split);
criterion_main!(benches);
