use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;
use tracefit::{
    correction::{calibrate_envelope, EnvelopeConfig},
    cutback::{cutback, DEFAULT_CUTBACK_ORDER},
    metrics::{free_spectral_range, PeakConfig},
    polyfit,
    test::{cutback_set, dipped_reference, mzi_transmission_db, wavelength_grid},
    Trace,
};

struct CriterionTestEntry<V> {
    id: String,
    elements: u64,
    values: V,
}
impl<V> CriterionTestEntry<V> {
    pub fn new(id: &str, elements: u64, values: V) -> Self {
        Self {
            id: id.to_string(),
            elements,
            values,
        }
    }
}

fn criterion_group_over<F, V>(c: &mut Criterion, id: &str, samples: &[CriterionTestEntry<V>], runner: F)
where
    for<'a, 'b, 'c> F: Fn(&'a mut criterion::Bencher<'b>, &'c V),
{
    let mut group = c.benchmark_group(id);
    for sample in samples {
        group.throughput(Throughput::Elements(sample.elements));
        group.bench_with_input(BenchmarkId::from_parameter(&sample.id), &sample.values, &runner);
    }
    group.finish();
}

fn sweep(n: usize) -> (Vec<f64>, Vec<f64>) {
    let wavelength = wavelength_grid(1500.0, 1600.0, n);
    let power = mzi_transmission_db(&wavelength, 4.2, 100e-6, 30.0);
    (wavelength, power)
}

fn criterion_benchmark(c: &mut Criterion) {
    //
    // Solver cost against polynomial order on a typical sweep
    println!("Benchmarking fit vs degree (n=10_001)...");
    let (wavelength, power) = sweep(10_001);
    criterion_group_over(
        c,
        "fit_vs_degree",
        &[1, 2, 4, 8, 12, 16]
            .map(|degree| CriterionTestEntry::new(&format!("degree={degree}"), 10_001, degree)),
        |b, degree| b.iter(|| polyfit(black_box(&wavelength), black_box(&power), *degree)),
    );

    //
    // Envelope calibration against the number of coarse samples
    println!("Benchmarking envelope calibration vs segments (n=20_001)...");
    let wavelength = wavelength_grid(1500.0, 1600.0, 20_001);
    let dips: Vec<f64> = (0..14).map(|k| 1503.0 + 7.0 * f64::from(k)).collect();
    let (reference, _) = dipped_reference(
        &wavelength,
        |l| -6.0 - 0.002 * (l - 1550.0).powi(2),
        &dips,
        8.0,
        0.3,
    );
    criterion_group_over(
        c,
        "envelope_vs_segments",
        &[100, 500, 2000].map(|segments| {
            CriterionTestEntry::new(
                &format!("segments={segments}"),
                segments as u64,
                EnvelopeConfig::new(1.0, segments),
            )
        }),
        |b, config| {
            b.iter(|| calibrate_envelope(&wavelength, &reference, &reference, black_box(config)));
        },
    );

    //
    // Cutback cost against the number of structures
    println!("Benchmarking cutback vs trace count (n=5_001)...");
    let wavelength = wavelength_grid(1500.0, 1600.0, 5_001);
    let sets: Vec<CriterionTestEntry<(Vec<Trace>, Vec<f64>)>> = [3_u32, 6, 12, 24]
        .into_iter()
        .map(|count| {
            let lengths: Vec<f64> = (1..=count).map(|i| 0.25 * f64::from(i)).collect();
            let traces = cutback_set(&wavelength, &lengths, |_| 2.0, |l| -8.0 - 0.001 * (l - 1550.0).powi(2));
            CriterionTestEntry::new(&format!("traces={count}"), u64::from(count), (traces, lengths))
        })
        .collect();
    criterion_group_over(c, "cutback_vs_traces", &sets, |b, (traces, lengths)| {
        b.iter(|| cutback(black_box(traces), lengths, 1550.0, DEFAULT_CUTBACK_ORDER));
    });

    //
    // Peak detection is the hot loop of every periodic metric
    let (wavelength, power) = sweep(100_001);
    let trace = Trace::new(wavelength, power).expect("valid sweep");
    c.bench_function("fsr_n=100_001", |b| {
        b.iter(|| free_spectral_range(black_box(&trace), &PeakConfig::default()));
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
