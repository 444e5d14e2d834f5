// benches/bench_ingest_position.rs
use criterion::{
    black_box, criterion_group, criterion_main, AxisScale, Criterion, PlotConfiguration,
};
use signal_preemption::communication::messages::PositionSample;
use signal_preemption::config::{PreemptionConfig, SignalConfig};
use signal_preemption::PreemptionEngine;
use std::time::Duration;

// Helper function to build an engine with `num_signals` signals spaced 0.001 deg apart going north.
fn create_engine(num_signals: usize) -> PreemptionEngine {
    let signals = (0..num_signals)
        .map(|i| SignalConfig {
            id: format!("S{}", i + 1),
            name: format!("Signal {}", i + 1),
            lat: 17.3845 + i as f64 * 0.001,
            lng: 78.4867,
        })
        .collect();
    let config = PreemptionConfig {
        signals,
        ..PreemptionConfig::default()
    };
    PreemptionEngine::new(config).unwrap()
}

fn bench_ingest_position(c: &mut Criterion) {
    let mut group = c.benchmark_group("ingest_position");

    group.sample_size(100);
    group.measurement_time(Duration::from_secs(5));
    group.warm_up_time(Duration::from_secs(2));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Linear));

    // Run benchmarks for routes with 3, 50 and 200 signals.
    for &size in [3, 50, 200].iter() {
        group.bench_function(format!("size_{}", size), |b| {
            let mut engine = create_engine(size);
            let route_end = 17.3845 + size as f64 * 0.001;
            let mut lat = 17.3835;
            b.iter(|| {
                // Drive north and start over once past the last signal.
                lat += 0.00003;
                if lat > route_end {
                    lat = 17.3835;
                }
                let update = engine
                    .ingest_position(&PositionSample::new(lat, 78.4867))
                    .unwrap();
                black_box(update);
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_ingest_position);
criterion_main!(benches);
