//! Evaluator throughput over a city-sized hazard set

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use geodesy::Coordinate;
use hazard_model::{Hazard, HazardSet, LineHazard, PointHazard};
use proximity::{evaluate, EvaluatorConfig, PositionSample};

fn synthetic_set(points: usize, lines: usize) -> HazardSet {
    let mut hazards: Vec<Hazard> = Vec::with_capacity(points + lines);

    for i in 0..points {
        let offset = i as f64 * 0.0007;
        hazards.push(
            PointHazard {
                id: format!("C{i}"),
                location: Coordinate::new(22.20 + offset % 0.2, 114.00 + offset % 0.3),
                road_bearing: (i * 37 % 360) as f64,
                speed_limit: Some(50.0),
                remarks: String::new(),
            }
            .into(),
        );
    }

    for i in 0..lines {
        let lat = 22.25 + i as f64 * 0.0011 % 0.15;
        let lon = 114.05 + i as f64 * 0.0013 % 0.2;
        hazards.push(
            LineHazard {
                id: format!("L{i}"),
                vertices: (0..8)
                    .map(|k| Coordinate::new(lat + k as f64 * 0.0004, lon))
                    .collect(),
                road_bearing: (i * 53 % 360) as f64,
                speed_limit: Some(70.0),
                remarks: String::new(),
            }
            .into(),
        );
    }

    HazardSet::new(hazards).expect("synthetic hazards are valid")
}

fn bench_evaluate(c: &mut Criterion) {
    let hazards = synthetic_set(1000, 200);
    let config = EvaluatorConfig::default();
    let sample = PositionSample::new(Coordinate::new(22.2820, 114.1570), 0)
        .with_heading(90.0)
        .with_speed(15.0);

    c.bench_function("evaluate_1200_hazards", |b| {
        b.iter(|| {
            let eval = evaluate(black_box(&hazards), black_box(&sample), &config);
            black_box(eval.primary().map(|p| p.distance_m))
        })
    });
}

criterion_group!(benches, bench_evaluate);
criterion_main!(benches);
