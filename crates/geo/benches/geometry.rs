//! Benchmarks for geo crate transforms.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use infraplan_geo::batch::nearest_facility_distances;
use infraplan_geo::{
    bin_points_to_hexagons, haversine_distance, point_in_polygon, Facility, FacilityType,
    GeoPoint, PopulationPoint,
};

fn create_test_points(count: usize) -> Vec<PopulationPoint> {
    (0..count)
        .map(|i| {
            // Spread points over the Bishkek box
            let lat = 42.8 + (i as f64 * 0.0007) % 0.1;
            let lng = 74.5 + (i as f64 * 0.0013) % 0.2;
            PopulationPoint::new(lat, lng, (i % 100) as f64)
        })
        .collect()
}

fn create_test_facilities(count: usize) -> Vec<Facility> {
    (0..count)
        .map(|i| {
            let lat = 42.8 + (i as f64 * 0.013) % 0.1;
            let lng = 74.5 + (i as f64 * 0.017) % 0.2;
            Facility::new(i as i64, format!("School #{i}"), FacilityType::School, lat, lng)
        })
        .collect()
}

fn bench_single_distance(c: &mut Criterion) {
    let ala_too = GeoPoint::new(42.8746, 74.5698);
    let airport = GeoPoint::new(43.0613, 74.4776);

    c.bench_function("haversine_single", |b| {
        b.iter(|| haversine_distance(black_box(&ala_too), black_box(&airport)))
    });
}

fn bench_point_in_polygon(c: &mut Criterion) {
    let ring: Vec<GeoPoint> = (0..64)
        .map(|k| {
            let a = (k as f64 / 64.0) * std::f64::consts::TAU;
            GeoPoint::new(42.85 + 0.05 * a.sin(), 74.6 + 0.05 * a.cos())
        })
        .collect();
    let inside = GeoPoint::new(42.85, 74.6);

    c.bench_function("point_in_polygon_64", |b| {
        b.iter(|| point_in_polygon(black_box(&inside), black_box(&ring)))
    });
}

fn bench_hexbin(c: &mut Criterion) {
    let mut group = c.benchmark_group("hexbin");

    for size in [100, 1000, 10000].iter() {
        let points = create_test_points(*size);
        group.bench_with_input(BenchmarkId::new("rounding", size), size, |b, _| {
            b.iter(|| bin_points_to_hexagons(black_box(&points), black_box(0.01)))
        });

        #[cfg(feature = "h3")]
        group.bench_with_input(BenchmarkId::new("h3_res8", size), size, |b, _| {
            b.iter(|| infraplan_geo::hexbin::bin_points_to_h3(black_box(&points), black_box(8)))
        });
    }

    group.finish();
}

fn bench_nearest_facility(c: &mut Criterion) {
    let mut group = c.benchmark_group("nearest_facility");
    let facilities = create_test_facilities(50);

    for size in [100, 1000, 10000].iter() {
        let points = create_test_points(*size);
        group.bench_with_input(BenchmarkId::new("batch", size), size, |b, _| {
            b.iter(|| nearest_facility_distances(black_box(&points), black_box(&facilities)))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_single_distance,
    bench_point_in_polygon,
    bench_hexbin,
    bench_nearest_facility
);
criterion_main!(benches);
