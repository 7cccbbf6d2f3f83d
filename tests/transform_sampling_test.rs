use std::f32::consts::PI;

use cgmath::{InnerSpace, Vector3};
use rand::{Rng, SeedableRng, rngs::StdRng};
use sphere_shell::data_structures::instance::{
    DEFAULT_SCALE, TransformGenerator, generate_transform, sample_unit_sphere,
};

const SAMPLES: usize = 10_000;
const Z_BINS: usize = 10;

/// Counts of `z` coordinates in equal-width bins over [-1, 1]. Uniform points on
/// a sphere have uniformly distributed `z` (Archimedes' hat-box theorem).
fn z_histogram(points: impl Iterator<Item = Vector3<f32>>) -> [usize; Z_BINS] {
    let mut bins = [0; Z_BINS];
    for p in points {
        let bin = (((p.z + 1.0) / 2.0) * Z_BINS as f32) as usize;
        bins[bin.min(Z_BINS - 1)] += 1;
    }
    bins
}

fn max_deviation(bins: &[usize; Z_BINS]) -> f32 {
    let expected = SAMPLES as f32 / Z_BINS as f32;
    bins.iter()
        .map(|&count| (count as f32 - expected).abs() / expected)
        .fold(0.0, f32::max)
}

#[test]
fn should_place_transforms_inside_shell() {
    let mut rng = StdRng::seed_from_u64(1);
    for _ in 0..SAMPLES {
        let t = generate_transform(&mut rng, 8.0, 18.0);
        let r = t.position.magnitude();
        assert!((8.0 - 1e-4..=18.0 + 1e-4).contains(&r), "radius {}", r);
        for angle in [t.rotation.x.0, t.rotation.y.0, t.rotation.z.0] {
            assert!((0.0..PI).contains(&angle), "angle {}", angle);
        }
        assert!(DEFAULT_SCALE.contains(&t.scale), "scale {}", t.scale);
    }
}

#[test]
fn should_collapse_to_sphere_when_radii_match() {
    let mut rng = StdRng::seed_from_u64(2);
    for _ in 0..100 {
        let t = generate_transform(&mut rng, 10.0, 10.0);
        approx::assert_relative_eq!(t.position.magnitude(), 10.0, max_relative = 1e-5);
    }
}

#[test]
fn should_sample_directions_uniformly_over_sphere() {
    let mut rng = StdRng::seed_from_u64(3);
    let bins = z_histogram((0..SAMPLES).map(|_| sample_unit_sphere(&mut rng)));

    assert!(max_deviation(&bins) < 0.15, "bins {:?}", bins);
}

#[test]
fn should_detect_pole_clustering_of_naive_sampler() {
    // Uniform polar angle piles points up around the poles
    let mut rng = StdRng::seed_from_u64(3);
    let naive = (0..SAMPLES).map(|_| {
        let phi = rng.r#gen::<f32>() * PI;
        let theta = rng.r#gen::<f32>() * 2.0 * PI;
        Vector3::new(phi.sin() * theta.cos(), phi.sin() * theta.sin(), phi.cos())
    });
    let bins = z_histogram(naive);

    assert!(max_deviation(&bins) > 0.15, "bins {:?}", bins);
}

#[test]
fn should_return_unit_directions() {
    let mut rng = StdRng::seed_from_u64(4);
    for _ in 0..1000 {
        approx::assert_relative_eq!(sample_unit_sphere(&mut rng).magnitude(), 1.0, epsilon = 1e-5);
    }
}

#[test]
fn should_reproduce_sequence_from_seed() {
    let a: Vec<_> = TransformGenerator::seeded(42, 8.0..=18.0, 0.5..=1.2)
        .take(25)
        .collect();
    let b: Vec<_> = TransformGenerator::seeded(42, 8.0..=18.0, 0.5..=1.2)
        .take(25)
        .collect();
    let c: Vec<_> = TransformGenerator::seeded(43, 8.0..=18.0, 0.5..=1.2)
        .take(25)
        .collect();

    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn should_honour_configured_scale_range() {
    let mut generator = TransformGenerator::seeded(5, 8.0..=18.0, 2.0..=3.0);
    for _ in 0..500 {
        let t = generator.generate();
        assert!((2.0..=3.0).contains(&t.scale), "scale {}", t.scale);
    }
}
