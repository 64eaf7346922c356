//! Synthetic surface samples with outward normals
//!
//! Deterministic point clouds on simple closed and open surfaces, used to
//! exercise the estimator where the true medial axis is known: the center of
//! a sphere, the axis of a tube.
//!
//! Sphere samples follow the Fibonacci lattice (golden angle spiral) with
//! tangential jitter. Both generators also jitter the samples radially by a
//! small fraction of the radius: exactly co-spherical samples put every
//! Voronoi vertex at the same place, which is the degenerate case the pole
//! estimator is least suited for.

use glam::DVec3;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::f64::consts::{PI, TAU};

/// Golden ratio φ = (1 + √5) / 2
const PHI: f64 = 1.618033988749895;

/// Tangential jitter as fraction of average sample spacing
const JITTER_STRENGTH: f64 = 0.5;

/// Radial jitter as fraction of the radius
const RADIAL_JITTER: f64 = 1e-3;

/// Pole offset for the Fibonacci lattice at a given sample count
///
/// Offsetting the first and last samples away from the poles improves the
/// uniformity of the canonical lattice.
fn lattice_epsilon(n: usize) -> f64 {
    match n {
        0..=23 => 0.33,
        24..=176 => 1.33,
        177..=889 => 3.33,
        890..=10999 => 10.0,
        _ => 27.5,
    }
}

/// Samples on a sphere, with outward normals
///
/// # Arguments
///
/// * `count` - Number of samples
/// * `radius` - Sphere radius
/// * `center` - Sphere center
/// * `seed` - Random seed for deterministic jitter
///
/// # Returns
///
/// `(points, normals)`, both of length `count`
///
/// # Example
///
/// ```rust
/// use medial_poles::sampling::fibonacci_sphere_samples;
/// use glam::DVec3;
///
/// let (points, normals) = fibonacci_sphere_samples(500, 2.0, DVec3::ZERO, 42);
/// assert_eq!(points.len(), 500);
/// assert!((normals[0].length() - 1.0).abs() < 1e-12);
/// ```
pub fn fibonacci_sphere_samples(
    count: usize,
    radius: f64,
    center: DVec3,
    seed: u64,
) -> (Vec<DVec3>, Vec<DVec3>) {
    if count == 0 {
        return (Vec::new(), Vec::new());
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let epsilon = lattice_epsilon(count);
    let n = count as f64;
    let jitter_amount = (4.0 * PI / n).sqrt() * JITTER_STRENGTH;

    (0..count)
        .map(|i| {
            let i_f = i as f64;
            let theta = TAU * i_f / PHI;
            let cos_phi = 1.0 - 2.0 * (i_f + epsilon) / (n - 1.0 + 2.0 * epsilon);
            let sin_phi = (1.0 - cos_phi * cos_phi).max(0.0).sqrt();

            let base = DVec3::new(sin_phi * theta.cos(), sin_phi * theta.sin(), cos_phi);

            let jitter_theta: f64 = rng.gen_range(0.0..TAU);
            let jitter_mag: f64 = rng.gen_range(0.0..jitter_amount);
            let up = if base.z.abs() < 0.9 { DVec3::Z } else { DVec3::X };
            let tangent1 = base.cross(up).normalize();
            let tangent2 = base.cross(tangent1).normalize();

            let normal = (base
                + tangent1 * jitter_mag * jitter_theta.cos()
                + tangent2 * jitter_mag * jitter_theta.sin())
            .normalize();

            let r = radius * (1.0 + rng.gen_range(-RADIAL_JITTER..RADIAL_JITTER));
            (center + normal * r, normal)
        })
        .unzip()
}

/// Samples on the side of an open tube along +Z, with outward normals
///
/// A crude stand-in for a cave passage: `rings` rings from `z = 0` to
/// `z = length`, `per_ring` samples each, alternate rings rotated by half a
/// step. The medial axis of the side surface is the tube axis.
///
/// Returns empty vectors if `rings` or `per_ring` is 0.
pub fn tube_samples(
    length: f64,
    radius: f64,
    rings: usize,
    per_ring: usize,
    seed: u64,
) -> (Vec<DVec3>, Vec<DVec3>) {
    if rings == 0 || per_ring == 0 {
        return (Vec::new(), Vec::new());
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let step = TAU / per_ring as f64;
    let dz = if rings > 1 { length / (rings - 1) as f64 } else { 0.0 };

    let mut points = Vec::with_capacity(rings * per_ring);
    let mut normals = Vec::with_capacity(rings * per_ring);

    for ring in 0..rings {
        let offset = if ring % 2 == 0 { 0.0 } else { 0.5 * step };
        for k in 0..per_ring {
            let angle = offset + step * k as f64 + rng.gen_range(-0.1..0.1) * step;
            let normal = DVec3::new(angle.cos(), angle.sin(), 0.0);
            let r = radius * (1.0 + rng.gen_range(-RADIAL_JITTER..RADIAL_JITTER));
            let z = ring as f64 * dz + rng.gen_range(-0.05..0.05) * dz;

            points.push(normal * r + DVec3::Z * z);
            normals.push(normal);
        }
    }

    (points, normals)
}
