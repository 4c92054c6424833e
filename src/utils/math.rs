// utils/math.rs

use log::warn;
use rand::Rng;

use crate::utils::vec3::Vec3;

/// Safely generates a random number in the given range.
/// Logs a warning if min >= max and returns min in that case.
pub fn safe_gen_range<R: Rng + ?Sized>(rng: &mut R, min: f64, max: f64, context: &str) -> f64 {
    if min >= max {
        warn!(
            "Empty range detected in {}: min={}, max={}",
            context, min, max
        );
        min
    } else {
        rng.random_range(min..max)
    }
}

/// Uniformly distributed direction on the unit sphere
pub fn random_unit_vector<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    let z: f64 = rng.random_range(-1.0..1.0);
    let theta: f64 = rng.random_range(0.0..std::f64::consts::TAU);
    let r = (1.0 - z * z).sqrt();
    Vec3::new(r * theta.cos(), r * theta.sin(), z)
}

pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Hermite smoothstep, 0 below `edge0`, 1 above `edge1`
pub fn smoothstep(edge0: f64, edge1: f64, x: f64) -> f64 {
    if edge0 >= edge1 {
        return if x < edge0 { 0.0 } else { 1.0 };
    }
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Component-wise RGBA interpolation
pub fn mix_color(a: [f32; 4], b: [f32; 4], t: f64) -> [f32; 4] {
    let t = t.clamp(0.0, 1.0) as f32;
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
        a[3] + (b[3] - a[3]) * t,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn smoothstep_clamps_and_is_symmetric() {
        assert_eq!(smoothstep(1.0, 3.0, 0.0), 0.0);
        assert_eq!(smoothstep(1.0, 3.0, 5.0), 1.0);
        assert!((smoothstep(1.0, 3.0, 2.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn empty_range_returns_min() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(safe_gen_range(&mut rng, 4.0, 4.0, "test"), 4.0);
    }

    #[test]
    fn unit_vectors_have_unit_length() {
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..100 {
            assert!((random_unit_vector(&mut rng).length() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn mix_color_endpoints() {
        let a = [0.0, 0.0, 0.0, 0.0];
        let b = [1.0, 0.5, 0.25, 1.0];
        assert_eq!(mix_color(a, b, 0.0), a);
        assert_eq!(mix_color(a, b, 1.0), b);
        assert_eq!(mix_color(a, b, 7.0), b);
    }
}
