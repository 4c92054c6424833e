// intro/particles.rs

use rand::Rng;

use crate::config::particles::{
    COLLAPSE_GRAVITY, COLLAPSE_RAMP, COLLAPSE_SPEEDUP, REFERENCE_FPS, SYSTEM_SPIN_Y,
    SYSTEM_SPIN_Z,
};
use crate::utils::vec3::Vec3;

/// Static factors of one point in the cloud. Only `t`, `y_factor` and
/// `fall_velocity` change after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub t: f64,
    pub factor: f64,
    pub speed: f64,
    pub x_factor: f64,
    pub y_factor: f64,
    pub z_factor: f64,
    pub mx: f64,
    pub my: f64,
    pub fall_velocity: f64,
}

impl Particle {
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Particle {
            t: rng.random_range(0.0..100.0_f64),
            factor: 20.0 + rng.random_range(0.0..100.0_f64),
            speed: 0.01 + rng.random_range(0.0..1.0_f64) / 200.0,
            x_factor: -50.0 + rng.random_range(0.0..100.0_f64),
            y_factor: -50.0 + rng.random_range(0.0..100.0_f64),
            z_factor: -50.0 + rng.random_range(0.0..100.0_f64),
            mx: 0.0,
            my: 0.0,
            fall_velocity: 0.0,
        }
    }

    /// Position in the cloud's local frame, a pure function of the factors
    pub fn local_position(&self) -> Vec3 {
        let t = self.t;
        let a = t.cos() + t.sin() / 10.0;
        let b = t.sin() + (t * 2.0).cos() / 10.0;
        let f = self.factor;

        Vec3::new(
            (self.mx / 10.0) * a + self.x_factor + (t / 10.0 * f).cos() + t.sin() * f / 10.0,
            (self.my / 10.0) * b + self.y_factor + (t / 10.0 * f).sin() + (t * 2.0).cos() * f / 10.0,
            (self.my / 10.0) * b + self.z_factor + (t / 10.0 * f).cos() + (t * 3.0).sin() * f / 10.0,
        )
    }

    /// Large when the phase's cosine is past 0.5, small otherwise
    pub fn scale(&self) -> f64 {
        let s = self.t.cos();
        (if s > 0.5 { 1.5 } else { 0.5 }) * 1.5
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleInstance {
    pub position: Vec3,
    pub scale: f64,
}

/// The chaotic point cloud in front of the network
pub struct ParticleField {
    particles: Vec<Particle>,
    rotation_y: f64,
    rotation_z: f64,
    collapse_time: f64,
}

impl ParticleField {
    pub fn generate<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Self {
        ParticleField {
            particles: (0..count).map(|_| Particle::new(rng)).collect(),
            rotation_y: 0.0,
            rotation_z: 0.0,
            collapse_time: 0.0,
        }
    }

    /// Advances every particle by `dt` seconds. While `collapsing`, particles
    /// accelerate downward and oscillate ever faster, with no end state.
    pub fn update(&mut self, dt: f64, collapsing: bool) {
        let dt = dt.max(0.0);
        let frames = dt * REFERENCE_FPS;

        self.rotation_y += SYSTEM_SPIN_Y * frames;
        self.rotation_z += SYSTEM_SPIN_Z * frames;

        let phase_multiplier = if collapsing {
            COLLAPSE_SPEEDUP + COLLAPSE_RAMP * self.collapse_time
        } else {
            1.0
        };
        if collapsing {
            self.collapse_time += dt;
        }
        for particle in &mut self.particles {
            particle.t += particle.speed / 2.0 * phase_multiplier * frames;

            if collapsing {
                particle.fall_velocity += COLLAPSE_GRAVITY * frames;
                particle.y_factor -= particle.fall_velocity * frames;
            }
        }
    }

    /// World-space placement of particle `i`
    pub fn instance(&self, i: usize) -> Option<ParticleInstance> {
        self.particles.get(i).map(|particle| ParticleInstance {
            position: particle
                .local_position()
                .rotate_z(self.rotation_z)
                .rotate_y(self.rotation_y),
            scale: particle.scale(),
        })
    }

    pub fn instances(&self) -> impl Iterator<Item = ParticleInstance> + '_ {
        (0..self.particles.len()).filter_map(move |i| self.instance(i))
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn same_seed_gives_same_static_factors() {
        let a = ParticleField::generate(256, &mut StdRng::seed_from_u64(2024));
        let b = ParticleField::generate(256, &mut StdRng::seed_from_u64(2024));
        assert_eq!(a.particles(), b.particles());

        let c = ParticleField::generate(256, &mut StdRng::seed_from_u64(2025));
        assert_ne!(a.particles(), c.particles());
    }

    #[test]
    fn generated_factors_stay_in_range() {
        let field = ParticleField::generate(1000, &mut StdRng::seed_from_u64(11));
        for p in field.particles() {
            assert!((0.0..100.0).contains(&p.t));
            assert!((20.0..120.0).contains(&p.factor));
            assert!((0.01..0.015).contains(&p.speed));
            assert!((-50.0..50.0).contains(&p.x_factor));
            assert!((-50.0..50.0).contains(&p.y_factor));
            assert!((-50.0..50.0).contains(&p.z_factor));
        }
    }

    #[test]
    fn vertical_offsets_never_rise_while_collapsing() {
        let mut field = ParticleField::generate(200, &mut StdRng::seed_from_u64(8));
        let mut previous: Vec<f64> = field.particles().iter().map(|p| p.y_factor).collect();

        for frame in 0..240 {
            let dt = if frame % 5 == 0 { 0.05 } else { 1.0 / 60.0 };
            field.update(dt, true);
            for (p, prev) in field.particles().iter().zip(&previous) {
                assert!(p.y_factor <= *prev);
            }
            previous = field.particles().iter().map(|p| p.y_factor).collect();
        }
    }

    #[test]
    fn collapse_speeds_up_phase() {
        let mut calm = ParticleField::generate(10, &mut StdRng::seed_from_u64(4));
        let mut falling = ParticleField::generate(10, &mut StdRng::seed_from_u64(4));
        let start: Vec<f64> = calm.particles().iter().map(|p| p.t).collect();

        calm.update(1.0, false);
        falling.update(1.0, true);

        for ((c, f), t0) in calm.particles().iter().zip(falling.particles()).zip(&start) {
            let calm_advance = c.t - t0;
            let fall_advance = f.t - t0;
            assert!((fall_advance - calm_advance * COLLAPSE_SPEEDUP).abs() < 1e-9);
        }
        // calm particles keep their height
        assert_eq!(
            calm.particles()[0].y_factor,
            ParticleField::generate(10, &mut StdRng::seed_from_u64(4)).particles()[0].y_factor
        );
    }

    #[test]
    fn oscillation_keeps_accelerating_during_collapse() {
        let mut field = ParticleField::generate(10, &mut StdRng::seed_from_u64(5));
        let mut last_advance = 0.0;

        for _ in 0..120 {
            let before = field.particles()[0].t;
            field.update(1.0 / 60.0, true);
            let advance = field.particles()[0].t - before;
            assert!(advance > last_advance);
            last_advance = advance;
        }
    }

    #[test]
    fn scale_is_binary() {
        let mut particle = Particle::new(&mut StdRng::seed_from_u64(0));
        particle.t = 0.0;
        assert_eq!(particle.scale(), 2.25);
        particle.t = std::f64::consts::PI;
        assert_eq!(particle.scale(), 0.75);
    }

    #[test]
    fn local_position_matches_closed_form_at_zero_phase() {
        let particle = Particle {
            t: 0.0,
            factor: 20.0,
            speed: 0.01,
            x_factor: 1.0,
            y_factor: 2.0,
            z_factor: 3.0,
            mx: 0.0,
            my: 0.0,
            fall_velocity: 0.0,
        };
        // cos(0) = 1, sin(0) = 0, cos(0) * 20 / 10 = 2
        assert_eq!(particle.local_position(), Vec3::new(2.0, 4.0, 4.0));
    }
}
