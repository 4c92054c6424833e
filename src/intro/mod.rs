// intro/mod.rs

pub mod cooldown;
pub mod eagle;
pub mod glow;
pub mod network;
pub mod particles;
pub mod progress;
pub mod sequence;

use rand::Rng;

use crate::config::glow::{COLOR as GLOW_COLOR, RADIUS as GLOW_RADIUS, SEGMENTS as GLOW_SEGMENTS};
use crate::config::resolution::{HEIGHT, WIDTH};
use crate::graphics::camera::Camera;
use eagle::{build_eagle, EagleRig};
use glow::GlowShell;
use network::NetworkBackground;
use particles::ParticleField;

/// Flags written only by the exit sequence and read by every animated
/// element each frame. Each flag only ever turns on.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SceneFlags {
    pub collapsing: bool,
    pub exiting: bool,
    pub flash: bool,
}

/// Everything drawn behind the overlay for one mounted intro
pub struct IntroScene {
    pub particles: ParticleField,
    pub network: NetworkBackground,
    pub glow: GlowShell,
    pub eagle: Option<EagleRig>,
    pub camera: Camera,
}

impl IntroScene {
    pub fn new<R: Rng + ?Sized>(particle_count: usize, node_count: usize, rng: &mut R) -> Self {
        IntroScene {
            particles: ParticleField::generate(particle_count, rng),
            network: NetworkBackground::generate(node_count, rng),
            glow: GlowShell::new(GLOW_RADIUS, GLOW_SEGMENTS, GLOW_COLOR),
            eagle: None,
            camera: Camera::new(WIDTH, HEIGHT),
        }
    }

    pub fn spawn_eagle(&mut self) {
        if self.eagle.is_none() {
            self.eagle = Some(EagleRig::spawn(build_eagle()));
        }
    }

    pub fn update(&mut self, dt: f64, flags: SceneFlags) {
        self.particles.update(dt, flags.collapsing);
        self.network.update(dt, flags.collapsing);
        if let Some(eagle) = self.eagle.as_mut() {
            eagle.update(dt);
        }
        self.camera.update(dt);
    }
}
