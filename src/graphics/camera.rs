// graphics/camera.rs

use std::f64::consts::TAU;

use crate::config::camera::{
    AUTO_ROTATE_SPEED, FOV_DEGREES, MAX_POLAR, MIN_POLAR, SHAKE_DECAY, SHAKE_FREQUENCY,
    SHAKE_INTENSITY, START_DISTANCE,
};
use crate::utils::vec3::Vec3;

const NEAR_PLANE: f64 = 0.5;
const DRAG_SENSITIVITY: f64 = 0.005;

/// Decaying jitter applied to the camera eye.
pub struct CameraShake {
    trauma: f64,
    time: f64,
}

impl CameraShake {
    pub fn new() -> Self {
        CameraShake { trauma: 0.0, time: 0.0 }
    }

    /// Full-strength shake; repeated calls refill rather than stack
    pub fn start(&mut self) {
        self.trauma = 1.0;
    }

    pub fn update(&mut self, dt: f64) {
        self.time += dt;
        self.trauma = (self.trauma - SHAKE_DECAY * dt).max(0.0);
    }

    pub fn is_active(&self) -> bool {
        self.trauma > 0.0
    }

    /// Offset in camera right/up units
    pub fn offset(&self) -> (f64, f64) {
        if !self.is_active() {
            return (0.0, 0.0);
        }
        let amplitude = self.trauma * self.trauma * SHAKE_INTENSITY;
        let t = self.time * SHAKE_FREQUENCY;
        (
            amplitude * (t.sin() + 0.5 * (t * 2.3 + 1.1).sin()),
            amplitude * ((t * 1.3 + 0.7).cos() + 0.5 * (t * 2.9).sin()),
        )
    }
}

/// A point after projection: screen coordinates and the perspective factor
/// used to size sprites.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projected {
    pub x: f64,
    pub y: f64,
    pub scale: f64,
}

/// Orbiting perspective camera looking at the origin.
pub struct Camera {
    pub yaw: f64,
    pub polar: f64,
    pub distance: f64,
    pub shake: CameraShake,
    width: f64,
    height: f64,
    focal: f64,
    eye: Vec3,
    right: Vec3,
    up: Vec3,
    forward: Vec3,
}

impl Camera {
    pub fn new(width: f64, height: f64) -> Self {
        let mut camera = Camera {
            yaw: 0.0,
            polar: std::f64::consts::FRAC_PI_2,
            distance: START_DISTANCE,
            shake: CameraShake::new(),
            width,
            height,
            focal: (height / 2.0) / (FOV_DEGREES.to_radians() / 2.0).tan(),
            eye: Vec3::ZERO,
            right: Vec3::ZERO,
            up: Vec3::ZERO,
            forward: Vec3::ZERO,
        };
        camera.rebuild_basis();
        camera
    }

    /// Auto-rotation and shake decay
    pub fn update(&mut self, dt: f64) {
        self.yaw = (self.yaw + TAU / 60.0 * AUTO_ROTATE_SPEED * dt) % TAU;
        self.shake.update(dt);
        self.rebuild_basis();
    }

    /// Mouse drag orbit, polar angle clamped to keep the horizon in view
    pub fn orbit_drag(&mut self, dx: f64, dy: f64) {
        self.yaw = (self.yaw - dx * DRAG_SENSITIVITY) % TAU;
        self.polar = (self.polar - dy * DRAG_SENSITIVITY).clamp(MIN_POLAR, MAX_POLAR);
        self.rebuild_basis();
    }

    fn rebuild_basis(&mut self) {
        let base_eye = Vec3::new(
            self.distance * self.polar.sin() * self.yaw.sin(),
            self.distance * self.polar.cos(),
            self.distance * self.polar.sin() * self.yaw.cos(),
        );
        self.forward = (-base_eye).normalized();
        self.right = self.forward.cross(Vec3::new(0.0, 1.0, 0.0)).normalized();
        self.up = self.right.cross(self.forward);

        let (sx, sy) = self.shake.offset();
        self.eye = base_eye + self.right * sx + self.up * sy;
    }

    /// Projects a world point to the screen. `None` when behind the near plane.
    pub fn project(&self, world: Vec3) -> Option<Projected> {
        let rel = world - self.eye;
        let depth = rel.dot(self.forward);
        if depth <= NEAR_PLANE {
            return None;
        }
        let scale = self.focal / depth;
        Some(Projected {
            x: self.width / 2.0 + rel.dot(self.right) * scale,
            y: self.height / 2.0 - rel.dot(self.up) * scale,
            scale,
        })
    }
}
