// graphics/scene.rs

use piston_window::*;

use crate::config::particles::{BASE_RADIUS, COLOR as PARTICLE_COLOR};
use crate::graphics::camera::Camera;
use crate::intro::IntroScene;
use crate::utils::vec3::Vec3;

const LINE_RADIUS: f64 = 0.5;
const EAGLE_LINE_RADIUS: f64 = 0.9;
const MIN_SPRITE: f64 = 1.0;

/// Projects a segment and draws it, skipping it if either end is culled
fn draw_segment(camera: &Camera, from: Vec3, to: Vec3, color: [f32; 4], radius: f64, c: &Context, g: &mut G2d) {
    if let (Some(a), Some(b)) = (camera.project(from), camera.project(to)) {
        line_from_to(color, radius, [a.x, a.y], [b.x, b.y], c.transform, g);
    }
}

pub fn draw_glow(scene: &IntroScene, c: &Context, g: &mut G2d) {
    for &(from, to) in &scene.glow.segments {
        draw_segment(&scene.camera, from, to, scene.glow.color, LINE_RADIUS, c, g);
    }
}

/// Each edge is drawn in two halves so both end colors show
pub fn draw_network(scene: &IntroScene, c: &Context, g: &mut G2d) {
    for segment in scene.network.render_segments() {
        let mid = (segment.from + segment.to) * 0.5;
        draw_segment(&scene.camera, segment.from, mid, segment.from_color, LINE_RADIUS, c, g);
        draw_segment(&scene.camera, mid, segment.to, segment.to_color, LINE_RADIUS, c, g);
    }
}

pub fn draw_particles(scene: &IntroScene, c: &Context, g: &mut G2d) {
    for instance in scene.particles.instances() {
        if let Some(p) = scene.camera.project(instance.position) {
            let size = (BASE_RADIUS * 2.0 * instance.scale * p.scale).max(MIN_SPRITE);
            rectangle(
                PARTICLE_COLOR,
                [p.x - size / 2.0, p.y - size / 2.0, size, size],
                c.transform,
                g,
            );
        }
    }
}

pub fn draw_eagle(scene: &IntroScene, c: &Context, g: &mut G2d) {
    if let Some(eagle) = &scene.eagle {
        for (from, to, color) in eagle.world_edges() {
            draw_segment(&scene.camera, from, to, color, EAGLE_LINE_RADIUS, c, g);
        }
    }
}

/// Back to front: glow shell, network, particles, eagle
pub fn draw_scene(scene: &IntroScene, c: &Context, g: &mut G2d) {
    draw_glow(scene, c, g);
    draw_network(scene, c, g);
    draw_particles(scene, c, g);
    draw_eagle(scene, c, g);
}
