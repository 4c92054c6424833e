// intro/eagle.rs

use crate::utils::math::{mix_color, smoothstep};
use crate::utils::vec3::Vec3;

const WING_SEGMENTS: usize = 9;
const WING_SPAN: f64 = 38.0;
const WING_LIFT: f64 = 7.0;
const WING_SWEEP: f64 = 6.0;
const FEATHER_ROOT: f64 = 4.0;
const FEATHER_TIP: f64 = 11.0;
const TAIL_FEATHERS: usize = 5;
const TAIL_LENGTH: f64 = 9.0;
const SPINE_POINTS: usize = 7;
const BODY_LENGTH: f64 = 20.0;

const CORE_COLOR: [f32; 4] = [1.0, 0.78, 0.25, 1.0];
const TIP_COLOR: [f32; 4] = [0.0, 0.95, 1.0, 0.85];

/// Immutable line geometry. The per-frame rig only moves it.
#[derive(Debug, Clone, PartialEq)]
pub struct WireframeMesh {
    pub vertices: Vec<Vec3>,
    pub colors: Vec<[f32; 4]>,
    pub edges: Vec<(usize, usize)>,
}

impl WireframeMesh {
    fn push_vertex(&mut self, position: Vec3) -> usize {
        let spread = (position.x.abs() / WING_SPAN).clamp(0.0, 1.0);
        self.vertices.push(position);
        self.colors.push(mix_color(CORE_COLOR, TIP_COLOR, spread));
        self.vertices.len() - 1
    }

    fn link(&mut self, a: usize, b: usize) {
        self.edges.push((a, b));
    }

    fn chain(&mut self, indices: &[usize]) {
        for pair in indices.windows(2) {
            self.link(pair[0], pair[1]);
        }
    }
}

/// Builds the wireframe eagle, wings spread along x, beak toward +z.
pub fn build_eagle() -> WireframeMesh {
    let mut mesh = WireframeMesh {
        vertices: Vec::new(),
        colors: Vec::new(),
        edges: Vec::new(),
    };

    // spine, tail (-z) to neck (+z) with a slight arch
    let spine: Vec<usize> = (0..SPINE_POINTS)
        .map(|i| {
            let s = i as f64 / (SPINE_POINTS - 1) as f64;
            let z = -BODY_LENGTH / 2.0 + s * BODY_LENGTH;
            let y = (s * std::f64::consts::PI).sin() * 1.5;
            mesh.push_vertex(Vec3::new(0.0, y, z))
        })
        .collect();
    mesh.chain(&spine);

    let tail_root = spine[0];
    let neck = spine[SPINE_POINTS - 1];
    let shoulder = spine[SPINE_POINTS / 2 + 1];

    // head and beak
    let crown = mesh.push_vertex(Vec3::new(0.0, 2.5, BODY_LENGTH / 2.0 + 2.5));
    let beak = mesh.push_vertex(Vec3::new(0.0, 0.5, BODY_LENGTH / 2.0 + 6.0));
    let jaw = mesh.push_vertex(Vec3::new(0.0, -0.5, BODY_LENGTH / 2.0 + 3.0));
    mesh.chain(&[neck, crown, beak, jaw, neck]);

    for side in [-1.0, 1.0] {
        // leading edge, shoulder to tip
        let leading: Vec<usize> = (0..=WING_SEGMENTS)
            .map(|i| {
                let s = i as f64 / WING_SEGMENTS as f64;
                let x = side * (1.5 + s * WING_SPAN);
                let y = (s * std::f64::consts::PI * 0.8).sin() * WING_LIFT - s * s * 2.0;
                let z = mesh.vertices[shoulder].z - s * s * WING_SWEEP;
                mesh.push_vertex(Vec3::new(x, y, z))
            })
            .collect();
        mesh.link(shoulder, leading[0]);
        mesh.chain(&leading);

        // primaries hang back from each leading point, longest near the tip
        let tips: Vec<usize> = leading
            .iter()
            .enumerate()
            .map(|(i, &root)| {
                let s = i as f64 / WING_SEGMENTS as f64;
                let length = FEATHER_ROOT + (FEATHER_TIP - FEATHER_ROOT) * smoothstep(0.0, 1.0, s);
                let base = mesh.vertices[root];
                let tip = mesh.push_vertex(Vec3::new(base.x + side * s * 2.0, base.y - 1.0, base.z - length));
                mesh.link(root, tip);
                tip
            })
            .collect();
        mesh.chain(&tips);
        mesh.link(tips[0], tail_root);
    }

    // fanned tail
    let tail_base = mesh.vertices[tail_root];
    let spread = std::f64::consts::PI / 5.0;
    let mut fan = Vec::with_capacity(TAIL_FEATHERS);
    for i in 0..TAIL_FEATHERS {
        let s = i as f64 / (TAIL_FEATHERS - 1) as f64;
        let angle = -spread + s * 2.0 * spread;
        let tip = mesh.push_vertex(Vec3::new(
            tail_base.x + angle.sin() * TAIL_LENGTH,
            tail_base.y - 0.5,
            tail_base.z - angle.cos() * TAIL_LENGTH,
        ));
        mesh.link(tail_root, tip);
        fan.push(tip);
    }
    mesh.chain(&fan);

    mesh
}

/// Flight path of the eagle during the exit sequence: it dives from deep in
/// the scene toward the camera, banking slightly, its wings beating by
/// pitching the whole body.
pub struct EagleRig {
    mesh: WireframeMesh,
    elapsed: f64,
    pub position: Vec3,
    pub yaw: f64,
    pub pitch: f64,
    pub roll: f64,
    pub scale: f64,
}

const FLIGHT_START: Vec3 = Vec3::new(0.0, 25.0, -220.0);
const FLIGHT_END: Vec3 = Vec3::new(0.0, -5.0, 70.0);
const FLIGHT_DURATION: f64 = 1.8;

impl EagleRig {
    pub fn spawn(mesh: WireframeMesh) -> Self {
        let mut rig = EagleRig {
            mesh,
            elapsed: 0.0,
            position: FLIGHT_START,
            yaw: 0.0,
            pitch: 0.0,
            roll: 0.0,
            scale: 0.6,
        };
        rig.update(0.0);
        rig
    }

    pub fn update(&mut self, dt: f64) {
        self.elapsed += dt.max(0.0);
        let progress = smoothstep(0.0, FLIGHT_DURATION, self.elapsed);

        self.position = FLIGHT_START + (FLIGHT_END - FLIGHT_START) * progress;
        self.roll = (self.elapsed * 2.2).sin() * 0.18;
        self.pitch = -0.25 + (self.elapsed * 9.0).sin() * 0.08;
        self.yaw = (self.elapsed * 1.3).sin() * 0.1;
        self.scale = 0.6 + progress * 0.9;
    }

    pub fn transform(&self, local: Vec3) -> Vec3 {
        (local * self.scale)
            .rotate_z(self.roll)
            .rotate_x(self.pitch)
            .rotate_y(self.yaw)
            + self.position
    }

    /// World-space edges with the color of their first vertex
    pub fn world_edges(&self) -> impl Iterator<Item = (Vec3, Vec3, [f32; 4])> + '_ {
        self.mesh.edges.iter().map(move |&(a, b)| {
            (
                self.transform(self.mesh.vertices[a]),
                self.transform(self.mesh.vertices[b]),
                self.mesh.colors[a],
            )
        })
    }
}
