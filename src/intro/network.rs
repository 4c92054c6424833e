// intro/network.rs

use rand::Rng;
use std::collections::BTreeSet;

use crate::config::network::{
    ACTIVE_COLOR, BASE_COLOR, COLLAPSE_DROP, COLLAPSE_SPIN, LIGHT_INNER_RADIUS,
    LIGHT_OUTER_RADIUS, LIGHT_PATH_RADIUS, NEIGHBORS, PULSE_FREQ, PULSE_SPEED, PULSE_WEIGHT,
    SHELL_INNER, SHELL_OUTER,
};
use crate::utils::math::{mix_color, random_unit_vector, safe_gen_range, smoothstep};
use crate::utils::vec3::Vec3;

#[derive(Debug, Clone, PartialEq)]
pub struct NetworkNode {
    pub position: Vec3,
    /// Indices of the nearest other nodes, closest first
    pub neighbors: Vec<usize>,
}

/// A drawable edge with per-end colors
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderSegment {
    pub from: Vec3,
    pub to: Vec3,
    pub from_color: [f32; 4],
    pub to_color: [f32; 4],
}

/// Static graph of nodes on a sphere shell, lit by a wandering light.
/// The topology is fixed at creation; only the transform and light move.
pub struct NetworkBackground {
    nodes: Vec<NetworkNode>,
    segments: Vec<(usize, usize)>,
    time: f64,
    collapse_time: f64,
    light: Vec3,
}

impl NetworkBackground {
    pub fn generate<R: Rng + ?Sized>(node_count: usize, rng: &mut R) -> Self {
        let positions: Vec<Vec3> = (0..node_count)
            .map(|_| {
                let radius = safe_gen_range(rng, SHELL_INNER, SHELL_OUTER, "network_shell");
                random_unit_vector(rng) * radius
            })
            .collect();

        NetworkBackground::from_positions(positions)
    }

    /// Connects each position to its `NEIGHBORS` nearest others. Distance ties
    /// keep index order.
    pub fn from_positions(positions: Vec<Vec3>) -> Self {
        let nodes: Vec<NetworkNode> = positions
            .iter()
            .enumerate()
            .map(|(i, &p)| {
                let mut others: Vec<(usize, f64)> = positions
                    .iter()
                    .enumerate()
                    .filter(|&(j, _)| j != i)
                    .map(|(j, &q)| (j, p.distance(q)))
                    .collect();
                others.sort_by(|a, b| a.1.total_cmp(&b.1));

                NetworkNode {
                    position: p,
                    neighbors: others.into_iter().take(NEIGHBORS).map(|(j, _)| j).collect(),
                }
            })
            .collect();

        let segments: BTreeSet<(usize, usize)> = nodes
            .iter()
            .enumerate()
            .flat_map(|(i, node)| node.neighbors.iter().map(move |&j| (i.min(j), i.max(j))))
            .collect();

        NetworkBackground {
            nodes,
            segments: segments.into_iter().collect(),
            time: 0.0,
            collapse_time: 0.0,
            light: Vec3::ZERO,
        }
    }

    pub fn update(&mut self, dt: f64, collapsing: bool) {
        let dt = dt.max(0.0);
        self.time += dt;
        if collapsing {
            self.collapse_time += dt;
        }

        let t = self.time;
        self.light = Vec3::new(
            (t * 0.5).sin() * LIGHT_PATH_RADIUS,
            (t * 0.3).sin() * LIGHT_PATH_RADIUS * 0.5,
            (t * 0.5).cos() * LIGHT_PATH_RADIUS,
        );
    }

    pub fn rotation(&self) -> f64 {
        self.collapse_time * COLLAPSE_SPIN
    }

    pub fn drop_offset(&self) -> f64 {
        -self.collapse_time * COLLAPSE_DROP
    }

    pub fn world_position(&self, local: Vec3) -> Vec3 {
        local.rotate_y(self.rotation()) + Vec3::new(0.0, self.drop_offset(), 0.0)
    }

    /// Light falloff plus a pulse traveling along each edge (`along` in 0..=1)
    pub fn intensity_at(&self, world: Vec3, along: f64) -> f64 {
        let falloff = 1.0 - smoothstep(LIGHT_INNER_RADIUS, LIGHT_OUTER_RADIUS, world.distance(self.light));
        let pulse = 0.5 + 0.5 * (self.time * PULSE_SPEED - along * PULSE_FREQ).sin();
        (falloff + pulse * PULSE_WEIGHT).clamp(0.0, 1.0)
    }

    pub fn vertex_color(&self, world: Vec3, along: f64) -> [f32; 4] {
        mix_color(BASE_COLOR, ACTIVE_COLOR, self.intensity_at(world, along))
    }

    pub fn render_segments(&self) -> impl Iterator<Item = RenderSegment> + '_ {
        self.segments.iter().map(move |&(a, b)| {
            let from = self.world_position(self.nodes[a].position);
            let to = self.world_position(self.nodes[b].position);
            RenderSegment {
                from,
                to,
                from_color: self.vertex_color(from, 0.0),
                to_color: self.vertex_color(to, 1.0),
            }
        })
    }

    pub fn nodes(&self) -> &[NetworkNode] {
        &self.nodes
    }

    pub fn segments(&self) -> &[(usize, usize)] {
        &self.segments
    }
}
