// intro/glow.rs

use std::f64::consts::{PI, TAU};

use crate::utils::vec3::Vec3;

/// Faint latitude/longitude wireframe sphere enclosing the scene
pub struct GlowShell {
    pub segments: Vec<(Vec3, Vec3)>,
    pub color: [f32; 4],
}

impl GlowShell {
    pub fn new(radius: f64, divisions: usize, color: [f32; 4]) -> Self {
        let divisions = divisions.max(3);
        let point = |lat: usize, lon: usize| {
            let theta = lat as f64 / divisions as f64 * PI;
            let phi = lon as f64 / divisions as f64 * TAU;
            Vec3::new(
                radius * theta.sin() * phi.cos(),
                radius * theta.cos(),
                radius * theta.sin() * phi.sin(),
            )
        };

        let mut segments = Vec::with_capacity(divisions * divisions * 2);
        for lat in 0..divisions {
            for lon in 0..divisions {
                // meridian piece
                segments.push((point(lat, lon), point(lat + 1, lon)));
                // parallels, skipping the degenerate ring at the north pole
                if lat > 0 {
                    segments.push((point(lat, lon), point(lat, lon + 1)));
                }
            }
        }

        GlowShell { segments, color }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shell_points_sit_on_the_radius() {
        let shell = GlowShell::new(150.0, 10, [1.0; 4]);
        assert_eq!(shell.segments.len(), 10 * 10 + 9 * 10);
        for (a, b) in &shell.segments {
            assert!((a.length() - 150.0).abs() < 1e-9);
            assert!((b.length() - 150.0).abs() < 1e-9);
        }
    }
}
