//! Seed points for field lines.
//!
//! Lines are started on a small ring around each pole rather than on the pole
//! itself, where the field is singular.

use std::f64::consts::TAU;

use glam::DVec2;

/// Returns `count` points evenly spaced by angle on a circle of `radius`
/// around `center`, starting at angle 0 and proceeding counter-clockwise
/// in the usual maths orientation (clockwise on a y-down canvas).
pub fn seed_ring(center: DVec2, count: usize, radius: f64) -> Vec<DVec2> {
    (0..count)
        .map(|i| {
            let theta = i as f64 / count as f64 * TAU;
            center + radius * DVec2::new(theta.cos(), theta.sin())
        })
        .collect()
}
