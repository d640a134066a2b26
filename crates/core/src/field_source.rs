//! Field sampling: the superposed inverse-square field of every visible pole.
//!
//! A [`FieldSource`] produces a 2D field vector at any point. [`MagnetField`]
//! is the production source: each visible magnet contributes a diverging
//! source pole and a converging sink pole. [`sample`] is the free-function
//! form used by callers that hold a magnet slice and parameters.
//!
//! All implementations are deterministic: same inputs produce the same output.

use glam::DVec2;

use crate::magnet::Magnet;
use crate::params::FieldParams;

/// A source of 2D field vectors.
///
/// All implementations must be deterministic and must return finite vectors
/// for finite inputs.
pub trait FieldSource: Send + Sync {
    /// Sample the field at `point`.
    fn sample(&self, point: DVec2) -> DVec2;
}

impl<F> FieldSource for F
where
    F: Fn(DVec2) -> DVec2 + Send + Sync,
{
    fn sample(&self, point: DVec2) -> DVec2 {
        self(point)
    }
}

/// A single signed inverse-square point source.
///
/// Positive `strength` pushes away from `position`, negative pulls toward it.
/// Within `singularity_radius` of the position the contribution is omitted,
/// as is any contribution whose magnitude overflows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointPole {
    pub position: DVec2,
    pub strength: f64,
    pub singularity_radius: f64,
}

impl PointPole {
    fn contribution(&self, point: DVec2) -> DVec2 {
        let d = point - self.position;
        let dist_sq = d.length_squared();
        let dist = dist_sq.sqrt();
        if dist <= self.singularity_radius {
            return DVec2::ZERO;
        }
        let scale = self.strength / dist_sq;
        if !scale.is_finite() {
            return DVec2::ZERO;
        }
        d / dist * scale
    }
}

impl FieldSource for PointPole {
    fn sample(&self, point: DVec2) -> DVec2 {
        self.contribution(point)
    }
}

/// Net field of a set of magnets.
///
/// Invisible magnets are skipped outright. Poles are derived from the
/// borrowed magnets at sample time, so the field always reflects their
/// current pose.
#[derive(Debug, Clone, Copy)]
pub struct MagnetField<'a> {
    magnets: &'a [Magnet],
    pole_strength: f64,
    half_length: f64,
    singularity_radius: f64,
}

impl<'a> MagnetField<'a> {
    /// Borrows `magnets` and copies the field constants out of `params`.
    pub fn new(magnets: &'a [Magnet], params: &FieldParams) -> Self {
        Self {
            magnets,
            pole_strength: params.pole_strength,
            half_length: params.half_length,
            singularity_radius: params.singularity_radius,
        }
    }

    /// The magnets this field is computed from.
    pub fn magnets(&self) -> &'a [Magnet] {
        self.magnets
    }

    fn point_poles(&self) -> impl Iterator<Item = PointPole> + '_ {
        self.magnets
            .iter()
            .filter(|m| m.visible)
            .flat_map(|m| m.poles(self.half_length))
            .map(|pole| PointPole {
                position: pole.position,
                strength: pole.kind.sign() * self.pole_strength,
                singularity_radius: self.singularity_radius,
            })
    }
}

impl FieldSource for MagnetField<'_> {
    fn sample(&self, point: DVec2) -> DVec2 {
        self.point_poles()
            .fold(DVec2::ZERO, |acc, pole| acc + pole.contribution(point))
    }
}

/// Net field vector at `point` for `magnets` under `params`.
pub fn sample(point: DVec2, magnets: &[Magnet], params: &FieldParams) -> DVec2 {
    MagnetField::new(magnets, params).sample(point)
}
