//! Field-line tracing by fixed-step Euler integration.
//!
//! A line starts at a seed point and repeatedly advances `step_size` along the
//! unit field direction (or against it, for [`Direction::Inward`]). It stops
//! when the field magnitude drops below `collapse_threshold` or cannot be
//! normalised, when the next point would leave the domain, or after
//! `max_steps` steps. All three are normal outcomes; tracing never fails.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::field_source::FieldSource;
use crate::params::FieldParams;

/// Rectangular domain `[0, width] x [0, height]`, edges included.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// True if `p` lies inside the domain or on its edge. NaN is never inside.
    pub fn contains(&self, p: DVec2) -> bool {
        p.x >= 0.0 && p.x <= self.width && p.y >= 0.0 && p.y <= self.height
    }
}

/// Which way a line is integrated relative to the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Along the field: lines leave source poles.
    Outward,
    /// Against the field: lines run into sink poles.
    Inward,
}

impl Direction {
    pub fn sign(self) -> f64 {
        match self {
            Direction::Outward => 1.0,
            Direction::Inward => -1.0,
        }
    }
}

/// Why a traced line stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// Field magnitude fell below the collapse threshold.
    FieldCollapsed,
    /// The next step would have left the domain.
    OutOfBounds,
    /// The step bound was exhausted.
    MaxStepsReached,
}

/// Placement of a direction arrow on a traced line.
///
/// `angle` is in radians and always points along the physical field, from
/// source toward sink, regardless of the integration direction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArrowAnchor {
    pub position: DVec2,
    pub angle: f64,
}

/// A traced field line: seed first, every accepted point after it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TracedLine {
    pub points: Vec<DVec2>,
    pub arrow: Option<ArrowAnchor>,
    pub termination: Termination,
}

/// The subset of [`FieldParams`] that drives integration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceSettings {
    pub step_size: f64,
    pub max_steps: usize,
    pub collapse_threshold: f64,
    pub arrow_min_points: usize,
}

impl Default for TraceSettings {
    fn default() -> Self {
        Self::from(&FieldParams::default())
    }
}

impl From<&FieldParams> for TraceSettings {
    fn from(params: &FieldParams) -> Self {
        Self {
            step_size: params.step_size,
            max_steps: params.max_steps,
            collapse_threshold: params.collapse_threshold,
            arrow_min_points: params.arrow_min_points,
        }
    }
}

/// Traces one field line from `seed` through `field`.
///
/// The returned line holds at most `max_steps + 1` points, all inside
/// `bounds` except possibly the seed itself.
pub fn trace<S>(
    seed: DVec2,
    direction: Direction,
    field: &S,
    bounds: &Bounds,
    settings: &TraceSettings,
) -> TracedLine
where
    S: FieldSource + ?Sized,
{
    let mut points = Vec::with_capacity(settings.max_steps.min(1024) + 1);
    points.push(seed);

    let mut current = seed;
    let mut termination = Termination::MaxStepsReached;
    for _ in 0..settings.max_steps {
        let b = field.sample(current);
        let magnitude = b.length();
        // Zero or non-finite magnitudes cannot be normalised, whatever the threshold.
        if !(magnitude.is_finite() && magnitude > 0.0) || magnitude < settings.collapse_threshold {
            termination = Termination::FieldCollapsed;
            break;
        }
        let next = current + b / magnitude * (direction.sign() * settings.step_size);
        if !bounds.contains(next) {
            termination = Termination::OutOfBounds;
            break;
        }
        points.push(next);
        current = next;
    }

    let arrow = arrow_anchor(&points, direction, settings.arrow_min_points);
    TracedLine {
        points,
        arrow,
        termination,
    }
}

/// Picks the midpoint of a long enough line and the field direction there.
///
/// Lines with `min_points` points or fewer get no arrow.
pub fn arrow_anchor(points: &[DVec2], direction: Direction, min_points: usize) -> Option<ArrowAnchor> {
    if points.len() <= min_points.max(1) {
        return None;
    }
    let mid = points.len() / 2;
    let position = points[mid];
    let prev = points[mid - 1];
    let along = match direction {
        Direction::Outward => position - prev,
        Direction::Inward => prev - position,
    };
    Some(ArrowAnchor {
        position,
        angle: along.y.atan2(along.x),
    })
}
