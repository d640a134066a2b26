//! Bar magnets and their derived poles.
//!
//! A [`Magnet`] stores only its pose and visibility. Pole positions are never
//! stored: [`Magnet::poles`] recomputes them from the current centre and
//! angle on every call, so drags and angle changes between redraws are always
//! reflected.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Which end of a magnet a pole is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoleKind {
    /// North end: field lines diverge from it.
    Source,
    /// South end: field lines converge on it.
    Sink,
}

impl PoleKind {
    /// Sign applied to the inverse-square contribution of this pole.
    pub fn sign(self) -> f64 {
        match self {
            PoleKind::Source => 1.0,
            PoleKind::Sink => -1.0,
        }
    }

    /// Single-letter pole label for presentation layers that annotate magnets.
    pub fn label(self) -> &'static str {
        match self {
            PoleKind::Source => "N",
            PoleKind::Sink => "S",
        }
    }
}

/// A point source derived from a magnet's pose.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pole {
    pub kind: PoleKind,
    pub position: DVec2,
}

/// A bar magnet in canvas space.
///
/// `angle` is in degrees, measured from the positive x-axis. With angle 0 the
/// source pole sits on the left of the centre and the sink pole on the right.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Magnet {
    pub id: usize,
    pub position: DVec2,
    pub angle: f64,
    pub visible: bool,
}

impl Magnet {
    /// Creates a visible magnet at `position` with angle 0.
    pub fn new(id: usize, position: DVec2) -> Self {
        Self {
            id,
            position,
            angle: 0.0,
            visible: true,
        }
    }

    /// Unit vector along the magnet's axis, pointing from source to sink.
    pub fn axis(&self) -> DVec2 {
        let rad = self.angle.to_radians();
        DVec2::new(rad.cos(), rad.sin())
    }

    /// Source pole at `center - half_length * axis`.
    pub fn source_pole(&self, half_length: f64) -> Pole {
        Pole {
            kind: PoleKind::Source,
            position: self.position - half_length * self.axis(),
        }
    }

    /// Sink pole at `center + half_length * axis`.
    pub fn sink_pole(&self, half_length: f64) -> Pole {
        Pole {
            kind: PoleKind::Sink,
            position: self.position + half_length * self.axis(),
        }
    }

    /// Both poles, source first.
    pub fn poles(&self, half_length: f64) -> [Pole; 2] {
        [self.source_pole(half_length), self.sink_pole(half_length)]
    }

    /// True if `point` is strictly within `radius` of the magnet centre.
    pub fn within_reach(&self, point: DVec2, radius: f64) -> bool {
        self.position.distance(point) < radius
    }
}
