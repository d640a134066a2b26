//! Tunable constants for field sampling, line tracing and the interactive scene.
//!
//! [`FieldParams`] is built from a `serde_json::Value` object through the
//! `param_*` helpers below. Each helper takes a JSON value, a key name, and a
//! default. If the key is missing or the value is not the expected type, the
//! default is returned. Range checks happen separately in
//! [`FieldParams::validate`].

use serde_json::{json, Value};

use crate::error::FieldError;
use crate::tracer::Bounds;

/// Shared strength scalar for every pole.
pub const DEFAULT_POLE_STRENGTH: f64 = 100.0;
/// Distance from a magnet's centre to each of its poles.
pub const DEFAULT_HALF_LENGTH: f64 = 60.0;
/// Glyph width of a magnet. Only used for drawing.
pub const DEFAULT_MAGNET_WIDTH: f64 = 30.0;
/// Poles closer than this to the query point contribute nothing.
pub const DEFAULT_SINGULARITY_RADIUS: f64 = 1.0;
/// Seeds per pole.
pub const DEFAULT_SEEDS_PER_POLE: usize = 25;
/// Offset of each seed from its pole.
pub const DEFAULT_SEED_RADIUS: f64 = 5.0;
/// Euler step length.
pub const DEFAULT_STEP_SIZE: f64 = 1.5;
/// Step bound per traced line.
pub const DEFAULT_MAX_STEPS: usize = 2000;
/// Field magnitude below which a line stops.
pub const DEFAULT_COLLAPSE_THRESHOLD: f64 = 0.001;
/// A line needs strictly more points than this to carry an arrow.
pub const DEFAULT_ARROW_MIN_POINTS: usize = 50;
/// Extra grab distance beyond the half-length when picking a magnet.
pub const DEFAULT_GRAB_MARGIN: f64 = 10.0;
/// Domain width.
pub const DEFAULT_WIDTH: f64 = 600.0;
/// Domain height.
pub const DEFAULT_HEIGHT: f64 = 400.0;

/// Extracts an `f64` from `params[name]`, returning `default` if missing or wrong type.
///
/// Accepts both JSON numbers (including integers) and converts them to f64.
pub fn param_f64(params: &Value, name: &str, default: f64) -> f64 {
    params.get(name).and_then(Value::as_f64).unwrap_or(default)
}

/// Extracts a `usize` from `params[name]`, returning `default` if missing or wrong type.
///
/// Only succeeds if the JSON value is a non-negative integer that fits in `u64`,
/// then converts to `usize`.
pub fn param_usize(params: &Value, name: &str, default: usize) -> usize {
    params
        .get(name)
        .and_then(Value::as_u64)
        .map(|v| v as usize)
        .unwrap_or(default)
}

/// Every tunable constant of the visualizer.
///
/// Use [`Default`] for the stock layout: a 600x400 domain, magnets of length
/// 120, 25 lines per pole.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldParams {
    pub pole_strength: f64,
    pub half_length: f64,
    pub magnet_width: f64,
    pub singularity_radius: f64,
    pub seeds_per_pole: usize,
    pub seed_radius: f64,
    pub step_size: f64,
    pub max_steps: usize,
    pub collapse_threshold: f64,
    pub arrow_min_points: usize,
    pub grab_margin: f64,
    pub width: f64,
    pub height: f64,
}

impl Default for FieldParams {
    fn default() -> Self {
        Self {
            pole_strength: DEFAULT_POLE_STRENGTH,
            half_length: DEFAULT_HALF_LENGTH,
            magnet_width: DEFAULT_MAGNET_WIDTH,
            singularity_radius: DEFAULT_SINGULARITY_RADIUS,
            seeds_per_pole: DEFAULT_SEEDS_PER_POLE,
            seed_radius: DEFAULT_SEED_RADIUS,
            step_size: DEFAULT_STEP_SIZE,
            max_steps: DEFAULT_MAX_STEPS,
            collapse_threshold: DEFAULT_COLLAPSE_THRESHOLD,
            arrow_min_points: DEFAULT_ARROW_MIN_POINTS,
            grab_margin: DEFAULT_GRAB_MARGIN,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }
}

impl FieldParams {
    /// Extracts parameters from a JSON object, falling back to defaults.
    pub fn from_json(params: &Value) -> Self {
        Self {
            pole_strength: param_f64(params, "pole_strength", DEFAULT_POLE_STRENGTH),
            half_length: param_f64(params, "half_length", DEFAULT_HALF_LENGTH),
            magnet_width: param_f64(params, "magnet_width", DEFAULT_MAGNET_WIDTH),
            singularity_radius: param_f64(
                params,
                "singularity_radius",
                DEFAULT_SINGULARITY_RADIUS,
            ),
            seeds_per_pole: param_usize(params, "seeds_per_pole", DEFAULT_SEEDS_PER_POLE),
            seed_radius: param_f64(params, "seed_radius", DEFAULT_SEED_RADIUS),
            step_size: param_f64(params, "step_size", DEFAULT_STEP_SIZE),
            max_steps: param_usize(params, "max_steps", DEFAULT_MAX_STEPS),
            collapse_threshold: param_f64(
                params,
                "collapse_threshold",
                DEFAULT_COLLAPSE_THRESHOLD,
            ),
            arrow_min_points: param_usize(params, "arrow_min_points", DEFAULT_ARROW_MIN_POINTS),
            grab_margin: param_f64(params, "grab_margin", DEFAULT_GRAB_MARGIN),
            width: param_f64(params, "width", DEFAULT_WIDTH),
            height: param_f64(params, "height", DEFAULT_HEIGHT),
        }
    }

    /// Current parameter values as a JSON object.
    pub fn to_json(&self) -> Value {
        json!({
            "pole_strength": self.pole_strength,
            "half_length": self.half_length,
            "magnet_width": self.magnet_width,
            "singularity_radius": self.singularity_radius,
            "seeds_per_pole": self.seeds_per_pole,
            "seed_radius": self.seed_radius,
            "step_size": self.step_size,
            "max_steps": self.max_steps,
            "collapse_threshold": self.collapse_threshold,
            "arrow_min_points": self.arrow_min_points,
            "grab_margin": self.grab_margin,
            "width": self.width,
            "height": self.height,
        })
    }

    /// Schema describing every parameter: type, default and meaning.
    pub fn schema() -> Value {
        json!({
            "pole_strength": {
                "type": "number",
                "default": DEFAULT_POLE_STRENGTH,
                "description": "Strength scalar shared by every pole"
            },
            "half_length": {
                "type": "number",
                "default": DEFAULT_HALF_LENGTH,
                "min": 0.0,
                "description": "Distance from a magnet's centre to each pole"
            },
            "magnet_width": {
                "type": "number",
                "default": DEFAULT_MAGNET_WIDTH,
                "min": 0.0,
                "description": "Drawn width of a magnet glyph"
            },
            "singularity_radius": {
                "type": "number",
                "default": DEFAULT_SINGULARITY_RADIUS,
                "exclusive_min": 0.0,
                "description": "Poles closer than this to the query point are skipped"
            },
            "seeds_per_pole": {
                "type": "integer",
                "default": DEFAULT_SEEDS_PER_POLE,
                "min": 1,
                "description": "Field lines seeded around each pole"
            },
            "seed_radius": {
                "type": "number",
                "default": DEFAULT_SEED_RADIUS,
                "min": 0.0,
                "description": "Offset of each seed point from its pole"
            },
            "step_size": {
                "type": "number",
                "default": DEFAULT_STEP_SIZE,
                "exclusive_min": 0.0,
                "description": "Euler step length along the unit field direction"
            },
            "max_steps": {
                "type": "integer",
                "default": DEFAULT_MAX_STEPS,
                "min": 0,
                "description": "Step bound per traced line"
            },
            "collapse_threshold": {
                "type": "number",
                "default": DEFAULT_COLLAPSE_THRESHOLD,
                "exclusive_min": 0.0,
                "description": "Field magnitude below which a line terminates"
            },
            "arrow_min_points": {
                "type": "integer",
                "default": DEFAULT_ARROW_MIN_POINTS,
                "min": 1,
                "description": "Lines with more points than this get a direction arrow"
            },
            "grab_margin": {
                "type": "number",
                "default": DEFAULT_GRAB_MARGIN,
                "min": 0.0,
                "description": "Pick radius beyond the half-length for dragging"
            },
            "width": {
                "type": "number",
                "default": DEFAULT_WIDTH,
                "exclusive_min": 0.0,
                "description": "Domain width"
            },
            "height": {
                "type": "number",
                "default": DEFAULT_HEIGHT,
                "exclusive_min": 0.0,
                "description": "Domain height"
            }
        })
    }

    /// Rectangular tracing domain `[0, width] x [0, height]`.
    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.width, self.height)
    }

    /// Distance from a magnet centre within which a pointer-down grabs it.
    pub fn grab_radius(&self) -> f64 {
        self.half_length + self.grab_margin
    }

    /// Checks that every constant is in a range the sampler and tracer can use.
    ///
    /// Pole strength may be any finite value; a negative strength swaps which
    /// pole diverges.
    pub fn validate(&self) -> Result<(), FieldError> {
        if !(self.width.is_finite() && self.height.is_finite())
            || self.width <= 0.0
            || self.height <= 0.0
        {
            return Err(FieldError::InvalidDimensions);
        }
        if !self.pole_strength.is_finite() {
            return Err(FieldError::invalid_param("pole_strength", "must be finite"));
        }
        if !(self.step_size.is_finite() && self.step_size > 0.0) {
            return Err(FieldError::invalid_param("step_size", "must be positive"));
        }
        if self.seeds_per_pole == 0 {
            return Err(FieldError::invalid_param(
                "seeds_per_pole",
                "must be at least 1",
            ));
        }
        if self.arrow_min_points == 0 {
            return Err(FieldError::invalid_param(
                "arrow_min_points",
                "must be at least 1",
            ));
        }
        // The pole distance guard and the field collapse guard need nonzero thresholds.
        let positive = [
            ("singularity_radius", self.singularity_radius),
            ("collapse_threshold", self.collapse_threshold),
        ];
        if let Some((name, _)) = positive
            .iter()
            .find(|(_, v)| !(v.is_finite() && *v > 0.0))
        {
            return Err(FieldError::invalid_param(name, "must be finite and positive"));
        }
        let non_negative = [
            ("half_length", self.half_length),
            ("magnet_width", self.magnet_width),
            ("seed_radius", self.seed_radius),
            ("grab_margin", self.grab_margin),
        ];
        if let Some((name, _)) = non_negative
            .iter()
            .find(|(_, v)| !(v.is_finite() && *v >= 0.0))
        {
            return Err(FieldError::invalid_param(
                name,
                "must be finite and non-negative",
            ));
        }
        Ok(())
    }
}
