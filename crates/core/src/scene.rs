//! The interactive session state: two magnet slots, their drag state, and the
//! parameters every redraw uses.
//!
//! A [`Scene`] is the single authoritative copy of the magnet poses. UI input
//! arrives as [`SceneEvent`]s; [`Scene::apply`] mutates the scene and reports
//! whether a full recompute-and-draw is due. [`Scene::field_lines`] performs
//! that recompute: every visible magnet gets a ring of outward lines from its
//! source pole and a ring of inward lines into its sink pole.

use glam::DVec2;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::FieldError;
use crate::field_source::{FieldSource, MagnetField};
use crate::magnet::{Magnet, PoleKind};
use crate::params::FieldParams;
use crate::seed::seed_ring;
use crate::tracer::{trace, Direction, Termination, TraceSettings, TracedLine};

/// Number of magnet slots in a scene.
pub const MAGNET_COUNT: usize = 2;

/// Pointer interaction state of one magnet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DragState {
    #[default]
    Idle,
    Dragging,
}

/// A discrete UI input.
///
/// Serialized with an internal `"type"` tag, e.g.
/// `{"type": "angle_changed", "magnet": 0, "degrees": 45}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SceneEvent {
    AngleChanged { magnet: usize, degrees: f64 },
    VisibilityChanged { magnet: usize, visible: bool },
    Reset,
    PointerDown { x: f64, y: f64 },
    PointerMove { x: f64, y: f64 },
    PointerUp,
}

/// One traced line tagged with the magnet and pole it was seeded from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldLine {
    pub magnet: usize,
    pub pole: PoleKind,
    pub direction: Direction,
    #[serde(flatten)]
    pub line: TracedLine,
}

/// Interactive two-magnet scene.
#[derive(Debug, Clone)]
pub struct Scene {
    params: FieldParams,
    magnets: [Magnet; MAGNET_COUNT],
    drag: [DragState; MAGNET_COUNT],
    dirty: bool,
}

impl Scene {
    /// Creates a scene in the default layout.
    ///
    /// Returns an error if `params` fails [`FieldParams::validate`].
    pub fn new(params: FieldParams) -> Result<Self, FieldError> {
        params.validate()?;
        Ok(Self {
            magnets: default_layout(&params),
            params,
            drag: [DragState::Idle; MAGNET_COUNT],
            dirty: true,
        })
    }

    /// Default layout: magnets at a quarter and three quarters of the width,
    /// vertically centred, angle 0, both visible.
    pub fn default_magnets(&self) -> [Magnet; MAGNET_COUNT] {
        default_layout(&self.params)
    }

    pub fn params(&self) -> &FieldParams {
        &self.params
    }

    pub fn magnets(&self) -> &[Magnet] {
        &self.magnets
    }

    /// The magnet in `slot`.
    pub fn magnet(&self, slot: usize) -> Result<&Magnet, FieldError> {
        self.magnets.get(slot).ok_or(FieldError::UnknownMagnet {
            index: slot,
            count: MAGNET_COUNT,
        })
    }

    fn magnet_mut(&mut self, slot: usize) -> Result<&mut Magnet, FieldError> {
        self.magnets.get_mut(slot).ok_or(FieldError::UnknownMagnet {
            index: slot,
            count: MAGNET_COUNT,
        })
    }

    pub fn drag_state(&self, slot: usize) -> Result<DragState, FieldError> {
        self.drag
            .get(slot)
            .copied()
            .ok_or(FieldError::UnknownMagnet {
                index: slot,
                count: MAGNET_COUNT,
            })
    }

    /// True while any magnet is being dragged.
    pub fn is_dragging(&self) -> bool {
        self.drag.contains(&DragState::Dragging)
    }

    /// Sets the angle in degrees. Non-finite angles are rejected.
    pub fn set_angle(&mut self, slot: usize, degrees: f64) -> Result<(), FieldError> {
        if !degrees.is_finite() {
            return Err(FieldError::invalid_param("angle", "must be finite"));
        }
        self.magnet_mut(slot)?.angle = degrees;
        self.dirty = true;
        Ok(())
    }

    pub fn set_visible(&mut self, slot: usize, visible: bool) -> Result<(), FieldError> {
        self.magnet_mut(slot)?.visible = visible;
        self.dirty = true;
        Ok(())
    }

    pub fn set_position(&mut self, slot: usize, position: DVec2) -> Result<(), FieldError> {
        finite_point("position", position)?;
        self.magnet_mut(slot)?.position = position;
        self.dirty = true;
        Ok(())
    }

    /// Restores the default layout and ends any drag in progress.
    pub fn reset(&mut self) {
        self.magnets = default_layout(&self.params);
        self.drag = [DragState::Idle; MAGNET_COUNT];
        self.dirty = true;
    }

    /// Starts dragging every magnet whose centre is within the grab radius of
    /// `point`. Returns true if at least one magnet was grabbed.
    ///
    /// Hidden magnets can be grabbed too.
    pub fn pointer_down(&mut self, point: DVec2) -> bool {
        let radius = self.params.grab_radius();
        let mut grabbed = false;
        for (magnet, state) in self.magnets.iter().zip(self.drag.iter_mut()) {
            if magnet.within_reach(point, radius) {
                *state = DragState::Dragging;
                grabbed = true;
            }
        }
        grabbed
    }

    /// Moves every dragging magnet's centre to `point`. Returns true if any
    /// magnet moved. Non-finite points are ignored.
    pub fn pointer_move(&mut self, point: DVec2) -> bool {
        if !point.is_finite() {
            return false;
        }
        let mut moved = false;
        for (magnet, state) in self.magnets.iter_mut().zip(self.drag.iter()) {
            if *state == DragState::Dragging {
                magnet.position = point;
                moved = true;
            }
        }
        self.dirty |= moved;
        moved
    }

    /// Ends every drag.
    pub fn pointer_up(&mut self) {
        self.drag = [DragState::Idle; MAGNET_COUNT];
    }

    /// Applies one UI event. Returns true if the scene must be redrawn.
    pub fn apply(&mut self, event: SceneEvent) -> Result<bool, FieldError> {
        match event {
            SceneEvent::AngleChanged { magnet, degrees } => {
                self.set_angle(magnet, degrees)?;
                Ok(true)
            }
            SceneEvent::VisibilityChanged { magnet, visible } => {
                self.set_visible(magnet, visible)?;
                Ok(true)
            }
            SceneEvent::Reset => {
                self.reset();
                Ok(true)
            }
            SceneEvent::PointerDown { x, y } => {
                self.pointer_down(finite_point("pointer", DVec2::new(x, y))?);
                Ok(false)
            }
            SceneEvent::PointerMove { x, y } => {
                Ok(self.pointer_move(finite_point("pointer", DVec2::new(x, y))?))
            }
            SceneEvent::PointerUp => {
                self.pointer_up();
                Ok(false)
            }
        }
    }

    /// Returns and clears the pending-redraw flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Net field vector at `point` from the visible magnets.
    pub fn sample(&self, point: DVec2) -> DVec2 {
        self.field().sample(point)
    }

    /// The field source backed by this scene's magnets.
    pub fn field(&self) -> MagnetField<'_> {
        MagnetField::new(&self.magnets, &self.params)
    }

    /// Traces every field line for the current state.
    ///
    /// Per visible magnet: `seeds_per_pole` outward lines from the source pole,
    /// then `seeds_per_pole` inward lines into the sink pole.
    pub fn field_lines(&self) -> Vec<FieldLine> {
        let field = self.field();
        let bounds = self.params.bounds();
        let settings = TraceSettings::from(&self.params);

        let lines: Vec<FieldLine> = self
            .magnets
            .iter()
            .filter(|m| m.visible)
            .flat_map(|m| {
                m.poles(self.params.half_length).into_iter().flat_map(move |pole| {
                    let direction = match pole.kind {
                        PoleKind::Source => Direction::Outward,
                        PoleKind::Sink => Direction::Inward,
                    };
                    seed_ring(pole.position, self.params.seeds_per_pole, self.params.seed_radius)
                        .into_iter()
                        .map(move |seed| FieldLine {
                            magnet: m.id,
                            pole: pole.kind,
                            direction,
                            line: trace(seed, direction, &field, &bounds, &settings),
                        })
                })
            })
            .collect();

        if log::log_enabled!(log::Level::Debug) {
            let tally = |t: Termination| lines.iter().filter(|l| l.line.termination == t).count();
            debug!(
                "traced {} field lines ({} collapsed, {} out of bounds, {} at step limit)",
                lines.len(),
                tally(Termination::FieldCollapsed),
                tally(Termination::OutOfBounds),
                tally(Termination::MaxStepsReached),
            );
        }
        lines
    }
}

fn finite_point(name: &str, p: DVec2) -> Result<DVec2, FieldError> {
    if p.is_finite() {
        Ok(p)
    } else {
        Err(FieldError::invalid_param(name, "coordinates must be finite"))
    }
}

fn default_layout(params: &FieldParams) -> [Magnet; MAGNET_COUNT] {
    let y = params.height / 2.0;
    [
        Magnet::new(0, DVec2::new(params.width * 0.25, y)),
        Magnet::new(1, DVec2::new(params.width * 0.75, y)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene() -> Scene {
        Scene::new(FieldParams::default()).unwrap()
    }

    /// Cheaper tracing for tests that only count lines.
    fn quick_scene() -> Scene {
        Scene::new(FieldParams {
            max_steps: 50,
            seeds_per_pole: 6,
            ..FieldParams::default()
        })
        .unwrap()
    }

    // ---- Construction ----

    #[test]
    fn new_uses_default_layout() {
        let s = scene();
        let m = s.magnets();
        assert_eq!(m.len(), 2);
        assert_eq!(m[0].position, DVec2::new(150.0, 200.0));
        assert_eq!(m[1].position, DVec2::new(450.0, 200.0));
        assert!(m.iter().all(|m| m.angle == 0.0 && m.visible));
        assert!(!s.is_dragging());
    }

    #[test]
    fn new_rejects_invalid_params() {
        let bad = FieldParams {
            width: -1.0,
            ..FieldParams::default()
        };
        assert!(matches!(Scene::new(bad), Err(FieldError::InvalidDimensions)));
    }

    #[test]
    fn unknown_slot_is_an_error() {
        let mut s = scene();
        assert!(matches!(
            s.set_angle(2, 10.0),
            Err(FieldError::UnknownMagnet { index: 2, count: 2 })
        ));
        assert!(s.magnet(5).is_err());
        assert!(s.drag_state(9).is_err());
    }

    // ---- Mutation and reset ----

    #[test]
    fn reset_restores_defaults_after_any_mutation() {
        let mut s = scene();
        s.set_angle(0, 45.0).unwrap();
        s.set_angle(1, 270.0).unwrap();
        s.set_visible(1, false).unwrap();
        s.set_position(0, DVec2::new(10.0, 10.0)).unwrap();
        s.pointer_down(DVec2::new(450.0, 200.0));
        s.pointer_move(DVec2::new(300.0, 300.0));

        s.reset();

        assert_eq!(s.magnets(), &s.default_magnets());
        assert!(!s.is_dragging());
    }

    #[test]
    fn mutations_mark_scene_dirty() {
        let mut s = scene();
        assert!(s.take_dirty(), "new scene needs a first draw");
        assert!(!s.take_dirty());
        s.set_angle(0, 30.0).unwrap();
        assert!(s.take_dirty());
        s.set_visible(0, false).unwrap();
        assert!(s.take_dirty());
        s.reset();
        assert!(s.take_dirty());
    }

    #[test]
    fn non_finite_angle_is_rejected_and_pose_kept() {
        let mut s = scene();
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(matches!(
                s.set_angle(1, bad),
                Err(FieldError::InvalidParam { ref name, .. }) if name == "angle"
            ));
        }
        assert_eq!(s.magnets()[1].angle, 0.0);
        assert!(s.sample(DVec2::new(300.0, 150.0)).is_finite());
    }

    #[test]
    fn non_finite_position_is_rejected_and_pose_kept() {
        let mut s = scene();
        let before = s.magnets()[0].position;
        let err = s.set_position(0, DVec2::new(f64::NAN, 10.0));
        assert!(matches!(
            err,
            Err(FieldError::InvalidParam { ref name, .. }) if name == "position"
        ));
        assert_eq!(s.magnets()[0].position, before);
    }

    #[test]
    fn bad_angle_event_leaves_other_magnet_lines_intact() {
        let mut s = quick_scene();
        let event = SceneEvent::AngleChanged {
            magnet: 1,
            degrees: f64::NAN,
        };
        assert!(s.apply(event).is_err());
        let longest = s
            .field_lines()
            .iter()
            .filter(|l| l.magnet == 0)
            .map(|l| l.line.points.len())
            .max()
            .unwrap();
        assert!(longest > 1, "magnet 0 lines stopped at their seeds");
    }

    // ---- Drag state machine ----

    #[test]
    fn pointer_down_within_reach_starts_drag() {
        let mut s = scene();
        assert!(s.pointer_down(DVec2::new(200.0, 210.0)));
        assert_eq!(s.drag_state(0).unwrap(), DragState::Dragging);
        assert_eq!(s.drag_state(1).unwrap(), DragState::Idle);
    }

    #[test]
    fn pointer_down_outside_reach_does_nothing() {
        let mut s = scene();
        // 70 units from magnet 0's centre is outside the strict grab radius.
        assert!(!s.pointer_down(DVec2::new(220.0, 200.0)));
        assert!(!s.is_dragging());
    }

    #[test]
    fn move_only_applies_while_dragging() {
        let mut s = scene();
        s.take_dirty();
        assert!(!s.pointer_move(DVec2::new(300.0, 300.0)));
        assert!(!s.take_dirty());
        assert_eq!(s.magnets()[0].position, DVec2::new(150.0, 200.0));

        s.pointer_down(DVec2::new(150.0, 200.0));
        assert!(s.pointer_move(DVec2::new(300.0, 300.0)));
        assert_eq!(s.magnets()[0].position, DVec2::new(300.0, 300.0));
        assert!(s.take_dirty());

        s.pointer_up();
        assert_eq!(s.drag_state(0).unwrap(), DragState::Idle);
        assert!(!s.pointer_move(DVec2::new(10.0, 10.0)));
        assert_eq!(s.magnets()[0].position, DVec2::new(300.0, 300.0));
    }

    #[test]
    fn overlapping_magnets_are_dragged_together() {
        let mut s = scene();
        s.set_position(1, DVec2::new(160.0, 200.0)).unwrap();
        s.pointer_down(DVec2::new(155.0, 200.0));
        s.pointer_move(DVec2::new(400.0, 100.0));
        assert!(s.magnets().iter().all(|m| m.position == DVec2::new(400.0, 100.0)));
    }

    #[test]
    fn hidden_magnet_can_still_be_grabbed() {
        let mut s = scene();
        s.set_visible(0, false).unwrap();
        assert!(s.pointer_down(DVec2::new(150.0, 200.0)));
    }

    // ---- Events ----

    #[test]
    fn apply_reports_redraws() {
        let mut s = scene();
        assert!(s
            .apply(SceneEvent::AngleChanged {
                magnet: 1,
                degrees: 90.0
            })
            .unwrap());
        assert_eq!(s.magnets()[1].angle, 90.0);
        assert!(s
            .apply(SceneEvent::VisibilityChanged {
                magnet: 0,
                visible: false
            })
            .unwrap());
        assert!(!s.magnets()[0].visible);
        assert!(!s.apply(SceneEvent::PointerDown { x: 450.0, y: 200.0 }).unwrap());
        assert!(s.apply(SceneEvent::PointerMove { x: 500.0, y: 250.0 }).unwrap());
        assert!(!s.apply(SceneEvent::PointerUp).unwrap());
        assert!(!s.apply(SceneEvent::PointerMove { x: 0.0, y: 0.0 }).unwrap());
        assert_eq!(s.magnets()[1].position, DVec2::new(500.0, 250.0));
        assert!(s.apply(SceneEvent::Reset).unwrap());
        assert_eq!(s.magnets(), &s.default_magnets());
    }

    #[test]
    fn pointer_events_reject_non_finite_coordinates() {
        let mut s = scene();
        let down = SceneEvent::PointerDown { x: 150.0, y: 200.0 };
        assert!(s.apply(down).is_ok());
        let bad_move = SceneEvent::PointerMove {
            x: f64::INFINITY,
            y: 200.0,
        };
        assert!(matches!(
            s.apply(bad_move),
            Err(FieldError::InvalidParam { ref name, .. }) if name == "pointer"
        ));
        assert!(!s.pointer_move(DVec2::new(f64::NAN, 0.0)));
        assert_eq!(s.magnets()[0].position, DVec2::new(150.0, 200.0));
        assert!(s.is_dragging());
    }

    #[test]
    fn apply_rejects_unknown_slot() {
        let mut s = scene();
        let result = s.apply(SceneEvent::AngleChanged {
            magnet: 3,
            degrees: 1.0,
        });
        assert!(matches!(result, Err(FieldError::UnknownMagnet { .. })));
    }

    #[test]
    fn events_deserialize_from_tagged_json() {
        let json = r#"[
            {"type": "angle_changed", "magnet": 0, "degrees": 45},
            {"type": "visibility_changed", "magnet": 1, "visible": false},
            {"type": "pointer_down", "x": 150, "y": 200},
            {"type": "pointer_move", "x": 20.5, "y": 30},
            {"type": "pointer_up"},
            {"type": "reset"}
        ]"#;
        let events: Vec<SceneEvent> = serde_json::from_str(json).unwrap();
        assert_eq!(events.len(), 6);
        assert_eq!(
            events[0],
            SceneEvent::AngleChanged {
                magnet: 0,
                degrees: 45.0
            }
        );
        assert_eq!(events[4], SceneEvent::PointerUp);
    }

    // ---- Field lines ----

    #[test]
    fn each_visible_magnet_contributes_two_rings() {
        let mut s = quick_scene();
        assert_eq!(s.field_lines().len(), 2 * 2 * 6);
        s.set_visible(1, false).unwrap();
        let lines = s.field_lines();
        assert_eq!(lines.len(), 2 * 6);
        assert!(lines.iter().all(|l| l.magnet == 0));
        s.set_visible(0, false).unwrap();
        assert!(s.field_lines().is_empty());
    }

    #[test]
    fn source_lines_go_outward_and_sink_lines_inward() {
        let s = quick_scene();
        for l in s.field_lines() {
            match l.pole {
                PoleKind::Source => assert_eq!(l.direction, Direction::Outward),
                PoleKind::Sink => assert_eq!(l.direction, Direction::Inward),
            }
        }
    }

    #[test]
    fn lines_start_on_the_seed_ring() {
        let s = quick_scene();
        let params = *s.params();
        for l in s.field_lines() {
            let magnet = s.magnet(l.magnet).unwrap();
            let pole = match l.pole {
                PoleKind::Source => magnet.source_pole(params.half_length),
                PoleKind::Sink => magnet.sink_pole(params.half_length),
            };
            let start = l.line.points[0];
            assert!((start.distance(pole.position) - params.seed_radius).abs() < 1e-9);
        }
    }

    #[test]
    fn hidden_magnet_does_not_bend_the_other_lines() {
        let mut both = quick_scene();
        both.set_visible(1, false).unwrap();
        let mut alone = quick_scene();
        alone.set_position(1, DVec2::new(5000.0, 5000.0)).unwrap();
        alone.set_visible(1, false).unwrap();
        assert_eq!(both.field_lines(), alone.field_lines());
    }

    #[test]
    fn scene_sample_matches_free_function() {
        let s = scene();
        let p = DVec2::new(300.0, 150.0);
        assert_eq!(
            s.sample(p),
            crate::field_source::sample(p, s.magnets(), s.params())
        );
    }

    #[test]
    fn field_lines_serialize_with_flattened_trace() {
        let s = quick_scene();
        let lines = s.field_lines();
        let v = serde_json::to_value(&lines[0]).unwrap();
        assert_eq!(v["pole"], "source");
        assert_eq!(v["direction"], "outward");
        assert!(v["points"].is_array());
        assert!(v.get("termination").is_some());
    }
}
