#![deny(unsafe_code)]
//! Core types for the magnet-field visualizer.
//!
//! Provides `Magnet`/`Pole` poses, `FieldParams`, the `FieldSource` trait with
//! the superposed pole field (`MagnetField`, `sample`), seed rings, the
//! fixed-step line tracer (`trace`), and the interactive `Scene` that ties
//! them together for a presentation layer.

pub mod error;
pub mod field_source;
pub mod magnet;
pub mod params;
pub mod scene;
pub mod seed;
pub mod tracer;

pub use error::FieldError;
pub use field_source::{sample, FieldSource, MagnetField, PointPole};
pub use magnet::{Magnet, Pole, PoleKind};
pub use params::FieldParams;
pub use scene::{DragState, FieldLine, Scene, SceneEvent, MAGNET_COUNT};
pub use seed::seed_ring;
pub use tracer::{trace, ArrowAnchor, Bounds, Direction, Termination, TraceSettings, TracedLine};
