#![deny(unsafe_code)]
//! CPU-side drawing of a magnet-field scene.
//!
//! This crate is the presentation side of `magnet-field-core`: it takes the
//! magnet poses and the traced [`FieldLine`]s a [`Scene`] hands back and
//! rasterizes them. Pole labels are not drawn; each half of a magnet is
//! coloured instead.

pub mod pixel;

#[cfg(feature = "png")]
pub mod snapshot;

use glam::DVec2;
use log::debug;
use magnet_field_core::{FieldError, FieldLine, Scene, MAGNET_COUNT};

pub use pixel::{Raster, Rgba};

/// Colours and sizes used by [`draw_scene`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Style {
    pub background: Rgba,
    pub line: Rgba,
    pub arrow: Rgba,
    /// Source-half colour per magnet slot.
    pub magnets: [Rgba; MAGNET_COUNT],
    /// Sink-half colour shared by every magnet.
    pub sink: Rgba,
    /// Arrowhead length; its base is half as wide.
    pub arrow_size: f64,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            background: Rgba::WHITE,
            line: Rgba::opaque(0x33, 0x33, 0x33),
            arrow: Rgba::opaque(0x33, 0x33, 0x33),
            magnets: [Rgba::opaque(0xff, 0, 0), Rgba::opaque(0, 0x80, 0)],
            sink: Rgba::opaque(0, 0, 0xff),
            arrow_size: 8.0,
        }
    }
}

/// Renders the visible magnets, then every line and its arrowhead on top.
///
/// The raster covers the scene's domain, rounded up to whole pixels.
pub fn draw_scene(scene: &Scene, lines: &[FieldLine], style: &Style) -> Result<Raster, FieldError> {
    let params = scene.params();
    let mut raster = Raster::new(
        params.width.ceil() as usize,
        params.height.ceil() as usize,
    )?;
    raster.fill(style.background);

    let half_len = params.half_length;
    let half_w = params.magnet_width / 2.0;
    for (slot, magnet) in scene.magnets().iter().enumerate() {
        if !magnet.visible {
            continue;
        }
        let angle = magnet.angle.to_radians();
        let source_color = style.magnets.get(slot).copied().unwrap_or(style.line);
        raster.fill_rotated_rect(
            magnet.position,
            angle,
            DVec2::new(-half_len, -half_w),
            DVec2::new(0.0, half_w),
            source_color,
        );
        raster.fill_rotated_rect(
            magnet.position,
            angle,
            DVec2::new(0.0, -half_w),
            DVec2::new(half_len, half_w),
            style.sink,
        );
    }

    let mut arrows = 0;
    for field_line in lines {
        raster.stroke_polyline(&field_line.line.points, style.line);
        if let Some(anchor) = field_line.line.arrow {
            draw_arrowhead(&mut raster, anchor.position, anchor.angle, style.arrow_size, style.arrow);
            arrows += 1;
        }
    }
    debug!(
        "drew {} lines ({arrows} arrows) on {}x{} raster",
        lines.len(),
        raster.width(),
        raster.height()
    );
    Ok(raster)
}

/// Triangle with its tip at `tip`, pointing along `angle` radians.
pub fn draw_arrowhead(raster: &mut Raster, tip: DVec2, angle: f64, size: f64, color: Rgba) {
    let rot = DVec2::from_angle(angle);
    let back_left = tip + rot.rotate(DVec2::new(-size, -size / 2.0));
    let back_right = tip + rot.rotate(DVec2::new(-size, size / 2.0));
    raster.fill_triangle(tip, back_left, back_right, color);
}
