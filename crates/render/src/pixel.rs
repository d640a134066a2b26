//! RGBA8 raster and the few fill/stroke primitives the scene needs.
//!
//! Always available (no feature gate) so the PNG snapshot path and any
//! in-memory consumer share the same pixels. Coordinates are canvas units
//! with y pointing down; a pixel `(x, y)` covers `[x, x+1) x [y, y+1)` and is
//! tested at its centre.

use glam::DVec2;
use magnet_field_core::FieldError;

/// An opaque-or-not 8-bit colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::opaque(0xff, 0xff, 0xff);

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parses a hex color string like "#ff00aa" or "ff00aa" (case insensitive).
    ///
    /// Returns `FieldError::InvalidColor` if the input is not a valid 6-digit hex color.
    pub fn from_hex(hex: &str) -> Result<Rgba, FieldError> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(FieldError::InvalidColor(format!(
                "expected 6 hex digits, got '{hex}'"
            )));
        }
        let channel = |range: std::ops::Range<usize>, name: &str| {
            u8::from_str_radix(&hex[range], 16)
                .map_err(|e| FieldError::InvalidColor(format!("invalid {name} component: {e}")))
        };
        Ok(Rgba::opaque(
            channel(0..2, "red")?,
            channel(2..4, "green")?,
            channel(4..6, "blue")?,
        ))
    }

    fn bytes(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Row-major RGBA8 pixel buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl Raster {
    /// Largest raster `new` will allocate, in pixels (256 MiB of RGBA).
    pub const MAX_PIXELS: usize = 1 << 26;

    /// Creates a transparent-black raster.
    ///
    /// Returns `FieldError::InvalidDimensions` if either side is zero or the
    /// pixel count exceeds [`Raster::MAX_PIXELS`].
    pub fn new(width: usize, height: usize) -> Result<Self, FieldError> {
        if width == 0 || height == 0 {
            return Err(FieldError::InvalidDimensions);
        }
        let len = width
            .checked_mul(height)
            .filter(|&n| n <= Self::MAX_PIXELS)
            .ok_or(FieldError::InvalidDimensions)?
            * 4;
        Ok(Self {
            width,
            height,
            data: vec![0; len],
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Raw RGBA bytes, `width * height * 4` long.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Colour at `(x, y)`, or `None` outside the raster.
    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y * self.width + x) * 4;
        Some(Rgba {
            r: self.data[i],
            g: self.data[i + 1],
            b: self.data[i + 2],
            a: self.data[i + 3],
        })
    }

    /// Writes `color` at `(x, y)`; coordinates outside the raster are clipped.
    pub fn put(&mut self, x: i64, y: i64, color: Rgba) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let i = (y as usize * self.width + x as usize) * 4;
        self.data[i..i + 4].copy_from_slice(&color.bytes());
    }

    pub fn fill(&mut self, color: Rgba) {
        let bytes = color.bytes();
        self.data
            .chunks_exact_mut(4)
            .for_each(|px| px.copy_from_slice(&bytes));
    }

    /// One-pixel line from `a` to `b`, both endpoints included.
    pub fn stroke_line(&mut self, a: DVec2, b: DVec2, color: Rgba) {
        let delta = b - a;
        let steps = delta.x.abs().max(delta.y.abs()).ceil().max(1.0) as usize;
        for i in 0..=steps {
            let p = a + delta * (i as f64 / steps as f64);
            self.put(p.x.floor() as i64, p.y.floor() as i64, color);
        }
    }

    /// Strokes consecutive segments; a single point marks one pixel.
    pub fn stroke_polyline(&mut self, points: &[DVec2], color: Rgba) {
        match points {
            [] => {}
            [p] => self.put(p.x.floor() as i64, p.y.floor() as i64, color),
            _ => points
                .windows(2)
                .for_each(|seg| self.stroke_line(seg[0], seg[1], color)),
        }
    }

    /// Fills every pixel whose centre lies inside or on triangle `abc`.
    pub fn fill_triangle(&mut self, a: DVec2, b: DVec2, c: DVec2, color: Rgba) {
        let area = edge(a, b, c);
        if area == 0.0 || !area.is_finite() {
            return;
        }
        let min = a.min(b).min(c);
        let max = a.max(b).max(c);
        self.fill_where(min, max, color, |p| {
            let w0 = edge(b, c, p) * area;
            let w1 = edge(c, a, p) * area;
            let w2 = edge(a, b, p) * area;
            w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0
        });
    }

    /// Fills the rectangle `[local_min, local_max]` expressed in a frame
    /// centred on `center` and rotated by `angle` radians.
    pub fn fill_rotated_rect(
        &mut self,
        center: DVec2,
        angle: f64,
        local_min: DVec2,
        local_max: DVec2,
        color: Rgba,
    ) {
        let rot = DVec2::from_angle(angle);
        let corners = [
            local_min,
            DVec2::new(local_max.x, local_min.y),
            local_max,
            DVec2::new(local_min.x, local_max.y),
        ]
        .map(|c| center + rot.rotate(c));
        let min = corners.iter().fold(DVec2::INFINITY, |m, c| m.min(*c));
        let max = corners.iter().fold(DVec2::NEG_INFINITY, |m, c| m.max(*c));
        let inverse = DVec2::new(rot.x, -rot.y);
        self.fill_where(min, max, color, |p| {
            let local = inverse.rotate(p - center);
            local.x >= local_min.x
                && local.x <= local_max.x
                && local.y >= local_min.y
                && local.y <= local_max.y
        });
    }

    /// Visits pixel centres in the clipped bounding box `[min, max]`.
    fn fill_where(&mut self, min: DVec2, max: DVec2, color: Rgba, inside: impl Fn(DVec2) -> bool) {
        if !(min.is_finite() && max.is_finite()) {
            return;
        }
        let x0 = min.x.floor().max(0.0) as usize;
        let y0 = min.y.floor().max(0.0) as usize;
        let x1 = (max.x.ceil().max(0.0) as usize).min(self.width);
        let y1 = (max.y.ceil().max(0.0) as usize).min(self.height);
        for y in y0..y1 {
            for x in x0..x1 {
                if inside(DVec2::new(x as f64 + 0.5, y as f64 + 0.5)) {
                    self.put(x as i64, y as i64, color);
                }
            }
        }
    }
}

/// Twice the signed area of `abc`; the sign gives the winding.
fn edge(a: DVec2, b: DVec2, c: DVec2) -> f64 {
    (b - a).perp_dot(c - a)
}
