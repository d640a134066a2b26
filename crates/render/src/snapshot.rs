//! PNG output of a [`Raster`].
//!
//! This module is feature-gated behind `png` (default on) so that consumers
//! that only need the pixel buffer do not pull in the `image` crate.

use std::path::Path;

use magnet_field_core::FieldError;

use crate::pixel::Raster;

/// Writes the raster as an RGBA PNG.
///
/// Returns `FieldError::InvalidDimensions` if the raster dimensions overflow
/// `u32`, or `FieldError::Io` on write failure.
pub fn write_png(raster: &Raster, path: &Path) -> Result<(), FieldError> {
    let w = u32::try_from(raster.width()).map_err(|_| FieldError::InvalidDimensions)?;
    let h = u32::try_from(raster.height()).map_err(|_| FieldError::InvalidDimensions)?;
    let img = image::RgbaImage::from_raw(w, h, raster.data().to_vec())
        .ok_or_else(|| FieldError::Io("RGBA buffer size mismatch".into()))?;
    img.save(path).map_err(|e| FieldError::Io(e.to_string()))
}
