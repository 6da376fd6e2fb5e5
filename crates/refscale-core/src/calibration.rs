//! Pixel-to-real-world scale calibration.

use tracing::{debug, info};

use crate::error::{Result, ScalerError};
use crate::geometry::Size;
use crate::reference::{Calibration, ReferenceImage};
use crate::units::DraftingScale;

/// Display pixels that should span `real_inches` on paper at `scale`.
pub fn target_pixels(real_inches: f64, scale: DraftingScale, pixels_per_inch: f64) -> f64 {
    scale.paper_inches(real_inches) * pixels_per_inch
}

/// Multiplier turning a measured `pixel_distance` into the calibrated one.
pub fn calibration_factor(
    pixel_distance: f64,
    real_inches: f64,
    scale: DraftingScale,
    pixels_per_inch: f64,
) -> f64 {
    target_pixels(real_inches, scale, pixels_per_inch) / pixel_distance
}

/// Scale `image` so that a line of `pixel_distance` display pixels spans
/// `real_inches` at `scale`.
///
/// Returns the applied factor. On rejection the image is untouched.
pub fn apply_calibration(
    image: &mut ReferenceImage,
    pixel_distance: f64,
    real_inches: f64,
    scale: DraftingScale,
    pixels_per_inch: f64,
    min_pixel_distance: f64,
) -> Result<f64> {
    if !pixel_distance.is_finite() || pixel_distance < min_pixel_distance {
        return Err(ScalerError::PixelDistanceTooSmall {
            distance: pixel_distance,
            minimum: min_pixel_distance,
        });
    }
    if !real_inches.is_finite() || real_inches <= 0.0 {
        return Err(ScalerError::InvalidDimensionInput(format!(
            "length must be positive, got {real_inches}"
        )));
    }

    let factor = calibration_factor(pixel_distance, real_inches, scale, pixels_per_inch);
    let new_size = image.size.scaled(factor);
    if !factor.is_finite() || !new_size.is_valid() {
        return Err(ScalerError::InvalidDimensionInput(format!(
            "calibration would produce an invalid size (factor {factor})"
        )));
    }

    // Measured on the current display; store it in native pixels.
    let native_per_display = image.original_width() as f64 / image.size.width;
    let calibration = Calibration {
        reference_pixel_distance: pixel_distance * native_per_display,
        reference_inches: real_inches,
    };

    image.size = new_size;
    image.scale_factor *= factor;
    image.calibration = Some(calibration);

    info!(
        image = %image.id(),
        factor,
        width = new_size.width,
        height = new_size.height,
        "Calibration applied"
    );
    Ok(factor)
}

/// Display size implied by `calibration` for a raster of `native_width x native_height`.
///
/// Computed from scratch on every call so repeated scale changes never
/// accumulate rounding drift.
pub fn derived_display_size(
    calibration: &Calibration,
    native_width: u32,
    native_height: u32,
    scale: DraftingScale,
    pixels_per_inch: f64,
) -> Size {
    let target = target_pixels(calibration.reference_inches, scale, pixels_per_inch);
    let width = native_width as f64 * target / calibration.reference_pixel_distance;
    Size::with_aspect_of(width, native_width, native_height)
}

/// Re-derive the display size of a calibrated image for a new drafting scale.
///
/// Returns `false` for images without calibration, which are left alone.
pub fn rederive(image: &mut ReferenceImage, scale: DraftingScale, pixels_per_inch: f64) -> bool {
    let Some(calibration) = image.calibration else {
        return false;
    };
    let size = derived_display_size(
        &calibration,
        image.original_width(),
        image.original_height(),
        scale,
        pixels_per_inch,
    );
    if !size.is_valid() {
        return false;
    }
    image.scale_factor *= size.width / image.size.width;
    image.size = size;
    debug!(image = %image.id(), width = size.width, height = size.height, "Display size re-derived");
    true
}

/// Real-world inches represented by a canvas distance at `scale`.
pub fn measure_inches(canvas_distance: f64, scale: DraftingScale, pixels_per_inch: f64) -> f64 {
    scale.real_inches(canvas_distance / pixels_per_inch)
}
