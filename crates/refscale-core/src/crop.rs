use image::imageops;
use tracing::info;

use crate::error::{Result, ScalerError};
use crate::geometry::{ImageFrame, LocalPoint, Size};
use crate::reference::ReferenceImage;

/// A rectangle in native image pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRect {
    /// Check the rect is non-empty and lies within `src_w x src_h`.
    pub fn validated(&self, src_w: u32, src_h: u32) -> Result<CropRect> {
        if self.width == 0 || self.height == 0 {
            return Err(ScalerError::CropTooSmall {
                width: self.width as f64,
                height: self.height as f64,
                minimum: 1.0,
            });
        }

        if self.x as u64 + self.width as u64 > src_w as u64
            || self.y as u64 + self.height as u64 > src_h as u64
        {
            return Err(ScalerError::InvalidDimensionInput(format!(
                "Crop region ({},{} {}x{}) exceeds image dimensions ({src_w}x{src_h})",
                self.x, self.y, self.width, self.height
            )));
        }

        Ok(self.clone())
    }
}

/// Map two display-space corners to a native pixel rectangle.
///
/// The selection is clipped to the image first; what remains must be at
/// least `min_size` display pixels on both sides. It is then rounded to
/// whole native pixels.
pub fn display_rect_to_pixels(
    frame: &ImageFrame,
    a: LocalPoint,
    b: LocalPoint,
    min_size: f64,
) -> Result<CropRect> {
    let x0 = a.x.min(b.x).clamp(0.0, frame.size.width);
    let y0 = a.y.min(b.y).clamp(0.0, frame.size.height);
    let x1 = a.x.max(b.x).clamp(0.0, frame.size.width);
    let y1 = a.y.max(b.y).clamp(0.0, frame.size.height);

    let width = x1 - x0;
    let height = y1 - y0;
    if !(width >= min_size && height >= min_size) {
        return Err(ScalerError::CropTooSmall {
            width,
            height,
            minimum: min_size,
        });
    }

    let p0 = frame.local_to_pixel(LocalPoint::new(x0, y0));
    let p1 = frame.local_to_pixel(LocalPoint::new(x1, y1));

    let px0 = (p0.x.round() as u32).min(frame.native_width);
    let py0 = (p0.y.round() as u32).min(frame.native_height);
    let px1 = (p1.x.round() as u32).min(frame.native_width);
    let py1 = (p1.y.round() as u32).min(frame.native_height);

    CropRect {
        x: px0,
        y: py0,
        width: px1.saturating_sub(px0),
        height: py1.saturating_sub(py0),
    }
    .validated(frame.native_width, frame.native_height)
}

/// Crop `image` to the display-space rectangle spanned by `a` and `b`.
///
/// The position is kept, and the display size follows the cropped region at
/// the image's current display scale. Calibration survives since it is
/// stored in native pixels. On error the image is untouched.
pub fn crop_image(
    image: &mut ReferenceImage,
    a: LocalPoint,
    b: LocalPoint,
    min_size: f64,
) -> Result<CropRect> {
    let frame = image.frame();
    let rect = display_rect_to_pixels(&frame, a, b, min_size)?;

    let cropped = imageops::crop_imm(image.pixels(), rect.x, rect.y, rect.width, rect.height).to_image();

    let (rx, _) = frame.pixel_ratio();
    let display_width = rect.width as f64 / rx;
    image.replace_pixels(cropped);
    image.size = Size::with_aspect_of(display_width, rect.width, rect.height);

    info!(
        image = %image.id(),
        x = rect.x,
        y = rect.y,
        width = rect.width,
        height = rect.height,
        "Image cropped"
    );
    Ok(rect)
}
