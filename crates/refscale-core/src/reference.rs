//! The placed reference image: working raster, pristine capture, placement
//! and calibration metadata.

use std::fmt;
use std::str::FromStr;

use image::RgbaImage;

use crate::error::{Result, ScalerError};
use crate::geometry::{CanvasPoint, ImageFrame, Size};
use crate::raster::PristineRaster;

/// Opaque identifier of an image on a board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageId(pub u64);

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "img-{}", self.0)
    }
}

impl FromStr for ImageId {
    type Err = ScalerError;

    fn from_str(s: &str) -> Result<Self> {
        let digits = s.trim().strip_prefix("img-").unwrap_or(s.trim());
        digits
            .parse::<u64>()
            .map(ImageId)
            .map_err(|_| ScalerError::CorruptPersistedRecord(format!("bad image id '{s}'")))
    }
}

/// The last scale-setting measurement of an image.
///
/// `reference_pixel_distance` is stored in native raster pixels, so the
/// display size can be re-derived from the raster width alone whatever the
/// image's current display size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Calibration {
    pub reference_pixel_distance: f64,
    pub reference_inches: f64,
}

impl Calibration {
    pub fn is_valid(&self) -> bool {
        self.reference_pixel_distance.is_finite()
            && self.reference_pixel_distance > 0.0
            && self.reference_inches.is_finite()
            && self.reference_inches > 0.0
    }
}

#[derive(Clone, Debug)]
pub struct ReferenceImage {
    id: ImageId,
    name: Option<String>,
    pixels: RgbaImage,
    pristine: PristineRaster,
    pub(crate) position: CanvasPoint,
    pub(crate) size: Size,
    pub(crate) scale_factor: f64,
    pub(crate) calibration: Option<Calibration>,
}

impl ReferenceImage {
    /// Create an image whose pristine capture is taken from `pixels`.
    pub(crate) fn new(id: ImageId, pixels: RgbaImage, position: CanvasPoint, size: Size) -> Self {
        let pristine = PristineRaster::capture(&pixels);
        Self {
            id,
            name: None,
            pixels,
            pristine,
            position,
            size,
            scale_factor: 1.0,
            calibration: None,
        }
    }

    /// Rebuild an image from persisted parts; the caller has validated them.
    pub(crate) fn restore(
        id: ImageId,
        pixels: RgbaImage,
        pristine: PristineRaster,
        position: CanvasPoint,
        size: Size,
        scale_factor: f64,
        calibration: Option<Calibration>,
    ) -> Self {
        Self {
            id,
            name: None,
            pixels,
            pristine,
            position,
            size,
            scale_factor,
            calibration,
        }
    }

    pub(crate) fn with_name(mut self, name: Option<String>) -> Self {
        self.name = name;
        self
    }

    pub fn id(&self) -> ImageId {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn pristine(&self) -> &PristineRaster {
        &self.pristine
    }

    pub fn original_width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn original_height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn position(&self) -> CanvasPoint {
        self.position
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    pub fn calibration(&self) -> Option<Calibration> {
        self.calibration
    }

    pub fn frame(&self) -> ImageFrame {
        ImageFrame {
            position: self.position,
            size: self.size,
            native_width: self.pixels.width(),
            native_height: self.pixels.height(),
        }
    }

    /// Swap in a new working raster in one step, keeping the display width
    /// and deriving the height from the new aspect ratio.
    pub(crate) fn replace_pixels(&mut self, pixels: RgbaImage) {
        self.size = Size::with_aspect_of(self.size.width, pixels.width(), pixels.height());
        self.pixels = pixels;
    }

    /// Restore the pristine raster and drop calibration.
    pub(crate) fn reset(&mut self) {
        let restored = self.pristine.to_working();
        self.replace_pixels(restored);
        self.calibration = None;
    }
}
