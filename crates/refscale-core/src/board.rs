//! The board: paper, drafting scale and the ordered reference images.

use std::fmt;
use std::str::FromStr;

use image::RgbaImage;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::calibration::{apply_calibration, rederive};
use crate::config::ScalerConfig;
use crate::consts::PLACEMENT_CASCADE_STEP;
use crate::crop::{crop_image, CropRect};
use crate::error::{Result, ScalerError};
use crate::geometry::{CanvasPoint, LocalPoint, Size};
use crate::raster::decode_image;
use crate::rectify::{rectify_image, RectifyOptions};
use crate::reference::{ImageId, ReferenceImage};
use crate::units::DraftingScale;

/// Known physical paper sizes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaperSize {
    #[default]
    Letter,
    Legal,
    Tabloid,
    A4,
    A3,
    ArchC,
    ArchD,
}

impl PaperSize {
    pub const ALL: &[Self] = &[
        Self::Letter,
        Self::Legal,
        Self::Tabloid,
        Self::A4,
        Self::A3,
        Self::ArchC,
        Self::ArchD,
    ];

    /// Portrait `(width, height)` in inches.
    pub fn inches(&self) -> (f64, f64) {
        match self {
            Self::Letter => (8.5, 11.0),
            Self::Legal => (8.5, 14.0),
            Self::Tabloid => (11.0, 17.0),
            Self::A4 => (210.0 / 25.4, 297.0 / 25.4),
            Self::A3 => (297.0 / 25.4, 420.0 / 25.4),
            Self::ArchC => (18.0, 24.0),
            Self::ArchD => (24.0, 36.0),
        }
    }
}

impl fmt::Display for PaperSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Letter => write!(f, "letter"),
            Self::Legal => write!(f, "legal"),
            Self::Tabloid => write!(f, "tabloid"),
            Self::A4 => write!(f, "a4"),
            Self::A3 => write!(f, "a3"),
            Self::ArchC => write!(f, "archc"),
            Self::ArchD => write!(f, "archd"),
        }
    }
}

impl FromStr for PaperSize {
    type Err = ScalerError;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().to_ascii_lowercase().replace([' ', '-', '_'], "");
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.to_string() == key)
            .ok_or_else(|| ScalerError::InvalidPaperSize(s.to_string()))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Portrait => write!(f, "portrait"),
            Self::Landscape => write!(f, "landscape"),
        }
    }
}

impl FromStr for Orientation {
    type Err = ScalerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "portrait" => Ok(Self::Portrait),
            "landscape" => Ok(Self::Landscape),
            other => Err(ScalerError::InvalidPaperSize(format!("orientation '{other}'"))),
        }
    }
}

/// Outcome of a multi-file ingest.
#[derive(Debug, Default)]
pub struct IngestReport {
    pub added: Vec<ImageId>,
    pub failed: Vec<(String, ScalerError)>,
}

#[derive(Clone, Debug)]
pub struct Board {
    pub(crate) paper: PaperSize,
    pub(crate) orientation: Orientation,
    pub(crate) drafting_scale: DraftingScale,
    pub(crate) config: ScalerConfig,
    pub(crate) images: Vec<ReferenceImage>,
    pub(crate) next_id: u64,
}

impl Default for Board {
    fn default() -> Self {
        Self::new(ScalerConfig::default())
    }
}

impl Board {
    pub fn new(config: ScalerConfig) -> Self {
        Self {
            paper: PaperSize::default(),
            orientation: Orientation::default(),
            drafting_scale: DraftingScale::default(),
            config,
            images: Vec::new(),
            next_id: 1,
        }
    }

    pub fn config(&self) -> &ScalerConfig {
        &self.config
    }

    pub fn pixels_per_inch(&self) -> f64 {
        self.config.pixels_per_inch
    }

    pub fn paper(&self) -> PaperSize {
        self.paper
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn set_paper(&mut self, paper: PaperSize, orientation: Orientation) {
        self.paper = paper;
        self.orientation = orientation;
        debug!(%paper, %orientation, "Paper changed");
    }

    /// Paper `(width, height)` in inches, honoring orientation.
    pub fn paper_inches(&self) -> (f64, f64) {
        let (w, h) = self.paper.inches();
        match self.orientation {
            Orientation::Portrait => (w, h),
            Orientation::Landscape => (h, w),
        }
    }

    /// Paper size in canvas pixels.
    pub fn paper_pixels(&self) -> Size {
        let (w, h) = self.paper_inches();
        Size::new(w * self.pixels_per_inch(), h * self.pixels_per_inch())
    }

    pub fn drafting_scale(&self) -> DraftingScale {
        self.drafting_scale
    }

    /// Change the drafting scale and re-derive every calibrated image's size.
    pub fn set_drafting_scale(&mut self, scale: DraftingScale) {
        self.drafting_scale = scale;
        let ppi = self.pixels_per_inch();
        let updated = self
            .images
            .iter_mut()
            .map(|img| rederive(img, scale, ppi))
            .filter(|&changed| changed)
            .count();
        info!(scale = %scale, updated, "Drafting scale changed");
    }

    pub fn images(&self) -> &[ReferenceImage] {
        &self.images
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn get(&self, id: ImageId) -> Result<&ReferenceImage> {
        self.images
            .iter()
            .find(|img| img.id() == id)
            .ok_or(ScalerError::ImageNotFound(id))
    }

    fn get_mut(&mut self, id: ImageId) -> Result<&mut ReferenceImage> {
        self.images
            .iter_mut()
            .find(|img| img.id() == id)
            .ok_or(ScalerError::ImageNotFound(id))
    }

    /// Place a decoded raster on the board, fitted into the configured
    /// fraction of the paper and cascaded from the top-left corner.
    ///
    /// An empty raster is rejected and nothing is added.
    pub fn add(&mut self, raster: RgbaImage, name: Option<String>) -> Result<ImageId> {
        if raster.width() == 0 || raster.height() == 0 {
            return Err(ScalerError::InvalidDimensionInput(format!(
                "image is {}x{} pixels",
                raster.width(),
                raster.height()
            )));
        }
        let next_id = self
            .next_id
            .checked_add(1)
            .ok_or_else(|| ScalerError::InvalidDimensionInput("no image ids left".into()))?;
        let id = ImageId(self.next_id);
        self.next_id = next_id;

        let paper = self.paper_pixels();
        let fit = self.config.initial_fit_fraction;
        let (w, h) = (raster.width() as f64, raster.height() as f64);
        let scale = (paper.width * fit / w).min(paper.height * fit / h).min(1.0);
        let size = Size::new(w * scale, h * scale);

        let step = PLACEMENT_CASCADE_STEP * self.images.len() as f64;
        let position = CanvasPoint::new(step, step);

        let image = ReferenceImage::new(id, raster, position, size).with_name(name);
        info!(image = %id, width = size.width, height = size.height, "Image added");
        self.images.push(image);
        Ok(id)
    }

    /// Decode raw bytes and add the result. Nothing is added on decode failure.
    pub fn add_encoded(&mut self, bytes: &[u8], name: Option<String>) -> Result<ImageId> {
        let raster = decode_image(bytes)?;
        self.add(raster, name)
    }

    /// Add several files; a file that fails to decode is reported and skipped.
    pub fn ingest<I, N>(&mut self, files: I) -> IngestReport
    where
        I: IntoIterator<Item = (N, Vec<u8>)>,
        N: Into<String>,
    {
        let mut report = IngestReport::default();
        for (name, bytes) in files {
            let name = name.into();
            match self.add_encoded(&bytes, Some(name.clone())) {
                Ok(id) => report.added.push(id),
                Err(e) => {
                    warn!(file = %name, error = %e, "Skipping unreadable image");
                    report.failed.push((name, e));
                }
            }
        }
        report
    }

    /// Restore a previously built image, e.g. from persistence.
    pub(crate) fn insert_restored(&mut self, image: ReferenceImage) {
        self.next_id = self.next_id.max(image.id().0.saturating_add(1));
        self.images.push(image);
    }

    pub fn move_image(&mut self, id: ImageId, position: CanvasPoint) -> Result<()> {
        if !position.is_finite() {
            return Err(ScalerError::InvalidDimensionInput(format!(
                "position {position} is not finite"
            )));
        }
        self.get_mut(id)?.position = position;
        debug!(image = %id, %position, "Image moved");
        Ok(())
    }

    /// Restore the pristine raster. Always succeeds for an existing image.
    pub fn reset_image(&mut self, id: ImageId) -> Result<()> {
        self.get_mut(id)?.reset();
        info!(image = %id, "Image reset to original");
        Ok(())
    }

    pub fn remove_image(&mut self, id: ImageId) -> Result<ReferenceImage> {
        let index = self
            .images
            .iter()
            .position(|img| img.id() == id)
            .ok_or(ScalerError::ImageNotFound(id))?;
        info!(image = %id, "Image removed");
        Ok(self.images.remove(index))
    }

    /// Move an image to the top of the z-order.
    pub fn bring_to_front(&mut self, id: ImageId) -> Result<()> {
        let index = self
            .images
            .iter()
            .position(|img| img.id() == id)
            .ok_or(ScalerError::ImageNotFound(id))?;
        let image = self.images.remove(index);
        self.images.push(image);
        Ok(())
    }

    /// Topmost image under a canvas point.
    pub fn image_at(&self, p: CanvasPoint) -> Option<ImageId> {
        self.images
            .iter()
            .rev()
            .find(|img| img.frame().contains_canvas(p))
            .map(|img| img.id())
    }

    /// Calibrate from a display-space line length and a real-world length in inches.
    pub fn calibrate(&mut self, id: ImageId, pixel_distance: f64, real_inches: f64) -> Result<f64> {
        let scale = self.drafting_scale;
        let ppi = self.pixels_per_inch();
        let min = self.config.min_pixel_distance;
        apply_calibration(self.get_mut(id)?, pixel_distance, real_inches, scale, ppi, min)
    }

    pub fn crop(&mut self, id: ImageId, a: LocalPoint, b: LocalPoint) -> Result<CropRect> {
        let min = self.config.min_crop_size;
        crop_image(self.get_mut(id)?, a, b, min)
    }

    pub fn rectify(&mut self, id: ImageId, corners: &[LocalPoint]) -> Result<()> {
        let options = RectifyOptions {
            max_pixels: self.config.max_rectified_pixels,
            sort_corners: self.config.sort_corners,
        };
        rectify_image(self.get_mut(id)?, corners, options)
    }
}
