//! Serialized board shape and load-time validation.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::board::{Board, Orientation, PaperSize};
use crate::config::ScalerConfig;
use crate::error::{Result, ScalerError};
use crate::geometry::{CanvasPoint, Size};
use crate::raster::{from_data_url, to_data_url, PristineRaster};
use crate::reference::{Calibration, ImageId, ReferenceImage};
use crate::units::DraftingScale;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardRecord {
    pub paper_size: PaperSize,
    pub orientation: Orientation,
    pub drafting_scale_value: f64,
    pub images: Vec<ImageRecord>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRecord {
    pub id: String,
    /// Working raster as a PNG data URL.
    pub src: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pristine_src: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub original_width: u32,
    pub original_height: u32,
    pub scale_factor: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_pixels: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_inches: Option<f64>,
}

impl ImageRecord {
    pub fn from_image(image: &ReferenceImage) -> Result<Self> {
        let calibration = image.calibration();
        Ok(Self {
            id: image.id().to_string(),
            src: to_data_url(image.pixels())?,
            pristine_src: Some(to_data_url(image.pristine().raster())?),
            name: image.name().map(str::to_string),
            x: image.position().x,
            y: image.position().y,
            width: image.size().width,
            height: image.size().height,
            original_width: image.original_width(),
            original_height: image.original_height(),
            scale_factor: image.scale_factor(),
            reference_pixels: calibration.map(|c| c.reference_pixel_distance),
            reference_inches: calibration.map(|c| c.reference_inches),
        })
    }

    /// Validate every field and decode the rasters.
    pub fn into_image(self) -> Result<ReferenceImage> {
        let corrupt = |what: String| ScalerError::CorruptPersistedRecord(format!("{}: {what}", self.id));

        let id: ImageId = self.id.parse()?;
        if id.0 == u64::MAX {
            return Err(corrupt("id is out of range".into()));
        }
        let position = CanvasPoint::new(self.x, self.y);
        if !position.is_finite() {
            return Err(corrupt(format!("position ({}, {}) is not finite", self.x, self.y)));
        }
        let size = Size::new(self.width, self.height);
        if !size.is_valid() {
            return Err(corrupt(format!("size {}x{} is not positive", self.width, self.height)));
        }
        if !(self.scale_factor.is_finite() && self.scale_factor > 0.0) {
            return Err(corrupt(format!("scale factor {} is not positive", self.scale_factor)));
        }

        let calibration = match (self.reference_pixels, self.reference_inches) {
            (None, None) => None,
            (Some(pixels), Some(inches)) => {
                let calibration = Calibration {
                    reference_pixel_distance: pixels,
                    reference_inches: inches,
                };
                if !calibration.is_valid() {
                    return Err(corrupt(format!("calibration {pixels}px = {inches}in is not positive")));
                }
                Some(calibration)
            }
            _ => return Err(corrupt("calibration is incomplete".into())),
        };

        let pixels = from_data_url(&self.src).map_err(|e| corrupt(e.to_string()))?;
        if pixels.dimensions() != (self.original_width, self.original_height) {
            return Err(corrupt(format!(
                "raster is {}x{} but record says {}x{}",
                pixels.width(),
                pixels.height(),
                self.original_width,
                self.original_height
            )));
        }
        let pristine = match &self.pristine_src {
            Some(url) => PristineRaster::from_owned(from_data_url(url).map_err(|e| corrupt(e.to_string()))?),
            None => PristineRaster::capture(&pixels),
        };

        Ok(ReferenceImage::restore(id, pixels, pristine, position, size, self.scale_factor, calibration)
            .with_name(self.name))
    }
}

impl Board {
    pub fn to_record(&self) -> Result<BoardRecord> {
        Ok(BoardRecord {
            paper_size: self.paper,
            orientation: self.orientation,
            drafting_scale_value: self.drafting_scale.value(),
            images: self
                .images
                .iter()
                .map(ImageRecord::from_image)
                .collect::<Result<_>>()?,
        })
    }

    /// Build a board from a typed record; invalid images are dropped.
    pub fn from_record(record: BoardRecord, config: ScalerConfig) -> Self {
        let mut board = Board::new(config);
        board.paper = record.paper_size;
        board.orientation = record.orientation;
        board.drafting_scale = DraftingScale::new(record.drafting_scale_value).unwrap_or_else(|e| {
            warn!(error = %e, "Stored drafting scale rejected, using default");
            DraftingScale::default()
        });
        restore_images(&mut board, record.images.into_iter().map(Ok));
        board
    }
}

/// Build a board from raw JSON, validating each field on its own.
///
/// Board-level fields that fail fall back to defaults. Each image entry is
/// decoded separately, so a malformed one (a `null` where a number belongs,
/// a bad raster) is dropped without affecting the others.
pub fn board_from_json(value: &Value, config: ScalerConfig) -> Result<Board> {
    let object = value
        .as_object()
        .ok_or_else(|| ScalerError::CorruptPersistedRecord("board record is not an object".into()))?;

    let mut board = Board::new(config);
    board.paper = field_or_default(object.get("paperSize"), "paperSize");
    board.orientation = field_or_default(object.get("orientation"), "orientation");
    board.drafting_scale = object
        .get("draftingScaleValue")
        .and_then(Value::as_f64)
        .ok_or_else(|| ScalerError::InvalidDraftingScale("missing".into()))
        .and_then(DraftingScale::new)
        .unwrap_or_else(|e| {
            warn!(error = %e, "Stored drafting scale rejected, using default");
            DraftingScale::default()
        });

    let entries = object
        .get("images")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();
    let records = entries
        .iter()
        .map(|entry| serde_json::from_value::<ImageRecord>(entry.clone()).map_err(ScalerError::from));
    restore_images(&mut board, records);
    Ok(board)
}

fn field_or_default<T>(value: Option<&Value>, name: &str) -> T
where
    T: Default + for<'de> Deserialize<'de>,
{
    match value.map(|v| serde_json::from_value::<T>(v.clone())) {
        Some(Ok(v)) => v,
        Some(Err(e)) => {
            warn!(field = name, error = %e, "Stored field rejected, using default");
            T::default()
        }
        None => T::default(),
    }
}

fn restore_images<I>(board: &mut Board, records: I)
where
    I: IntoIterator<Item = Result<ImageRecord>>,
{
    let mut seen = HashSet::new();
    for (index, record) in records.into_iter().enumerate() {
        let image = record.and_then(ImageRecord::into_image).and_then(|image| {
            if seen.insert(image.id()) {
                Ok(image)
            } else {
                Err(ScalerError::CorruptPersistedRecord(format!("duplicate id {}", image.id())))
            }
        });
        match image {
            Ok(image) => board.insert_restored(image),
            Err(e) => warn!(index, error = %e, "Dropping stored image"),
        }
    }
}
