//! Handing placed images to a document generator in physical units.

mod pdf;

pub use pdf::PdfSink;

use image::RgbaImage;
use tracing::{info, warn};

use crate::board::Board;
use crate::error::{Result, ScalerError};
use crate::reference::{ImageId, ReferenceImage};

/// One image's raster and its rectangle on the paper, in inches from the
/// paper's top-left corner.
#[derive(Clone, Copy, Debug)]
pub struct Placement<'a> {
    pub id: ImageId,
    pub raster: &'a RgbaImage,
    pub x_in: f64,
    pub y_in: f64,
    pub w_in: f64,
    pub h_in: f64,
}

impl<'a> Placement<'a> {
    pub fn of(image: &'a ReferenceImage, pixels_per_inch: f64) -> Self {
        let position = image.position();
        let size = image.size();
        Self {
            id: image.id(),
            raster: image.pixels(),
            x_in: position.x / pixels_per_inch,
            y_in: position.y / pixels_per_inch,
            w_in: size.width / pixels_per_inch,
            h_in: size.height / pixels_per_inch,
        }
    }

    pub fn is_valid(&self) -> bool {
        [self.x_in, self.y_in, self.w_in, self.h_in]
            .iter()
            .all(|v| v.is_finite())
            && self.w_in > 0.0
            && self.h_in > 0.0
            && self.raster.width() > 0
            && self.raster.height() > 0
    }
}

/// A document generator that accepts placed images one at a time.
pub trait DocumentSink {
    fn add_image(&mut self, placement: &Placement<'_>) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct ExportReport {
    pub placed: Vec<ImageId>,
    pub skipped: Vec<(ImageId, ScalerError)>,
}

/// Feed every image on `board`, bottom to top, into `sink`.
///
/// An image the sink rejects is logged and skipped; the rest still go out.
pub fn export_board<S: DocumentSink + ?Sized>(board: &Board, sink: &mut S) -> ExportReport {
    let ppi = board.pixels_per_inch();
    let mut report = ExportReport::default();
    for image in board.images() {
        let placement = Placement::of(image, ppi);
        let result = if placement.is_valid() {
            sink.add_image(&placement)
        } else {
            Err(ScalerError::Export(format!("{} has no valid placement", image.id())))
        };
        match result {
            Ok(()) => report.placed.push(image.id()),
            Err(e) => {
                warn!(image = %image.id(), error = %e, "Skipping image in export");
                report.skipped.push((image.id(), e));
            }
        }
    }
    info!(placed = report.placed.len(), skipped = report.skipped.len(), "Export done");
    report
}
