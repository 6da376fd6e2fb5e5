use thiserror::Error;

use crate::reference::ImageId;
use crate::tool::ToolKind;

#[derive(Error, Debug)]
pub enum ScalerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image format error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Degenerate point configuration: pick four non-collinear corners or two distinct points")]
    SingularSystem,

    #[error("Linear system shape mismatch: {rows}x{cols} matrix with {rhs} right-hand values")]
    ShapeMismatch { rows: usize, cols: usize, rhs: usize },

    #[error("Invalid dimension: {0}")]
    InvalidDimensionInput(String),

    #[error("Reference line too short: {distance:.1}px (minimum {minimum}px)")]
    PixelDistanceTooSmall { distance: f64, minimum: f64 },

    #[error("Crop selection too small: {width:.1}x{height:.1}px (minimum {minimum}px)")]
    CropTooSmall {
        width: f64,
        height: f64,
        minimum: f64,
    },

    #[error("Need {needed} points, got {got}")]
    InsufficientPoints { needed: usize, got: usize },

    #[error("Rectified image {width}x{height} exceeds the {limit} pixel limit")]
    RectifiedTooLarge { width: u32, height: u32, limit: u64 },

    #[error("Could not decode image: {0}")]
    Decode(String),

    #[error("Corrupt persisted record: {0}")]
    CorruptPersistedRecord(String),

    #[error("No image with id {0}")]
    ImageNotFound(ImageId),

    #[error("The {0} tool needs a selected image")]
    NoImageSelected(ToolKind),

    #[error("Invalid drafting scale: {0}")]
    InvalidDraftingScale(String),

    #[error("Unknown paper size: {0}")]
    InvalidPaperSize(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Export error: {0}")]
    Export(String),
}

pub type Result<T> = std::result::Result<T, ScalerError>;
