use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_INITIAL_FIT_FRACTION, DEFAULT_PIXELS_PER_INCH, DEFAULT_STORAGE_KEY,
    MAX_RECTIFIED_PIXELS, MIN_CROP_SIZE, MIN_PIXEL_DISTANCE,
};
use crate::error::{Result, ScalerError};

/// Tunables shared by every scale conversion and editing tool.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScalerConfig {
    /// Canvas pixels per paper inch.
    pub pixels_per_inch: f64,
    /// Shortest reference line accepted by the set-scale tool (display px).
    pub min_pixel_distance: f64,
    /// Smallest crop side accepted (display px).
    pub min_crop_size: f64,
    /// Upper bound on a rectified raster's pixel count.
    pub max_rectified_pixels: u64,
    /// Fraction of the paper a new image is fitted into (0.0..=1.0].
    pub initial_fit_fraction: f64,
    /// Sort perspective corners clockwise from top-left instead of trusting click order.
    pub sort_corners: bool,
    /// Key the board is stored under.
    pub storage_key: String,
}

impl Default for ScalerConfig {
    fn default() -> Self {
        Self {
            pixels_per_inch: DEFAULT_PIXELS_PER_INCH,
            min_pixel_distance: MIN_PIXEL_DISTANCE,
            min_crop_size: MIN_CROP_SIZE,
            max_rectified_pixels: MAX_RECTIFIED_PIXELS,
            initial_fit_fraction: DEFAULT_INITIAL_FIT_FRACTION,
            sort_corners: false,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
        }
    }
}

impl ScalerConfig {
    /// Reject values that would poison scale arithmetic.
    pub fn validate(&self) -> Result<()> {
        let positive = |name: &str, v: f64| {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(ScalerError::InvalidConfig(format!(
                    "{name} must be positive and finite, got {v}"
                )))
            }
        };
        positive("pixels_per_inch", self.pixels_per_inch)?;
        positive("min_pixel_distance", self.min_pixel_distance)?;
        positive("min_crop_size", self.min_crop_size)?;
        positive("initial_fit_fraction", self.initial_fit_fraction)?;
        if self.initial_fit_fraction > 1.0 {
            return Err(ScalerError::InvalidConfig(format!(
                "initial_fit_fraction must be at most 1.0, got {}",
                self.initial_fit_fraction
            )));
        }
        if self.max_rectified_pixels == 0 {
            return Err(ScalerError::InvalidConfig(
                "max_rectified_pixels must be > 0".into(),
            ));
        }
        if self.storage_key.trim().is_empty() {
            return Err(ScalerError::InvalidConfig("storage_key is empty".into()));
        }
        Ok(())
    }
}
