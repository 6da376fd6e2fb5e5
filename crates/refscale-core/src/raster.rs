//! RGBA raster buffers: decoding, encoding, and the immutable pristine capture.

use std::io::Cursor;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::{ImageFormat, RgbaImage};

use crate::error::{Result, ScalerError};

const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// Snapshot of an image's raster as first added.
///
/// Shared read-only; there is no way to obtain a mutable reference, so the
/// working buffer can never alias it.
#[derive(Clone, Debug)]
pub struct PristineRaster(Arc<RgbaImage>);

impl PristineRaster {
    pub fn capture(raster: &RgbaImage) -> Self {
        Self(Arc::new(raster.clone()))
    }

    pub fn from_owned(raster: RgbaImage) -> Self {
        Self(Arc::new(raster))
    }

    pub fn raster(&self) -> &RgbaImage {
        &self.0
    }

    /// A fresh working copy of the pristine pixels.
    pub fn to_working(&self) -> RgbaImage {
        self.0.as_ref().clone()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.0.dimensions()
    }
}

/// Decode raw file bytes (any format the `image` crate recognizes) to RGBA.
pub fn decode_image(bytes: &[u8]) -> Result<RgbaImage> {
    let img = image::load_from_memory(bytes).map_err(|e| ScalerError::Decode(e.to_string()))?;
    let rgba = img.to_rgba8();
    if rgba.width() == 0 || rgba.height() == 0 {
        return Err(ScalerError::Decode("image has zero width or height".into()));
    }
    Ok(rgba)
}

/// Encode a raster as PNG bytes.
pub fn encode_png(raster: &RgbaImage) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    raster.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
    Ok(buf)
}

/// Encode a raster as a `data:image/png;base64,...` URL.
pub fn to_data_url(raster: &RgbaImage) -> Result<String> {
    let png = encode_png(raster)?;
    Ok(format!("{PNG_DATA_URL_PREFIX}{}", STANDARD.encode(png)))
}

/// Decode a `data:<mime>;base64,...` URL to RGBA.
pub fn from_data_url(url: &str) -> Result<RgbaImage> {
    let payload = url
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(";base64,"))
        .map(|(_, data)| data)
        .ok_or_else(|| ScalerError::Decode("not a base64 data URL".into()))?;
    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| ScalerError::Decode(e.to_string()))?;
    decode_image(&bytes)
}
