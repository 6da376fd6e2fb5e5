//! Perspective rectification by backward mapping through a homography.

use image::RgbaImage;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::consts::PARALLEL_PIXEL_THRESHOLD;
use crate::error::{Result, ScalerError};
use crate::geometry::{order_corners, LocalPoint, PixelPoint};
use crate::homography::Homography;
use crate::reference::ReferenceImage;

/// Options for [`rectify_image`].
#[derive(Clone, Copy, Debug)]
pub struct RectifyOptions {
    /// Reject outputs with more pixels than this.
    pub max_pixels: u64,
    /// Sort corners clockwise from top-left instead of trusting click order.
    pub sort_corners: bool,
}

/// Output size for a source quadrilateral: the longer of each pair of
/// opposing edges, rounded to whole pixels.
pub fn output_dimensions(quad: &[PixelPoint; 4]) -> (u32, u32) {
    let top = quad[0].distance_to(&quad[1]);
    let bottom = quad[3].distance_to(&quad[2]);
    let right = quad[1].distance_to(&quad[2]);
    let left = quad[0].distance_to(&quad[3]);
    let w = top.max(bottom).round();
    let h = right.max(left).round();
    let clamp = |v: f64| if v.is_finite() && v > 0.0 { v.min(u32::MAX as f64) as u32 } else { 0 };
    (clamp(w), clamp(h))
}

/// Resample the quadrilateral `quad` of `src` into an axis-aligned raster.
///
/// The destination rectangle `{(0,0), (W,0), (W,H), (0,H)}` is paired with
/// `quad` in the given order and the homography is solved destination to
/// source directly. Destination pixels whose rounded source position falls
/// outside `src` stay transparent.
pub fn rectify_raster(src: &RgbaImage, quad: &[PixelPoint; 4], max_pixels: u64) -> Result<RgbaImage> {
    let (w, h) = output_dimensions(quad);
    if w == 0 || h == 0 {
        return Err(ScalerError::SingularSystem);
    }
    if w as u64 * h as u64 > max_pixels {
        return Err(ScalerError::RectifiedTooLarge {
            width: w,
            height: h,
            limit: max_pixels,
        });
    }

    let (wf, hf) = (w as f64, h as f64);
    let dst_rect = [
        PixelPoint::new(0.0, 0.0),
        PixelPoint::new(wf, 0.0),
        PixelPoint::new(wf, hf),
        PixelPoint::new(0.0, hf),
    ];
    let to_source = Homography::from_quads(&dst_rect, quad)?;
    debug!(width = w, height = h, "Rectifying quad");

    let mut out = RgbaImage::new(w, h);
    let row_bytes = w as usize * 4;
    let fill = |(y, row): (usize, &mut [u8])| sample_row(src, &to_source, y, row);

    if (w as usize) * (h as usize) >= PARALLEL_PIXEL_THRESHOLD {
        out.par_chunks_mut(row_bytes).enumerate().for_each(fill);
    } else {
        out.chunks_mut(row_bytes).enumerate().for_each(fill);
    }

    Ok(out)
}

fn sample_row(src: &RgbaImage, to_source: &Homography, y: usize, row: &mut [u8]) {
    let (sw, sh) = (src.width() as f64, src.height() as f64);
    for (x, px) in row.chunks_exact_mut(4).enumerate() {
        let s: PixelPoint = to_source.transform(PixelPoint::new(x as f64, y as f64));
        let sx = s.x.round();
        let sy = s.y.round();
        if sx >= 0.0 && sy >= 0.0 && sx < sw && sy < sh {
            px.copy_from_slice(&src.get_pixel(sx as u32, sy as u32).0);
        }
    }
}

/// Rectify `image` from four corners picked in its local display space.
///
/// On success the working raster is replaced, the display width kept, the
/// height re-derived from the new aspect ratio and calibration cleared. On
/// any error the image is untouched.
pub fn rectify_image(
    image: &mut ReferenceImage,
    corners: &[LocalPoint],
    options: RectifyOptions,
) -> Result<()> {
    let corners: [LocalPoint; 4] = corners
        .try_into()
        .map_err(|_| ScalerError::InsufficientPoints {
            needed: 4,
            got: corners.len(),
        })?;
    let corners = if options.sort_corners {
        order_corners(corners)
    } else {
        corners
    };

    let frame = image.frame();
    let quad = corners.map(|p| frame.local_to_pixel(p));
    let rectified = rectify_raster(image.pixels(), &quad, options.max_pixels)?;

    let (w, h) = rectified.dimensions();
    image.replace_pixels(rectified);
    image.calibration = None;
    info!(image = %image.id(), width = w, height = h, "Perspective corrected");
    Ok(())
}
