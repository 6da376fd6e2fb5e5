#![allow(dead_code)]

use image::{Rgba, RgbaImage};

use refscale_core::board::Board;
use refscale_core::geometry::CanvasPoint;
use refscale_core::raster::encode_png;
use refscale_core::reference::ImageId;

/// Opaque checkerboard with `cell`-pixel squares.
pub fn checkerboard(width: u32, height: u32, cell: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        if ((x / cell) + (y / cell)) % 2 == 0 {
            Rgba([255, 255, 255, 255])
        } else {
            Rgba([0, 0, 0, 255])
        }
    })
}

/// Each pixel encodes its own coordinates: `r = x`, `g = y` (mod 256).
pub fn coordinate_raster(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| Rgba([(x % 256) as u8, (y % 256) as u8, 128, 255]))
}

pub fn png_bytes(raster: &RgbaImage) -> Vec<u8> {
    encode_png(raster).unwrap()
}

/// A board holding one `width x height` raster placed at the origin with
/// display size equal to its native size.
pub fn board_with_image(width: u32, height: u32) -> (Board, ImageId) {
    let mut board = Board::default();
    let id = board.add(coordinate_raster(width, height), Some("test.png".into())).unwrap();
    board.move_image(id, CanvasPoint::new(0.0, 0.0)).unwrap();
    (board, id)
}
