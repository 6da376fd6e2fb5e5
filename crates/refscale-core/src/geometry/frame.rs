use super::{CanvasPoint, LocalPoint, PixelPoint, Size};

/// Placement of one image on the canvas, used for the canvas, local and
/// native pixel conversions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ImageFrame {
    pub position: CanvasPoint,
    pub size: Size,
    pub native_width: u32,
    pub native_height: u32,
}

impl ImageFrame {
    pub fn canvas_to_local(&self, p: CanvasPoint) -> LocalPoint {
        LocalPoint::new(p.x - self.position.x, p.y - self.position.y)
    }

    pub fn local_to_canvas(&self, p: LocalPoint) -> CanvasPoint {
        CanvasPoint::new(p.x + self.position.x, p.y + self.position.y)
    }

    /// Native pixels per display pixel along `(x, y)`.
    pub fn pixel_ratio(&self) -> (f64, f64) {
        (
            self.native_width as f64 / self.size.width,
            self.native_height as f64 / self.size.height,
        )
    }

    pub fn local_to_pixel(&self, p: LocalPoint) -> PixelPoint {
        let (rx, ry) = self.pixel_ratio();
        PixelPoint::new(p.x * rx, p.y * ry)
    }

    pub fn pixel_to_local(&self, p: PixelPoint) -> LocalPoint {
        let (rx, ry) = self.pixel_ratio();
        LocalPoint::new(p.x / rx, p.y / ry)
    }

    pub fn contains_local(&self, p: LocalPoint) -> bool {
        p.x >= 0.0 && p.y >= 0.0 && p.x <= self.size.width && p.y <= self.size.height
    }

    pub fn contains_canvas(&self, p: CanvasPoint) -> bool {
        self.contains_local(self.canvas_to_local(p))
    }
}
