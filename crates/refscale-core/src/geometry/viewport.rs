use super::{CanvasPoint, ScreenPoint};
use crate::consts::{MAX_ZOOM, MIN_ZOOM};

/// Viewport zoom and pan. Presentation only; never persisted as board state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub zoom: f64,
    pub pan_x: f64,
    pub pan_y: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
        }
    }
}

impl Viewport {
    pub fn screen_to_canvas(&self, p: ScreenPoint) -> CanvasPoint {
        CanvasPoint::new((p.x - self.pan_x) / self.zoom, (p.y - self.pan_y) / self.zoom)
    }

    pub fn canvas_to_screen(&self, p: CanvasPoint) -> ScreenPoint {
        ScreenPoint::new(p.x * self.zoom + self.pan_x, p.y * self.zoom + self.pan_y)
    }

    /// Translate the view by a screen-space delta.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.pan_x += dx;
        self.pan_y += dy;
    }

    /// Multiply zoom by `factor`, keeping the canvas point under `anchor` fixed.
    pub fn zoom_at(&mut self, factor: f64, anchor: ScreenPoint) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        let fixed = self.screen_to_canvas(anchor);
        self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        self.pan_x = anchor.x - fixed.x * self.zoom;
        self.pan_y = anchor.y - fixed.y * self.zoom;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
