//! Coordinate spaces and the pure conversions between them.
//!
//! Every point is tagged with the space it lives in, so a screen position can
//! never be handed to code expecting native image pixels:
//!
//! | Space | Origin | Unit |
//! |---|---|---|
//! | [`Screen`](space::Screen) | viewport top-left | viewport pixel (after zoom/pan) |
//! | [`Canvas`](space::Canvas) | paper top-left | display pixel at zoom 1 |
//! | [`Local`](space::Local) | image top-left | display pixel |
//! | [`Pixel`](space::Pixel) | image top-left | native raster pixel |
//! | [`Paper`](space::Paper) | paper top-left | inch |

mod frame;
mod viewport;

use std::fmt;
use std::marker::PhantomData;

pub use frame::ImageFrame;
pub use viewport::Viewport;

pub mod space {
    /// Viewport pixels, after zoom and pan.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Screen;
    /// Board display pixels; origin at the paper's top-left corner.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Canvas;
    /// Display pixels relative to one image's top-left corner.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Local;
    /// Native raster pixels of one image.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Pixel;
    /// Physical inches on the paper.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Paper;
}

/// An immutable 2D point in the space `S`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point<S> {
    pub x: f64,
    pub y: f64,
    space: PhantomData<S>,
}

pub type ScreenPoint = Point<space::Screen>;
pub type CanvasPoint = Point<space::Canvas>;
pub type LocalPoint = Point<space::Local>;
pub type PixelPoint = Point<space::Pixel>;
pub type PaperPoint = Point<space::Paper>;

impl<S> Point<S> {
    pub const fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            space: PhantomData,
        }
    }

    pub fn distance_to(&self, other: &Self) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl<S> fmt::Display for Point<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}

/// Width and height in display pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Positive and finite on both axes.
    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self::new(self.width * factor, self.height * factor)
    }

    /// Keep `width` and derive the height from a native `w x h` aspect ratio.
    pub fn with_aspect_of(width: f64, native_width: u32, native_height: u32) -> Self {
        Self::new(width, width * native_height as f64 / native_width as f64)
    }
}

/// Convert a canvas position to physical paper inches.
pub fn canvas_to_paper(p: CanvasPoint, pixels_per_inch: f64) -> PaperPoint {
    PaperPoint::new(p.x / pixels_per_inch, p.y / pixels_per_inch)
}

/// Convert physical paper inches to a canvas position.
pub fn paper_to_canvas(p: PaperPoint, pixels_per_inch: f64) -> CanvasPoint {
    CanvasPoint::new(p.x * pixels_per_inch, p.y * pixels_per_inch)
}

/// Sort four corners clockwise starting from the top-left one.
///
/// Corners are ordered by angle around their centroid; the start is the
/// corner with the smallest `x + y`.
pub fn order_corners<S: Copy>(quad: [Point<S>; 4]) -> [Point<S>; 4] {
    let cx = quad.iter().map(|p| p.x).sum::<f64>() / 4.0;
    let cy = quad.iter().map(|p| p.y).sum::<f64>() / 4.0;

    let mut sorted = quad;
    // y grows downward, so increasing atan2 walks clockwise on screen
    sorted.sort_by(|a, b| {
        let ta = (a.y - cy).atan2(a.x - cx);
        let tb = (b.y - cy).atan2(b.x - cx);
        ta.total_cmp(&tb)
    });

    let start = sorted
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| (a.x + a.y).total_cmp(&(b.x + b.y)))
        .map(|(i, _)| i)
        .unwrap_or(0);
    sorted.rotate_left(start);
    sorted
}
