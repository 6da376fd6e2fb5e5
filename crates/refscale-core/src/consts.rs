/// Canvas pixels per paper inch (CSS reference pixel density).
pub const DEFAULT_PIXELS_PER_INCH: f64 = 96.0;

/// Shortest on-screen reference line accepted for calibration, in display pixels.
pub const MIN_PIXEL_DISTANCE: f64 = 5.0;

/// Smallest crop selection accepted, in display pixels per side.
pub const MIN_CROP_SIZE: f64 = 10.0;

/// Upper bound on the rectified raster's pixel count (bounds resample cost).
pub const MAX_RECTIFIED_PIXELS: u64 = 40_000_000;

/// Fraction of the paper a newly added image is fitted into.
pub const DEFAULT_INITIAL_FIT_FRACTION: f64 = 0.5;

/// Offset applied per existing image when placing a new one, in display pixels.
pub const PLACEMENT_CASCADE_STEP: f64 = 24.0;

/// Key under which the board is stored in a key-value store.
pub const DEFAULT_STORAGE_KEY: &str = "model-reference-scaler";

/// Pivots with an absolute value at or below this are treated as zero.
pub const PIVOT_TOLERANCE: f64 = 1e-10;

/// Minimum pixel count (h*w) to use row-level Rayon parallelism.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// Inches per foot.
pub const INCHES_PER_FOOT: f64 = 12.0;

/// PDF user-space units per inch.
pub const POINTS_PER_INCH: f64 = 72.0;

/// Viewport zoom limits.
pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 10.0;
