/// Minimum pixel count (h*w) to use row-level Rayon parallelism.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// Lower bound of the Nielsen saturation function.
pub const NIELSEN_SATURATION_MIN: f32 = 0.0;

/// Upper bound of the Nielsen saturation function (8-bit, independent of sample type).
pub const NIELSEN_SATURATION_MAX: f32 = 255.0;

/// Full-scale value of the 16-bit working range used by denoising and CLAHE.
pub const U16_FULL_SCALE: f64 = 65_535.0;

/// Full-scale value of the 8-bit range used for video export.
pub const U8_FULL_SCALE: f64 = 255.0;

/// Number of histogram bins for 16-bit CLAHE.
pub const CLAHE_HISTOGRAM_BINS: usize = 65_536;

/// Gaussian kernel half-width in units of sigma.
pub const GAUSSIAN_TRUNCATE: f64 = 4.0;

/// Non-local-means weights below this value are discarded.
pub const NLMEANS_WEIGHT_THRESHOLD: f64 = 0.001;

/// Default lower clip percentile.
pub const DEFAULT_CLIP_MIN_PERCENTILE: f64 = 1.0;

/// Default upper clip percentile.
pub const DEFAULT_CLIP_MAX_PERCENTILE: f64 = 99.0;

/// Default Gaussian smoothing sigma.
pub const DEFAULT_GAUSSIAN_SIGMA: f64 = 0.5;

/// Default non-local-means template window size.
pub const DEFAULT_NLMEANS_TEMPLATE_WINDOW: usize = 7;

/// Default non-local-means search window size.
pub const DEFAULT_NLMEANS_SEARCH_WINDOW: usize = 21;

/// Default non-local-means strength, in percent of the 16-bit range.
pub const DEFAULT_NLMEANS_STRENGTH_PERCENT: f64 = 2.0;

/// Default CLAHE clip limit.
pub const DEFAULT_CLAHE_CLIP_LIMIT: f64 = 2.0;

/// Default CLAHE tile grid size (tiles per side).
pub const DEFAULT_CLAHE_TILE_GRID: usize = 8;

/// Default neighbour order for the neighbour comparison modes.
pub const DEFAULT_NEIGHBOUR_ORDER: usize = 1;

/// Default frame shown after a mode or order change invalidates the index.
pub const DEFAULT_FRAME_INDEX: usize = 0;

/// Default first/last frame loaded from a source.
pub const DEFAULT_LOAD_START: usize = 0;
pub const DEFAULT_LOAD_END: usize = 100;

/// Default frame range averaged for flat/dark references.
pub const DEFAULT_REFERENCE_START: usize = 0;
pub const DEFAULT_REFERENCE_END: usize = 50;

/// Default video export frame rate.
pub const DEFAULT_VIDEO_FPS: u32 = 30;

/// Number of digits in exported frame file names.
pub const EXPORT_INDEX_DIGITS: usize = 4;

/// Default Nielsen weight of the summed differences.
pub const DEFAULT_NIELSEN_DELTA_SCALE: f32 = 1.0;

/// Default Nielsen weight applied inside each saturated ratio.
pub const DEFAULT_NIELSEN_RATIO_SCALE: f32 = 1.0;

/// Default resize and zoom factor (no change).
pub const DEFAULT_VIEW_FACTOR: f64 = 1.0;
