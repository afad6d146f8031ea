use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{Result, SipsError};
use crate::geometry::GeometryPlan;
use crate::modes::{ComparisonMode, NielsenWeights};

/// Everything the frame pipeline needs to render one frame.
///
/// A plain value: changing a setting means building a new config and handing
/// it to the pipeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    pub mode: ComparisonMode,
    /// Frame distance of the neighbour modes (at least 1).
    pub neighbour_order: usize,
    pub nielsen: NielsenWeights,
    pub clip: ClipConfig,
    pub gaussian: GaussianConfig,
    pub denoise: DenoiseConfig,
    pub clahe: ClaheConfig,
    pub view: ViewConfig,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            mode: ComparisonMode::Standard,
            neighbour_order: DEFAULT_NEIGHBOUR_ORDER,
            nielsen: NielsenWeights::default(),
            clip: ClipConfig::default(),
            gaussian: GaussianConfig::default(),
            denoise: DenoiseConfig::default(),
            clahe: ClaheConfig::default(),
            view: ViewConfig::default(),
        }
    }
}

impl ProcessingConfig {
    /// Neighbour order with values below 1 raised to 1.
    pub fn order(&self) -> usize {
        self.neighbour_order.max(1)
    }

    /// Number of renderable frames for a series of `frames`.
    pub fn effective_frame_count(&self, frames: usize) -> usize {
        self.mode.effective_frame_count(frames, self.order())
    }
}

/// Percentile clipping of each frame's value range.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipConfig {
    pub enabled: bool,
    pub min_percentile: f64,
    pub max_percentile: f64,
}

impl Default for ClipConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            min_percentile: DEFAULT_CLIP_MIN_PERCENTILE,
            max_percentile: DEFAULT_CLIP_MAX_PERCENTILE,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaussianConfig {
    pub enabled: bool,
    pub sigma: f64,
}

impl Default for GaussianConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            sigma: DEFAULT_GAUSSIAN_SIGMA,
        }
    }
}

/// Fast non-local-means denoising on the 16-bit range.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DenoiseConfig {
    pub enabled: bool,
    pub template_window: usize,
    pub search_window: usize,
    /// Filter strength in percent of the 16-bit range.
    pub strength_percent: f64,
}

impl Default for DenoiseConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            template_window: DEFAULT_NLMEANS_TEMPLATE_WINDOW,
            search_window: DEFAULT_NLMEANS_SEARCH_WINDOW,
            strength_percent: DEFAULT_NLMEANS_STRENGTH_PERCENT,
        }
    }
}

impl DenoiseConfig {
    /// Filter strength `h` in 16-bit units: `round(percent / 100 * 65535)`.
    pub fn strength(&self) -> f32 {
        (self.strength_percent / 100.0 * U16_FULL_SCALE).round().max(0.0) as f32
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClaheConfig {
    pub enabled: bool,
    pub clip_limit: f64,
    /// Tiles per side.
    pub tile_grid: usize,
}

impl Default for ClaheConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            clip_limit: DEFAULT_CLAHE_CLIP_LIMIT,
            tile_grid: DEFAULT_CLAHE_TILE_GRID,
        }
    }
}

/// Final resize and zoom of the processed frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub resize_factor: f64,
    pub zoom_factor: f64,
    /// Zoom centre `(x, y)` in resized-frame pixels; the frame centre when unset.
    pub zoom_center: Option<(f64, f64)>,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            resize_factor: DEFAULT_VIEW_FACTOR,
            zoom_factor: DEFAULT_VIEW_FACTOR,
            zoom_center: None,
        }
    }
}

/// Output container of a bulk export.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// One TIFF per frame.
    #[default]
    Tiff,
    /// Animated greyscale GIF.
    Video,
    /// Single `.npy` array.
    Npy,
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tiff => write!(f, "tiff"),
            Self::Video => write!(f, "video"),
            Self::Npy => write!(f, "npy"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    pub format: ExportFormat,
    /// Directory for TIFF sequences, file path for video and array output.
    pub output: PathBuf,
    /// Inclusive frame range; the full range when unset.
    #[serde(default)]
    pub range: Option<(usize, usize)>,
    #[serde(default = "default_fps")]
    pub fps: u32,
}

fn default_fps() -> u32 {
    DEFAULT_VIDEO_FPS
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            format: ExportFormat::Tiff,
            output: PathBuf::from("export"),
            range: None,
            fps: DEFAULT_VIDEO_FPS,
        }
    }
}

/// A source path with the inclusive frame range to read from it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    pub path: PathBuf,
    #[serde(default)]
    pub start: usize,
    #[serde(default = "default_load_end")]
    pub end: usize,
    /// Frame file extension for image directories.
    #[serde(default)]
    pub extension: Option<String>,
}

fn default_load_end() -> usize {
    DEFAULT_LOAD_END
}

/// Flat and optional dark reference recordings, averaged over one range.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReferenceConfig {
    pub flat: PathBuf,
    #[serde(default)]
    pub dark: Option<PathBuf>,
    #[serde(default = "default_reference_start")]
    pub start: usize,
    #[serde(default = "default_reference_end")]
    pub end: usize,
}

fn default_reference_start() -> usize {
    DEFAULT_REFERENCE_START
}

fn default_reference_end() -> usize {
    DEFAULT_REFERENCE_END
}

/// A complete batch run: load, correct, prepare, process and export.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub source: SourceConfig,
    #[serde(default)]
    pub references: Option<ReferenceConfig>,
    #[serde(default)]
    pub geometry: GeometryPlan,
    #[serde(default)]
    pub processing: ProcessingConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            source: SourceConfig {
                path: PathBuf::from("recording.cine"),
                start: DEFAULT_LOAD_START,
                end: DEFAULT_LOAD_END,
                extension: None,
            },
            references: Some(ReferenceConfig {
                flat: PathBuf::from("flat.cine"),
                dark: Some(PathBuf::from("dark.cine")),
                start: DEFAULT_REFERENCE_START,
                end: DEFAULT_REFERENCE_END,
            }),
            geometry: GeometryPlan::default(),
            processing: ProcessingConfig::default(),
            export: ExportConfig::default(),
        }
    }
}

impl SessionConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| SipsError::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| SipsError::Config(e.to_string()))
    }
}
