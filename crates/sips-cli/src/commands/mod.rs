pub mod average;
pub mod config;
pub mod export;
pub mod frame;
pub mod info;
pub mod run;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};
use sips_core::modes::{ComparisonMode, NielsenWeights};
use sips_core::pipeline::ProcessingConfig;

#[derive(Clone, Copy, ValueEnum)]
pub enum ModeArg {
    Standard,
    DeltaTotal,
    DeltaNeighbour,
    RatioTotal,
    RatioNeighbour,
    Nielsen,
}

impl From<ModeArg> for ComparisonMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Standard => Self::Standard,
            ModeArg::DeltaTotal => Self::DeltaTotal,
            ModeArg::DeltaNeighbour => Self::DeltaNeighbour,
            ModeArg::RatioTotal => Self::RatioTotal,
            ModeArg::RatioNeighbour => Self::RatioNeighbour,
            ModeArg::Nielsen => Self::NielsenCombo,
        }
    }
}

/// Processing settings shared by `frame` and `export`.
#[derive(Args)]
pub struct ProcessingArgs {
    /// Processing config file (TOML); flags below override it
    #[arg(long)]
    pub processing: Option<PathBuf>,

    /// Comparison mode
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Frame distance for neighbour and Nielsen modes
    #[arg(long)]
    pub order: Option<usize>,

    /// Nielsen weights "d,q" (e.g. "1,1")
    #[arg(long)]
    pub nielsen: Option<String>,

    /// Percentile clip "low,high" (e.g. "1,99")
    #[arg(long)]
    pub clip: Option<String>,

    /// Gaussian smoothing sigma
    #[arg(long)]
    pub gaussian: Option<f64>,

    /// Non-local-means strength in percent of the 16-bit range
    #[arg(long)]
    pub denoise: Option<f64>,

    /// Non-local-means template window size
    #[arg(long)]
    pub template_window: Option<usize>,

    /// Non-local-means search window size
    #[arg(long)]
    pub search_window: Option<usize>,

    /// CLAHE clip limit
    #[arg(long)]
    pub clahe: Option<f64>,

    /// CLAHE tiles per side
    #[arg(long)]
    pub tile_grid: Option<usize>,

    /// Resize factor applied after enhancement
    #[arg(long)]
    pub resize: Option<f64>,

    /// Zoom factor applied after resizing
    #[arg(long)]
    pub zoom: Option<f64>,

    /// Zoom centre "x,y" in resized pixels
    #[arg(long)]
    pub zoom_center: Option<String>,
}

impl ProcessingArgs {
    pub fn to_config(&self) -> Result<ProcessingConfig> {
        let mut config = match self.processing {
            Some(ref path) => {
                let contents = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config {}", path.display()))?;
                toml::from_str(&contents).context("Invalid processing config")?
            }
            None => ProcessingConfig::default(),
        };

        if let Some(mode) = self.mode {
            config.mode = mode.into();
        }
        if let Some(order) = self.order {
            config.neighbour_order = order;
        }
        if let Some(ref weights) = self.nielsen {
            let [d, q] = parse_pair::<f32>(weights, "nielsen", "d,q")?;
            config.nielsen = NielsenWeights { d, q };
        }
        if let Some(ref clip) = self.clip {
            let [low, high] = parse_pair::<f64>(clip, "clip", "low,high")?;
            config.clip.enabled = true;
            config.clip.min_percentile = low;
            config.clip.max_percentile = high;
        }
        if let Some(sigma) = self.gaussian {
            config.gaussian.enabled = true;
            config.gaussian.sigma = sigma;
        }
        if let Some(strength) = self.denoise {
            config.denoise.enabled = true;
            config.denoise.strength_percent = strength;
        }
        if let Some(size) = self.template_window {
            config.denoise.template_window = size;
        }
        if let Some(size) = self.search_window {
            config.denoise.search_window = size;
        }
        if let Some(limit) = self.clahe {
            config.clahe.enabled = true;
            config.clahe.clip_limit = limit;
        }
        if let Some(grid) = self.tile_grid {
            config.clahe.tile_grid = grid;
        }
        if let Some(factor) = self.resize {
            config.view.resize_factor = factor;
        }
        if let Some(factor) = self.zoom {
            config.view.zoom_factor = factor;
        }
        if let Some(ref center) = self.zoom_center {
            let [x, y] = parse_pair::<f64>(center, "zoom-center", "x,y")?;
            config.view.zoom_center = Some((x, y));
        }

        Ok(config)
    }
}

/// Parse `"a,b"` into two numbers.
pub fn parse_pair<T: std::str::FromStr>(text: &str, flag: &str, shape: &str) -> Result<[T; 2]> {
    let parts: Vec<T> = text
        .split(',')
        .map(|s| s.trim().parse::<T>())
        .collect::<std::result::Result<_, _>>()
        .map_err(|_| anyhow::anyhow!("Invalid --{flag} format (expected '{shape}')"))?;
    match <[T; 2]>::try_from(parts) {
        Ok(pair) => Ok(pair),
        Err(_) => bail!("--{flag} needs exactly two values ('{shape}')"),
    }
}
