use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::JoinHandle;

use ndarray::{Array3, Axis};
use tracing::{debug, error, info};

use crate::error::{Result, SipsError};
use crate::frame::{SourceInfo, SourceKind};
use crate::io::image_io::{frame_dimensions, load_frame};
use crate::io::natural::natural_sort;
use crate::io::npy::{read_npy, read_npy_shape};
use crate::pipeline::{PipelineStage, ProgressCounter, ProgressReporter};
use crate::sample::Sample;
use crate::series::ImageSeries;

/// Default image-directory extensions.
const DEFAULT_IMAGE_EXTENSIONS: [&str; 2] = ["tif", "tiff"];

/// What to load: a source path and an inclusive frame range.
#[derive(Clone, Debug)]
pub struct LoadRequest {
    pub path: PathBuf,
    pub start: usize,
    pub end: usize,
    /// Extension of the frame files when `path` is a directory.
    /// `None` accepts `tif` and `tiff`.
    pub extension: Option<String>,
}

impl LoadRequest {
    pub fn new(path: impl Into<PathBuf>, start: usize, end: usize) -> Self {
        Self {
            path: path.into(),
            start,
            end,
            extension: None,
        }
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        let ext: String = extension.into();
        self.extension = Some(ext.trim_start_matches('.').to_string());
        self
    }
}

/// Classify a source path by its type and extension.
pub fn detect_source(path: &Path) -> Result<SourceKind> {
    if !path.exists() {
        return Err(SipsError::NotFound(path.to_path_buf()));
    }
    if path.is_dir() {
        return Ok(SourceKind::ImageDirectory);
    }
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "cine" => Ok(SourceKind::Cine),
        "npy" => Ok(SourceKind::StoredArray),
        _ => Err(SipsError::UnsupportedFormat(path.display().to_string())),
    }
}

/// Clamp an inclusive range so that `end <= total - 1` and `start <= end`.
pub fn clamp_range(start: usize, end: usize, total: usize) -> (usize, usize) {
    let end = end.min(total.saturating_sub(1));
    (start.min(end), end)
}

/// Read the geometry and frame count of a source without decoding pixels.
pub fn probe(path: &Path) -> Result<SourceInfo> {
    match detect_source(path)? {
        SourceKind::Cine => probe_cine(path),
        SourceKind::StoredArray => {
            let shape = read_npy_shape(path)?;
            let (h, w, n) = match shape.as_slice() {
                [h, w] => (*h, *w, 1),
                [h, w, n] => (*h, *w, *n),
                _ => {
                    return Err(SipsError::InvalidArray(format!(
                        "expected a 2D or 3D array, found shape {shape:?}"
                    )))
                }
            };
            Ok(SourceInfo {
                path: path.to_path_buf(),
                kind: SourceKind::StoredArray,
                total_frames: n,
                width: w as u32,
                height: h as u32,
                bit_depth: 0,
            })
        }
        SourceKind::ImageDirectory => {
            let files = list_image_files(path, None)?;
            let (width, height) = frame_dimensions(&files[0])?;
            Ok(SourceInfo {
                path: path.to_path_buf(),
                kind: SourceKind::ImageDirectory,
                total_frames: files.len(),
                width,
                height,
                bit_depth: 0,
            })
        }
    }
}

#[cfg(feature = "cine")]
fn probe_cine(path: &Path) -> Result<SourceInfo> {
    Ok(crate::io::cine::CineReader::open(path)?.source_info(path))
}

#[cfg(not(feature = "cine"))]
fn probe_cine(path: &Path) -> Result<SourceInfo> {
    Err(cine_unavailable(path))
}

#[cfg(not(feature = "cine"))]
fn cine_unavailable(path: &Path) -> SipsError {
    error!(path = %path.display(), "Cine decoding support is not compiled in");
    SipsError::DecodingUnavailable(format!(
        "{} (built without the `cine` feature)",
        path.display()
    ))
}

/// Files in `dir` with the given extension (case-insensitive), in natural order.
pub fn list_image_files(dir: &Path, extension: Option<&str>) -> Result<Vec<PathBuf>> {
    let wanted: Vec<String> = match extension {
        Some(ext) => vec![ext.trim_start_matches('.').to_ascii_lowercase()],
        None => DEFAULT_IMAGE_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
    };

    let mut names: Vec<String> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_file())
        .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
        .filter(|name| {
            Path::new(name)
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| wanted.contains(&e.to_ascii_lowercase()))
        })
        .collect();

    if names.is_empty() {
        return Err(SipsError::EmptySequence);
    }
    natural_sort(&mut names);
    Ok(names.into_iter().map(|name| dir.join(name)).collect())
}

/// Load the requested range of a source into a series, on the calling thread.
///
/// The range is clamped to the source; stored arrays ignore it and are
/// loaded whole. `reporter` advances once per frame read.
pub fn load_series<T: Sample>(
    request: &LoadRequest,
    reporter: &dyn ProgressReporter,
) -> Result<ImageSeries<T>> {
    let path = request.path.as_path();
    let kind = detect_source(path)?;
    info!(path = %path.display(), kind = %kind, "Loading series");

    let series = match kind {
        SourceKind::Cine => load_cine(request, reporter)?,
        SourceKind::StoredArray => {
            reporter.begin_stage(PipelineStage::Loading, Some(1));
            let data = read_npy::<T>(path)?;
            reporter.advance();
            reporter.finish_stage();
            ImageSeries::new(data)?
        }
        SourceKind::ImageDirectory => {
            let files = list_image_files(path, request.extension.as_deref())?;
            let (start, end) = clamp_range(request.start, request.end, files.len());
            let (w, h) = frame_dimensions(&files[start])?;
            read_frames(h as usize, w as usize, start, end, reporter, |i| {
                load_frame::<T>(&files[i])
            })?
        }
    };

    let (h, w, n) = series.dim();
    info!(width = w, height = h, frames = n, sample = %T::KIND, "Series loaded");
    Ok(series)
}

#[cfg(feature = "cine")]
fn load_cine<T: Sample>(
    request: &LoadRequest,
    reporter: &dyn ProgressReporter,
) -> Result<ImageSeries<T>> {
    let reader = crate::io::cine::CineReader::open(&request.path).inspect_err(|e| {
        if matches!(e, SipsError::DecodingUnavailable(_)) {
            error!(path = %request.path.display(), error = %e, "Cannot decode Cine source");
        }
    })?;
    let (start, end) = clamp_range(request.start, request.end, reader.frame_count());
    read_frames(
        reader.bitmap.height as usize,
        reader.bitmap.width as usize,
        start,
        end,
        reporter,
        |i| reader.read_frame::<T>(i),
    )
}

#[cfg(not(feature = "cine"))]
fn load_cine<T: Sample>(
    request: &LoadRequest,
    _reporter: &dyn ProgressReporter,
) -> Result<ImageSeries<T>> {
    Err(cine_unavailable(&request.path))
}

/// Read frames `start..=end` into successive slices of one buffer.
fn read_frames<T: Sample>(
    height: usize,
    width: usize,
    start: usize,
    end: usize,
    reporter: &dyn ProgressReporter,
    mut read: impl FnMut(usize) -> Result<ndarray::Array2<T>>,
) -> Result<ImageSeries<T>> {
    let count = end - start + 1;
    debug!(start, end, count, "Reading frame range");
    reporter.begin_stage(PipelineStage::Loading, Some(count));

    let mut data = Array3::<T>::zeros((height, width, count));
    for (slot, index) in (start..=end).enumerate() {
        let frame = read(index)?;
        if frame.dim() != (height, width) {
            return Err(SipsError::ShapeMismatch {
                expected: (height, width),
                actual: frame.dim(),
            });
        }
        data.index_axis_mut(Axis(2), slot).assign(&frame);
        reporter.advance();
    }

    reporter.finish_stage();
    ImageSeries::new(data)
}

/// A series load running on a background thread.
///
/// Poll [`LoadTask::progress`] while the load runs, then call
/// [`LoadTask::join`] to block for the result.
pub struct LoadTask<T: Sample> {
    handle: JoinHandle<Result<ImageSeries<T>>>,
    progress: Arc<ProgressCounter>,
}

impl<T: Sample> LoadTask<T> {
    /// Start loading on a new thread named `sips-loader`.
    pub fn spawn(request: LoadRequest) -> Result<Self> {
        let progress = Arc::new(ProgressCounter::new());
        let counter = Arc::clone(&progress);
        let handle = std::thread::Builder::new()
            .name("sips-loader".into())
            .spawn(move || load_series::<T>(&request, counter.as_ref()))?;
        Ok(Self { handle, progress })
    }

    /// Shared counter: frames read so far and the expected total.
    pub fn progress(&self) -> Arc<ProgressCounter> {
        Arc::clone(&self.progress)
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Block until the load completes and return its result.
    pub fn join(self) -> Result<ImageSeries<T>> {
        self.handle.join().map_err(|panic| {
            let message = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "loader thread panicked".to_string());
            SipsError::Worker(message)
        })?
    }
}
