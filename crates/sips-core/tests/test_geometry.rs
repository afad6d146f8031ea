#[allow(dead_code)]
mod common;

use std::sync::Mutex;

use approx::assert_abs_diff_eq;
use ndarray::{Array2, Array3};

use sips_core::geometry::zoom::frame_centre;
use sips_core::geometry::{resize_area, rotate_frame, zoom_frame, CropBounds, GeometryPlan};
use sips_core::pipeline::{NoOpReporter, PipelineStage, ProgressCounter, ProgressReporter};
use sips_core::{RawSeries, SipsError};

use common::ramp;

fn ramp_series(h: usize, w: usize, n: usize) -> RawSeries<f32> {
    RawSeries::from_array(Array3::from_shape_fn((h, w, n), |(r, c, k)| {
        (r * w + c) as f32 + 100.0 * k as f32
    }))
    .unwrap()
}

// ---------------------------------------------------------------------------
// Crop
// ---------------------------------------------------------------------------

#[test]
fn test_crop_window() {
    let raw = ramp_series(4, 5, 3);
    let prepared = raw.crop(&CropBounds::new(1, 3, 0, 2), &NoOpReporter).unwrap();

    assert_eq!(prepared.dim(), (2, 2, 3));
    assert_eq!(prepared.frame(0)[[0, 0]], 1.0);
    assert_eq!(prepared.frame(0)[[1, 1]], 7.0);
    assert_eq!(prepared.frame(2)[[1, 1]], 207.0);
}

#[test]
fn test_crop_outside_frame_rejected() {
    let raw = ramp_series(4, 5, 1);
    let err = raw.clone().crop(&CropBounds::new(0, 6, 0, 2), &NoOpReporter).unwrap_err();
    assert!(matches!(err, SipsError::InvalidCrop(_)));

    let err = raw.crop(&CropBounds::new(2, 2, 0, 2), &NoOpReporter).unwrap_err();
    assert!(matches!(err, SipsError::InvalidCrop(_)), "empty window");
}

/// Records every stage a reporter is told about.
#[derive(Default)]
struct StageLog(Mutex<Vec<PipelineStage>>);

impl ProgressReporter for StageLog {
    fn begin_stage(&self, stage: PipelineStage, _total_items: Option<usize>) {
        self.0.lock().unwrap().push(stage);
    }
}

#[test]
fn test_prepare_reports_rotation_then_crop() {
    let raw = ramp_series(6, 6, 2);
    let plan = GeometryPlan {
        angle_degrees: 90.0,
        crop: Some(CropBounds::new(1, 5, 1, 5)),
    };
    let log = StageLog::default();
    raw.prepare(&plan, &log).unwrap();
    assert_eq!(
        *log.0.lock().unwrap(),
        vec![PipelineStage::Rotating, PipelineStage::Cropping]
    );
}

#[test]
fn test_crop_counts_one_item() {
    let counter = ProgressCounter::new();
    let prepared = ramp_series(4, 4, 3)
        .crop(&CropBounds::new(0, 2, 0, 2), &counter)
        .unwrap();
    assert_eq!(prepared.dim(), (2, 2, 3));
    assert_eq!((counter.count(), counter.total()), (1, 1));
}

#[test]
fn test_prepare_without_plan_keeps_series() {
    let raw = ramp_series(3, 3, 2);
    let expected = raw.data().clone();
    let prepared = raw.prepare(&GeometryPlan::default(), &NoOpReporter).unwrap();
    assert_eq!(prepared.data(), &expected);
}

#[test]
fn test_prepare_rotates_then_crops() {
    let mut data = Array3::<u16>::zeros((6, 6, 1));
    data[[3, 5, 0]] = 1000;
    let raw = RawSeries::from_array(data).unwrap();
    let plan = GeometryPlan {
        angle_degrees: 90.0,
        crop: Some(CropBounds::new(2, 5, 0, 3)),
    };
    let prepared = raw.prepare(&plan, &NoOpReporter).unwrap();

    assert_eq!(prepared.dim(), (3, 3, 1));
    // (row 1, col 3) of the rotated frame is (row 1, col 1) after the crop.
    assert_eq!(prepared.frame(0)[[1, 1]], 1000);
}

// ---------------------------------------------------------------------------
// Rotate
// ---------------------------------------------------------------------------

#[test]
fn test_rotate_zero_is_identity() {
    let frame = ramp(5, 7);
    let rotated = rotate_frame(frame.view(), 0.0);
    assert_eq!(rotated, frame);
}

#[test]
fn test_rotate_quarter_turn_counter_clockwise() {
    let mut frame = Array2::<u16>::zeros((6, 6));
    frame[[3, 5]] = 1000;
    let rotated = rotate_frame(frame.view(), 90.0);

    // A point right of the centre moves above it.
    assert_eq!(rotated[[1, 3]], 1000);
    assert_eq!(rotated.iter().map(|&v| v as u32).sum::<u32>(), 1000);
}

#[test]
fn test_rotate_fills_uncovered_with_zero() {
    let frame = Array2::<f32>::from_elem((8, 8), 5.0);
    let rotated = rotate_frame(frame.view(), 45.0);
    assert_eq!(rotated.dim(), (8, 8));
    assert_eq!(rotated[[0, 0]], 0.0, "corner leaves the source frame");
    assert_abs_diff_eq!(rotated[[4, 4]], 5.0, epsilon = 1e-4);
}

#[test]
fn test_rotate_series_every_frame() {
    let mut raw = ramp_series(4, 4, 3);
    raw.rotate(180.0, &NoOpReporter);
    assert_eq!(raw.dim(), (4, 4, 3));
    // Centre (2, 2) maps onto itself under a half turn.
    assert_abs_diff_eq!(raw.frame(1)[[2, 2]], 110.0, epsilon = 1e-3);
}

// ---------------------------------------------------------------------------
// Resize and zoom
// ---------------------------------------------------------------------------

#[test]
fn test_resize_dimensions() {
    let frame = Array2::<f32>::from_elem((10, 8), 3.0);
    assert_eq!(resize_area(&frame, 0.5).dim(), (5, 4));
    assert_eq!(resize_area(&frame, 2.0).dim(), (20, 16));
    assert_eq!(resize_area(&frame, 0.01).dim(), (1, 1));
    assert_eq!(resize_area(&frame, 1.0), frame);
}

#[test]
fn test_resize_area_averages_blocks() {
    let frame = ramp(4, 4);
    let small = resize_area(&frame, 0.5);
    assert_abs_diff_eq!(small[[0, 0]], 2.5, epsilon = 1e-5);
    assert_abs_diff_eq!(small[[1, 1]], 12.5, epsilon = 1e-5);
}

#[test]
fn test_resize_keeps_constant_frames() {
    let frame = Array2::<f32>::from_elem((9, 7), 42.0);
    for factor in [0.3, 0.5, 1.5, 3.0] {
        let out = resize_area(&frame, factor);
        assert!(
            out.iter().all(|&v| (v - 42.0).abs() < 1e-3),
            "factor {factor} changed a constant frame"
        );
    }
}

#[test]
fn test_zoom_about_centre() {
    let frame = ramp(5, 5);
    let (cx, cy) = frame_centre(&frame);
    assert_eq!((cx, cy), (2.0, 2.0));

    let zoomed = zoom_frame(&frame, 2.0, cx, cy);
    assert_eq!(zoomed.dim(), (5, 5));
    assert_eq!(zoomed[[2, 2]], frame[[2, 2]]);
    assert_eq!(zoomed[[0, 0]], frame[[1, 1]]);
    assert_eq!(zoomed[[4, 4]], frame[[3, 3]]);
}

#[test]
fn test_zoom_unit_factor_is_identity() {
    let frame = ramp(4, 6);
    assert_eq!(zoom_frame(&frame, 1.0, 3.0, 2.0), frame);
    assert_eq!(zoom_frame(&frame, 0.0, 3.0, 2.0), frame);
}
