#[allow(dead_code)]
mod common;

use ndarray::Array3;

use sips_core::io::LoadRequest;
use sips_core::pipeline::NoOpReporter;
use sips_core::stack::{average_source, mean_frame};
use sips_core::ImageSeries;

use common::constant_tiff_dir;

#[test]
fn test_mean_float() {
    let data = Array3::<f32>::from_shape_fn((2, 3, 2), |(_, _, k)| (k + 1) as f32);
    let series = ImageSeries::new(data).unwrap();
    let mean = mean_frame(&series);
    assert_eq!(mean.dim(), (2, 3));
    assert!(mean.iter().all(|&v| (v - 1.5).abs() < 1e-6));
}

#[test]
fn test_mean_integer_truncates() {
    let data = Array3::<u16>::from_shape_fn((2, 2, 2), |(_, _, k)| (k + 1) as u16);
    let series = ImageSeries::new(data).unwrap();
    let mean = mean_frame(&series);
    assert!(mean.iter().all(|&v| v == 1), "(1 + 2) / 2 should truncate to 1");
}

#[test]
fn test_mean_integer_wraps_without_widening() {
    let values = [250u8, 10];
    let data = Array3::<u8>::from_shape_fn((2, 2, 2), |(_, _, k)| values[k]);
    let series = ImageSeries::new(data).unwrap();
    let mean = mean_frame(&series);
    // 250 + 10 wraps to 4 in 8-bit arithmetic.
    assert!(mean.iter().all(|&v| v == 2));
}

#[test]
fn test_single_frame_mean_is_identity() {
    let data = Array3::<f32>::from_shape_fn((3, 3, 1), |(r, c, _)| (r * 3 + c) as f32);
    let series = ImageSeries::new(data.clone()).unwrap();
    let mean = mean_frame(&series);
    assert_eq!(mean, data.index_axis(ndarray::Axis(2), 0));
}

#[test]
fn test_average_source_uses_range() {
    let dir = constant_tiff_dir(4, 3, 6);
    let request = LoadRequest::new(dir.path(), 1, 3);

    let mean_u8 = average_source::<u8>(&request, &NoOpReporter).unwrap();
    assert_eq!(mean_u8.dim(), (3, 4));
    assert!(mean_u8.iter().all(|&v| v == 2));

    let mean_f32 = average_source::<f32>(&request, &NoOpReporter).unwrap();
    assert!(mean_f32.iter().all(|&v| v == 2.0));
}
