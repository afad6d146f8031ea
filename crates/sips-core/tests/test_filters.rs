#[allow(dead_code)]
mod common;

use approx::assert_abs_diff_eq;
use ndarray::Array2;

use sips_core::filters::{clahe, clip_percentile, fast_nl_means, gaussian_blur, percentile};

use common::ramp;

// ---------------------------------------------------------------------------
// Percentile clip
// ---------------------------------------------------------------------------

#[test]
fn test_percentile_linear_interpolation() {
    let data = ramp(2, 5);
    assert_eq!(percentile(&data, 0.0), 0.0);
    assert_eq!(percentile(&data, 100.0), 9.0);
    assert_abs_diff_eq!(percentile(&data, 50.0), 4.5, epsilon = 1e-6);
}

#[test]
fn test_clip_limits_to_percentiles() {
    let data = ramp(2, 5);
    let clipped = clip_percentile(&data, 10.0, 90.0);

    let min = clipped.iter().copied().fold(f32::INFINITY, f32::min);
    let max = clipped.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    assert_abs_diff_eq!(min, 0.9, epsilon = 1e-5);
    assert_abs_diff_eq!(max, 8.1, epsilon = 1e-5);
    assert_eq!(clipped[[0, 3]], 3.0, "values inside the range are untouched");
}

#[test]
fn test_clip_full_range_is_identity() {
    let data = ramp(3, 3);
    assert_eq!(clip_percentile(&data, 0.0, 100.0), data);
}

// ---------------------------------------------------------------------------
// Gaussian
// ---------------------------------------------------------------------------

#[test]
fn test_gaussian_preserves_constant() {
    let data = Array2::<f32>::from_elem((16, 16), 5.0);
    let blurred = gaussian_blur(&data, 1.5);
    assert!(blurred.iter().all(|&v| (v - 5.0).abs() < 1e-4));
}

#[test]
fn test_gaussian_zero_sigma_is_identity() {
    let data = ramp(4, 4);
    assert_eq!(gaussian_blur(&data, 0.0), data);
}

#[test]
fn test_gaussian_spreads_impulse_symmetrically() {
    let mut data = Array2::<f32>::zeros((21, 21));
    data[[10, 10]] = 1.0;
    let blurred = gaussian_blur(&data, 1.0);

    let total: f32 = blurred.iter().sum();
    assert!((total - 1.0).abs() < 1e-4, "mass should be preserved, got {total}");
    assert!(blurred[[10, 10]] < 1.0);
    assert_abs_diff_eq!(blurred[[9, 10]], blurred[[11, 10]], epsilon = 1e-7);
    assert_abs_diff_eq!(blurred[[10, 9]], blurred[[9, 10]], epsilon = 1e-7);
}

// ---------------------------------------------------------------------------
// Non-local means
// ---------------------------------------------------------------------------

#[test]
fn test_nlmeans_flat_frame_unchanged() {
    let data = Array2::<u16>::from_elem((12, 12), 1234);
    let out = fast_nl_means(&data, 500.0, 3, 7);
    assert_eq!(out, data);
}

#[test]
fn test_nlmeans_zero_strength_is_identity() {
    let data = Array2::from_shape_fn((8, 8), |(r, c)| (r * 100 + c) as u16);
    assert_eq!(fast_nl_means(&data, 0.0, 7, 21), data);
}

#[test]
fn test_nlmeans_keeps_distinct_regions() {
    let data = Array2::from_shape_fn((16, 16), |(_, c)| if c < 8 { 1000u16 } else { 5000 });
    let out = fast_nl_means(&data, 500.0, 3, 7);
    assert_eq!(out.dim(), (16, 16));
    assert_eq!(out[[8, 1]], 1000);
    assert_eq!(out[[8, 14]], 5000);
    assert!(out.iter().all(|&v| (1000..=5000).contains(&v)));
}

#[test]
fn test_nlmeans_output_within_input_range() {
    let data = Array2::from_shape_fn((20, 20), |(r, c)| ((r * 7 + c * 13) % 17) as u16 * 100 + 200);
    let lo = *data.iter().min().unwrap();
    let hi = *data.iter().max().unwrap();
    let out = fast_nl_means(&data, 2000.0, 3, 9);
    assert!(out.iter().all(|&v| v >= lo && v <= hi));
}

// ---------------------------------------------------------------------------
// CLAHE
// ---------------------------------------------------------------------------

#[test]
fn test_clahe_constant_without_clipping_saturates() {
    let data = Array2::<u16>::from_elem((16, 16), 300);
    let out = clahe(&data, 0.0, 2);
    assert!(out.iter().all(|&v| v == 65535));
}

#[test]
fn test_clahe_constant_stays_uniform() {
    let data = Array2::<u16>::from_elem((16, 16), 300);
    let out = clahe(&data, 2.0, 4);
    let first = out[[0, 0]];
    assert!(out.iter().all(|&v| v == first));
}

#[test]
fn test_clahe_uneven_tiles() {
    let data = Array2::from_shape_fn((10, 7), |(r, c)| (r * 1000 + c * 10) as u16);
    let out = clahe(&data, 2.0, 3);
    assert_eq!(out.dim(), (10, 7));
}

#[test]
fn test_clahe_preserves_order_within_tile() {
    let data = Array2::from_shape_fn((8, 8), |(r, c)| (r * 8 + c) as u16 * 500);
    let out = clahe(&data, 0.0, 1);
    // One tile without clipping is plain histogram equalisation.
    let values: Vec<u16> = out.iter().copied().collect();
    assert!(values.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(out[[7, 7]], 65535);
}
