use ndarray::Array2;
use rayon::prelude::*;

use crate::consts::{GAUSSIAN_TRUNCATE, PARALLEL_PIXEL_THRESHOLD};

/// Gaussian blur by separable 1D convolution with replicated edges.
///
/// The kernel reaches `round(4 * sigma)` pixels each side and is normalised,
/// so the value range of the input is preserved. `sigma <= 0` returns the
/// input unchanged.
pub fn gaussian_blur(data: &Array2<f32>, sigma: f64) -> Array2<f32> {
    if sigma <= 0.0 || data.is_empty() {
        return data.clone();
    }
    let kernel = make_gaussian_kernel(sigma);
    let row_pass = convolve(data, &kernel, Direction::Rows);
    convolve(&row_pass, &kernel, Direction::Cols)
}

fn make_gaussian_kernel(sigma: f64) -> Vec<f32> {
    let radius = (GAUSSIAN_TRUNCATE * sigma + 0.5) as usize;
    let size = 2 * radius + 1;
    let s2 = 2.0 * sigma * sigma;

    let weights: Vec<f64> = (0..size)
        .map(|i| {
            let x = i as f64 - radius as f64;
            (-x * x / s2).exp()
        })
        .collect();
    let sum: f64 = weights.iter().sum();
    weights.into_iter().map(|k| (k / sum) as f32).collect()
}

#[derive(Clone, Copy)]
enum Direction {
    Rows,
    Cols,
}

fn convolve(data: &Array2<f32>, kernel: &[f32], direction: Direction) -> Array2<f32> {
    let (h, w) = data.dim();
    let radius = kernel.len() / 2;

    let blur_row = |row: usize| -> Vec<f32> {
        (0..w)
            .map(|col| {
                let mut sum = 0.0f32;
                for (ki, &kv) in kernel.iter().enumerate() {
                    let offset = ki as isize - radius as isize;
                    let px = match direction {
                        Direction::Rows => {
                            let c = (col as isize + offset).clamp(0, w as isize - 1) as usize;
                            data[[row, c]]
                        }
                        Direction::Cols => {
                            let r = (row as isize + offset).clamp(0, h as isize - 1) as usize;
                            data[[r, col]]
                        }
                    };
                    sum += px * kv;
                }
                sum
            })
            .collect()
    };

    let rows: Vec<Vec<f32>> = if h * w >= PARALLEL_PIXEL_THRESHOLD {
        (0..h).into_par_iter().map(blur_row).collect()
    } else {
        (0..h).map(blur_row).collect()
    };

    let mut result = Array2::<f32>::zeros((h, w));
    for (row, row_data) in rows.into_iter().enumerate() {
        for (col, val) in row_data.into_iter().enumerate() {
            result[[row, col]] = val;
        }
    }
    result
}
