use ndarray::Array2;

/// Resize a frame by `factor` to `(int(h * factor), int(w * factor))`, at least 1x1.
///
/// Downscaling averages every source pixel by the fraction of it that falls
/// into each destination pixel (area interpolation), so no sample is skipped.
/// Upscaling falls back to bilinear interpolation with replicated edges.
pub fn resize_area(frame: &Array2<f32>, factor: f64) -> Array2<f32> {
    let (h, w) = frame.dim();
    let dst_h = ((h as f64 * factor) as usize).max(1);
    let dst_w = ((w as f64 * factor) as usize).max(1);
    if (dst_h, dst_w) == (h, w) {
        return frame.clone();
    }

    let row_taps = axis_taps(h, dst_h);
    let col_taps = axis_taps(w, dst_w);

    // Horizontal pass, then vertical pass.
    let mut horizontal = Array2::<f64>::zeros((h, dst_w));
    for row in 0..h {
        for (dst_col, taps) in col_taps.iter().enumerate() {
            horizontal[[row, dst_col]] = taps
                .iter()
                .map(|&(src_col, weight)| frame[[row, src_col]] as f64 * weight)
                .sum();
        }
    }

    let mut result = Array2::<f32>::zeros((dst_h, dst_w));
    for (dst_row, taps) in row_taps.iter().enumerate() {
        for dst_col in 0..dst_w {
            let value: f64 = taps
                .iter()
                .map(|&(src_row, weight)| horizontal[[src_row, dst_col]] * weight)
                .sum();
            result[[dst_row, dst_col]] = value as f32;
        }
    }
    result
}

/// Source indices and weights contributing to each destination index along one axis.
fn axis_taps(src_len: usize, dst_len: usize) -> Vec<Vec<(usize, f64)>> {
    let scale = src_len as f64 / dst_len as f64;
    if scale >= 1.0 {
        area_taps(src_len, dst_len, scale)
    } else {
        linear_taps(src_len, dst_len, scale)
    }
}

fn area_taps(src_len: usize, dst_len: usize, scale: f64) -> Vec<Vec<(usize, f64)>> {
    (0..dst_len)
        .map(|dst| {
            let start = dst as f64 * scale;
            let end = (start + scale).min(src_len as f64);
            let mut taps = Vec::with_capacity(scale.ceil() as usize + 1);
            let mut src = start.floor() as usize;
            while src < src_len && (src as f64) < end {
                let lo = start.max(src as f64);
                let hi = end.min(src as f64 + 1.0);
                let coverage = hi - lo;
                if coverage > 1e-9 {
                    taps.push((src, coverage / scale));
                }
                src += 1;
            }
            taps
        })
        .collect()
}

fn linear_taps(src_len: usize, dst_len: usize, scale: f64) -> Vec<Vec<(usize, f64)>> {
    let last = src_len as i64 - 1;
    (0..dst_len)
        .map(|dst| {
            let centre = (dst as f64 + 0.5) * scale - 0.5;
            let i0 = centre.floor() as i64;
            let frac = centre - i0 as f64;
            let a = i0.clamp(0, last) as usize;
            let b = (i0 + 1).clamp(0, last) as usize;
            vec![(a, 1.0 - frac), (b, frac)]
        })
        .collect()
}
