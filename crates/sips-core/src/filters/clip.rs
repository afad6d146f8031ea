use ndarray::Array2;

/// Value at percentile `p` (0..=100) of `data`, linearly interpolated
/// between the two nearest ranks.
pub fn percentile(data: &Array2<f32>, p: f64) -> f32 {
    let mut sorted: Vec<f32> = data.iter().copied().collect();
    if sorted.is_empty() {
        return 0.0;
    }
    sorted.sort_by(|a, b| a.total_cmp(b));
    percentile_of_sorted(&sorted, p)
}

fn percentile_of_sorted(sorted: &[f32], p: f64) -> f32 {
    let n = sorted.len();
    let rank = (p.clamp(0.0, 100.0) / 100.0) * (n - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = (lo + 1).min(n - 1);
    let frac = rank - lo as f64;
    let a = sorted[lo] as f64;
    let b = sorted[hi] as f64;
    (a + (b - a) * frac) as f32
}

/// Clip a frame to its own `[min_percentile, max_percentile]` value range.
///
/// Values at or below the low percentile become the low percentile, values
/// at or above the high percentile become the high percentile.
pub fn clip_percentile(data: &Array2<f32>, min_percentile: f64, max_percentile: f64) -> Array2<f32> {
    let mut sorted: Vec<f32> = data.iter().copied().collect();
    if sorted.is_empty() {
        return data.clone();
    }
    sorted.sort_by(|a, b| a.total_cmp(b));
    let lo = percentile_of_sorted(&sorted, min_percentile);
    let hi = percentile_of_sorted(&sorted, max_percentile);

    data.mapv(|v| {
        let v = if v <= lo { lo } else { v };
        if v >= hi {
            hi
        } else {
            v
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    #[test]
    fn percentile_interpolates_between_ranks() {
        let data = Array2::from_shape_vec((1, 5), vec![4.0, 0.0, 1.0, 3.0, 2.0]).unwrap();
        assert_eq!(percentile(&data, 0.0), 0.0);
        assert_eq!(percentile(&data, 50.0), 2.0);
        assert_eq!(percentile(&data, 100.0), 4.0);
        assert!((percentile(&data, 10.0) - 0.4).abs() < 1e-6);
    }
}
