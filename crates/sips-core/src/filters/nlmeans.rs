use ndarray::{Array2, Zip};

use crate::consts::{NLMEANS_WEIGHT_THRESHOLD, PARALLEL_PIXEL_THRESHOLD};

use super::reflect_101;

/// Fast non-local-means denoising of a 16-bit frame.
///
/// Every pixel becomes the weighted mean of the pixels in a
/// `search_window`-wide neighbourhood, each weighted by
/// `exp(-d^2 / h^2)` where `d` is the mean absolute difference between the
/// `template_window`-wide patches around the two pixels. Weights below
/// 0.001 are dropped. Window sizes are rounded down to odd (minimum 1),
/// borders are mirrored without repeating the edge pixel. `h <= 0` returns
/// the input unchanged.
pub fn fast_nl_means(
    data: &Array2<u16>,
    h: f32,
    template_window: usize,
    search_window: usize,
) -> Array2<u16> {
    let (height, width) = data.dim();
    if h <= 0.0 || data.is_empty() {
        return data.clone();
    }

    let tr = template_window / 2;
    let sr = search_window / 2;
    let border = tr + sr;
    let template_area = ((2 * tr + 1) * (2 * tr + 1)) as f64;
    let h2 = h as f64 * h as f64;

    let padded = Array2::from_shape_fn((height + 2 * border, width + 2 * border), |(r, c)| {
        let y = reflect_101(r as isize - border as isize, height);
        let x = reflect_101(c as isize - border as isize, width);
        data[[y, x]] as i64
    });

    let mut weight_sum = Array2::<f64>::zeros((height, width));
    let mut value_sum = Array2::<f64>::zeros((height, width));
    let span = 2 * tr + 1;

    for dy in -(sr as isize)..=(sr as isize) {
        for dx in -(sr as isize)..=(sr as isize) {
            let integral = displaced_integral(&padded, sr, tr, height, width, dy, dx);

            let accumulate = |(y, x): (usize, usize), ws: &mut f64, vs: &mut f64| {
                let patch = integral[[y + span, x + span]] - integral[[y, x + span]]
                    - integral[[y + span, x]]
                    + integral[[y, x]];
                let dist = patch as f64 / template_area;
                let weight = (-dist * dist / h2).exp();
                if weight < NLMEANS_WEIGHT_THRESHOLD {
                    return;
                }
                let py = (y + border) as isize + dy;
                let px = (x + border) as isize + dx;
                *ws += weight;
                *vs += weight * padded[[py as usize, px as usize]] as f64;
            };

            let zip = Zip::indexed(&mut weight_sum).and(&mut value_sum);
            if height * width >= PARALLEL_PIXEL_THRESHOLD {
                zip.par_for_each(accumulate);
            } else {
                zip.for_each(accumulate);
            }
        }
    }

    Zip::from(&weight_sum)
        .and(&value_sum)
        .map_collect(|&ws, &vs| (vs / ws).round().clamp(0.0, u16::MAX as f64) as u16)
}

/// Integral image of `|I(p) - I(p + (dy, dx))|` over the template-padded
/// frame area, with a leading zero row and column.
fn displaced_integral(
    padded: &Array2<i64>,
    sr: usize,
    tr: usize,
    height: usize,
    width: usize,
    dy: isize,
    dx: isize,
) -> Array2<i64> {
    let rows = height + 2 * tr;
    let cols = width + 2 * tr;
    let mut integral = Array2::<i64>::zeros((rows + 1, cols + 1));
    for i in 0..rows {
        let mut row_sum = 0i64;
        for j in 0..cols {
            let a = padded[[i + sr, j + sr]];
            let r = (i + sr) as isize + dy;
            let c = (j + sr) as isize + dx;
            row_sum += (a - padded[[r as usize, c as usize]]).abs();
            integral[[i + 1, j + 1]] = integral[[i, j + 1]] + row_sum;
        }
    }
    integral
}
