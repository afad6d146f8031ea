use ndarray::Array2;
use rayon::prelude::*;

use crate::consts::CLAHE_HISTOGRAM_BINS;

use super::reflect_101;

/// Contrast-limited adaptive histogram equalisation of a 16-bit frame.
///
/// The frame is split into a `tile_grid` x `tile_grid` grid (padded by
/// mirroring when the size is not a multiple of the grid). Each tile gets an
/// equalisation curve from its own histogram, clipped at
/// `clip_limit * tile_pixels / 65536` counts with the excess spread over all
/// bins. Pixels are mapped through the four nearest tile curves with
/// bilinear weighting.
pub fn clahe(data: &Array2<u16>, clip_limit: f64, tile_grid: usize) -> Array2<u16> {
    let (h, w) = data.dim();
    if data.is_empty() {
        return data.clone();
    }
    let tiles = tile_grid.max(1);
    let tile_h = h.div_ceil(tiles);
    let tile_w = w.div_ceil(tiles);
    let tile_pixels = tile_h * tile_w;

    let clip = if clip_limit > 0.0 {
        Some(((clip_limit * tile_pixels as f64 / CLAHE_HISTOGRAM_BINS as f64) as usize).max(1))
    } else {
        None
    };
    let lut_scale = (CLAHE_HISTOGRAM_BINS - 1) as f64 / tile_pixels as f64;

    let luts: Vec<Vec<u16>> = (0..tiles * tiles)
        .into_par_iter()
        .map(|t| {
            let (ty, tx) = (t / tiles, t % tiles);
            let mut hist = vec![0usize; CLAHE_HISTOGRAM_BINS];
            for r in ty * tile_h..(ty + 1) * tile_h {
                let y = reflect_101(r as isize, h);
                for c in tx * tile_w..(tx + 1) * tile_w {
                    let x = reflect_101(c as isize, w);
                    hist[data[[y, x]] as usize] += 1;
                }
            }
            if let Some(limit) = clip {
                clip_histogram(&mut hist, limit);
            }
            let mut sum = 0usize;
            hist.iter()
                .map(|&count| {
                    sum += count;
                    (sum as f64 * lut_scale).round().min(u16::MAX as f64) as u16
                })
                .collect()
        })
        .collect();

    let inv_th = 1.0 / tile_h as f64;
    let inv_tw = 1.0 / tile_w as f64;
    let last = tiles as isize - 1;

    let x_taps: Vec<(usize, usize, f64)> = (0..w)
        .map(|x| {
            let txf = x as f64 * inv_tw - 0.5;
            let tx1 = txf.floor() as isize;
            let frac = txf - tx1 as f64;
            (tx1.max(0) as usize, (tx1 + 1).min(last) as usize, frac)
        })
        .collect();

    Array2::from_shape_fn((h, w), |(y, x)| {
        let tyf = y as f64 * inv_th - 0.5;
        let ty1 = tyf.floor() as isize;
        let ya = tyf - ty1 as f64;
        let ty2 = (ty1 + 1).min(last) as usize;
        let ty1 = ty1.max(0) as usize;
        let (tx1, tx2, xa) = x_taps[x];

        let v = data[[y, x]] as usize;
        let lut = |ty: usize, tx: usize| luts[ty * tiles + tx][v] as f64;
        let top = lut(ty1, tx1) * (1.0 - xa) + lut(ty1, tx2) * xa;
        let bottom = lut(ty2, tx1) * (1.0 - xa) + lut(ty2, tx2) * xa;
        (top * (1.0 - ya) + bottom * ya).round().clamp(0.0, u16::MAX as f64) as u16
    })
}

/// Clip every bin at `limit` and hand the excess back, evenly first and
/// then one count at a time across the bins.
fn clip_histogram(hist: &mut [usize], limit: usize) {
    let mut clipped = 0usize;
    for count in hist.iter_mut() {
        if *count > limit {
            clipped += *count - limit;
            *count = limit;
        }
    }

    let bins = hist.len();
    let batch = clipped / bins;
    let mut residual = clipped - batch * bins;
    for count in hist.iter_mut() {
        *count += batch;
    }
    if residual > 0 {
        let step = (bins / residual).max(1);
        let mut i = 0;
        while i < bins && residual > 0 {
            hist[i] += 1;
            residual -= 1;
            i += step;
        }
    }
}
