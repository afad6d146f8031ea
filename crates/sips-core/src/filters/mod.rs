pub mod clahe;
pub mod clip;
pub mod gaussian_blur;
pub mod nlmeans;

pub use clahe::clahe;
pub use clip::{clip_percentile, percentile};
pub use gaussian_blur::gaussian_blur;
pub use nlmeans::fast_nl_means;

/// Mirror an index into `0..len` without repeating the edge sample
/// (`-1 -> 1`, `len -> len - 2`).
pub(crate) fn reflect_101(index: isize, len: usize) -> usize {
    if len == 1 {
        return 0;
    }
    let period = 2 * (len as isize - 1);
    let mut i = index.rem_euclid(period);
    if i >= len as isize {
        i = period - i;
    }
    i as usize
}
