//! Adaptive thresholding for boundary extraction.
//!
//! Two modes are supported, matching the two historical acquisition
//! setups. They differ in how the local mean is weighted *and* in output
//! polarity: `Gaussian` produces an inverted mask (dark edge bands come
//! out white), `Mean` does not. The asymmetry is load-bearing: the
//! dilation step downstream only closes gaps in whichever polarity the
//! boards were tuned with, so both behaviors are preserved exactly.

use image::{GrayImage, Luma};
use serde::{Deserialize, Serialize};

/// Weighting (and polarity) of the local threshold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdMode {
    /// Unweighted box mean, direct polarity: pixel above the local
    /// threshold maps to white.
    Mean,
    /// Gaussian-weighted mean, inverted polarity: pixel above the local
    /// threshold maps to black.
    Gaussian,
}

/// Threshold `src` against a local neighbourhood mean.
///
/// `block_size` is the side of the (odd) neighbourhood window and `c` a
/// constant subtracted from the local mean. Borders are handled by
/// clamping (edge replication).
pub fn adaptive_threshold(src: &GrayImage, mode: ThresholdMode, block_size: u32, c: i32) -> GrayImage {
    debug_assert!(block_size % 2 == 1, "block size must be odd");
    let means = match mode {
        ThresholdMode::Mean => box_mean(src, block_size),
        ThresholdMode::Gaussian => gaussian_mean(src, block_size),
    };

    let (w, h) = src.dimensions();
    let mut out = GrayImage::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let v = src.get_pixel(x, y)[0] as f32;
            let t = means[(y * w + x) as usize] - c as f32;
            let above = v > t;
            let white = match mode {
                ThresholdMode::Mean => above,
                ThresholdMode::Gaussian => !above,
            };
            out.put_pixel(x, y, Luma([if white { 255 } else { 0 }]));
        }
    }
    out
}

#[inline]
fn clamp_coord(v: i64, max: u32) -> u32 {
    v.clamp(0, max as i64 - 1) as u32
}

fn box_mean(src: &GrayImage, block_size: u32) -> Vec<f32> {
    let (w, h) = src.dimensions();
    let r = (block_size / 2) as i64;

    // Integral image over the edge-replicated source, one row/col of
    // zero padding at the top-left.
    let iw = w as usize + 1;
    let ih = h as usize + 1;
    let mut integral = vec![0u64; iw * ih];
    for y in 1..ih {
        let mut row_sum = 0u64;
        for x in 1..iw {
            row_sum += src.get_pixel((x - 1) as u32, (y - 1) as u32)[0] as u64;
            integral[y * iw + x] = integral[(y - 1) * iw + x] + row_sum;
        }
    }
    let sum_rect = |x0: u32, y0: u32, x1: u32, y1: u32| -> u64 {
        // inclusive pixel rect
        let (x0, y0, x1, y1) = (x0 as usize, y0 as usize, x1 as usize + 1, y1 as usize + 1);
        integral[y1 * iw + x1] + integral[y0 * iw + x0]
            - integral[y0 * iw + x1]
            - integral[y1 * iw + x0]
    };

    let mut means = vec![0f32; (w * h) as usize];
    for y in 0..h {
        for x in 0..w {
            let x0 = clamp_coord(x as i64 - r, w);
            let x1 = clamp_coord(x as i64 + r, w);
            let y0 = clamp_coord(y as i64 - r, h);
            let y1 = clamp_coord(y as i64 + r, h);
            let n = ((x1 - x0 + 1) * (y1 - y0 + 1)) as f32;
            means[(y * w + x) as usize] = sum_rect(x0, y0, x1, y1) as f32 / n;
        }
    }
    means
}

/// Symmetric 1D Gaussian kernel with the OpenCV size->sigma rule.
pub(crate) fn gaussian_kernel(ksize: u32) -> Vec<f32> {
    let sigma = 0.3 * ((ksize as f32 - 1.0) * 0.5 - 1.0) + 0.8;
    let r = (ksize / 2) as i32;
    let mut k: Vec<f32> = (-r..=r)
        .map(|i| (-(i * i) as f32 / (2.0 * sigma * sigma)).exp())
        .collect();
    let sum: f32 = k.iter().sum();
    for v in &mut k {
        *v /= sum;
    }
    k
}

fn gaussian_mean(src: &GrayImage, block_size: u32) -> Vec<f32> {
    let (w, h) = src.dimensions();
    let kernel = gaussian_kernel(block_size);
    let r = (block_size / 2) as i64;

    // Separable convolution with edge replication: horizontal pass...
    let mut hpass = vec![0f32; (w * h) as usize];
    for y in 0..h {
        for x in 0..w {
            let mut acc = 0f32;
            for (i, &k) in kernel.iter().enumerate() {
                let sx = clamp_coord(x as i64 + i as i64 - r, w);
                acc += k * src.get_pixel(sx, y)[0] as f32;
            }
            hpass[(y * w + x) as usize] = acc;
        }
    }
    // ...then vertical.
    let mut means = vec![0f32; (w * h) as usize];
    for y in 0..h {
        for x in 0..w {
            let mut acc = 0f32;
            for (i, &k) in kernel.iter().enumerate() {
                let sy = clamp_coord(y as i64 + i as i64 - r, h);
                acc += k * hpass[(sy * w + x) as usize];
            }
            means[(y * w + x) as usize] = acc;
        }
    }
    means
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constant(w: u32, h: u32, v: u8) -> GrayImage {
        GrayImage::from_pixel(w, h, Luma([v]))
    }

    // On a constant image the local mean equals the pixel value, so the
    // `v > mean - c` test is true everywhere. The two modes then expose
    // their opposite polarities directly.
    #[test]
    fn modes_have_opposite_polarity() {
        let img = constant(16, 12, 128);
        let mean = adaptive_threshold(&img, ThresholdMode::Mean, 11, 2);
        let gauss = adaptive_threshold(&img, ThresholdMode::Gaussian, 11, 2);
        assert!(mean.pixels().all(|p| p[0] == 255));
        assert!(gauss.pixels().all(|p| p[0] == 0));
    }

    #[test]
    fn gaussian_mode_lights_dark_side_of_edges() {
        let mut img = constant(40, 40, 220);
        for y in 10..30 {
            for x in 10..30 {
                img.put_pixel(x, y, Luma([40]));
            }
        }
        let out = adaptive_threshold(&img, ThresholdMode::Gaussian, 11, 2);
        // Just inside the dark square: local mean is pulled up by the
        // bright surround, so the inverted output is white.
        assert_eq!(out.get_pixel(10, 20)[0], 255);
        // Deep inside the dark square the neighbourhood is uniform.
        assert_eq!(out.get_pixel(20, 20)[0], 0);
        // Deep in the bright background likewise.
        assert_eq!(out.get_pixel(2, 2)[0], 0);
    }

    #[test]
    fn kernel_is_normalized() {
        let k = gaussian_kernel(11);
        assert_eq!(k.len(), 11);
        let sum: f32 = k.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
        assert!(k[5] > k[0]);
    }
}
