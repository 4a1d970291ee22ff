use image::{Rgb, RgbImage};

#[inline]
fn get_rgb(src: &RgbImage, x: i64, y: i64) -> [f32; 3] {
    if x < 0 || y < 0 || x >= src.width() as i64 || y >= src.height() as i64 {
        return [0.0; 3];
    }
    let p = src.get_pixel(x as u32, y as u32);
    [p[0] as f32, p[1] as f32, p[2] as f32]
}

/// Bilinear sample at `(x, y)`; coordinates outside the image read as black.
#[inline]
pub fn sample_bilinear_rgb(src: &RgbImage, x: f32, y: f32) -> Rgb<u8> {
    let x0 = x.floor() as i64;
    let y0 = y.floor() as i64;
    let fx = x - x0 as f32;
    let fy = y - y0 as f32;

    let p00 = get_rgb(src, x0, y0);
    let p10 = get_rgb(src, x0 + 1, y0);
    let p01 = get_rgb(src, x0, y0 + 1);
    let p11 = get_rgb(src, x0 + 1, y0 + 1);

    let mut out = [0u8; 3];
    for c in 0..3 {
        let a = p00[c] + fx * (p10[c] - p00[c]);
        let b = p01[c] + fx * (p11[c] - p01[c]);
        out[c] = (a + fy * (b - a)).clamp(0.0, 255.0) as u8;
    }
    Rgb(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_by_two() -> RgbImage {
        let mut img = RgbImage::new(2, 2);
        img.put_pixel(0, 0, Rgb([0, 0, 0]));
        img.put_pixel(1, 0, Rgb([100, 0, 0]));
        img.put_pixel(0, 1, Rgb([0, 100, 0]));
        img.put_pixel(1, 1, Rgb([100, 100, 0]));
        img
    }

    #[test]
    fn bilinear_interpolates_midpoint() {
        let img = two_by_two();
        let p = sample_bilinear_rgb(&img, 0.5, 0.5);
        assert_eq!(p, Rgb([50, 50, 0]));
    }

    #[test]
    fn outside_reads_black() {
        let img = two_by_two();
        assert_eq!(sample_bilinear_rgb(&img, -5.0, -5.0), Rgb([0, 0, 0]));
        assert_eq!(sample_bilinear_rgb(&img, 10.0, 0.0), Rgb([0, 0, 0]));
    }
}
