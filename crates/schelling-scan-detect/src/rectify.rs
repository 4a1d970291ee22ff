//! Perspective rectification of a detected board boundary.

use image::RgbImage;
use log::info;
use nalgebra::Point2;
use schelling_scan_core::{homography_from_4pt, warp_perspective_rgb, GridSpec, Quad};

#[derive(thiserror::Error, Debug)]
pub enum RectifyError {
    #[error("degenerate quadrilateral: computed board height is {height} px")]
    DegenerateQuad { height: u32 },
    #[error("homography estimation failed for the ordered corners")]
    HomographyFailed,
}

/// Warp the region bounded by `quad` into an upright rectangle.
///
/// The output height is the smaller of the quad's left and right vertical
/// spans, rounded *down* to a multiple of `grid.rows`; the sub-cell
/// remainder is discarded so every cell later tiles to an exact pixel
/// size. The width is derived from the grid's cell count
/// (`height / rows * cols`), i.e. cells come out square regardless of the
/// photographed aspect ratio.
pub fn rectify(img: &RgbImage, quad: &Quad, grid: GridSpec) -> Result<RgbImage, RectifyError> {
    let ordered = quad.ordered();

    let min_span = ordered.left_span().min(ordered.right_span()) as u32;
    let height = min_span - min_span % grid.rows;
    if height == 0 {
        return Err(RectifyError::DegenerateQuad { height });
    }
    // height is an exact multiple of rows, so this is exact too.
    let width = height / grid.rows * grid.cols;

    let target = [
        Point2::new(0.0f32, 0.0),
        Point2::new(width as f32, 0.0),
        Point2::new(width as f32, height as f32),
        Point2::new(0.0f32, height as f32),
    ];
    // Inverse mapping: warp samples the source through target -> image.
    let h_img_from_rect = homography_from_4pt(&target, &ordered.as_array())
        .ok_or(RectifyError::HomographyFailed)?;

    info!("rectifying boundary to {}x{} ({} grid)", width, height, grid);
    Ok(warp_perspective_rgb(img, h_img_from_rect, width, height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn output_height_is_row_multiple() {
        let img = RgbImage::from_pixel(200, 200, Rgb([100, 100, 100]));
        let quad = Quad::new([
            Point2::new(10.0, 12.0),
            Point2::new(180.0, 18.0),
            Point2::new(185.0, 175.0),
            Point2::new(8.0, 170.0),
        ]);
        let grid = GridSpec::new(4, 3).unwrap();
        let out = rectify(&img, &quad, grid).unwrap();
        assert_eq!(out.height() % 3, 0);
        assert_eq!(out.width(), out.height() / 3 * 4);
        // left span 158, right span 157 -> min 157, floored to 156.
        assert_eq!(out.height(), 156);
        assert_eq!(out.width(), 208);
    }

    #[test]
    fn flat_quad_is_degenerate() {
        let img = RgbImage::new(100, 100);
        let quad = Quad::new([
            Point2::new(10.0, 50.0),
            Point2::new(40.0, 50.0),
            Point2::new(70.0, 50.5),
            Point2::new(90.0, 50.5),
        ]);
        let grid = GridSpec::new(4, 3).unwrap();
        assert!(matches!(
            rectify(&img, &quad, grid),
            Err(RectifyError::DegenerateQuad { .. })
        ));
    }

    #[test]
    fn warp_recovers_axis_aligned_content() {
        // Axis-aligned quad: rectification is a crop + scale, so a dark
        // cell in the source lands in the matching output cell.
        let mut img = RgbImage::from_pixel(130, 100, Rgb([230, 230, 230]));
        for y in 10..40 {
            for x in 10..40 {
                img.put_pixel(x, y, Rgb([20, 20, 20]));
            }
        }
        let quad = Quad::new([
            Point2::new(10.0, 10.0),
            Point2::new(100.0, 10.0),
            Point2::new(100.0, 70.0),
            Point2::new(10.0, 70.0),
        ]);
        let grid = GridSpec::new(3, 2).unwrap();
        let out = rectify(&img, &quad, grid).unwrap();
        assert_eq!(out.height(), 60);
        assert_eq!(out.width(), 90);
        // Top-left cell of the board was dark, bottom-right bright.
        assert!(out.get_pixel(10, 10)[0] < 60);
        assert!(out.get_pixel(80, 50)[0] > 180);
    }
}
