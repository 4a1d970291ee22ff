//! Tiling of a rectified board image into per-cell images.

use image::{imageops, RgbImage};
use log::info;
use schelling_scan_core::GridSpec;

/// Cell tile side expected by the production classifier.
pub const DEFAULT_CELL_SIZE: u32 = 75;

/// One grid cell: a fixed-size RGB tile plus its 0-indexed position.
///
/// Positions travel with their tiles. Downstream code must never
/// re-derive them from enumeration order once tiles may have been
/// reordered (e.g. for batched classification).
#[derive(Clone, Debug)]
pub struct CellImage {
    pub col: u32,
    pub row: u32,
    pub image: RgbImage,
}

impl CellImage {
    /// Pixel data normalized to `[0, 1]`, row-major, interleaved RGB.
    /// This is the classifier input contract.
    pub fn to_normalized(&self) -> Vec<f32> {
        self.image.as_raw().iter().map(|&v| v as f32 / 255.0).collect()
    }
}

#[derive(thiserror::Error, Debug)]
pub enum PartitionError {
    #[error("cell ({col},{row}) sliced to {got_w}x{got_h}, expected {expected}x{expected}")]
    ShapeMismatch {
        col: u32,
        row: u32,
        got_w: u32,
        got_h: u32,
        expected: u32,
    },
}

/// Slice `rectified` into `grid.cols * grid.rows` tiles of
/// `cell_size x cell_size` pixels.
///
/// Canonical tiling order is row-major: rows top to bottom, columns left
/// to right. The label-matrix reshape downstream depends on this order.
///
/// If the image is not exactly `cols*cell_size x rows*cell_size` it is
/// resized (bilinear) to that size first. The resize can stretch
/// non-uniformly when the rectifier's aspect-preserving output disagrees
/// with the cell-size multiple; this mirrors the acquisition rigs in the
/// field and is logged rather than rejected.
pub fn partition(
    rectified: &RgbImage,
    grid: GridSpec,
    cell_size: u32,
) -> Result<Vec<CellImage>, PartitionError> {
    let target_w = grid.cols * cell_size;
    let target_h = grid.rows * cell_size;

    let resized;
    let src = if rectified.dimensions() != (target_w, target_h) {
        info!(
            "resizing rectified image {}x{} -> {}x{}",
            rectified.width(),
            rectified.height(),
            target_w,
            target_h
        );
        resized = imageops::resize(rectified, target_w, target_h, imageops::FilterType::Triangle);
        &resized
    } else {
        rectified
    };

    let mut cells = Vec::with_capacity(grid.cell_count());
    for row in 0..grid.rows {
        for col in 0..grid.cols {
            let tile =
                imageops::crop_imm(src, col * cell_size, row * cell_size, cell_size, cell_size)
                    .to_image();
            if tile.dimensions() != (cell_size, cell_size) {
                return Err(PartitionError::ShapeMismatch {
                    col,
                    row,
                    got_w: tile.width(),
                    got_h: tile.height(),
                    expected: cell_size,
                });
            }
            cells.push(CellImage {
                col,
                row,
                image: tile,
            });
        }
    }
    Ok(cells)
}
