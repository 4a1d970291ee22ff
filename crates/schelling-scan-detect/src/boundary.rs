//! Board boundary extraction.

use crate::threshold::{adaptive_threshold, ThresholdMode};
use image::{imageops, RgbImage};
use imageproc::contours::find_contours;
use imageproc::distance_transform::Norm;
use imageproc::filter::gaussian_blur_f32;
use imageproc::geometry::{approximate_polygon_dp, arc_length};
use imageproc::morphology::dilate;
use imageproc::point::Point;
use log::{debug, info, warn};
use nalgebra::Point2;
use schelling_scan_core::Quad;
use serde::{Deserialize, Serialize};

/// Tuning knobs for [`locate_boundary`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BoundaryParams {
    /// Side of the Gaussian pre-blur kernel; must be odd.
    pub blur_kernel_size: u32,
    /// Local threshold weighting and polarity.
    pub threshold_mode: ThresholdMode,
    /// Side of the adaptive threshold window; must be odd.
    pub block_size: u32,
    /// Constant subtracted from the local mean.
    pub threshold_c: i32,
    /// Side of the square dilation element used to close boundary gaps.
    pub dilate_kernel_size: u32,
    /// Number of dilation passes; 0 skips dilation.
    pub dilate_iterations: u32,
    /// Maximum number of candidate quadrilaterals to return.
    pub max_candidates: usize,
}

impl Default for BoundaryParams {
    fn default() -> Self {
        Self {
            blur_kernel_size: 5,
            threshold_mode: ThresholdMode::Gaussian,
            block_size: 11,
            threshold_c: 2,
            dilate_kernel_size: 3,
            dilate_iterations: 1,
            max_candidates: 4,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum BoundaryError {
    #[error("no 4-vertex boundary polygon among {contours} contours")]
    NoBoundaryFound { contours: usize },
    #[error("kernel sizes must be odd and positive (blur={blur}, block={block})")]
    BadKernelSize { blur: u32, block: u32 },
}

/// One candidate boundary: the approximated polygon plus the area of the
/// contour it came from.
struct Candidate {
    quad: Quad,
    area: f64,
}

/// Binarize a photo for contour tracing: grayscale, Gaussian blur,
/// adaptive threshold, dilation. Exposed separately so callers can dump
/// the mask while tuning thresholds.
pub fn boundary_mask(
    img: &RgbImage,
    params: &BoundaryParams,
) -> Result<image::GrayImage, BoundaryError> {
    if params.blur_kernel_size % 2 == 0
        || params.blur_kernel_size == 0
        || params.block_size % 2 == 0
        || params.block_size == 0
    {
        return Err(BoundaryError::BadKernelSize {
            blur: params.blur_kernel_size,
            block: params.block_size,
        });
    }

    let gray = imageops::grayscale(img);
    // OpenCV's size->sigma rule, so a 5x5 blur behaves like the one the
    // boards were tuned with.
    let sigma = 0.3 * ((params.blur_kernel_size as f32 - 1.0) * 0.5 - 1.0) + 0.8;
    let blurred = gaussian_blur_f32(&gray, sigma);

    let mut mask = adaptive_threshold(
        &blurred,
        params.threshold_mode,
        params.block_size,
        params.threshold_c,
    );

    let radius = (params.dilate_kernel_size / 2).max(1) as u8;
    for _ in 0..params.dilate_iterations {
        mask = dilate(&mask, Norm::LInf, radius);
    }
    Ok(mask)
}

/// Extract up to `max_candidates` quadrilateral boundary candidates.
///
/// Pipeline: [`boundary_mask`], contour tracing with full hierarchy,
/// Douglas-Peucker approximation at 1% of each contour's perimeter. Only
/// polygons with exactly 4 vertices qualify; candidates are ordered by
/// descending contour area. Area only ranks qualified candidates: a tiny
/// 4-vertex contour still beats a huge disqualified one.
pub fn locate_boundary(img: &RgbImage, params: &BoundaryParams) -> Result<Vec<Quad>, BoundaryError> {
    let mask = boundary_mask(img, params)?;
    let contours = find_contours::<i32>(&mask);
    debug!("traced {} contours", contours.len());

    let mut ranked: Vec<(usize, f64)> = contours
        .iter()
        .enumerate()
        .map(|(i, c)| (i, polygon_area(&c.points)))
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    let mut candidates: Vec<Candidate> = Vec::new();
    for (rank, (idx, area)) in ranked.iter().enumerate() {
        if candidates.len() >= params.max_candidates {
            break;
        }
        let points = &contours[*idx].points;
        let peri = arc_length(points, true);
        let approx = approximate_polygon_dp(points, 0.01 * peri, true);
        if approx.len() == 4 {
            candidates.push(Candidate {
                quad: to_quad(&approx),
                area: *area,
            });
        } else {
            warn!(
                "the {} largest contour is not a quadrilateral ({} vertices after approximation)",
                ordinal(rank + 1),
                approx.len()
            );
        }
    }

    if candidates.is_empty() {
        return Err(BoundaryError::NoBoundaryFound {
            contours: contours.len(),
        });
    }

    info!(
        "found {} boundary candidate(s), best area {:.0} px^2",
        candidates.len(),
        candidates[0].area
    );
    Ok(candidates.into_iter().map(|c| c.quad).collect())
}

fn to_quad(points: &[Point<i32>]) -> Quad {
    let mut arr = [Point2::new(0.0f32, 0.0); 4];
    for (a, p) in arr.iter_mut().zip(points.iter()) {
        *a = Point2::new(p.x as f32, p.y as f32);
    }
    Quad::new(arr)
}

/// Shoelace area of a closed pixel polygon.
fn polygon_area(points: &[Point<i32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut acc = 0i64;
    for (i, p) in points.iter().enumerate() {
        let q = points[(i + 1) % points.len()];
        acc += p.x as i64 * q.y as i64 - q.x as i64 * p.y as i64;
    }
    (acc.abs() as f64) / 2.0
}

fn ordinal(n: usize) -> String {
    let suffix = match (n % 10, n % 100) {
        (1, 11) | (2, 12) | (3, 13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}
