//! End-to-end scan: photo in, board state out.

use image::RgbImage;
use log::info;
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use schelling_scan_core::GridSpec;
use schelling_scan_detect::{
    locate_boundary, partition, rectify, BoundaryError, BoundaryParams, CellImage, PartitionError,
    RectifyError, DEFAULT_CELL_SIZE,
};
use schelling_scan_model::{decode_labels, BoardState, DecodeError, LabelTable};

/// The external per-cell classifier boundary.
///
/// The pipeline treats the model as a stateless pure function over a
/// batch of tiles; [`CellImage::to_normalized`] provides the `[0, 1]`
/// input contract. Predictions must come back in the same order as
/// `cells` — the pipeline pairs them by position, never by a re-derived
/// enumeration order. No timeout is imposed; callers own retry policy.
pub trait Classifier {
    fn predict(&self, cells: &[CellImage]) -> Result<Vec<usize>, ClassifierError>;
}

#[derive(thiserror::Error, Debug)]
pub enum ClassifierError {
    #[error("classifier returned {got} predictions for {expected} cells")]
    WrongPredictionCount { expected: usize, got: usize },
    #[error("classifier backend failure: {0}")]
    Backend(String),
}

/// Everything a scan run needs, threaded explicitly through the calls.
/// There is no ambient configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScanParams {
    pub boundary: BoundaryParams,
    pub grid: GridSpec,
    /// Tile side handed to the classifier.
    pub cell_size: u32,
}

impl Default for ScanParams {
    fn default() -> Self {
        Self {
            boundary: BoundaryParams::default(),
            grid: GridSpec::default(),
            cell_size: DEFAULT_CELL_SIZE,
        }
    }
}

/// Failures of a scan run, tagged by pipeline stage.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    #[error("boundary stage: {0}")]
    Boundary(#[from] BoundaryError),
    #[error("rectify stage: {0}")]
    Rectify(#[from] RectifyError),
    #[error("partition stage: {0}")]
    Partition(#[from] PartitionError),
    #[error("classify stage: {0}")]
    Classify(#[from] ClassifierError),
    #[error("decode stage: {0}")]
    Decode(#[from] DecodeError),
}

/// Result of a successful scan.
#[derive(Debug)]
pub struct ScanOutcome {
    /// The long-lived artifact: the decoded, analyzable board snapshot.
    pub board: BoardState,
    /// The rectified board image, kept for overlays and debug dumps.
    pub rectified: RgbImage,
    /// All boundary candidates, best first (the first one was used).
    pub candidates: usize,
}

/// Run the full pipeline on one photograph.
///
/// Stages run synchronously in order; the best (largest-area) boundary
/// candidate drives the rectification. Each cell tile travels with its
/// `(col, row)` position into the label matrix, so a classifier is free
/// to batch or reorder internally as long as its output order matches
/// its input order.
pub fn scan_board<C: Classifier>(
    photo: &RgbImage,
    classifier: &C,
    table: &LabelTable,
    params: &ScanParams,
) -> Result<ScanOutcome, ScanError> {
    let quads = locate_boundary(photo, &params.boundary)?;
    let rectified = rectify(photo, &quads[0], params.grid)?;
    let cells = partition(&rectified, params.grid, params.cell_size)?;

    info!("classifying {} cells", cells.len());
    let predictions = classifier.predict(&cells)?;
    if predictions.len() != cells.len() {
        return Err(ScanError::Classify(ClassifierError::WrongPredictionCount {
            expected: cells.len(),
            got: predictions.len(),
        }));
    }

    let mut class_indices =
        DMatrix::<usize>::zeros(params.grid.rows as usize, params.grid.cols as usize);
    for (cell, &class) in cells.iter().zip(predictions.iter()) {
        class_indices[(cell.row as usize, cell.col as usize)] = class;
    }

    let board = decode_labels(&class_indices, table)?;
    Ok(ScanOutcome {
        board,
        rectified,
        candidates: quads.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CountingClassifier {
        classes: Vec<usize>,
    }

    impl Classifier for CountingClassifier {
        fn predict(&self, _cells: &[CellImage]) -> Result<Vec<usize>, ClassifierError> {
            Ok(self.classes.clone())
        }
    }

    fn photo_with_board() -> RgbImage {
        let mut img = RgbImage::from_pixel(160, 120, image::Rgb([230, 228, 224]));
        for y in 20..104 {
            for x in 20..140 {
                img.put_pixel(x, y, image::Rgb([45, 42, 40]));
            }
        }
        img
    }

    #[test]
    fn prediction_count_mismatch_is_an_error() {
        let params = ScanParams {
            grid: GridSpec::new(4, 3).unwrap(),
            cell_size: 16,
            ..ScanParams::default()
        };
        let classifier = CountingClassifier { classes: vec![2; 5] };
        let err = scan_board(
            &photo_with_board(),
            &classifier,
            &LabelTable::two_teams(),
            &params,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ScanError::Classify(ClassifierError::WrongPredictionCount { expected: 12, got: 5 })
        ));
    }
}
