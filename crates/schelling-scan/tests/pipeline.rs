//! End-to-end scan on a synthetic board photograph.

use image::{Rgb, RgbImage};
use schelling_scan::detect::CellImage;
use schelling_scan::model::LabelTable;
use schelling_scan::{scan_board, Classifier, ClassifierError, GridSpec, ScanParams};

/// Light desk with a dark board rectangle on it.
fn synthetic_photo() -> RgbImage {
    let mut img = RgbImage::from_pixel(400, 320, Rgb([232, 229, 225]));
    for y in 40..280 {
        for x in 60..360 {
            img.put_pixel(x, y, Rgb([48, 45, 42]));
        }
    }
    img
}

/// Stand-in for the external model: labels cells from their grid
/// position only, checkerboarding B_H and R_H with one Empty corner.
struct CheckerClassifier;

impl Classifier for CheckerClassifier {
    fn predict(&self, cells: &[CellImage]) -> Result<Vec<usize>, ClassifierError> {
        Ok(cells
            .iter()
            .map(|cell| {
                if cell.col == 0 && cell.row == 0 {
                    2 // Empty
                } else if (cell.col + cell.row) % 2 == 0 {
                    0 // B_H
                } else {
                    3 // R_H
                }
            })
            .collect())
    }
}

fn scan_params(grid: GridSpec) -> ScanParams {
    ScanParams {
        grid,
        cell_size: 32,
        ..ScanParams::default()
    }
}

#[test]
fn scans_synthetic_board_end_to_end() {
    let grid = GridSpec::new(4, 3).unwrap();
    let outcome = scan_board(
        &synthetic_photo(),
        &CheckerClassifier,
        &LabelTable::two_teams(),
        &scan_params(grid),
    )
    .expect("pipeline succeeds on the synthetic photo");

    // Rectified geometry: height snapped to a row multiple, width from
    // the grid's cell aspect.
    assert_eq!(outcome.rectified.height() % grid.rows, 0);
    assert_eq!(
        outcome.rectified.width(),
        outcome.rectified.height() / grid.rows * grid.cols
    );
    assert!(outcome.candidates >= 1);

    let board = &outcome.board;
    assert_eq!(board.grid_x(), 4);
    assert_eq!(board.grid_y(), 3);

    // The label matrix landed on the positions the classifier used.
    assert_eq!(board.teams()[(0, 0)], 0, "corner cell is Empty");
    assert_eq!(board.teams()[(0, 1)], 2, "odd cells are R");
    assert_eq!(board.teams()[(1, 1)], 1, "even cells are B");

    // Analytics over the whole surface stay consistent.
    let counts = board.count_agents_teams();
    assert_eq!(counts.values().sum::<usize>(), grid.cell_count());
    assert_eq!(counts["Empty"], 1);

    let seg = board.segregation();
    assert!((-1.0..=1.0).contains(&seg));
    // A checkerboard is maximally mixed.
    assert!(seg < 0.5, "checkerboard should not look segregated: {seg}");

    let happyness = board.happyness();
    assert!(happyness.contains_key("B"));
    assert!(happyness.contains_key("R"));
    assert!(happyness.contains_key("total"));
}

#[test]
fn boundary_failure_carries_stage_context() {
    let featureless = RgbImage::from_pixel(200, 150, Rgb([128, 128, 128]));
    let err = scan_board(
        &featureless,
        &CheckerClassifier,
        &LabelTable::two_teams(),
        &scan_params(GridSpec::new(4, 3).unwrap()),
    )
    .unwrap_err();

    let msg = err.to_string();
    assert!(msg.starts_with("boundary stage:"), "got: {msg}");
}
