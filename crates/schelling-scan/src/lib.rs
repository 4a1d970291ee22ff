//! Turn a photograph of a physical Schelling board game into a symbolic,
//! analyzable grid state.
//!
//! The pipeline is a strictly ordered sequence of pure stages:
//!
//! ```text
//! photo -> boundary quad -> rectified image -> cell tiles
//!       -> class indices (external classifier) -> BoardState
//! ```
//!
//! # Example
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use schelling_scan::{scan_board, Classifier, ClassifierError, ScanParams};
//! use schelling_scan::model::LabelTable;
//! use schelling_scan::detect::CellImage;
//!
//! struct MyModel;
//! impl Classifier for MyModel {
//!     fn predict(&self, cells: &[CellImage]) -> Result<Vec<usize>, ClassifierError> {
//!         Ok(vec![2; cells.len()]) // everything "Empty"
//!     }
//! }
//!
//! let photo = image::open("board.jpg")?.to_rgb8();
//! let outcome = scan_board(&photo, &MyModel, &LabelTable::two_teams(), &ScanParams::default())?;
//! println!("segregation = {}", outcome.board.segregation());
//! # Ok(())
//! # }
//! ```

mod pipeline;
mod report;

pub use pipeline::{scan_board, Classifier, ClassifierError, ScanError, ScanOutcome, ScanParams};
pub use report::AnalyticsReport;

pub use schelling_scan_core as core;
pub use schelling_scan_detect as detect;
pub use schelling_scan_model as model;

pub use schelling_scan_core::{init_with_level, GridSpec};
