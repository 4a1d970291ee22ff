//! Vision stages that turn a board photograph into a stack of cell tiles.
//!
//! The stages are strictly ordered and each is a pure function over its
//! input image:
//!
//! 1. [`locate_boundary`] — binarize the photo and extract candidate
//!    4-vertex boundary polygons.
//! 2. [`rectify`] — warp the quadrilateral into an upright rectangle
//!    whose height is an exact multiple of the grid rows.
//! 3. [`partition`] — slice the rectangle into fixed-size cell images in
//!    canonical row-major order.

mod boundary;
mod partition;
mod rectify;
mod threshold;

pub use boundary::{boundary_mask, locate_boundary, BoundaryError, BoundaryParams};
pub use partition::{partition, CellImage, PartitionError, DEFAULT_CELL_SIZE};
pub use rectify::{rectify, RectifyError};
pub use threshold::{adaptive_threshold, ThresholdMode};
