//! Core geometry and pixel utilities for board photo analysis.
//!
//! This crate is intentionally small. It knows nothing about boards,
//! teams or classifiers: just images, quadrilaterals and the homography
//! that maps one onto the other.

mod grid;
mod homography;
mod logger;
mod quad;
mod sample;

pub use grid::{GridSpec, GridSpecParseError};
pub use homography::{homography_from_4pt, warp_perspective_rgb, Homography};
pub use logger::init_with_level;
pub use quad::{OrderedQuad, Quad};
pub use sample::sample_bilinear_rgb;
