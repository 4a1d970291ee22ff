//! Symbolic board state for the Schelling board game.
//!
//! [`BoardState`] holds the team and mood grids decoded from a board
//! photo and derives the model-level analytics: per-team happiness, the
//! segregation index and mood cells that contradict the neighbour-
//! majority model.

mod board;
mod labels;

pub use board::{BoardError, BoardState};
pub use labels::{decode_labels, CellLabel, DecodeError, LabelTable, Mood, TeamId};
