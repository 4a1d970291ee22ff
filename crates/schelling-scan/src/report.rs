//! Serializable analytics summary for the persistence/session layer.

use std::collections::HashMap;

use serde::Serialize;

use schelling_scan_core::GridSpec;
use schelling_scan_model::BoardState;

/// Read-only analytics snapshot assembled from a [`BoardState`].
///
/// This is the full surface the session layer consumes; it holds no
/// reference back into the pipeline.
#[derive(Clone, Debug, Serialize)]
pub struct AnalyticsReport {
    pub grid: GridSpec,
    /// Agents per team name, plus `"Empty"`.
    pub counts: HashMap<String, usize>,
    /// Model happiness per team name, plus the unweighted `"total"`.
    pub happyness: HashMap<String, f64>,
    /// Segregation index, or `-1.0` when the board has no eligible links.
    pub segregation: f64,
    /// Number of occupied cells whose mood token contradicts the model.
    pub wrong_positions: usize,
    /// Status string per cell, row-major (`"B_H"`, ..., `"Empty"`).
    pub cells: Vec<Vec<String>>,
    /// The label vocabulary of this board (team-major, mood-minor, then
    /// `"Empty"`).
    pub classes: Vec<String>,
}

impl AnalyticsReport {
    pub fn from_board(board: &BoardState) -> Self {
        let wrong = board.find_wrong_position();
        Self {
            grid: GridSpec {
                cols: board.grid_x() as u32,
                rows: board.grid_y() as u32,
            },
            counts: board.count_agents_teams(),
            happyness: board.happyness(),
            segregation: board.segregation(),
            wrong_positions: wrong.iter().filter(|&&w| w).count(),
            cells: board.to_str_matrix(),
            classes: board.get_all_classes_str(),
        }
    }
}
