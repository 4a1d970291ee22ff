//! Immutable board snapshot and the Schelling analytics over it.

use std::collections::HashMap;
use std::sync::Mutex;

use nalgebra::DMatrix;

use crate::labels::{Mood, TeamId};

#[derive(thiserror::Error, Debug)]
pub enum BoardError {
    #[error("team grid is {team_rows}x{team_cols} but mood grid is {mood_rows}x{mood_cols}")]
    ShapeMismatch {
        team_rows: usize,
        team_cols: usize,
        mood_rows: usize,
        mood_cols: usize,
    },
    #[error("team code {code} at ({col},{row}) exceeds the {teams} named teams")]
    UnknownTeamCode {
        code: u8,
        col: usize,
        row: usize,
        teams: usize,
    },
    #[error("invalid mood code {code} at ({col},{row})")]
    InvalidMoodCode { code: i8, col: usize, row: usize },
    #[error("empty cell ({col},{row}) carries mood code {code}")]
    MoodOnEmptyCell { code: i8, col: usize, row: usize },
}

/// One decoded photograph of the physical board.
///
/// A `BoardState` is an immutable snapshot: a new photo produces a new
/// instance. Team positions are trusted; moods are hand-placed tokens
/// and may contradict the model (see [`BoardState::find_wrong_position`]).
///
/// Grids are rows x cols; `0` in the team grid marks an empty cell and
/// must pair with the undefined mood code.
#[derive(Debug)]
pub struct BoardState {
    teams: DMatrix<u8>,
    moods: DMatrix<i8>,
    team_names: Vec<String>,
    /// Lazy per-team Moore neighbour counts. Write-once per key; guarded
    /// so a snapshot can be shared across threads.
    neighbour_cache: Mutex<HashMap<u8, DMatrix<u32>>>,
}

impl BoardState {
    /// Validate the grids and build a snapshot.
    ///
    /// Invariants checked once here: both grids share a shape, every
    /// team code has a display name, mood codes are in {-1, 0, +1}, and
    /// empty cells carry the undefined mood.
    pub fn new(
        teams: DMatrix<u8>,
        moods: DMatrix<i8>,
        team_names: Vec<String>,
    ) -> Result<Self, BoardError> {
        if teams.shape() != moods.shape() {
            return Err(BoardError::ShapeMismatch {
                team_rows: teams.nrows(),
                team_cols: teams.ncols(),
                mood_rows: moods.nrows(),
                mood_cols: moods.ncols(),
            });
        }
        for row in 0..teams.nrows() {
            for col in 0..teams.ncols() {
                let code = teams[(row, col)];
                if code as usize > team_names.len() {
                    return Err(BoardError::UnknownTeamCode {
                        code,
                        col,
                        row,
                        teams: team_names.len(),
                    });
                }
                let mood = moods[(row, col)];
                if Mood::from_code(mood).is_none() {
                    return Err(BoardError::InvalidMoodCode { code: mood, col, row });
                }
                if code == 0 && mood != 0 {
                    return Err(BoardError::MoodOnEmptyCell { code: mood, col, row });
                }
            }
        }
        Ok(Self {
            teams,
            moods,
            team_names,
            neighbour_cache: Mutex::new(HashMap::new()),
        })
    }

    pub fn teams(&self) -> &DMatrix<u8> {
        &self.teams
    }

    pub fn moods(&self) -> &DMatrix<i8> {
        &self.moods
    }

    pub fn team_names(&self) -> &[String] {
        &self.team_names
    }

    pub fn n_teams(&self) -> usize {
        self.team_names.len()
    }

    /// Number of columns.
    pub fn grid_x(&self) -> usize {
        self.teams.ncols()
    }

    /// Number of rows.
    pub fn grid_y(&self) -> usize {
        self.teams.nrows()
    }

    /// All valid team ids, in code order.
    pub fn team_ids(&self) -> impl Iterator<Item = TeamId> + '_ {
        (1..=self.team_names.len() as u8).map(TeamId)
    }

    /// Resolve a display name back to its id.
    pub fn team_named(&self, name: &str) -> Option<TeamId> {
        self.team_names
            .iter()
            .position(|n| n == name)
            .map(|i| TeamId(i as u8 + 1))
    }

    pub fn team_name(&self, team: TeamId) -> &str {
        &self.team_names[team.code() as usize - 1]
    }

    pub fn count_team_agents(&self, team: TeamId) -> usize {
        self.teams.iter().filter(|&&t| t == team.code()).count()
    }

    pub fn count_empty_cells(&self) -> usize {
        self.teams.iter().filter(|&&t| t == 0).count()
    }

    /// Per-team agent counts plus an `"Empty"` entry; values always sum
    /// to the cell count.
    pub fn count_agents_teams(&self) -> HashMap<String, usize> {
        let mut counts: HashMap<String, usize> = self
            .team_ids()
            .map(|t| (self.team_name(t).to_owned(), self.count_team_agents(t)))
            .collect();
        counts.insert("Empty".to_owned(), self.count_empty_cells());
        counts
    }

    /// Number of 8-connected (Moore) neighbours of each cell that belong
    /// to `team`. Cells outside the grid contribute 0; nothing wraps.
    ///
    /// Memoized per team for the life of the snapshot.
    pub fn same_team_neighbours(&self, team: TeamId) -> DMatrix<u32> {
        let mut cache = self
            .neighbour_cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        cache
            .entry(team.code())
            .or_insert_with(|| moore_neighbour_counts(&self.teams, team.code()))
            .clone()
    }

    /// Cells where `team` would be happy by the neighbour-majority rule:
    /// at least as many same-team neighbours as all other teams combined.
    /// Ties count as happy. Evaluated for the whole grid; the caller
    /// intersects with occupancy where needed.
    pub fn model_happy_cells(&self, team: TeamId) -> DMatrix<bool> {
        let mine = self.same_team_neighbours(team);
        let mut others = DMatrix::<u32>::zeros(self.grid_y(), self.grid_x());
        for other in self.team_ids().filter(|&t| t != team) {
            others += self.same_team_neighbours(other);
        }
        DMatrix::from_fn(self.grid_y(), self.grid_x(), |r, c| {
            mine[(r, c)] >= others[(r, c)]
        })
    }

    /// Occupied cells whose stored mood token contradicts the model's
    /// prediction for their team. Empty cells are never flagged, and
    /// neither are occupied cells with an undefined mood.
    pub fn find_wrong_position(&self) -> DMatrix<bool> {
        let mut wrong = DMatrix::from_element(self.grid_y(), self.grid_x(), false);
        for team in self.team_ids() {
            let happy = self.model_happy_cells(team);
            for row in 0..self.grid_y() {
                for col in 0..self.grid_x() {
                    if self.teams[(row, col)] != team.code() {
                        continue;
                    }
                    let contradiction = match Mood::from_code(self.moods[(row, col)]) {
                        Some(Mood::Happy) => !happy[(row, col)],
                        Some(Mood::Sad) => happy[(row, col)],
                        _ => false,
                    };
                    if contradiction {
                        wrong[(row, col)] = true;
                    }
                }
            }
        }
        wrong
    }

    /// Fraction of each team's agents sitting on a model-happy cell,
    /// plus a `"total"` entry.
    ///
    /// `"total"` is the unweighted mean of the per-team ratios, not a
    /// population-weighted one: a 3-agent team counts as much as a
    /// 30-agent team. A team with no agents yields NaN, as does the
    /// total it joins.
    pub fn happyness(&self) -> HashMap<String, f64> {
        let mut out = HashMap::new();
        let mut sum = 0.0;
        for team in self.team_ids() {
            let happy = self.model_happy_cells(team);
            let mut occupied = 0usize;
            let mut content = 0usize;
            for row in 0..self.grid_y() {
                for col in 0..self.grid_x() {
                    if self.teams[(row, col)] == team.code() {
                        occupied += 1;
                        if happy[(row, col)] {
                            content += 1;
                        }
                    }
                }
            }
            let ratio = content as f64 / occupied as f64;
            sum += ratio;
            out.insert(self.team_name(team).to_owned(), ratio);
        }
        out.insert("total".to_owned(), sum / self.n_teams() as f64);
        out
    }

    /// Segregation index over occupied-cell adjacency.
    ///
    /// Each occupied cell contributes up to 4 forward-looking directed
    /// links (right, down, down-right, down-left); backward directions
    /// would double-count pairs. A link exists only when the neighbour is
    /// occupied too; it is "mixed" when the teams differ. Returns
    /// `1 - mixed/links`, or the sentinel `-1.0` when no link exists at
    /// all (empty board or fully isolated agents).
    pub fn segregation(&self) -> f64 {
        const FORWARD: [(i64, i64); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

        let mut links = 0u64;
        let mut mixed_links = 0u64;
        for row in 0..self.grid_y() as i64 {
            for col in 0..self.grid_x() as i64 {
                let here = self.teams[(row as usize, col as usize)];
                if here == 0 {
                    continue;
                }
                for (dr, dc) in FORWARD {
                    let (r, c) = (row + dr, col + dc);
                    if r >= self.grid_y() as i64 || c < 0 || c >= self.grid_x() as i64 {
                        continue;
                    }
                    let there = self.teams[(r as usize, c as usize)];
                    if there == 0 {
                        continue;
                    }
                    links += 1;
                    if there != here {
                        mixed_links += 1;
                    }
                }
            }
        }

        if links > 0 {
            1.0 - mixed_links as f64 / links as f64
        } else {
            -1.0
        }
    }

    /// `"{team}_{mood}"` for an occupied cell, `"Empty"` otherwise.
    /// `x` is the column, `y` the row.
    pub fn get_status_cell_str(&self, x: usize, y: usize) -> String {
        let code = self.teams[(y, x)];
        if code == 0 {
            return "Empty".to_owned();
        }
        let mood = Mood::from_code(self.moods[(y, x)]).unwrap_or(Mood::Undefined);
        format!("{}_{}", self.team_name(TeamId(code)), mood.letter())
    }

    /// The whole grid as status strings, row-major.
    pub fn to_str_matrix(&self) -> Vec<Vec<String>> {
        (0..self.grid_y())
            .map(|y| (0..self.grid_x()).map(|x| self.get_status_cell_str(x, y)).collect())
            .collect()
    }

    /// Every `{team}_{mood}` label in team-major, mood-minor order, then
    /// `"Empty"`. Matches the classifier's label vocabulary ordering
    /// convention.
    pub fn get_all_classes_str(&self) -> Vec<String> {
        let mut classes = Vec::with_capacity(self.n_teams() * 2 + 1);
        for team in self.team_ids() {
            for mood in [Mood::Happy, Mood::Sad] {
                classes.push(format!("{}_{}", self.team_name(team), mood.letter()));
            }
        }
        classes.push("Empty".to_owned());
        classes
    }
}

/// 8-connected neighbour counts of `teams == code`, zero-padded at the
/// border.
fn moore_neighbour_counts(teams: &DMatrix<u8>, code: u8) -> DMatrix<u32> {
    let (rows, cols) = teams.shape();
    let mut counts = DMatrix::<u32>::zeros(rows, cols);
    for row in 0..rows as i64 {
        for col in 0..cols as i64 {
            let mut n = 0u32;
            for dr in -1..=1i64 {
                for dc in -1..=1i64 {
                    if dr == 0 && dc == 0 {
                        continue;
                    }
                    let (r, c) = (row + dr, col + dc);
                    if r < 0 || c < 0 || r >= rows as i64 || c >= cols as i64 {
                        continue;
                    }
                    if teams[(r as usize, c as usize)] == code {
                        n += 1;
                    }
                }
            }
            counts[(row as usize, col as usize)] = n;
        }
    }
    counts
}
