//! Classifier label vocabulary and its decoding into board grids.

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::board::{BoardError, BoardState};

/// 1-based team code; `0` in a team grid means the cell is empty.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TeamId(pub u8);

impl TeamId {
    pub fn code(self) -> u8 {
        self.0
    }
}

/// Affect state of an occupied cell. Empty cells are `Undefined`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mood {
    #[default]
    Undefined,
    Happy,
    Sad,
}

impl Mood {
    /// Symmetric numeric code: +1 happy, -1 sad, 0 undefined.
    pub fn code(self) -> i8 {
        match self {
            Mood::Undefined => 0,
            Mood::Happy => 1,
            Mood::Sad => -1,
        }
    }

    pub fn from_code(code: i8) -> Option<Self> {
        match code {
            0 => Some(Mood::Undefined),
            1 => Some(Mood::Happy),
            -1 => Some(Mood::Sad),
            _ => None,
        }
    }

    /// Single-letter display form used in class labels ("H"/"S").
    pub fn letter(self) -> &'static str {
        match self {
            Mood::Undefined => "",
            Mood::Happy => "H",
            Mood::Sad => "S",
        }
    }
}

/// What one classifier class index stands for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellLabel {
    Empty,
    Agent { team: TeamId, mood: Mood },
}

/// Mapping from classifier class indices to cell labels, plus the team
/// display names used everywhere downstream.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LabelTable {
    /// Display name per team, index 0 naming `TeamId(1)`.
    pub team_names: Vec<String>,
    /// Class index -> label, dense from 0.
    pub classes: Vec<CellLabel>,
}

impl LabelTable {
    /// Class order of the production two-team classifier, which learned
    /// its classes from alphabetically sorted directories:
    /// `B_H, B_S, Empty, R_H, R_S`.
    pub fn two_teams() -> Self {
        let b = TeamId(1);
        let r = TeamId(2);
        Self {
            team_names: vec!["B".to_owned(), "R".to_owned()],
            classes: vec![
                CellLabel::Agent { team: b, mood: Mood::Happy },
                CellLabel::Agent { team: b, mood: Mood::Sad },
                CellLabel::Empty,
                CellLabel::Agent { team: r, mood: Mood::Happy },
                CellLabel::Agent { team: r, mood: Mood::Sad },
            ],
        }
    }

    pub fn lookup(&self, class_index: usize) -> Option<CellLabel> {
        self.classes.get(class_index).copied()
    }
}

impl Default for LabelTable {
    fn default() -> Self {
        Self::two_teams()
    }
}

#[derive(thiserror::Error, Debug)]
pub enum DecodeError {
    #[error("class index {index} at cell ({col},{row}) outside the label table ({classes} classes)")]
    UnknownClassIndex {
        index: usize,
        col: usize,
        row: usize,
        classes: usize,
    },
    #[error(transparent)]
    Board(#[from] BoardError),
}

/// Remap a grid of classifier class indices into a [`BoardState`].
///
/// `class_indices` is rows x cols in the canonical row-major cell order.
/// Cells labeled `Empty` get team 0 and the undefined mood code.
pub fn decode_labels(
    class_indices: &DMatrix<usize>,
    table: &LabelTable,
) -> Result<BoardState, DecodeError> {
    let (rows, cols) = class_indices.shape();
    let mut teams = DMatrix::<u8>::zeros(rows, cols);
    let mut moods = DMatrix::<i8>::zeros(rows, cols);

    for row in 0..rows {
        for col in 0..cols {
            let index = class_indices[(row, col)];
            let label = table
                .lookup(index)
                .ok_or(DecodeError::UnknownClassIndex {
                    index,
                    col,
                    row,
                    classes: table.classes.len(),
                })?;
            if let CellLabel::Agent { team, mood } = label {
                teams[(row, col)] = team.code();
                moods[(row, col)] = mood.code();
            }
        }
    }

    Ok(BoardState::new(teams, moods, table.team_names.clone())?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_two_team_classes() {
        // B_H B_S / Empty R_S
        let indices = DMatrix::from_row_slice(2, 2, &[0, 1, 2, 4]);
        let board = decode_labels(&indices, &LabelTable::two_teams()).unwrap();

        assert_eq!(board.teams()[(0, 0)], 1);
        assert_eq!(board.moods()[(0, 0)], 1);
        assert_eq!(board.teams()[(0, 1)], 1);
        assert_eq!(board.moods()[(0, 1)], -1);
        assert_eq!(board.teams()[(1, 0)], 0);
        assert_eq!(board.moods()[(1, 0)], 0);
        assert_eq!(board.teams()[(1, 1)], 2);
        assert_eq!(board.moods()[(1, 1)], -1);
    }

    #[test]
    fn unknown_class_index_is_rejected() {
        let indices = DMatrix::from_row_slice(1, 2, &[0, 7]);
        let err = decode_labels(&indices, &LabelTable::two_teams()).unwrap_err();
        match err {
            DecodeError::UnknownClassIndex { index, col, row, classes } => {
                assert_eq!(index, 7);
                assert_eq!((col, row), (1, 0));
                assert_eq!(classes, 5);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn mood_codes_round_trip() {
        for mood in [Mood::Undefined, Mood::Happy, Mood::Sad] {
            assert_eq!(Mood::from_code(mood.code()), Some(mood));
        }
        assert_eq!(Mood::from_code(3), None);
    }
}
