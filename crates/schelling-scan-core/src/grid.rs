use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of columns and rows the physical board is divided into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSpec {
    /// Number of columns (cells along x).
    pub cols: u32,
    /// Number of rows (cells along y).
    pub rows: u32,
}

impl GridSpec {
    pub fn new(cols: u32, rows: u32) -> Result<Self, GridSpecParseError> {
        if cols == 0 || rows == 0 {
            return Err(GridSpecParseError::ZeroDimension { cols, rows });
        }
        Ok(Self { cols, rows })
    }

    /// Total number of cells.
    pub fn cell_count(&self) -> usize {
        self.cols as usize * self.rows as usize
    }
}

/// The physical boards used in workshops are 26x18.
impl Default for GridSpec {
    fn default() -> Self {
        Self { cols: 26, rows: 18 }
    }
}

impl fmt::Display for GridSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.cols, self.rows)
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum GridSpecParseError {
    #[error("grid must be given as 'NxM', got {0:?}")]
    Malformed(String),
    #[error("grid dimensions must be positive (cols={cols}, rows={rows})")]
    ZeroDimension { cols: u32, rows: u32 },
}

impl FromStr for GridSpec {
    type Err = GridSpecParseError;

    /// Parse a `"26x18"`-style grid string (columns first).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (cols, rows) = s
            .split_once('x')
            .ok_or_else(|| GridSpecParseError::Malformed(s.to_owned()))?;
        let cols: u32 = cols
            .trim()
            .parse()
            .map_err(|_| GridSpecParseError::Malformed(s.to_owned()))?;
        let rows: u32 = rows
            .trim()
            .parse()
            .map_err(|_| GridSpecParseError::Malformed(s.to_owned()))?;
        Self::new(cols, rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_grid_string() {
        let g: GridSpec = "26x18".parse().unwrap();
        assert_eq!(g, GridSpec { cols: 26, rows: 18 });
        assert_eq!(g.cell_count(), 468);
    }

    #[test]
    fn rejects_malformed_strings() {
        assert!("26".parse::<GridSpec>().is_err());
        assert!("ax18".parse::<GridSpec>().is_err());
        assert!("26x18x2".parse::<GridSpec>().is_err());
    }

    #[test]
    fn rejects_zero_dimensions() {
        assert_eq!(
            "0x18".parse::<GridSpec>(),
            Err(GridSpecParseError::ZeroDimension { cols: 0, rows: 18 })
        );
    }
}
