//! Program images
//!
//! An image is the read-only template every VM copies its memory from.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::error::ProgramError;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Program {
    cells: Vec<i64>,
}

impl Program {
    pub fn new(cells: Vec<i64>) -> Self {
        Self { cells }
    }

    /// Read a comma separated image from disk
    pub fn from_file(path: &Path) -> Result<Self, ProgramError> {
        let text = fs::read_to_string(path)?;
        text.parse()
    }

    pub fn cells(&self) -> &[i64] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl From<Vec<i64>> for Program {
    fn from(cells: Vec<i64>) -> Self {
        Self::new(cells)
    }
}

impl From<&[i64]> for Program {
    fn from(cells: &[i64]) -> Self {
        Self::new(cells.to_vec())
    }
}

impl FromStr for Program {
    type Err = ProgramError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ProgramError::Empty);
        }

        let cells = s
            .split(',')
            .enumerate()
            .map(|(index, text)| {
                let text = text.trim();
                text.parse::<i64>().map_err(|_| ProgramError::InvalidCell {
                    index,
                    text: text.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { cells })
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, cell) in self.cells.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{cell}")?;
        }
        Ok(())
    }
}
