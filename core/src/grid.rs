use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::config::{Score, Tile, BOARD_SIZE, CELL_COUNT, MAX_TILE};
use crate::direction::Direction;
use crate::line::{self, Line};

/// Rejected input when building a [`Grid`] from raw values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    #[error("tile {value} at ({row}, {col}) is not 0 or a power of two in 2..={max}", max = MAX_TILE)]
    InvalidTile { row: usize, col: usize, value: Tile },
    #[error("expected {expected} cells, got {actual}")]
    WrongCellCount { expected: usize, actual: usize },
}

/// The board: a `BOARD_SIZE` x `BOARD_SIZE` matrix of tiles, row-major.
///
/// Every cell is 0 (empty) or a power of two >= 2. Grids built through
/// [`Grid::from_rows`] are validated; moves and spawns preserve the invariant.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Grid {
    cells: [[Tile; BOARD_SIZE]; BOARD_SIZE],
}

/// A grid produced by sliding every line of another grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSlide {
    pub grid: Grid,
    /// Sum of merged tile values across all lines.
    pub reward: Score,
    /// Whether any line differs from the source grid.
    pub changed: bool,
}

impl Grid {
    /// The all-zero grid.
    pub fn empty() -> Self {
        Grid::default()
    }

    /// Build a grid from rows, checking that each value is 0 or a power of
    /// two between 2 and [`MAX_TILE`].
    pub fn from_rows(rows: [[Tile; BOARD_SIZE]; BOARD_SIZE]) -> Result<Self, GridError> {
        for (row, values) in rows.iter().enumerate() {
            for (col, &value) in values.iter().enumerate() {
                if !is_valid_tile(value) {
                    return Err(GridError::InvalidTile { row, col, value });
                }
            }
        }
        Ok(Grid { cells: rows })
    }

    /// Build a grid from `CELL_COUNT` values in row-major order.
    pub fn from_slice(values: &[Tile]) -> Result<Self, GridError> {
        if values.len() != CELL_COUNT {
            return Err(GridError::WrongCellCount {
                expected: CELL_COUNT,
                actual: values.len(),
            });
        }
        let mut rows = [[0; BOARD_SIZE]; BOARD_SIZE];
        for (idx, &value) in values.iter().enumerate() {
            rows[idx / BOARD_SIZE][idx % BOARD_SIZE] = value;
        }
        Grid::from_rows(rows)
    }

    /// Get the rows of the board, top to bottom.
    pub fn rows(&self) -> &[[Tile; BOARD_SIZE]; BOARD_SIZE] {
        &self.cells
    }

    /// Get the tile at `(row, col)`, or None outside the board.
    pub fn get(&self, row: usize, col: usize) -> Option<Tile> {
        self.cells.get(row).and_then(|r| r.get(col)).copied()
    }

    /// Row-major copy of all cells.
    pub fn to_vec(&self) -> Vec<Tile> {
        self.cells.iter().flatten().copied().collect()
    }

    /// Coordinates of every empty cell, in row-major order.
    pub fn empty_cells(&self) -> Vec<(usize, usize)> {
        let mut empty = Vec::new();
        for (row, values) in self.cells.iter().enumerate() {
            for (col, &value) in values.iter().enumerate() {
                if value == 0 {
                    empty.push((row, col));
                }
            }
        }
        empty
    }

    /// Get the number of empty cells on the board.
    pub fn empty_count(&self) -> usize {
        self.cells.iter().flatten().filter(|&&v| v == 0).count()
    }

    /// Get the maximum tile value on the board.
    pub fn max_tile(&self) -> Tile {
        self.cells.iter().flatten().copied().max().unwrap_or(0)
    }

    /// True when the board is full and no two neighbours (right or below) are equal.
    pub fn is_game_over(&self) -> bool {
        for row in 0..BOARD_SIZE {
            for col in 0..BOARD_SIZE {
                let value = self.cells[row][col];
                if value == 0 {
                    return false;
                }
                if col + 1 < BOARD_SIZE && value == self.cells[row][col + 1] {
                    return false;
                }
                if row + 1 < BOARD_SIZE && value == self.cells[row + 1][col] {
                    return false;
                }
            }
        }
        true
    }

    /// Line `index` read in the direction tiles travel for `direction`.
    ///
    /// Rows for left/right, columns for up/down; right and down are reversed
    /// so that index 0 is always the wall tiles slide toward.
    pub fn line(&self, direction: Direction, index: usize) -> Line {
        let mut out = [0; BOARD_SIZE];
        for (k, slot) in out.iter_mut().enumerate() {
            let (row, col) = cell_of(direction, index, k);
            *slot = self.cells[row][col];
        }
        out
    }

    /// Slide every line toward `direction`, returning the new grid.
    pub fn slide(&self, direction: Direction) -> GridSlide {
        let mut next = Grid::empty();
        let mut reward = 0;
        let mut changed = false;
        for index in 0..BOARD_SIZE {
            let before = self.line(direction, index);
            let after = line::slide(&before);
            changed |= after.changed(&before);
            reward += after.reward;
            next.write_line(direction, index, &after.line);
        }
        GridSlide {
            grid: next,
            reward,
            changed,
        }
    }

    pub(crate) fn set(&mut self, row: usize, col: usize, value: Tile) {
        self.cells[row][col] = value;
    }

    fn write_line(&mut self, direction: Direction, index: usize, values: &Line) {
        for (k, &value) in values.iter().enumerate() {
            let (row, col) = cell_of(direction, index, k);
            self.cells[row][col] = value;
        }
    }
}

/// Board coordinates of position `k` along line `index` for `direction`.
fn cell_of(direction: Direction, index: usize, k: usize) -> (usize, usize) {
    let last = BOARD_SIZE - 1;
    match direction {
        Direction::Left => (index, k),
        Direction::Right => (index, last - k),
        Direction::Up => (k, index),
        Direction::Down => (last - k, index),
    }
}

fn is_valid_tile(value: Tile) -> bool {
    value == 0 || (value >= 2 && value <= MAX_TILE && value.is_power_of_two())
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Grid {{")?;
        for row in &self.cells {
            for &val in row {
                if val == 0 {
                    write!(f, "    .")?;
                } else {
                    write!(f, "{:5}", val)?;
                }
            }
            writeln!(f)?;
        }
        write!(f, "}}")
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let border = format!("+{}", "------+".repeat(BOARD_SIZE));
        writeln!(f, "{}", border)?;
        for row in &self.cells {
            write!(f, "|")?;
            for &val in row {
                if val == 0 {
                    write!(f, "      |")?;
                } else {
                    write!(f, "{:^6}|", val)?;
                }
            }
            writeln!(f)?;
            writeln!(f, "{}", border)?;
        }
        Ok(())
    }
}
