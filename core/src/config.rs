//! Fixed game configuration.
//!
//! The engine reads board dimension and spawn distribution from here and
//! nowhere else.

/// A single cell value: 0 for empty, otherwise a power of two.
pub type Tile = u32;

/// Accumulated merge points for a game.
pub type Score = u64;

/// Width and height of the square board.
pub const BOARD_SIZE: usize = 4;

/// Number of cells on the board.
pub const CELL_COUNT: usize = BOARD_SIZE * BOARD_SIZE;

/// Largest tile a grid may be built with: the highest tile reachable on a
/// 4x4 board. Merges above it stay far below `Tile::MAX`.
pub const MAX_TILE: Tile = 1 << 17;

/// Values a freshly spawned tile can take.
pub const TILE_VALUES: [Tile; 2] = [2, 4];

/// Probability of each entry in [`TILE_VALUES`]. Sums to 1.
pub const TILE_PROBABILITIES: [f64; 2] = [0.9, 0.1];

/// Tiles placed on an empty board by `new_game`.
pub const INITIAL_TILES: usize = 2;

/// Map a unit roll in `[0, 1)` onto [`TILE_VALUES`] using [`TILE_PROBABILITIES`].
pub fn tile_for_roll(roll: f64) -> Tile {
    let mut cumulative = 0.0;
    for (value, probability) in TILE_VALUES.iter().zip(TILE_PROBABILITIES) {
        cumulative += probability;
        if roll < cumulative {
            return *value;
        }
    }
    TILE_VALUES[TILE_VALUES.len() - 1]
}
