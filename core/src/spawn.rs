//! Tile spawning and the injectable randomness behind it.

use log::debug;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::config::{tile_for_roll, Tile};
use crate::grid::Grid;

/// Source of the two random choices a spawn needs.
///
/// The engine never touches a global RNG; it asks its `SpawnSource`, so
/// tests can substitute a scripted sequence.
pub trait SpawnSource {
    /// Index in `0..len` of the empty cell to fill. `len` is never 0.
    fn pick_index(&mut self, len: usize) -> usize;

    /// Uniform sample in `[0, 1)` that selects the tile value.
    fn roll(&mut self) -> f64;
}

/// Spawn source backed by a `rand` generator.
#[derive(Debug, Clone)]
pub struct RandomSpawn<R = SmallRng> {
    rng: R,
}

impl RandomSpawn<SmallRng> {
    /// Deterministic source: the same seed yields the same games.
    pub fn seeded(seed: u64) -> Self {
        RandomSpawn {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Source seeded from operating system entropy.
    pub fn from_entropy() -> Self {
        RandomSpawn {
            rng: SmallRng::from_entropy(),
        }
    }
}

impl<R: Rng> RandomSpawn<R> {
    pub fn from_rng(rng: R) -> Self {
        RandomSpawn { rng }
    }
}

impl<R: Rng> SpawnSource for RandomSpawn<R> {
    fn pick_index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }

    fn roll(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}

/// Always fills the first empty cell (row-major) with the most likely tile.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedSpawn;

impl SpawnSource for FixedSpawn {
    fn pick_index(&mut self, _len: usize) -> usize {
        0
    }

    fn roll(&mut self) -> f64 {
        0.0
    }
}

impl<S: SpawnSource + ?Sized> SpawnSource for &mut S {
    fn pick_index(&mut self, len: usize) -> usize {
        (**self).pick_index(len)
    }

    fn roll(&mut self) -> f64 {
        (**self).roll()
    }
}

impl<S: SpawnSource + ?Sized> SpawnSource for Box<S> {
    fn pick_index(&mut self, len: usize) -> usize {
        (**self).pick_index(len)
    }

    fn roll(&mut self) -> f64 {
        (**self).roll()
    }
}

/// Where a tile was placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Spawned {
    pub row: usize,
    pub col: usize,
    pub value: Tile,
}

/// Place one tile in a random empty cell. No-op on a full grid.
pub fn spawn_tile<S: SpawnSource + ?Sized>(grid: &mut Grid, source: &mut S) -> Option<Spawned> {
    let empty = grid.empty_cells();
    if empty.is_empty() {
        return None;
    }

    let (row, col) = empty[source.pick_index(empty.len()) % empty.len()];
    let value = tile_for_roll(source.roll());
    grid.set(row, col, value);
    debug!("spawned {} at ({}, {})", value, row, col);

    Some(Spawned { row, col, value })
}
