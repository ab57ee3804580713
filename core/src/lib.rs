//! # 2048 Board Engine
//!
//! The state-transition core of the 2048 sliding-tile puzzle: sliding and
//! merging tiles, spawning new ones, keeping score and detecting when no
//! move is left. Rendering and input belong to the caller, which drives the
//! engine through [`Engine::apply_move`] and [`Engine::new_game`] and listens
//! through a [`GameObserver`].
//!
//! All randomness comes from an injected [`SpawnSource`], so games are
//! reproducible from a seed.
//!
//! ## Example
//!
//! ```rust
//! use game2048_core::{Direction, Engine};
//!
//! let mut engine = Engine::new(42); // Create game with seed 42
//! let outcome = engine.apply_move(Direction::Left);
//! println!("Score: {}, Changed: {}", engine.score(), outcome.changed);
//! ```

pub mod config;
pub mod direction;
pub mod engine;
pub mod grid;
pub mod line;
pub mod spawn;

pub use config::{
    Score, Tile, BOARD_SIZE, INITIAL_TILES, MAX_TILE, TILE_PROBABILITIES, TILE_VALUES,
};
pub use direction::{Direction, ParseDirectionError};
pub use engine::{Engine, GameEvent, GameObserver, GameStatus, MoveOutcome};
pub use grid::{Grid, GridError};
pub use spawn::{FixedSpawn, RandomSpawn, SpawnSource, Spawned};
