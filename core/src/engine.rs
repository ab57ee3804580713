use std::fmt;

use log::{debug, info};
use serde::Serialize;

use crate::config::{Score, INITIAL_TILES};
use crate::direction::Direction;
use crate::grid::Grid;
use crate::spawn::{spawn_tile, RandomSpawn, SpawnSource, Spawned};

/// Hooks a presentation layer registers to hear about game progress.
///
/// Both hooks run synchronously at the end of an effective move, after the
/// new grid and score are committed.
pub trait GameObserver {
    /// The score increased; `score` is the new total.
    fn on_score_change(&mut self, _score: Score) {}

    /// The board just became terminal. Fires at most once per game.
    fn on_game_over(&mut self) {}
}

impl<F> GameObserver for F
where
    F: FnMut(GameEvent),
{
    fn on_score_change(&mut self, score: Score) {
        self(GameEvent::ScoreChanged(score));
    }

    fn on_game_over(&mut self) {
        self(GameEvent::GameOver);
    }
}

/// Notification payload for closure observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    ScoreChanged(Score),
    GameOver,
}

/// Whether the game can continue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Playable,
    Over,
}

/// Result of [`Engine::apply_move`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MoveOutcome {
    /// Whether the board changed (and a new tile was spawned).
    pub changed: bool,
    /// Points earned from merges in this move.
    pub reward: Score,
    /// Whether the board is terminal after the spawn. Always false when
    /// `changed` is false.
    pub game_over: bool,
    /// The tile placed after the move, if any.
    pub spawned: Option<Spawned>,
}

impl MoveOutcome {
    const UNCHANGED: MoveOutcome = MoveOutcome {
        changed: false,
        reward: 0,
        game_over: false,
        spawned: None,
    };
}

/// The board engine: owns the grid and score and applies moves.
///
/// Randomness comes only from the injected [`SpawnSource`].
pub struct Engine<S = RandomSpawn> {
    grid: Grid,
    score: Score,
    source: S,
    observers: Vec<Box<dyn GameObserver>>,
    over_reported: bool,
}

impl Engine<RandomSpawn> {
    /// Start a game whose spawns are fully determined by `seed`.
    pub fn new(seed: u64) -> Self {
        Engine::with_source(RandomSpawn::seeded(seed))
    }

    /// Start a game seeded from operating system entropy.
    pub fn from_entropy() -> Self {
        Engine::with_source(RandomSpawn::from_entropy())
    }
}

impl<S: SpawnSource> Engine<S> {
    /// Start a new game drawing spawns from `source`.
    pub fn with_source(source: S) -> Self {
        let mut engine = Engine::from_grid(Grid::empty(), 0, source);
        engine.new_game();
        engine
    }

    /// Resume from an existing position. Nothing is spawned.
    pub fn from_grid(grid: Grid, score: Score, source: S) -> Self {
        Engine {
            grid,
            score,
            source,
            observers: Vec::new(),
            over_reported: false,
        }
    }

    /// Clear the board and score, then place the opening tiles.
    ///
    /// Observers are not notified; callers read the new state directly.
    pub fn new_game(&mut self) {
        self.grid = Grid::empty();
        self.score = 0;
        self.over_reported = false;
        for _ in 0..INITIAL_TILES {
            spawn_tile(&mut self.grid, &mut self.source);
        }
        info!("new game, max tile {}", self.grid.max_tile());
    }

    /// Slide all tiles toward `direction`.
    ///
    /// If nothing moves, the grid and score are untouched, no tile is spawned
    /// and no observer fires. Otherwise the merge points are added to the
    /// score, one tile is spawned, and observers hear about the new score and
    /// (once per game) about game over.
    pub fn apply_move(&mut self, direction: Direction) -> MoveOutcome {
        let slide = self.grid.slide(direction);
        if !slide.changed {
            debug!("move {} had no effect", direction);
            return MoveOutcome::UNCHANGED;
        }

        self.grid = slide.grid;
        self.score += slide.reward;
        let spawned = spawn_tile(&mut self.grid, &mut self.source);
        let game_over = self.grid.is_game_over();
        debug!(
            "move {}: +{} (score {}), spawned {:?}",
            direction, slide.reward, self.score, spawned
        );

        if slide.reward > 0 {
            for observer in &mut self.observers {
                observer.on_score_change(self.score);
            }
        }
        if game_over && !self.over_reported {
            self.over_reported = true;
            info!(
                "game over: score {}, max tile {}",
                self.score,
                self.grid.max_tile()
            );
            for observer in &mut self.observers {
                observer.on_game_over();
            }
        }

        MoveOutcome {
            changed: true,
            reward: slide.reward,
            game_over,
            spawned,
        }
    }

    /// Register a hook for score-changed and game-over notifications.
    pub fn subscribe(&mut self, observer: impl GameObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Get the current grid.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Get the current score.
    pub fn score(&self) -> Score {
        self.score
    }

    /// Derive the game status from the current grid.
    pub fn status(&self) -> GameStatus {
        if self.grid.is_game_over() {
            GameStatus::Over
        } else {
            GameStatus::Playable
        }
    }

    /// Check if the game is over (no legal moves available).
    pub fn is_game_over(&self) -> bool {
        self.status() == GameStatus::Over
    }

    /// For each of [`Direction::ALL`], whether that move would change the board.
    pub fn legal_moves(&self) -> [bool; 4] {
        Direction::ALL.map(|dir| self.grid.slide(dir).changed)
    }
}

impl<S> fmt::Debug for Engine<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("score", &self.score)
            .field("grid", &self.grid)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl<S> fmt::Display for Engine<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Score: {}", self.score)?;
        write!(f, "{}", self.grid)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::spawn::FixedSpawn;

    fn grid(rows: [[u32; 4]; 4]) -> Grid {
        Grid::from_rows(rows).unwrap()
    }

    fn recorded(engine: &mut Engine<FixedSpawn>) -> Rc<RefCell<Vec<GameEvent>>> {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        engine.subscribe(move |event: GameEvent| sink.borrow_mut().push(event));
        events
    }

    // -------------------------------------------------------------------------
    // New game
    // -------------------------------------------------------------------------

    #[test]
    fn test_new_game_has_two_tiles() {
        let engine = Engine::new(42);
        assert_eq!(engine.grid().empty_count(), 14);
        assert_eq!(engine.score(), 0);
        assert_eq!(engine.status(), GameStatus::Playable);
        for value in engine.grid().to_vec() {
            assert!(value == 0 || value == 2 || value == 4);
        }
    }

    #[test]
    fn test_new_game_resets_score() {
        let start = grid([[2, 2, 0, 0], [0; 4], [0; 4], [0; 4]]);
        let mut engine = Engine::from_grid(start, 0, FixedSpawn);
        engine.apply_move(Direction::Left);
        assert_eq!(engine.score(), 4);

        engine.new_game();
        assert_eq!(engine.score(), 0);
        assert_eq!(engine.grid(), &grid([[2, 2, 0, 0], [0; 4], [0; 4], [0; 4]]));
    }

    #[test]
    fn test_new_game_does_not_notify() {
        let mut engine = Engine::from_grid(Grid::empty(), 0, FixedSpawn);
        let events = recorded(&mut engine);
        engine.new_game();
        assert!(events.borrow().is_empty());
    }

    #[test]
    fn test_spawn_determinism() {
        let a = Engine::new(12345);
        let b = Engine::new(12345);
        assert_eq!(a.grid(), b.grid());
    }

    #[test]
    fn test_move_determinism() {
        let mut a = Engine::new(54321);
        let mut b = Engine::new(54321);
        for dir in [Direction::Left, Direction::Up, Direction::Right, Direction::Down] {
            assert_eq!(a.apply_move(dir), b.apply_move(dir));
            assert_eq!(a.grid(), b.grid());
            assert_eq!(a.score(), b.score());
        }
    }

    // -------------------------------------------------------------------------
    // Moves
    // -------------------------------------------------------------------------

    #[test]
    fn test_merge_then_spawn_end_to_end() {
        let start = grid([[2, 2, 0, 0], [0; 4], [0; 4], [0; 4]]);
        let mut engine = Engine::from_grid(start, 0, FixedSpawn);
        let outcome = engine.apply_move(Direction::Left);

        assert!(outcome.changed);
        assert_eq!(outcome.reward, 4);
        assert!(!outcome.game_over);
        assert_eq!(
            outcome.spawned,
            Some(Spawned {
                row: 0,
                col: 1,
                value: 2
            })
        );
        assert_eq!(engine.grid(), &grid([[4, 2, 0, 0], [0; 4], [0; 4], [0; 4]]));
        assert_eq!(engine.score(), 4);
    }

    #[test]
    fn test_ineffective_move_changes_nothing() {
        let start = grid([[2, 4, 2, 4], [0; 4], [0; 4], [0; 4]]);
        let mut engine = Engine::from_grid(start, 10, FixedSpawn);
        let events = recorded(&mut engine);

        let outcome = engine.apply_move(Direction::Left);

        assert_eq!(outcome, MoveOutcome::UNCHANGED);
        assert_eq!(engine.grid(), &start);
        assert_eq!(engine.score(), 10);
        assert!(events.borrow().is_empty());
    }

    #[test]
    fn test_slide_without_merge_spawns_but_keeps_score() {
        let start = grid([[0, 0, 0, 2], [0; 4], [0; 4], [0; 4]]);
        let mut engine = Engine::from_grid(start, 0, FixedSpawn);
        let events = recorded(&mut engine);

        let outcome = engine.apply_move(Direction::Left);

        assert!(outcome.changed);
        assert_eq!(outcome.reward, 0);
        assert_eq!(engine.grid().empty_count(), 14);
        assert!(events.borrow().is_empty());
    }

    #[test]
    fn test_only_effective_lines_contribute_score() {
        // Row 0 is already packed; row 1 merges.
        let mut engine = Engine::from_grid(
            grid([[2, 4, 8, 16], [8, 8, 0, 0], [0; 4], [0; 4]]),
            0,
            FixedSpawn,
        );
        let outcome = engine.apply_move(Direction::Left);
        assert_eq!(outcome.reward, 16);
        assert_eq!(engine.score(), 16);
        assert_eq!(engine.grid().rows()[0], [2, 4, 8, 16]);
    }

    #[test]
    fn test_legal_moves() {
        let engine = Engine::from_grid(grid([[2, 0, 0, 0], [0; 4], [0; 4], [0; 4]]), 0, FixedSpawn);
        // Up and left are walls for the single tile.
        assert_eq!(engine.legal_moves(), [false, true, false, true]);
    }

    // -------------------------------------------------------------------------
    // Game over
    // -------------------------------------------------------------------------

    #[test]
    fn test_game_over_after_final_merge() {
        let start = grid([[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [16, 32, 8, 8]]);
        let mut engine = Engine::from_grid(start, 0, FixedSpawn);
        let events = recorded(&mut engine);

        // 8+8 merges, the freed cell gets a 2 and the board locks up.
        let outcome = engine.apply_move(Direction::Left);
        assert!(outcome.changed);
        assert_eq!(outcome.reward, 16);
        assert!(outcome.game_over);
        assert_eq!(
            engine.grid(),
            &grid([[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [16, 32, 16, 2]])
        );
        assert_eq!(engine.status(), GameStatus::Over);
        assert_eq!(
            *events.borrow(),
            vec![GameEvent::ScoreChanged(16), GameEvent::GameOver]
        );

        // Nothing moves any more, and nothing is reported again.
        assert_eq!(engine.legal_moves(), [false; 4]);
        for dir in Direction::ALL {
            assert_eq!(engine.apply_move(dir), MoveOutcome::UNCHANGED);
        }
        assert_eq!(events.borrow().len(), 2);
        assert_eq!(engine.score(), 16);
    }

    #[test]
    fn test_game_over_without_merge() {
        let start = grid([[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [8, 16, 0, 32]]);
        let mut engine = Engine::from_grid(start, 100, FixedSpawn);
        let events = recorded(&mut engine);

        let outcome = engine.apply_move(Direction::Left);
        assert!(outcome.game_over);
        assert_eq!(engine.grid().rows()[3], [8, 16, 32, 2]);
        assert_eq!(engine.score(), 100);
        assert_eq!(*events.borrow(), vec![GameEvent::GameOver]);
    }

    #[test]
    fn test_new_game_rearms_game_over() {
        let start = grid([[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [8, 16, 0, 32]]);
        let mut engine = Engine::from_grid(start, 0, FixedSpawn);
        let events = recorded(&mut engine);
        engine.apply_move(Direction::Left);
        assert!(engine.is_game_over());

        engine.new_game();
        assert!(!engine.is_game_over());
        assert_eq!(engine.grid().empty_count(), 14);
        assert_eq!(events.borrow().len(), 1);
    }

    #[test]
    fn test_display_format() {
        let engine = Engine::new(42);
        let display = format!("{}", engine);
        assert!(display.contains("Score: 0"));
        assert!(display.contains("+------+"));
    }

    #[test]
    fn test_debug_format() {
        let engine = Engine::new(42);
        let debug = format!("{:?}", engine);
        assert!(debug.contains("Engine"));
        assert!(debug.contains("score"));
    }
}
