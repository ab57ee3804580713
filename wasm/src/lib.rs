//! # 2048 WebAssembly Bindings
//!
//! This crate provides JavaScript-friendly bindings to the 2048 board
//! engine using wasm-bindgen. A web front-end renders the grid, forwards
//! direction intents through `applyMove`, and registers callbacks for
//! score changes and game over.

use std::cell::RefCell;
use std::rc::Rc;

use game2048_core::{Direction, Engine, GameObserver, Score, Tile};
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// Result of a move, serialized for JavaScript.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsMoveResult {
    /// The updated grid (16 elements, row-major order).
    pub grid: Vec<Tile>,
    /// Current total score.
    pub score: f64,
    /// Points earned from this move.
    pub reward: f64,
    /// Whether the board changed.
    pub changed: bool,
    /// Whether the game is over.
    pub game_over: bool,
}

/// Scores cross into JS as plain numbers everywhere (never `BigInt`).
/// Reachable scores are far below 2^53, so the conversion is exact.
fn js_number(score: Score) -> f64 {
    score as f64
}

/// JS functions registered by the front-end.
#[derive(Default)]
struct JsCallbacks {
    on_score_change: Option<js_sys::Function>,
    on_game_over: Option<js_sys::Function>,
}

/// Fires the registered callbacks. Exceptions thrown by them are dropped
/// so they cannot unwind through the engine.
struct JsObserver(Rc<RefCell<JsCallbacks>>);

impl GameObserver for JsObserver {
    fn on_score_change(&mut self, score: Score) {
        let callback = self.0.borrow().on_score_change.clone();
        if let Some(callback) = callback {
            let _ = callback.call1(&JsValue::NULL, &JsValue::from_f64(js_number(score)));
        }
    }

    fn on_game_over(&mut self) {
        let callback = self.0.borrow().on_game_over.clone();
        if let Some(callback) = callback {
            let _ = callback.call0(&JsValue::NULL);
        }
    }
}

/// WebAssembly wrapper for the 2048 engine.
#[wasm_bindgen]
pub struct WasmGame {
    engine: Engine,
    callbacks: Rc<RefCell<JsCallbacks>>,
}

#[wasm_bindgen]
impl WasmGame {
    /// Create a new game. With a seed the spawns are reproducible;
    /// without one the browser's entropy is used.
    #[wasm_bindgen(constructor)]
    pub fn new(seed: Option<u64>) -> WasmGame {
        let engine = match seed {
            Some(seed) => Engine::new(seed),
            None => Engine::from_entropy(),
        };
        let callbacks = Rc::new(RefCell::new(JsCallbacks::default()));
        let mut game = WasmGame { engine, callbacks };
        game.engine.subscribe(JsObserver(Rc::clone(&game.callbacks)));
        game
    }

    /// Reset the board and score and place two new tiles.
    #[wasm_bindgen(js_name = newGame)]
    pub fn new_game(&mut self) {
        self.engine.new_game();
    }

    /// Execute a move: "up", "down", "left" or "right".
    ///
    /// Returns an object `{ grid, score, reward, changed, gameOver }`.
    /// Throws on any other direction string.
    #[wasm_bindgen(js_name = applyMove)]
    pub fn apply_move(&mut self, direction: &str) -> Result<JsValue, JsError> {
        let direction: Direction = direction.parse()?;
        let outcome = self.engine.apply_move(direction);
        let result = JsMoveResult {
            grid: self.engine.grid().to_vec(),
            score: js_number(self.engine.score()),
            reward: js_number(outcome.reward),
            changed: outcome.changed,
            game_over: outcome.game_over,
        };
        serde_wasm_bindgen::to_value(&result).map_err(|e| JsError::new(&e.to_string()))
    }

    /// Get the current grid as a flat row-major array.
    #[wasm_bindgen(js_name = getGrid)]
    pub fn get_grid(&self) -> Vec<Tile> {
        self.engine.grid().to_vec()
    }

    /// Get the current score.
    #[wasm_bindgen(js_name = getScore)]
    pub fn get_score(&self) -> f64 {
        js_number(self.engine.score())
    }

    /// Check if the game is over.
    #[wasm_bindgen(js_name = isGameOver)]
    pub fn is_game_over(&self) -> bool {
        self.engine.is_game_over()
    }

    /// Get the maximum tile value on the board.
    #[wasm_bindgen(js_name = getMaxTile)]
    pub fn get_max_tile(&self) -> Tile {
        self.engine.grid().max_tile()
    }

    /// Get legal moves as an array of 4 flags [Up, Down, Left, Right].
    #[wasm_bindgen(js_name = getLegalMoves)]
    pub fn get_legal_moves(&self) -> Vec<u8> {
        self.engine
            .legal_moves()
            .iter()
            .map(|&b| u8::from(b))
            .collect()
    }

    /// Register `callback(score)`, called when a move increases the score.
    #[wasm_bindgen(js_name = onScoreChange)]
    pub fn on_score_change(&mut self, callback: js_sys::Function) {
        self.callbacks.borrow_mut().on_score_change = Some(callback);
    }

    /// Register `callback()`, called once when the game ends.
    #[wasm_bindgen(js_name = onGameOver)]
    pub fn on_game_over(&mut self, callback: js_sys::Function) {
        self.callbacks.borrow_mut().on_game_over = Some(callback);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scores_are_plain_numbers() {
        assert_eq!(js_number(0), 0.0);
        assert_eq!(js_number(3_932_156), 3_932_156.0);
    }
}
