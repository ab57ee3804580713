//! # 2048 CLI
//!
//! Command-line interface for playing 2048 interactively or running
//! headless simulations with configurable policies.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::io::{self, Read, Write};
use std::rc::Rc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use env_logger::Env;
use game2048_core::{Direction, Engine, GameObserver, Score, Tile};
use log::info;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

#[derive(Parser, Debug)]
#[command(name = "game2048")]
#[command(author, version, about = "Play 2048 in the terminal or run simulations")]
struct Args {
    /// Number of episodes to run in headless mode (interactive if omitted)
    #[arg(short, long)]
    episodes: Option<u32>,

    /// Random seed for deterministic runs (entropy if omitted)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Maximum moves per episode (0 = unlimited)
    #[arg(short, long, default_value = "10000")]
    max_steps: u32,

    /// Policy for headless mode
    #[arg(short, long, value_enum, default_value = "random")]
    policy: Policy,

    /// Show board after each move in headless mode
    #[arg(long)]
    verbose: bool,

    /// Play a fixed list of moves (e.g. "left,up,right") and print the result
    #[arg(long, value_delimiter = ',', conflicts_with = "episodes")]
    moves: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Policy {
    /// Random legal moves
    Random,
    /// Cycle through moves: Left, Down, Right, Up
    Cycle,
}

fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let seed = args.seed.unwrap_or_else(rand::random);
    info!("using seed {}", seed);

    if let Some(moves) = &args.moves {
        run_scripted(seed, moves)
    } else if let Some(episodes) = args.episodes {
        run_headless(&args, seed, episodes);
        Ok(())
    } else {
        run_interactive(seed)
    }
}

// =============================================================================
// Interactive mode
// =============================================================================

/// What the terminal should say under the board.
#[derive(Default)]
struct Banner {
    last_score: Score,
    gained: Option<Score>,
    over: bool,
}

/// Forwards engine notifications into the shared banner.
struct BannerObserver(Rc<RefCell<Banner>>);

impl GameObserver for BannerObserver {
    fn on_score_change(&mut self, score: Score) {
        let mut banner = self.0.borrow_mut();
        banner.gained = Some(score - banner.last_score);
        banner.last_score = score;
    }

    fn on_game_over(&mut self) {
        self.0.borrow_mut().over = true;
    }
}

/// Run interactive mode where user plays with keyboard.
fn run_interactive(seed: u64) -> Result<()> {
    let _raw = RawMode::enable();

    let mut engine = Engine::new(seed);
    let banner = Rc::new(RefCell::new(Banner::default()));
    engine.subscribe(BannerObserver(Rc::clone(&banner)));

    let mut stdin = io::stdin();
    let mut buffer = [0u8; 3];
    redraw(&engine, &mut banner.borrow_mut())?;

    loop {
        let bytes_read = stdin.read(&mut buffer).context("reading keyboard input")?;
        if bytes_read == 0 {
            break;
        }

        match parse_input(&buffer[..bytes_read]) {
            InputAction::Move(dir) => {
                engine.apply_move(dir);
                redraw(&engine, &mut banner.borrow_mut())?;
            }
            InputAction::Restart => {
                engine.new_game();
                *banner.borrow_mut() = Banner::default();
                redraw(&engine, &mut banner.borrow_mut())?;
            }
            InputAction::Quit => {
                println!("\nGoodbye!");
                break;
            }
            InputAction::None => {}
        }
    }
    Ok(())
}

fn redraw(engine: &Engine, banner: &mut Banner) -> Result<()> {
    let mut out = io::stdout().lock();
    write!(out, "\x1b[2J\x1b[H")?; // Clear screen
    writeln!(out, "=== 2048 ===")?;
    writeln!(out, "Controls: WASD or Arrow Keys | Q to quit | R to restart\n")?;
    write!(out, "{}", engine)?;

    if let Some(gained) = banner.gained.take() {
        writeln!(out, "  +{} points!", gained)?;
    }
    if banner.over {
        writeln!(out, "\n  *** GAME OVER ***")?;
        writeln!(out, "  Final Score: {}", engine.score())?;
        writeln!(out, "  Max Tile: {}", engine.grid().max_tile())?;
        writeln!(out, "\n  Press R to restart or Q to quit")?;
    }
    out.flush().context("flushing stdout")
}

enum InputAction {
    Move(Direction),
    Restart,
    Quit,
    None,
}

fn parse_input(bytes: &[u8]) -> InputAction {
    match bytes {
        // Arrow keys (escape sequences)
        [27, 91, 65] => InputAction::Move(Direction::Up),
        [27, 91, 66] => InputAction::Move(Direction::Down),
        [27, 91, 67] => InputAction::Move(Direction::Right),
        [27, 91, 68] => InputAction::Move(Direction::Left),

        // WASD keys
        [b'w'] | [b'W'] => InputAction::Move(Direction::Up),
        [b's'] | [b'S'] => InputAction::Move(Direction::Down),
        [b'a'] | [b'A'] => InputAction::Move(Direction::Left),
        [b'd'] | [b'D'] => InputAction::Move(Direction::Right),

        // Control keys
        [b'q'] | [b'Q'] | [3] | [27] => InputAction::Quit, // q, Q, Ctrl+C, Esc
        [b'r'] | [b'R'] => InputAction::Restart,

        _ => InputAction::None,
    }
}

// =============================================================================
// Scripted mode
// =============================================================================

/// Apply a fixed move list and print the final board.
fn run_scripted(seed: u64, moves: &[String]) -> Result<()> {
    let directions = moves
        .iter()
        .map(|m| m.parse::<Direction>())
        .collect::<Result<Vec<_>, _>>()
        .context("parsing --moves")?;

    let mut engine = Engine::new(seed);
    for dir in directions {
        let outcome = engine.apply_move(dir);
        info!("{} -> changed={} reward={}", dir, outcome.changed, outcome.reward);
        if outcome.game_over {
            break;
        }
    }
    print!("{}", engine);
    println!("game_over={}", engine.is_game_over());
    Ok(())
}

// =============================================================================
// Headless mode
// =============================================================================

/// Run headless simulation mode.
fn run_headless(args: &Args, seed: u64, episodes: u32) {
    let mut scores: Vec<Score> = Vec::with_capacity(episodes as usize);
    let mut tile_counts: BTreeMap<Tile, u32> = BTreeMap::new();

    // Use a separate RNG for move selection
    let mut policy_rng = SmallRng::seed_from_u64(seed.wrapping_add(1000));

    for episode in 0..episodes {
        let mut engine = Engine::new(seed.wrapping_add(u64::from(episode)));
        let mut steps = 0;
        let mut cycle = 0;

        while !engine.is_game_over() && (args.max_steps == 0 || steps < args.max_steps) {
            let dir = match args.policy {
                Policy::Random => select_random_move(&engine, &mut policy_rng),
                Policy::Cycle => select_cycle_move(&engine, &mut cycle),
            };
            let Some(dir) = dir else {
                break;
            };

            engine.apply_move(dir);
            steps += 1;

            if args.verbose {
                println!("Episode {} Step {}: {}", episode + 1, steps, dir);
                print!("{}", engine);
            }
        }

        let max_tile = engine.grid().max_tile();
        scores.push(engine.score());
        *tile_counts.entry(max_tile).or_insert(0) += 1;
        info!(
            "episode {}: score={} max_tile={} steps={}",
            episode + 1,
            engine.score(),
            max_tile,
            steps
        );
    }

    print_summary(args, seed, episodes, &mut scores, &tile_counts);
}

fn print_summary(
    args: &Args,
    seed: u64,
    episodes: u32,
    scores: &mut [Score],
    tile_counts: &BTreeMap<Tile, u32>,
) {
    if scores.is_empty() {
        println!("episodes=0");
        return;
    }

    scores.sort_unstable();
    let n = scores.len();
    let total: Score = scores.iter().sum();
    let avg_score = total as f64 / n as f64;
    let median_score = if n % 2 == 0 {
        (scores[n / 2 - 1] + scores[n / 2]) as f64 / 2.0
    } else {
        scores[n / 2] as f64
    };

    // Output results in parseable format
    println!("=== Simulation Results ===");
    println!("episodes={}", episodes);
    println!("policy={:?}", args.policy);
    println!("seed={}", seed);
    println!("max_steps={}", args.max_steps);
    println!("avg_score={:.2}", avg_score);
    println!("median_score={:.2}", median_score);
    println!("min_score={}", scores[0]);
    println!("max_score={}", scores[n - 1]);
    println!(
        "max_tile_overall={}",
        tile_counts.keys().next_back().copied().unwrap_or(0)
    );

    let distribution: Vec<String> = tile_counts
        .iter()
        .map(|(tile, count)| format!("{}:{}", tile, count))
        .collect();
    println!("tile_distribution={}", distribution.join(","));
}

fn legal_directions(engine: &Engine) -> Vec<Direction> {
    Direction::ALL
        .into_iter()
        .zip(engine.legal_moves())
        .filter(|(_, legal)| *legal)
        .map(|(dir, _)| dir)
        .collect()
}

/// Select a random legal move.
fn select_random_move(engine: &Engine, rng: &mut SmallRng) -> Option<Direction> {
    legal_directions(engine).choose(rng).copied()
}

/// Select moves in a cycle: Left, Down, Right, Up, skipping illegal ones.
fn select_cycle_move(engine: &Engine, cycle: &mut usize) -> Option<Direction> {
    const ORDER: [Direction; 4] = [
        Direction::Left,
        Direction::Down,
        Direction::Right,
        Direction::Up,
    ];
    let legal = legal_directions(engine);

    for _ in 0..ORDER.len() {
        let dir = ORDER[*cycle % ORDER.len()];
        *cycle += 1;
        if legal.contains(&dir) {
            return Some(dir);
        }
    }
    None
}

// =============================================================================
// Terminal raw mode
// =============================================================================

/// Puts the terminal into single-keypress mode until dropped.
struct RawMode {
    #[cfg(unix)]
    saved: Option<libc::termios>,
}

#[cfg(unix)]
impl RawMode {
    fn enable() -> Self {
        use std::os::unix::io::AsRawFd;
        let fd = io::stdin().as_raw_fd();
        // SAFETY: termios is plain data and fd is stdin for the life of the process.
        unsafe {
            let mut termios: libc::termios = std::mem::zeroed();
            if libc::tcgetattr(fd, &mut termios) != 0 {
                return RawMode { saved: None };
            }
            let saved = termios;
            termios.c_lflag &= !(libc::ICANON | libc::ECHO);
            termios.c_cc[libc::VMIN] = 1;
            termios.c_cc[libc::VTIME] = 0;
            libc::tcsetattr(fd, libc::TCSANOW, &termios);
            RawMode { saved: Some(saved) }
        }
    }
}

#[cfg(unix)]
impl Drop for RawMode {
    fn drop(&mut self) {
        use std::os::unix::io::AsRawFd;
        if let Some(saved) = self.saved {
            // SAFETY: restores the attributes read in `enable`.
            unsafe {
                libc::tcsetattr(io::stdin().as_raw_fd(), libc::TCSANOW, &saved);
            }
        }
    }
}

#[cfg(not(unix))]
impl RawMode {
    // Without raw mode each key needs Enter.
    fn enable() -> Self {
        RawMode {}
    }
}
