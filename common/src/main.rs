use clap::Parser;
use clap_verbosity_flag::Verbosity;
use minesweeper_ai::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::thread;
use std::time::Duration;

/// Autonomous Minesweeper bot driven by a propositional knowledge base.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Number of rows.
    #[arg(long, default_value_t = 10)]
    height: usize,

    /// Number of columns.
    #[arg(long, default_value_t = 10)]
    width: usize,

    /// Number of mines to place.
    #[arg(long, default_value_t = 15)]
    mines: usize,

    /// Seed for mine placement and guesses; random if omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Pause between moves, to make the game watchable.
    #[arg(long, default_value_t = 0)]
    delay_ms: u64,

    #[command(flatten)]
    verbose: Verbosity,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .init();

    // --- 1. Initialization ---
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let board = Board::new(args.height, args.width, args.mines, &mut rng)?;
    let mut game = Game::new(board);

    println!("--- Autonomous Minesweeper Bot ---");
    println!("Strategy: Prioritize logically safe moves, guess randomly otherwise.");
    println!(
        "Board: {}x{} with {} mines",
        args.height, args.width, args.mines
    );

    // --- 2. Game Loop ---
    while game.game_state == GameState::Playing {
        let Some(turn) = game.step(&mut rng)? else {
            println!("No valid moves left for the bot to make.");
            break;
        };

        let point = turn.chosen.point();
        match turn.chosen {
            Move::Safe(_) => println!("\n--- Move #{}: {point} (safe) ---", game.move_count),
            Move::Random(_) => println!(
                "\n--- Move #{}: {point} (no safe move known, guessing) ---",
                game.move_count
            ),
        }

        match turn.revealed {
            Some(count) => println!(
                "Revealed {count}. Learned {} safe, {} mines. Known: {} safe unrevealed, {} mines.",
                turn.inference.safes.len(),
                turn.inference.mines.len(),
                game.engine.safes().len() - game.engine.moves_made().len(),
                game.engine.mines().len(),
            ),
            None => println!("Boom."),
        }

        if args.delay_ms > 0 {
            thread::sleep(Duration::from_millis(args.delay_ms));
        }
    }

    // --- 3. Final Result ---
    println!("\n--- Game Over ---");

    match game.game_state {
        GameState::Won => println!("Result: The bot won in {} moves!", game.move_count),
        GameState::Lost => println!("Result: The bot hit a mine and lost."),
        GameState::Stuck => println!("Result: The bot ran out of moves."),
        GameState::Playing => println!("Result: The game ended unexpectedly."),
    }

    Ok(())
}
