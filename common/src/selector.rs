use rand::Rng;
use rand::seq::IndexedRandom;

use crate::{Engine, Point};

/// A chosen cell and how the choice was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    /// The engine has proven this cell safe.
    Safe(Point),
    /// Nothing is known to be safe; this is a guess among unknown cells.
    Random(Point),
}

impl Move {
    pub const fn point(self) -> Point {
        match self {
            Move::Safe(point) | Move::Random(point) => point,
        }
    }
}

/// Returns a cell known to be safe that has not been revealed yet.
///
/// Picks the smallest such cell so the choice is reproducible.
pub fn make_safe_move(engine: &Engine) -> Option<Point> {
    engine.safes().difference(engine.moves_made()).next().copied()
}

/// Returns a uniformly random cell that has not been revealed and is not a
/// known mine, or `None` when no such cell remains.
pub fn make_random_move<R: Rng + ?Sized>(
    engine: &Engine,
    height: usize,
    width: usize,
    rng: &mut R,
) -> Option<Point> {
    let candidates: Vec<Point> = (0..height)
        .flat_map(|row| (0..width).map(move |col| Point { row, col }))
        .filter(|p| !engine.moves_made().contains(p) && !engine.mines().contains(p))
        .collect();

    candidates.choose(rng).copied()
}

/// Prioritize logically safe moves, guess randomly otherwise.
pub fn next_move<R: Rng + ?Sized>(engine: &Engine, rng: &mut R) -> Option<Move> {
    make_safe_move(engine).map(Move::Safe).or_else(|| {
        make_random_move(engine, engine.height(), engine.width(), rng).map(Move::Random)
    })
}
