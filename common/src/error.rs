use thiserror::Error;

use crate::Point;

/// Contract violations detected by the deduction engine.
///
/// None of these occur while the board reports truthful neighbor counts; each one
/// means the caller fed the engine something impossible.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverError {
    #[error("{0} is outside the {1}x{2} grid")]
    OutOfBounds(Point, usize, usize),
    #[error("constraint has {count} mines among {cells} cells")]
    InconsistentCount { cells: usize, count: isize },
    #[error("{0} was proven both safe and a mine")]
    Contradiction(Point),
}

/// Errors raised by the board adapter.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardError {
    #[error("{0} is outside the board")]
    OutOfBounds(Point),
    #[error("{mines} mines do not fit on a board of {cells} cells")]
    TooManyMines { mines: usize, cells: usize },
    #[error("a {height}x{width} board has too many cells to index")]
    TooLarge { height: usize, width: usize },
}

pub type Result<T> = std::result::Result<T, SolverError>;
