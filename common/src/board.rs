use std::collections::BTreeSet;

use rand::Rng;
use rand::seq::index;
use serde::{Deserialize, Serialize};

use crate::{BoardError, Point, neighbors};

/// What the player is allowed to ask of the hidden board.
///
/// The engine only ever sees neighbor counts; where the mines actually are
/// stays behind this boundary.
pub trait Minefield {
    /// `(height, width)` of the grid.
    fn dimensions(&self) -> (usize, usize);

    /// Number of mines among the up-to-8 neighbors of `cell`, not counting
    /// `cell` itself.
    fn neighbor_mine_count(&self, cell: Point) -> Result<u8, BoardError>;
}

/// The hidden board: mine positions plus the cells the player has flagged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub height: usize,
    pub width: usize,
    mines: BTreeSet<Point>,
    /// Cells the player has flagged as mines.
    flagged: BTreeSet<Point>,
}

fn cell_count(height: usize, width: usize) -> Result<usize, BoardError> {
    height
        .checked_mul(width)
        .ok_or(BoardError::TooLarge { height, width })
}

impl Board {
    /// Places `mines` mines uniformly at random.
    pub fn new<R: Rng + ?Sized>(
        height: usize,
        width: usize,
        mines: usize,
        rng: &mut R,
    ) -> Result<Self, BoardError> {
        let cells = cell_count(height, width)?;
        if mines >= cells {
            return Err(BoardError::TooManyMines { mines, cells });
        }

        let mines = index::sample(rng, cells, mines)
            .into_iter()
            .map(|i| Point {
                row: i / width,
                col: i % width,
            })
            .collect();

        Ok(Board {
            height,
            width,
            mines,
            flagged: BTreeSet::new(),
        })
    }

    /// A board with mines at exactly the given cells.
    pub fn from_mines(
        height: usize,
        width: usize,
        mines: impl IntoIterator<Item = Point>,
    ) -> Result<Self, BoardError> {
        let cells = cell_count(height, width)?;
        let mut board = Board {
            height,
            width,
            mines: BTreeSet::new(),
            flagged: BTreeSet::new(),
        };
        for mine in mines {
            board.check_bounds(mine)?;
            board.mines.insert(mine);
        }
        if board.mines.len() >= cells {
            return Err(BoardError::TooManyMines {
                mines: board.mines.len(),
                cells,
            });
        }
        Ok(board)
    }

    /// Deserializes a board from bytes.
    pub fn deserialize(bts: &[u8]) -> anyhow::Result<Self> {
        Ok(bcs::from_bytes(bts)?)
    }

    /// Serializes the board to bytes.
    pub fn serialize(&self) -> anyhow::Result<Vec<u8>> {
        Ok(bcs::to_bytes(self)?)
    }

    pub fn mine_count(&self) -> usize {
        self.mines.len()
    }

    pub fn is_mine(&self, cell: Point) -> Result<bool, BoardError> {
        self.check_bounds(cell)?;
        Ok(self.mines.contains(&cell))
    }

    /// Counts mines within one row and column of `cell`, excluding `cell`.
    pub fn nearby_mines(&self, cell: Point) -> Result<u8, BoardError> {
        self.check_bounds(cell)?;
        let count = neighbors(cell, self.height, self.width)
            .filter(|neighbor| self.mines.contains(neighbor))
            .count();
        // At most 8 neighbors.
        Ok(count as u8)
    }

    /// Flags `cell` as a mine. Returns whether the flag is new.
    pub fn flag(&mut self, cell: Point) -> Result<bool, BoardError> {
        self.check_bounds(cell)?;
        Ok(self.flagged.insert(cell))
    }

    pub fn flagged(&self) -> &BTreeSet<Point> {
        &self.flagged
    }

    /// The game is won once the flags match the mines exactly.
    pub fn won(&self) -> bool {
        self.flagged == self.mines
    }

    fn check_bounds(&self, cell: Point) -> Result<(), BoardError> {
        if cell.row < self.height && cell.col < self.width {
            Ok(())
        } else {
            Err(BoardError::OutOfBounds(cell))
        }
    }
}

impl Minefield for Board {
    fn dimensions(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    fn neighbor_mine_count(&self, cell: Point) -> Result<u8, BoardError> {
        self.nearby_mines(cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn p(row: usize, col: usize) -> Point {
        Point::new(row, col)
    }

    #[test]
    fn test_random_board_has_requested_mines() {
        let mut rng = StdRng::seed_from_u64(3);
        let board = Board::new(8, 8, 10, &mut rng).unwrap();
        assert_eq!(board.mine_count(), 10);
        assert_eq!(board.dimensions(), (8, 8));
        assert!(!board.won());
    }

    #[test]
    fn test_too_many_mines() {
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(
            Board::new(3, 3, 9, &mut rng),
            Err(BoardError::TooManyMines { mines: 9, cells: 9 })
        );
    }

    #[test]
    fn test_oversized_board_is_rejected() {
        let mut rng = StdRng::seed_from_u64(0);
        let too_large = BoardError::TooLarge {
            height: usize::MAX,
            width: 2,
        };
        assert_eq!(Board::new(usize::MAX, 2, 1, &mut rng), Err(too_large));
        assert_eq!(Board::from_mines(usize::MAX, 2, Vec::new()), Err(too_large));
    }

    #[test]
    fn test_nearby_mines() {
        let board = Board::from_mines(3, 3, [p(0, 0), p(2, 2)]).unwrap();
        assert_eq!(board.nearby_mines(p(1, 1)), Ok(2));
        assert_eq!(board.nearby_mines(p(0, 1)), Ok(1));
        assert_eq!(board.nearby_mines(p(2, 0)), Ok(0));
        // A mine does not count itself.
        assert_eq!(board.nearby_mines(p(0, 0)), Ok(0));
        assert_eq!(
            board.neighbor_mine_count(p(3, 0)),
            Err(BoardError::OutOfBounds(p(3, 0)))
        );
    }

    #[test]
    fn test_won_requires_exact_flags() {
        let mut board = Board::from_mines(2, 2, [p(0, 0)]).unwrap();
        assert!(board.flag(p(1, 1)).unwrap());
        assert!(!board.won());

        let mut board = Board::from_mines(2, 2, [p(0, 0)]).unwrap();
        assert!(board.flag(p(0, 0)).unwrap());
        assert!(!board.flag(p(0, 0)).unwrap());
        assert!(board.won());
    }

    #[test]
    fn test_serialization_preserves_board() {
        let mut board = Board::from_mines(4, 5, [p(0, 3), p(3, 4)]).unwrap();
        board.flag(p(0, 3)).unwrap();

        let restored = Board::deserialize(&board.serialize().unwrap()).unwrap();
        assert_eq!(restored, board);
    }
}
