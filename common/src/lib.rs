use std::fmt;

pub use autoplay::*;
pub use board::*;
pub use constraint::*;
pub use engine::*;
pub use error::*;
pub use selector::*;

mod autoplay;
mod board;
mod constraint;
mod engine;
mod error;
mod selector;

/// A cell on the board, addressed as (row, column).
///
/// Ordered row-major, so sets of points iterate top-left to bottom-right.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Point {
    pub row: usize,
    pub col: usize,
}

impl Point {
    pub const fn new(row: usize, col: usize) -> Self {
        Point { row, col }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// All valid neighbor coordinates of `point` on a `height x width` grid.
/// Handles board edges and corners, and never yields `point` itself.
pub fn neighbors(point: Point, height: usize, width: usize) -> impl Iterator<Item = Point> {
    (-1..=1).flat_map(move |dr| {
        (-1..=1).filter_map(move |dc| {
            if dr == 0 && dc == 0 {
                return None;
            }

            let row = point.row.checked_add_signed(dr)?;
            let col = point.col.checked_add_signed(dc)?;

            if row < height && col < width {
                Some(Point { row, col })
            } else {
                None
            }
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neighbors() {
        // Corner cell should have 3 neighbors
        assert_eq!(neighbors(Point::new(0, 0), 3, 3).count(), 3);

        // Center cell should have 8 neighbors
        let center: Vec<Point> = neighbors(Point::new(1, 1), 3, 3).collect();
        assert_eq!(center.len(), 8);
        assert!(!center.contains(&Point::new(1, 1)));

        // Edge cell should have 5 neighbors
        assert_eq!(neighbors(Point::new(0, 1), 3, 3).count(), 5);

        // A single-cell board has none
        assert_eq!(neighbors(Point::new(0, 0), 1, 1).count(), 0);
    }

    #[test]
    fn test_point_ordering_is_row_major() {
        assert!(Point::new(0, 5) < Point::new(1, 0));
        assert!(Point::new(1, 0) < Point::new(1, 1));
    }
}
