use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Point, Result, SolverError};

/// A logical statement about the board: exactly `count` of `cells` are mines.
///
/// Two constraints are equal (and hash equally) when both their cell sets and
/// their counts match, which is what the engine relies on to skip duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Constraint {
    cells: BTreeSet<Point>,
    count: usize,
}

impl Constraint {
    /// Builds a constraint, rejecting counts larger than the cell set.
    pub fn new(cells: impl IntoIterator<Item = Point>, count: usize) -> Result<Self> {
        let constraint = Constraint {
            cells: cells.into_iter().collect(),
            count,
        };
        constraint.check()?;
        Ok(constraint)
    }

    pub fn cells(&self) -> &BTreeSet<Point> {
        &self.cells
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Every cell is a mine when the count covers the whole set.
    pub fn known_mines(&self) -> BTreeSet<Point> {
        if self.cells.len() == self.count {
            self.cells.clone()
        } else {
            BTreeSet::new()
        }
    }

    /// Every cell is safe when no mines remain. An empty constraint carries no
    /// information and yields nothing.
    pub fn known_safe(&self) -> BTreeSet<Point> {
        if self.count == 0 && !self.cells.is_empty() {
            self.cells.clone()
        } else {
            BTreeSet::new()
        }
    }

    /// Drops `cell` as an accounted-for mine. Returns whether the cell was present.
    pub fn remove_as_mine(&mut self, cell: Point) -> Result<bool> {
        if !self.cells.contains(&cell) {
            return Ok(false);
        }
        let Some(count) = self.count.checked_sub(1) else {
            return Err(SolverError::InconsistentCount {
                cells: self.cells.len() - 1,
                count: -1,
            });
        };
        self.cells.remove(&cell);
        self.count = count;
        Ok(true)
    }

    /// Drops `cell` as a known safe cell. Returns whether the cell was present.
    pub fn remove_as_safe(&mut self, cell: Point) -> bool {
        self.cells.remove(&cell)
    }

    /// Subset subtraction: if `other.cells ⊆ self.cells`, the cells only `self`
    /// covers hold exactly `self.count - other.count` mines.
    ///
    /// Returns `Ok(None)` when `other` is not a subset of `self`.
    pub fn subtract(&self, other: &Constraint) -> Result<Option<Constraint>> {
        if !other.cells.is_subset(&self.cells) {
            return Ok(None);
        }
        let cells: BTreeSet<Point> = self.cells.difference(&other.cells).copied().collect();
        let Some(count) = self.count.checked_sub(other.count) else {
            return Err(SolverError::InconsistentCount {
                cells: cells.len(),
                count: self.count as isize - other.count as isize,
            });
        };
        Constraint::new(cells, count).map(Some)
    }

    /// Validates `count <= |cells|`.
    pub fn check(&self) -> Result<()> {
        if self.count > self.cells.len() {
            return Err(SolverError::InconsistentCount {
                cells: self.cells.len(),
                count: self.count as isize,
            });
        }
        Ok(())
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, cell) in self.cells.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{cell}")?;
        }
        write!(f, "}} = {}", self.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(row: usize, col: usize) -> Point {
        Point::new(row, col)
    }

    #[test]
    fn test_single_zero_cell_is_safe() {
        let constraint = Constraint::new([p(0, 0)], 0).unwrap();
        assert_eq!(constraint.known_safe(), BTreeSet::from([p(0, 0)]));
        assert!(constraint.known_mines().is_empty());
    }

    #[test]
    fn test_full_count_means_all_mines() {
        let constraint = Constraint::new([p(0, 0), p(0, 1)], 2).unwrap();
        assert_eq!(constraint.known_mines(), BTreeSet::from([p(0, 0), p(0, 1)]));
        assert!(constraint.known_safe().is_empty());
    }

    #[test]
    fn test_empty_constraint_carries_nothing() {
        // Zero cells and zero mines: neither rule should fire.
        let constraint = Constraint::new(Vec::new(), 0).unwrap();
        assert!(constraint.known_safe().is_empty());
        assert!(constraint.known_mines().is_empty());
    }

    #[test]
    fn test_partial_count_is_undetermined() {
        let constraint = Constraint::new([p(0, 0), p(0, 1), p(1, 0)], 1).unwrap();
        assert!(constraint.known_safe().is_empty());
        assert!(constraint.known_mines().is_empty());
    }

    #[test]
    fn test_remove_as_mine_decrements() {
        let mut constraint = Constraint::new([p(0, 0), p(0, 1)], 1).unwrap();
        assert!(constraint.remove_as_mine(p(0, 0)).unwrap());
        assert_eq!(constraint.count(), 0);
        assert_eq!(constraint.known_safe(), BTreeSet::from([p(0, 1)]));

        // Unknown cells leave the constraint untouched.
        assert!(!constraint.remove_as_mine(p(5, 5)).unwrap());
        assert_eq!(constraint.count(), 0);
    }

    #[test]
    fn test_remove_as_mine_below_zero_is_error() {
        let mut constraint = Constraint::new([p(0, 0), p(0, 1)], 0).unwrap();
        assert!(matches!(
            constraint.remove_as_mine(p(0, 0)),
            Err(SolverError::InconsistentCount { count: -1, .. })
        ));
        // The failed removal must not have mutated anything.
        assert_eq!(constraint.cells().len(), 2);
    }

    #[test]
    fn test_remove_as_safe_keeps_count() {
        let mut constraint = Constraint::new([p(0, 0), p(0, 1)], 1).unwrap();
        assert!(constraint.remove_as_safe(p(0, 1)));
        assert!(!constraint.remove_as_safe(p(0, 1)));
        assert_eq!(constraint.known_mines(), BTreeSet::from([p(0, 0)]));
    }

    #[test]
    fn test_subtract_subset() {
        let big = Constraint::new([p(0, 0), p(0, 1), p(0, 2)], 1).unwrap();
        let small = Constraint::new([p(0, 0), p(0, 1)], 1).unwrap();
        let derived = big.subtract(&small).unwrap().unwrap();
        assert_eq!(derived, Constraint::new([p(0, 2)], 0).unwrap());

        // Not a subset the other way round.
        assert_eq!(small.subtract(&big).unwrap(), None);
    }

    #[test]
    fn test_subtract_detects_impossible_counts() {
        let big = Constraint::new([p(0, 0), p(0, 1), p(0, 2)], 1).unwrap();
        let small = Constraint::new([p(0, 0), p(0, 1)], 2).unwrap();
        assert!(big.subtract(&small).is_err());
    }

    #[test]
    fn test_new_rejects_overfull_count() {
        assert_eq!(
            Constraint::new([p(0, 0)], 2),
            Err(SolverError::InconsistentCount { cells: 1, count: 2 })
        );
    }

    #[test]
    fn test_display() {
        let constraint = Constraint::new([p(1, 0), p(0, 2)], 1).unwrap();
        assert_eq!(constraint.to_string(), "{(0, 2), (1, 0)} = 1");
    }
}
