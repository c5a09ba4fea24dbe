use std::collections::{BTreeSet, HashSet};
use std::mem;

use itertools::Itertools;
use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};

use crate::{Constraint, Point, Result, SolverError, neighbors};

/// What a call to [`Engine::add_observation`] or [`Engine::saturate`] learned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inference {
    /// Cells newly proven safe, in the order they were resolved.
    pub safes: Vec<Point>,
    /// Cells newly proven to be mines, in the order they were resolved.
    pub mines: Vec<Point>,
    /// Constraints added by subset subtraction.
    pub derived: usize,
    /// Saturation passes run, including the final pass that found nothing.
    pub passes: usize,
}

impl Inference {
    pub fn is_empty(&self) -> bool {
        self.safes.is_empty() && self.mines.is_empty() && self.derived == 0
    }
}

/// The player's knowledge base.
///
/// It never sees where the mines are. Everything it knows comes from the
/// neighbor counts handed to [`Engine::add_observation`], and every cell it
/// places in the safe or mine set is logically guaranteed by those counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Engine {
    height: usize,
    width: usize,
    /// Cells that have been revealed.
    moves_made: BTreeSet<Point>,
    /// Cells proven not to contain a mine.
    safes: BTreeSet<Point>,
    /// Cells proven to contain a mine.
    mines: BTreeSet<Point>,
    /// Live constraints. Resolved cells never appear in any of them.
    knowledge: Vec<Constraint>,
}

impl Engine {
    pub fn new(height: usize, width: usize) -> Self {
        Engine {
            height,
            width,
            moves_made: BTreeSet::new(),
            safes: BTreeSet::new(),
            mines: BTreeSet::new(),
            knowledge: Vec::new(),
        }
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn moves_made(&self) -> &BTreeSet<Point> {
        &self.moves_made
    }

    pub fn safes(&self) -> &BTreeSet<Point> {
        &self.safes
    }

    pub fn mines(&self) -> &BTreeSet<Point> {
        &self.mines
    }

    pub fn knowledge(&self) -> &[Constraint] {
        &self.knowledge
    }

    pub fn is_resolved(&self, cell: Point) -> bool {
        self.safes.contains(&cell) || self.mines.contains(&cell)
    }

    /// Records `cell` as a mine and removes it from every constraint.
    ///
    /// On error the engine is left unchanged.
    pub fn mark_mine(&mut self, cell: Point) -> Result<()> {
        self.check_bounds(cell)?;
        if self.safes.contains(&cell) {
            warn!("{cell} is already known to be safe, refusing to mark it as a mine");
            return Err(SolverError::Contradiction(cell));
        }
        // A constraint with no mines left cannot contain this one.
        if let Some(constraint) = self
            .knowledge
            .iter()
            .find(|c| c.cells().contains(&cell) && c.count() == 0)
        {
            warn!("{cell} cannot be a mine, {constraint} has none left");
            return Err(SolverError::InconsistentCount {
                cells: constraint.cells().len() - 1,
                count: -1,
            });
        }

        self.mines.insert(cell);
        for constraint in &mut self.knowledge {
            constraint.remove_as_mine(cell)?;
        }
        Ok(())
    }

    /// Records `cell` as safe and removes it from every constraint.
    ///
    /// On error the engine is left unchanged.
    pub fn mark_safe(&mut self, cell: Point) -> Result<()> {
        self.check_bounds(cell)?;
        if self.mines.contains(&cell) {
            warn!("{cell} is already known to be a mine, refusing to mark it as safe");
            return Err(SolverError::Contradiction(cell));
        }
        // Every other cell of a full constraint is a mine, so this one cannot be safe.
        if let Some(constraint) = self
            .knowledge
            .iter()
            .find(|c| c.cells().contains(&cell) && c.count() == c.cells().len())
        {
            warn!("{cell} cannot be safe, {constraint} needs every cell");
            return Err(SolverError::InconsistentCount {
                cells: constraint.cells().len() - 1,
                count: constraint.count() as isize,
            });
        }

        self.safes.insert(cell);
        for constraint in &mut self.knowledge {
            constraint.remove_as_safe(cell);
        }
        Ok(())
    }

    /// Called when the board reports that the revealed `cell` has `count`
    /// mines among its neighbors.
    ///
    /// Adds the resulting constraint and saturates the knowledge base, so when
    /// this returns every fact derivable by subset subtraction is already in
    /// the safe and mine sets. On error the engine is left as it was before
    /// the call, including anything saturation had already resolved.
    pub fn add_observation(&mut self, cell: Point, count: u8) -> Result<Inference> {
        self.check_bounds(cell)?;
        if self.mines.contains(&cell) {
            warn!("{cell} was revealed but is already known to be a mine");
            return Err(SolverError::Contradiction(cell));
        }

        let mut remaining = isize::from(count);
        let mut cells = Vec::new();
        for neighbor in neighbors(cell, self.height, self.width) {
            if self.moves_made.contains(&neighbor) || self.safes.contains(&neighbor) {
                continue;
            }
            if self.mines.contains(&neighbor) {
                remaining -= 1;
            } else {
                cells.push(neighbor);
            }
        }

        if remaining < 0 {
            warn!("{cell} reported {count} mines but more are already known around it");
            return Err(SolverError::InconsistentCount {
                cells: cells.len(),
                count: remaining,
            });
        }
        let constraint = Constraint::new(cells, remaining as usize).inspect_err(|_| {
            warn!("{cell} reported {count} mines, more than its unresolved neighbors");
        })?;

        self.atomically(|engine| {
            engine.mark_safe(cell)?;
            engine.moves_made.insert(cell);
            debug!("observed {cell} = {count}, adding {constraint}");
            engine.knowledge.push(constraint);
            engine.saturate_in_place()
        })
    }

    /// Applies the inference rules until a whole pass learns nothing new.
    ///
    /// Each pass resolves every cell some constraint pins down, drops empty and
    /// duplicate constraints, then derives `B - A` for every pair with `A ⊆ B`.
    /// A single pass is not enough: resolving a cell shrinks other constraints,
    /// which can expose new subsets and new resolved cells.
    ///
    /// On error the engine is left unchanged.
    pub fn saturate(&mut self) -> Result<Inference> {
        self.atomically(Self::saturate_in_place)
    }

    fn saturate_in_place(&mut self) -> Result<Inference> {
        let mut inference = Inference::default();

        loop {
            inference.passes += 1;
            let resolved = self.resolve_known(&mut inference)?;
            self.prune();
            let derived = self.derive_subsets()?;
            inference.derived += derived;

            trace!(
                "pass {}: resolved {resolved}, derived {derived}, {} live constraints",
                inference.passes,
                self.knowledge.len()
            );

            if resolved == 0 && derived == 0 {
                break;
            }
        }

        debug!(
            "saturated after {} passes: {} safe, {} mines, {} constraints",
            inference.passes,
            self.safes.len(),
            self.mines.len(),
            self.knowledge.len()
        );
        Ok(inference)
    }

    /// Runs `f`, restoring the previous state if it fails partway.
    fn atomically<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let snapshot = self.clone();
        let result = f(self);
        if result.is_err() {
            *self = snapshot;
        }
        result
    }

    /// Marks every cell some constraint pins down. Returns how many were new.
    fn resolve_known(&mut self, inference: &mut Inference) -> Result<usize> {
        let mut mines = BTreeSet::new();
        let mut safes = BTreeSet::new();
        for constraint in &self.knowledge {
            mines.extend(constraint.known_mines());
            safes.extend(constraint.known_safe());
        }

        let mut resolved = 0;
        for cell in mines {
            if !self.mines.contains(&cell) {
                self.mark_mine(cell)?;
                inference.mines.push(cell);
                resolved += 1;
            }
        }
        for cell in safes {
            if !self.safes.contains(&cell) {
                self.mark_safe(cell)?;
                inference.safes.push(cell);
                resolved += 1;
            }
        }
        Ok(resolved)
    }

    /// Appends every new constraint obtainable by subset subtraction.
    fn derive_subsets(&mut self) -> Result<usize> {
        let mut derived = Vec::new();
        {
            let present: HashSet<&Constraint> = self.knowledge.iter().collect();
            let mut seen = HashSet::new();

            for (a, b) in self.knowledge.iter().tuple_combinations() {
                for (outer, inner) in [(a, b), (b, a)] {
                    let Some(constraint) = outer.subtract(inner)? else {
                        continue;
                    };
                    if constraint.is_empty() || present.contains(&constraint) {
                        continue;
                    }
                    if seen.insert(constraint.clone()) {
                        trace!("{outer} minus {inner} gives {constraint}");
                        derived.push(constraint);
                    }
                }
            }
        }

        let count = derived.len();
        self.knowledge.extend(derived);
        Ok(count)
    }

    /// Drops constraints with no cells left and exact duplicates.
    fn prune(&mut self) {
        self.knowledge = mem::take(&mut self.knowledge)
            .into_iter()
            .filter(|constraint| !constraint.is_empty())
            .unique()
            .collect();
    }

    fn check_bounds(&self, cell: Point) -> Result<()> {
        if cell.row < self.height && cell.col < self.width {
            Ok(())
        } else {
            Err(SolverError::OutOfBounds(cell, self.height, self.width))
        }
    }
}
