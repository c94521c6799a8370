//! This module defines [Scope]s, the building blocks of the puzzle rules, as
//! well as factories that generate the full scope set for a grid shape.
//!
//! A scope is a fixed set of cells that must collectively contain each domain
//! value at most once. In classic Sudoku the scopes are the nine rows, nine
//! columns, and nine 3x3 blocks. Scopes are structural: they hold points, not
//! cells, and are evaluated against whatever [Grid](crate::Grid) is passed
//! in. This allows one scope set to be computed per grid shape and reused
//! across every puzzle instance of that shape.
//!
//! [SquareRootScopeFactory] generates the canonical layout for square grids:
//! one scope per row and per column, plus square blocks whenever the side
//! length permits them.

use crate::{Grid, MAX_SIZE, MIN_SIZE, Value};
use crate::error::{SudokuError, SudokuResult};
use crate::geometry::{Dimension, Point, Rectangle};
use crate::util::{contains_duplicate, integer_sqrt, is_prime};

use serde::{Deserialize, Serialize};

use std::collections::{BTreeSet, HashSet};

/// A fixed set of cells, identified by their [Point]s, that must collectively
/// contain each domain value at most once. Scope equality and hashing are
/// defined by the point set, so scopes with coinciding cells - such as the
/// row, column, and block of a 1x1 grid - are interchangeable and can be
/// deduplicated.
///
/// All queries take the grid to evaluate against as a parameter. Points
/// outside that grid's bounds are treated as empty cells.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct Scope {
    points: BTreeSet<Point>
}

impl Scope {

    /// Creates a new scope containing the given points. Duplicate points are
    /// collapsed.
    pub fn from_points(points: impl IntoIterator<Item = Point>) -> Scope {
        Scope {
            points: points.into_iter().collect()
        }
    }

    /// Creates a new scope covering all points of the given rectangle.
    pub fn from_rectangle(rectangle: Rectangle) -> Scope {
        Scope::from_points(rectangle.points())
    }

    /// Returns an iterator over the member points of this scope in row-major
    /// order.
    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        self.points.iter().copied()
    }

    /// Gets the number of member cells.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Indicates whether this scope has no member cells.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Indicates whether the given point is a member of this scope.
    pub fn contains(&self, point: Point) -> bool {
        self.points.contains(&point)
    }

    /// Gets the values of all non-empty member cells in the given grid, in
    /// scan order. Duplicates are preserved; a grid that violates this scope
    /// yields the offending value more than once.
    pub fn used_values<'grid, V: Value>(&self, grid: &'grid Grid<V>)
            -> Vec<&'grid V> {
        self.points()
            .filter_map(|point| grid.cell_at(point).ok().flatten())
            .collect()
    }

    /// Indicates whether no value appears more than once among the non-empty
    /// member cells of this scope in the given grid. Empty cells never cause
    /// invalidity.
    pub fn is_valid<V: Value>(&self, grid: &Grid<V>) -> bool {
        !contains_duplicate(self.used_values(grid).into_iter())
    }

    /// Indicates whether every member cell of this scope is filled in the
    /// given grid and all values are pairwise distinct.
    pub fn is_solved<V: Value>(&self, grid: &Grid<V>) -> bool {
        let mut seen = HashSet::new();

        for point in self.points() {
            match grid.cell_at(point) {
                Ok(Some(value)) =>
                    if !seen.insert(value) {
                        return false;
                    }
                _ => return false
            }
        }

        true
    }

    /// Finds the first member cell, in scan order, whose value duplicates the
    /// value of an earlier member cell in the given grid. Returns `None` if
    /// this scope is valid.
    pub fn conflict<V: Value>(&self, grid: &Grid<V>) -> Option<Point> {
        let mut seen = HashSet::new();

        for point in self.points() {
            if let Ok(Some(value)) = grid.cell_at(point) {
                if !seen.insert(value) {
                    return Some(point);
                }
            }
        }

        None
    }
}

/// A trait for factories that generate the full scope set for a grid shape
/// according to some layout rule.
pub trait ScopeFactory {

    /// Generates all scopes for a grid of the given size. The result contains
    /// no two equal scopes.
    ///
    /// # Errors
    ///
    /// Layout-specific; see the implementations.
    fn create_scopes(&self, size: Dimension) -> SudokuResult<Vec<Scope>>;
}

/// The canonical scope layout for square grids: one scope per row, one per
/// column, and - if the side length `n` is a perfect square - one block scope
/// per `sqrt(n) x sqrt(n)` tile, tiling the grid exactly. Prime side lengths
/// get no blocks.
///
/// The layout cannot derive a sensible block size for side lengths that are
/// neither prime nor perfect squares and rejects those grids.
pub struct SquareRootScopeFactory;

impl SquareRootScopeFactory {
    fn block_size(side: usize) -> SudokuResult<usize> {
        if is_prime(side) {
            return Ok(0);
        }

        let root = integer_sqrt(side);

        if root * root == side {
            Ok(root)
        }
        else {
            Err(SudokuError::UnsupportedSize)
        }
    }
}

impl ScopeFactory for SquareRootScopeFactory {

    /// Generates row, column, and block scopes for a square grid, in that
    /// layout order (blocks first, then columns, then rows, mirroring the
    /// tiling derivation). Scopes with coinciding point sets appear once.
    ///
    /// # Errors
    ///
    /// * `SudokuError::NonSquareGrid` if `size` is not square.
    /// * `SudokuError::InvalidDimensions` if the side length is outside
    /// [[MIN_SIZE], [MAX_SIZE]].
    /// * `SudokuError::UnsupportedSize` if the side length is neither prime
    /// nor a perfect square.
    fn create_scopes(&self, size: Dimension) -> SudokuResult<Vec<Scope>> {
        if size.width() != size.height() {
            return Err(SudokuError::NonSquareGrid);
        }

        let side = size.width();

        if side < MIN_SIZE || side > MAX_SIZE {
            return Err(SudokuError::InvalidDimensions);
        }

        let block = SquareRootScopeFactory::block_size(side)?;
        let mut scopes = Vec::new();

        if block > 0 {
            for y in (0..side).step_by(block) {
                for x in (0..side).step_by(block) {
                    scopes.push(Scope::from_rectangle(
                        Rectangle::new(x, y, block, block)));
                }
            }
        }

        for x in 0..side {
            scopes.push(Scope::from_rectangle(Rectangle::new(x, 0, 1, side)));
        }

        for y in 0..side {
            scopes.push(Scope::from_rectangle(Rectangle::new(0, y, side, 1)));
        }

        let mut unique = Vec::new();

        for scope in scopes {
            if !unique.contains(&scope) {
                unique.push(scope);
            }
        }

        Ok(unique)
    }
}
