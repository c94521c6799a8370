// Code lints

#![warn(trivial_casts)]
#![warn(trivial_numeric_casts)]
#![warn(unreachable_pub)]
#![warn(unused_import_braces)]
#![warn(unused_lifetimes)]
#![warn(unused_qualifications)]

// Doc lints

#![warn(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]
#![warn(rustdoc::invalid_codeblock_attributes)]

//! This crate implements a generalized Sudoku engine. It supports the
//! following key features:
//!
//! * Square grids of configurable size with arbitrary value domains (digits,
//! letters, anything equality-comparable and hashable)
//! * Rules expressed as overlapping [Scope](scope::Scope)s - rows, columns,
//! and blocks - each of which must contain every domain value exactly once
//! * Candidate derivation for individual cells by intersecting the domain
//! against all scopes containing the cell
//! * A prioritized backtracking solver in two modes: a deterministic
//! single-threaded mode and a fork-join mode that explores independent
//! branches in parallel
//!
//! Note that in this introduction we will mostly be using classic 9x9
//! puzzles, where the scopes are the nine rows, nine columns, and nine 3x3
//! blocks, and the domain is the digits 1 to 9.
//!
//! # Building rules and grids
//!
//! The rules of a puzzle family live in a [Sudoku]: the value domain plus the
//! scope set for one grid shape. A `Sudoku` holds no puzzle state and can be
//! shared across any number of puzzle instances of that shape, which are
//! stored in [Grid]s. [Sudoku::classic] wires up the standard 9x9 rules;
//! custom shapes go through [Sudoku::new] with a
//! [ScopeFactory](scope::ScopeFactory).
//!
//! Puzzle text is ingested through a [GridParser](parser::GridParser), which
//! maps one character per cell in row-major order:
//!
//! ```
//! use sudoku_scopes::Sudoku;
//! use sudoku_scopes::parser::{GridParser, SymbolParser};
//!
//! let sudoku = Sudoku::classic();
//! let mut grid = sudoku.empty_grid();
//!
//! SymbolParser::decimal().populate(&mut grid, "\
//!     ?????64?9\
//!     ?3?2???1?\
//!     ??6?7????\
//!     ?7???2??5\
//!     ?4?????2?\
//!     9??6???3?\
//!     ????9?1??\
//!     ?9???3?7?\
//!     3?54?????").unwrap();
//!
//! assert_eq!(26, grid.count_clues());
//! ```
//!
//! # Deriving candidates
//!
//! The key pruning primitive is [Sudoku::potential_values]: the domain minus
//! every value already used in some scope containing the cell. For a cell of
//! a classic puzzle that means its row, its column, and its block.
//!
//! ```
//! use sudoku_scopes::Sudoku;
//! use sudoku_scopes::geometry::Point;
//! use sudoku_scopes::parser::{GridParser, SymbolParser};
//!
//! let sudoku = Sudoku::classic();
//! let mut grid = sudoku.empty_grid();
//!
//! SymbolParser::decimal().populate(&mut grid, "\
//!     ?????64?9\
//!     ?3?2???1?\
//!     ??6?7????\
//!     ?7???2??5\
//!     ?4?????2?\
//!     9??6???3?\
//!     ????9?1??\
//!     ?9???3?7?\
//!     3?54?????").unwrap();
//!
//! // Row 0 uses {6, 4, 9}, column 0 uses {9, 3}, and the top-left block
//! // uses {3, 6}, so five candidates remain for the top-left cell.
//! assert_eq!(vec![1, 2, 5, 7, 8],
//!     sudoku.potential_values(&grid, Point::new(0, 0)));
//! ```
//!
//! # Solving puzzles
//!
//! Solvers implement the [Solver](solver::Solver) trait and produce a
//! [Solution](solver::Solution) carrying either the solved grid or a failure
//! diagnostic, along with iteration and timing metadata.
//! [BacktrackingSolver](solver::BacktrackingSolver) is the deterministic
//! reference mode; [ForkJoinSolver](solver::ForkJoinSolver) explores
//! independent branches on a thread pool and adopts the first solution found.
//!
//! ```
//! use sudoku_scopes::Sudoku;
//! use sudoku_scopes::parser::{GridParser, SymbolParser};
//! use sudoku_scopes::solver::{BacktrackingSolver, ForkJoinSolver, Solver};
//!
//! let sudoku = Sudoku::classic();
//! let mut grid = sudoku.empty_grid();
//!
//! SymbolParser::decimal().populate(&mut grid, "\
//!     ?????64?9\
//!     ?3?2???1?\
//!     ??6?7????\
//!     ?7???2??5\
//!     ?4?????2?\
//!     9??6???3?\
//!     ????9?1??\
//!     ?9???3?7?\
//!     3?54?????").unwrap();
//!
//! let solution = BacktrackingSolver.solve(&sudoku, &grid);
//! assert!(sudoku.is_solved(solution.solution().unwrap()));
//!
//! let solution = ForkJoinSolver::new().solve(&sudoku, &grid);
//! assert!(sudoku.is_solved(solution.solution().unwrap()));
//! ```

pub mod error;
pub mod geometry;
pub mod parser;
pub mod scope;
pub mod solver;

mod util;

use crate::error::{SudokuError, SudokuResult, Unsolvable};
use crate::geometry::{Dimension, Point};
use crate::scope::{Scope, ScopeFactory, SquareRootScopeFactory};
use crate::util::contains_duplicate;

use std::collections::{HashMap, HashSet};
use std::fmt::{self, Display, Formatter};
use std::hash::Hash;

/// The smallest supported width and height of a [Grid].
pub const MIN_SIZE: usize = 1;

/// The largest supported width and height of a [Grid].
pub const MAX_SIZE: usize = 25;

/// A marker trait for types usable as puzzle values. It is blanket
/// implemented for every type with structural equality and hashing that can
/// be shared across solver tasks, so classic digit puzzles can use `u8` while
/// letter puzzles use `char`, with no further ceremony.
///
/// `Send` and `Sync` are part of the contract because value domains and grids
/// are handed to the fork-join solver's worker threads.
pub trait Value: Clone + Eq + Hash + Send + Sync {}

impl<T: Clone + Eq + Hash + Send + Sync> Value for T {}

fn check_size(size: Dimension) -> SudokuResult<()> {
    if size.width() < MIN_SIZE || size.width() > MAX_SIZE
            || size.height() < MIN_SIZE || size.height() > MAX_SIZE {
        Err(SudokuError::InvalidDimensions)
    }
    else {
        Ok(())
    }
}

fn index(point: Point, width: usize) -> usize {
    point.y() * width + point.x()
}

/// A fixed-size storage of puzzle cells, addressed by [Point]. Each cell
/// either holds one value of type `V` or is empty. The grid is pure storage:
/// it knows nothing about scopes or rules, which live in [Sudoku].
///
/// Cloning a grid produces a deep, fully independent copy in O(cells). This
/// is the unit of branching in the solver - no two concurrently explored
/// branches ever share cell storage.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Grid<V: Value> {
    size: Dimension,
    cells: Vec<Option<V>>
}

impl<V: Value> Grid<V> {

    /// Creates a new, empty grid of the given size.
    ///
    /// # Errors
    ///
    /// If the width or height is outside the range [[MIN_SIZE], [MAX_SIZE]].
    /// In that case, `SudokuError::InvalidDimensions` is returned.
    pub fn new(size: Dimension) -> SudokuResult<Grid<V>> {
        check_size(size)?;

        Ok(Grid {
            size,
            cells: vec![None; size.area()]
        })
    }

    /// Gets the size of this grid.
    pub fn size(&self) -> Dimension {
        self.size
    }

    /// Gets the content of the cell at the given point: `Some` with a
    /// reference to the value for a filled cell, `None` for an empty one.
    ///
    /// # Errors
    ///
    /// If the point lies outside this grid. In that case,
    /// `SudokuError::OutOfBounds` is returned.
    pub fn cell_at(&self, point: Point) -> SudokuResult<Option<&V>> {
        self.check_bounds(point)?;
        Ok(self.cells[index(point, self.size.width())].as_ref())
    }

    /// Sets the content of the cell at the given point. If the cell was not
    /// empty, the old value is overwritten. The grid performs no domain
    /// checks; which values are sensible is the business of the [Sudoku]
    /// evaluating it.
    ///
    /// # Errors
    ///
    /// If the point lies outside this grid. In that case,
    /// `SudokuError::OutOfBounds` is returned.
    pub fn set_cell_at(&mut self, point: Point, value: V) -> SudokuResult<()> {
        self.check_bounds(point)?;
        let width = self.size.width();
        self.cells[index(point, width)] = Some(value);
        Ok(())
    }

    /// Clears the content of the cell at the given point. If the cell is
    /// already empty, it is left that way.
    ///
    /// # Errors
    ///
    /// If the point lies outside this grid. In that case,
    /// `SudokuError::OutOfBounds` is returned.
    pub fn clear_cell_at(&mut self, point: Point) -> SudokuResult<()> {
        self.check_bounds(point)?;
        let width = self.size.width();
        self.cells[index(point, width)] = None;
        Ok(())
    }

    /// Indicates whether the cell at the given point is empty.
    ///
    /// # Errors
    ///
    /// If the point lies outside this grid. In that case,
    /// `SudokuError::OutOfBounds` is returned.
    pub fn is_cell_empty(&self, point: Point) -> SudokuResult<bool> {
        Ok(self.cell_at(point)?.is_none())
    }

    fn check_bounds(&self, point: Point) -> SudokuResult<()> {
        if point.x() >= self.size.width() || point.y() >= self.size.height() {
            Err(SudokuError::OutOfBounds)
        }
        else {
            Ok(())
        }
    }

    /// Gets a slice of all cells in row-major order.
    pub fn cells(&self) -> &[Option<V>] {
        &self.cells
    }

    /// Gets the points of all empty cells in row-major scan order. The order
    /// is deterministic, which the solver relies on for reproducible
    /// tie-breaking.
    pub fn empty_cells(&self) -> Vec<Point> {
        self.size.points()
            .filter(|&point| {
                self.cells[index(point, self.size.width())].is_none()
            })
            .collect()
    }

    /// Counts the number of clues given by this grid, that is, the number of
    /// non-empty cells.
    pub fn count_clues(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_some()).count()
    }

    /// Indicates whether this grid is full, i.e. every cell holds a value.
    pub fn is_full(&self) -> bool {
        !self.cells.iter().any(|cell| cell.is_none())
    }

    /// Indicates whether this grid is empty, i.e. no cell holds a value.
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|cell| cell.is_none())
    }
}

impl<V: Value + Display> Display for Grid<V> {

    /// Dumps this grid in row-major order: cells separated by single spaces,
    /// rows separated by newlines, empty cells rendered as `?`. This is a
    /// debugging format, not a stable wire format.
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for y in 0..self.size.height() {
            if y > 0 {
                f.write_str("\n")?;
            }

            for x in 0..self.size.width() {
                if x > 0 {
                    f.write_str(" ")?;
                }

                match &self.cells[index(Point::new(x, y), self.size.width())] {
                    Some(value) => write!(f, "{}", value)?,
                    None => f.write_str("?")?
                }
            }
        }

        Ok(())
    }
}

/// The rules of one puzzle family: a value domain plus the full scope set for
/// one grid shape. A `Sudoku` is stateless with respect to any particular
/// puzzle instance - it is built once per shape and evaluated against any
/// number of [Grid]s, including concurrently from multiple solver tasks.
///
/// Scope membership per point is precomputed into a lookup table at
/// construction time, since it is queried every time candidates are derived.
#[derive(Clone, Debug)]
pub struct Sudoku<V: Value> {
    size: Dimension,
    values: Vec<V>,
    scopes: Vec<Scope>,
    point_scopes: HashMap<Point, Vec<usize>>
}

impl<V: Value> Sudoku<V> {

    /// Creates a new rule set for grids of the given size, with the given
    /// value domain and the scopes generated by the given factory.
    ///
    /// # Arguments
    ///
    /// * `size`: The shape of the grids these rules apply to.
    /// * `values`: The value domain. The iteration order is the domain's
    /// natural order, which is also the order in which solvers try candidate
    /// values. Must not contain duplicates.
    /// * `factory`: The [ScopeFactory] that lays out the scopes for `size`.
    ///
    /// # Errors
    ///
    /// * `SudokuError::DuplicateValue` if `values` contains the same value
    /// twice.
    /// * Any error raised by the factory for this size.
    pub fn new(size: Dimension, values: impl IntoIterator<Item = V>,
            factory: &impl ScopeFactory) -> SudokuResult<Sudoku<V>> {
        let scopes = factory.create_scopes(size)?;
        Sudoku::with_scopes(size, values, scopes)
    }

    /// Creates a new rule set from an explicit scope list instead of a
    /// factory. Equal scopes are collapsed into one.
    ///
    /// # Errors
    ///
    /// * `SudokuError::InvalidDimensions` if `size` is outside
    /// [[MIN_SIZE], [MAX_SIZE]].
    /// * `SudokuError::DuplicateValue` if `values` contains the same value
    /// twice.
    pub fn with_scopes(size: Dimension, values: impl IntoIterator<Item = V>,
            scopes: Vec<Scope>) -> SudokuResult<Sudoku<V>> {
        check_size(size)?;

        let values: Vec<V> = values.into_iter().collect();

        if contains_duplicate(values.iter()) {
            return Err(SudokuError::DuplicateValue);
        }

        let mut unique: Vec<Scope> = Vec::new();

        for scope in scopes {
            if !unique.contains(&scope) {
                unique.push(scope);
            }
        }

        let mut point_scopes: HashMap<Point, Vec<usize>> = HashMap::new();

        for (i, scope) in unique.iter().enumerate() {
            for point in scope.points() {
                point_scopes.entry(point).or_insert_with(Vec::new).push(i);
            }
        }

        Ok(Sudoku {
            size,
            values,
            scopes: unique,
            point_scopes
        })
    }

    /// Gets the shape of the grids these rules apply to.
    pub fn size(&self) -> Dimension {
        self.size
    }

    /// Gets the value domain in its natural order.
    pub fn values(&self) -> &[V] {
        &self.values
    }

    /// Gets all scopes of this rule set. No two of them are equal.
    pub fn scopes(&self) -> &[Scope] {
        &self.scopes
    }

    /// Returns an iterator over the scopes containing the given point. For a
    /// cell of a classic 9x9 puzzle these are its row, its column, and its
    /// block. Points outside every scope yield an empty iterator.
    pub fn scopes_for_point(&self, point: Point)
            -> impl Iterator<Item = &Scope> {
        self.point_scopes.get(&point)
            .map(|indices| indices.as_slice())
            .unwrap_or(&[])
            .iter()
            .map(move |&i| &self.scopes[i])
    }

    /// Computes the values that remain possible for the cell at the given
    /// point: the domain minus the union of used values over every scope
    /// containing the point, in domain order. This is correct even on a
    /// partially invalid grid - whatever is used is subtracted, valid or not.
    pub fn potential_values(&self, grid: &Grid<V>, point: Point) -> Vec<V> {
        let mut used = HashSet::new();

        for scope in self.scopes_for_point(point) {
            for value in scope.used_values(grid) {
                used.insert(value);
            }
        }

        self.values.iter()
            .filter(|value| !used.contains(*value))
            .cloned()
            .collect()
    }

    /// Indicates whether the given grid satisfies every scope of this rule
    /// set, that is, no value appears twice within any scope. Empty cells
    /// never cause invalidity.
    pub fn is_valid(&self, grid: &Grid<V>) -> bool {
        self.scopes.iter().all(|scope| scope.is_valid(grid))
    }

    /// Indicates whether the given grid is solved under this rule set, that
    /// is, every scope is completely filled with pairwise distinct values.
    pub fn is_solved(&self, grid: &Grid<V>) -> bool {
        self.scopes.iter().all(|scope| scope.is_solved(grid))
    }

    /// Checks the given grid against every scope and reports the first
    /// conflict found, in scope layout order.
    ///
    /// # Errors
    ///
    /// If some value appears twice within a scope. In that case,
    /// `Unsolvable::Conflict` with the offending cell is returned.
    pub fn validate(&self, grid: &Grid<V>) -> Result<(), Unsolvable> {
        for scope in &self.scopes {
            if let Some(point) = scope.conflict(grid) {
                return Err(Unsolvable::Conflict(point));
            }
        }

        Ok(())
    }

    /// Creates a new, empty grid of the shape these rules apply to.
    pub fn empty_grid(&self) -> Grid<V> {
        Grid::new(self.size).unwrap()
    }
}

impl Sudoku<u8> {

    /// Creates the rules of classic Sudoku: a 9x9 grid, the digits 1 to 9,
    /// and the square-root scope layout of nine rows, nine columns, and nine
    /// 3x3 blocks.
    pub fn classic() -> Sudoku<u8> {
        Sudoku::new(Dimension::new(9, 9), 1u8..=9, &SquareRootScopeFactory)
            .unwrap()
    }
}

impl Sudoku<char> {

    /// Creates the rules of super Sudoku: a 16x16 grid with 4x4 blocks.
    /// These puzzles conventionally use the letters `a` to `p` rather than
    /// double-digit numbers.
    pub fn super_sized() -> Sudoku<char> {
        Sudoku::new(Dimension::new(16, 16), 'a'..='p',
            &SquareRootScopeFactory).unwrap()
    }
}
