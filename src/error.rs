//! This module contains the error and result definitions used in this crate.

use crate::geometry::Point;

/// An enumeration of the precondition errors that can occur when constructing
/// grids, scopes, and rule sets or when ingesting puzzle text. These indicate
/// caller mistakes and are never retried.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SudokuError {

    /// Indicates that the dimensions specified for a grid are invalid, that
    /// is, outside the range [[MIN_SIZE](crate::MIN_SIZE),
    /// [MAX_SIZE](crate::MAX_SIZE)].
    InvalidDimensions,

    /// Indicates that the specified coordinates lie outside the grid in
    /// question.
    OutOfBounds,

    /// Indicates that a scope layout requiring a square grid was asked to
    /// cover a grid whose width and height differ.
    NonSquareGrid,

    /// Indicates that the side length of a grid is neither prime nor a
    /// perfect square, in which case the square-root scope layout cannot
    /// derive a block size. This is a deliberate restriction of the layout,
    /// not a defect.
    UnsupportedSize,

    /// Indicates that a value domain contains the same value more than once.
    DuplicateValue,

    /// Indicates that a puzzle string does not contain exactly one symbol per
    /// grid cell.
    PuzzleLengthMismatch
}

/// Syntactic sugar for `Result<V, SudokuError>`.
pub type SudokuResult<V> = Result<V, SudokuError>;

/// An enumeration of the ways solving a puzzle can fail. Both variants are
/// the same kind of failure - the puzzle has no solution - but they carry
/// different diagnostics.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Unsolvable {

    /// Indicates that the starting grid already violated some scope before
    /// any search took place. The payload is the first cell, in scan order,
    /// whose value duplicates another value in one of its scopes.
    Conflict(Point),

    /// Indicates that the starting grid was valid, but the search exhausted
    /// every branch without finding a completion.
    Exhausted
}
