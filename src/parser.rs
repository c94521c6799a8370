//! This module contains the ingestion of puzzle text into grids.
//!
//! A puzzle string carries one symbol per cell in row-major order, for
//! example the classic 9x9 notation where `5` is a given digit and `?` an
//! empty cell. Parsing is deliberately permissive about symbols: anything
//! that does not map to a domain value - `?`, `.`, whitespace, stray
//! characters - reads as an empty cell. Only the string length is a hard
//! precondition.

use crate::{Grid, Value};
use crate::error::{SudokuError, SudokuResult};

use std::collections::HashMap;

/// A trait for parsers that populate a [Grid] from a puzzle string.
pub trait GridParser<V: Value> {

    /// Fills the given grid from the puzzle string, assigning symbols to
    /// cells in row-major order. Cells whose symbol does not map to a domain
    /// value are cleared, so the grid afterwards reflects exactly the given
    /// puzzle.
    ///
    /// # Errors
    ///
    /// If the puzzle string does not contain exactly one symbol per grid
    /// cell. In that case, `SudokuError::PuzzleLengthMismatch` is returned
    /// and the grid is left unchanged.
    fn populate(&self, grid: &mut Grid<V>, puzzle: &str) -> SudokuResult<()>;
}

/// A [GridParser] defined by a plain symbol table mapping characters to
/// domain values.
pub struct SymbolParser<V: Value> {
    symbols: HashMap<char, V>
}

impl<V: Value> SymbolParser<V> {

    /// Creates a new parser from the given symbol table.
    pub fn new(symbols: HashMap<char, V>) -> SymbolParser<V> {
        SymbolParser {
            symbols
        }
    }
}

impl SymbolParser<u8> {

    /// Creates a parser for decimal digit puzzles: the characters `1` to `9`
    /// map to the values 1 to 9. This is the notation used by classic 9x9
    /// puzzles and their smaller variants.
    pub fn decimal() -> SymbolParser<u8> {
        let symbols = ('1'..='9')
            .zip(1u8..=9)
            .collect();
        SymbolParser::new(symbols)
    }
}

impl SymbolParser<char> {

    /// Creates a parser for letter puzzles: the characters `a` to `p` map to
    /// themselves. This is the notation used by 16x16 puzzles, which prefer
    /// letters over double-digit numbers.
    pub fn letters() -> SymbolParser<char> {
        let symbols = ('a'..='p')
            .map(|c| (c, c))
            .collect();
        SymbolParser::new(symbols)
    }
}

impl<V: Value> GridParser<V> for SymbolParser<V> {
    fn populate(&self, grid: &mut Grid<V>, puzzle: &str) -> SudokuResult<()> {
        let size = grid.size();
        let symbols: Vec<char> = puzzle.chars().collect();

        if symbols.len() != size.area() {
            return Err(SudokuError::PuzzleLengthMismatch);
        }

        for (point, symbol) in size.points().zip(symbols) {
            match self.symbols.get(&symbol) {
                Some(value) => grid.set_cell_at(point, value.clone())?,
                None => grid.clear_cell_at(point)?
            }
        }

        Ok(())
    }
}
