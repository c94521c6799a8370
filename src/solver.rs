//! This module contains the logic for solving puzzles.
//!
//! Most importantly, this module contains the definition of the [Solver]
//! trait together with the two provided implementations:
//! [BacktrackingSolver], a deterministic single-threaded reference solver,
//! and [ForkJoinSolver], which explores independent branches of the search
//! tree on a thread pool and adopts the first solution found.
//!
//! Both solvers search the same way: they repeatedly select the empty cell
//! with the fewest remaining candidate values (the minimum-remaining-values
//! heuristic), try each candidate in domain order, and backtrack when a
//! branch runs out of options. They differ only in how branches are
//! scheduled. The outcome of a solve is captured in a [Solution], which
//! carries either the solved grid or an [Unsolvable] diagnostic along with
//! iteration and timing metadata.

use crate::{Grid, Sudoku, Value};
use crate::error::Unsolvable;
use crate::geometry::{Dimension, Point};
use crate::util::integer_sqrt;

use log::debug;

use rayon::iter::{IntoParallelIterator, ParallelIterator};

use std::fmt::{self, Display, Formatter};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// The outcome of solving one puzzle instance: either the solved grid or a
/// diagnostic explaining why no solution was produced, together with the
/// number of search iterations and the elapsed wall-clock time. A solution is
/// created by a [Solver], populated exactly once, and immutable afterwards.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Solution<V: Value> {
    result: Result<Grid<V>, Unsolvable>,
    iterations: u64,
    elapsed: Duration
}

impl<V: Value> Solution<V> {

    fn new(result: Result<Grid<V>, Unsolvable>, iterations: u64,
            elapsed: Duration) -> Solution<V> {
        Solution {
            result,
            iterations,
            elapsed
        }
    }

    /// Gets the solved grid, or the reason there is none.
    ///
    /// # Errors
    ///
    /// * `Unsolvable::Conflict` if the starting grid already violated some
    /// scope. The payload is the first offending cell in scope layout order.
    /// * `Unsolvable::Exhausted` if the starting grid was valid but the
    /// search ran out of branches without completing it.
    pub fn solution(&self) -> Result<&Grid<V>, &Unsolvable> {
        self.result.as_ref()
    }

    /// Like [Solution::solution], but consumes this instance and transfers
    /// ownership of the solved grid to the caller.
    pub fn into_solution(self) -> Result<Grid<V>, Unsolvable> {
        self.result
    }

    /// Indicates whether a solved grid was found.
    pub fn is_solved(&self) -> bool {
        self.result.is_ok()
    }

    /// Gets the number of search iterations taken, that is, the number of
    /// cell selections made during the search. A grid that was rejected as
    /// invalid or was already solved counts zero iterations.
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Gets the wall-clock time the solver spent on this puzzle.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

impl<V: Value + Display> Display for Solution<V> {

    /// Renders the solved grid in the format of the
    /// [Grid](crate::Grid#impl-Display) dump, or a one-line failure note.
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.result {
            Ok(grid) => Display::fmt(grid, f),
            Err(Unsolvable::Conflict(point)) =>
                write!(f, "unsolvable: conflict at ({}, {})", point.x(),
                    point.y()),
            Err(Unsolvable::Exhausted) =>
                f.write_str("unsolvable: search exhausted")
        }
    }
}

/// A trait for structs which have the ability to solve puzzles. A solver
/// consumes the rules and a starting grid, neither of which it modifies, and
/// produces a [Solution]. Implementations are required to find a solution
/// whenever one exists; they are not required to enumerate further solutions
/// of ambiguous puzzles, nor to agree with each other on which solution of an
/// ambiguous puzzle they find.
pub trait Solver {

    /// Solves the puzzle given by the starting grid under the given rules.
    /// The first solution found is returned; if the grid already violates
    /// some scope or no branch of the search completes it, the returned
    /// [Solution] carries the corresponding [Unsolvable] diagnostic instead.
    fn solve<V: Value>(&self, sudoku: &Sudoku<V>, grid: &Grid<V>)
        -> Solution<V>;
}

/// Finds the empty cell with the fewest potential values, together with those
/// values. Ties are broken in row-major scan order, which keeps the search
/// deterministic. Returns `None` if the grid has no empty cell.
///
/// A cell with zero potential values ends the scan early, since no later cell
/// can beat it and the caller treats it as a dead end anyway.
fn most_constrained_cell<V: Value>(sudoku: &Sudoku<V>, grid: &Grid<V>)
        -> Option<(Point, Vec<V>)> {
    let mut best: Option<(Point, Vec<V>)> = None;

    for point in grid.empty_cells() {
        let candidates = sudoku.potential_values(grid, point);
        let better = match &best {
            Some((_, best_candidates)) =>
                candidates.len() < best_candidates.len(),
            None => true
        };

        if better {
            let dead_end = candidates.is_empty();
            best = Some((point, candidates));

            if dead_end {
                break;
            }
        }
    }

    best
}

/// A [Solver] which solves puzzles by synchronous recursive backtracking on a
/// single thread. Its exploration order is fully deterministic: cells are
/// selected by fewest candidates with row-major tie-breaking, and candidates
/// are tried in domain order. This makes it the reference implementation for
/// correctness tests, at the cost of leaving multi-core machines idle.
pub struct BacktrackingSolver;

impl BacktrackingSolver {

    /// Searches for a completion of the given grid, mutating it in place.
    /// Returns `true` if the grid was completed, in which case it holds the
    /// solution. Returns `false` if every branch was exhausted, in which case
    /// the grid is restored to the state it was passed in.
    fn search<V: Value>(sudoku: &Sudoku<V>, grid: &mut Grid<V>,
            iterations: &mut u64) -> bool {
        let (point, candidates) = match most_constrained_cell(sudoku, grid) {
            Some(selected) => selected,
            // No empty cell is left. The starting grid was valid and every
            // candidate placement kept all scopes valid, so the grid is
            // solved.
            None => return true
        };

        *iterations += 1;

        for value in candidates {
            grid.set_cell_at(point, value).unwrap();

            if BacktrackingSolver::search(sudoku, grid, iterations) {
                return true;
            }
        }

        grid.clear_cell_at(point).unwrap();
        false
    }
}

impl Solver for BacktrackingSolver {
    fn solve<V: Value>(&self, sudoku: &Sudoku<V>, grid: &Grid<V>)
            -> Solution<V> {
        let start = Instant::now();

        if let Err(conflict) = sudoku.validate(grid) {
            debug!("rejected starting grid: {:?}", conflict);
            return Solution::new(Err(conflict), 0, start.elapsed());
        }

        let mut work = grid.clone();
        let mut iterations = 0;
        let result = if BacktrackingSolver::search(sudoku, &mut work,
                &mut iterations) {
            Ok(work)
        }
        else {
            Err(Unsolvable::Exhausted)
        };

        debug!("backtracking search finished after {} iterations in {:?}",
            iterations, start.elapsed());

        Solution::new(result, iterations, start.elapsed())
    }
}

const MINIMUM_FORK_DEPTH: usize = 1;

/// A trait for policies that decide down to which depth of the search tree
/// the [ForkJoinSolver] spawns parallel tasks. Branch points above the fork
/// depth fork one task per candidate value; below it, each task continues
/// sequentially on the grid it exclusively owns. This bounds task-creation
/// overhead relative to puzzle size.
pub trait ForkDepthPolicy {

    /// Computes the fork depth for grids of the given size.
    fn fork_depth(&self, size: Dimension) -> usize;
}

/// The default [ForkDepthPolicy]: the fork depth is the square root of the
/// side length (equivalently, the fourth root of the grid area), rounded
/// down and at least 1. A classic 9x9 grid forks the top three levels of its
/// search tree, a 16x16 grid the top four.
pub struct SquareRootForkDepth;

impl ForkDepthPolicy for SquareRootForkDepth {
    fn fork_depth(&self, size: Dimension) -> usize {
        integer_sqrt(integer_sqrt(size.area())).max(MINIMUM_FORK_DEPTH)
    }
}

/// The shared read-only configuration and shared mutable flags of one
/// fork-join solve. The rules and fork depth are immutable; the cancellation
/// flag and iteration counter are the only state shared between tasks, and
/// both are atomic.
struct SearchContext<'sudoku, V: Value> {
    sudoku: &'sudoku Sudoku<V>,
    fork_depth: usize,
    solution_found: AtomicBool,
    iterations: AtomicU64
}

/// Searches for a completion of the given grid, forking one task per
/// candidate value while `depth` is less than the fork depth and recursing
/// sequentially below that. Forked branches operate on clones taken before
/// any mutation, so every task exclusively owns the grid it mutates.
///
/// The cancellation flag is checked before any work; once some task has found
/// a solution, all others stop expanding candidates and unwind quickly. The
/// parallel iteration joins all spawned branches before returning, so no
/// task outlives its parent. Results of branches that lost the race are
/// joined and dropped.
fn parallel_search<V: Value>(context: &SearchContext<'_, V>,
        grid: &mut Grid<V>, depth: usize) -> Option<Grid<V>> {
    if context.solution_found.load(Ordering::Relaxed) {
        return None;
    }

    let selected = most_constrained_cell(context.sudoku, grid);
    let (point, candidates) = match selected {
        Some(selected) => selected,
        None => {
            context.solution_found.store(true, Ordering::Relaxed);
            return Some(grid.clone());
        }
    };

    context.iterations.fetch_add(1, Ordering::Relaxed);

    if depth < context.fork_depth {
        candidates.into_par_iter()
            .find_map_any(|value| {
                let mut branch = grid.clone();
                branch.set_cell_at(point, value).unwrap();
                parallel_search(context, &mut branch, depth + 1)
            })
    }
    else {
        for value in candidates {
            grid.set_cell_at(point, value).unwrap();

            if let Some(solved) = parallel_search(context, grid, depth + 1) {
                return Some(solved);
            }
        }

        grid.clear_cell_at(point).unwrap();
        None
    }
}

/// A [Solver] which explores independent branches of the search tree in
/// parallel on the global [rayon] thread pool. Every parallel branch operates
/// on its own clone of the grid, taken before any mutation, so concurrently
/// explored branches never share cell storage. The first branch to complete
/// its grid wins; all others are cancelled cooperatively.
///
/// How many levels of the tree fork is controlled by a [ForkDepthPolicy],
/// by default [SquareRootForkDepth]. Since the branch that finds the solution
/// depends on scheduling, the solution of an ambiguous puzzle may differ
/// between runs and from the one [BacktrackingSolver] finds; solvability
/// itself is of course always agreed on.
pub struct ForkJoinSolver<P: ForkDepthPolicy = SquareRootForkDepth> {
    policy: P
}

impl ForkJoinSolver {

    /// Creates a new fork-join solver with the default
    /// [SquareRootForkDepth] policy.
    pub fn new() -> ForkJoinSolver {
        ForkJoinSolver {
            policy: SquareRootForkDepth
        }
    }
}

impl Default for ForkJoinSolver {
    fn default() -> ForkJoinSolver {
        ForkJoinSolver::new()
    }
}

impl<P: ForkDepthPolicy> ForkJoinSolver<P> {

    /// Creates a new fork-join solver with the given fork depth policy.
    pub fn with_policy(policy: P) -> ForkJoinSolver<P> {
        ForkJoinSolver {
            policy
        }
    }
}

impl<P: ForkDepthPolicy> Solver for ForkJoinSolver<P> {
    fn solve<V: Value>(&self, sudoku: &Sudoku<V>, grid: &Grid<V>)
            -> Solution<V> {
        let start = Instant::now();

        if let Err(conflict) = sudoku.validate(grid) {
            debug!("rejected starting grid: {:?}", conflict);
            return Solution::new(Err(conflict), 0, start.elapsed());
        }

        let context = SearchContext {
            sudoku,
            fork_depth: self.policy.fork_depth(grid.size()),
            solution_found: AtomicBool::new(false),
            iterations: AtomicU64::new(0)
        };
        let mut work = grid.clone();
        let result = match parallel_search(&context, &mut work, 0) {
            Some(solved) => Ok(solved),
            None => Err(Unsolvable::Exhausted)
        };
        let iterations = context.iterations.load(Ordering::Relaxed);

        debug!("fork-join search (fork depth {}) finished after {} \
            iterations in {:?}", context.fork_depth, iterations,
            start.elapsed());

        Solution::new(result, iterations, start.elapsed())
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    use crate::parser::{GridParser, SymbolParser};
    use crate::scope::SquareRootScopeFactory;

    const PUZZLE: &str = "\
        ?????64?9\
        ?3?2???1?\
        ??6?7????\
        ?7???2??5\
        ?4?????2?\
        9??6???3?\
        ????9?1??\
        ?9???3?7?\
        3?54?????";

    const WPF_PUZZLE: &str = "\
        ????81???\
        ??2??78??\
        ?53???17?\
        37???????\
        6???????3\
        ???????24\
        ?69???23?\
        ??59??4??\
        ???65????";

    fn parse_classic(puzzle: &str) -> (Sudoku<u8>, Grid<u8>) {
        let sudoku = Sudoku::classic();
        let mut grid = sudoku.empty_grid();
        SymbolParser::decimal().populate(&mut grid, puzzle).unwrap();
        (sudoku, grid)
    }

    fn assert_solves(solver: &impl Solver, puzzle: &str) {
        let (sudoku, grid) = parse_classic(puzzle);
        let solution = solver.solve(&sudoku, &grid);

        assert!(solution.is_solved());

        let solved = solution.solution().unwrap();

        assert!(sudoku.is_solved(solved));

        for scope in sudoku.scopes() {
            assert!(scope.is_solved(solved));
        }

        // the given clues survive into the solution
        for point in sudoku.size().points() {
            if let Some(value) = grid.cell_at(point).unwrap() {
                assert_eq!(Some(value), solved.cell_at(point).unwrap());
            }
        }
    }

    #[test]
    fn backtracking_solves_known_puzzle() {
        assert_solves(&BacktrackingSolver, PUZZLE);
    }

    #[test]
    fn fork_join_solves_known_puzzle() {
        assert_solves(&ForkJoinSolver::new(), PUZZLE);
    }

    #[test]
    fn both_modes_solve_wpf_puzzle() {
        assert_solves(&BacktrackingSolver, WPF_PUZZLE);
        assert_solves(&ForkJoinSolver::new(), WPF_PUZZLE);
    }

    fn grid_with_row_duplicate() -> (Sudoku<u8>, Grid<u8>) {
        let sudoku = Sudoku::classic();
        let mut grid = sudoku.empty_grid();
        grid.set_cell_at(Point::new(0, 0), 5).unwrap();
        grid.set_cell_at(Point::new(8, 0), 5).unwrap();
        (sudoku, grid)
    }

    #[test]
    fn backtracking_rejects_invalid_grid_without_search() {
        let (sudoku, grid) = grid_with_row_duplicate();
        let solution = BacktrackingSolver.solve(&sudoku, &grid);

        assert_eq!(Err(&Unsolvable::Conflict(Point::new(8, 0))),
            solution.solution());
        assert_eq!(0, solution.iterations());
    }

    #[test]
    fn fork_join_rejects_invalid_grid_without_search() {
        let (sudoku, grid) = grid_with_row_duplicate();
        let solution = ForkJoinSolver::new().solve(&sudoku, &grid);

        assert_eq!(Err(&Unsolvable::Conflict(Point::new(8, 0))),
            solution.solution());
        assert_eq!(0, solution.iterations());
    }

    fn uncompletable_grid() -> (Sudoku<u8>, Grid<u8>) {
        let sudoku = Sudoku::new(Dimension::new(4, 4), 1u8..=4,
            &SquareRootScopeFactory).unwrap();
        let mut grid = sudoku.empty_grid();

        // valid, but the top-left cell sees 2, 3, 4 in its row and 1 in its
        // column, leaving it no candidate
        SymbolParser::decimal()
            .populate(&mut grid, "?2341???????????")
            .unwrap();

        (sudoku, grid)
    }

    #[test]
    fn both_modes_agree_on_exhausted_search() {
        let (sudoku, grid) = uncompletable_grid();

        assert!(sudoku.is_valid(&grid));

        let backtracking = BacktrackingSolver.solve(&sudoku, &grid);
        let fork_join = ForkJoinSolver::new().solve(&sudoku, &grid);

        assert_eq!(Err(&Unsolvable::Exhausted), backtracking.solution());
        assert_eq!(Err(&Unsolvable::Exhausted), fork_join.solution());
    }

    fn solved_classic_grid() -> (Sudoku<u8>, Grid<u8>) {
        let sudoku = Sudoku::classic();
        let mut grid = sudoku.empty_grid();
        SymbolParser::decimal().populate(&mut grid, "\
            123456789\
            456789123\
            789123456\
            234567891\
            567891234\
            891234567\
            345678912\
            678912345\
            912345678").unwrap();
        (sudoku, grid)
    }

    #[test]
    fn already_solved_grid_takes_no_iterations() {
        let (sudoku, grid) = solved_classic_grid();

        let backtracking = BacktrackingSolver.solve(&sudoku, &grid);
        let fork_join = ForkJoinSolver::new().solve(&sudoku, &grid);

        assert_eq!(Ok(&grid), backtracking.solution());
        assert_eq!(0, backtracking.iterations());
        assert_eq!(Ok(&grid), fork_join.solution());
        assert_eq!(0, fork_join.iterations());
    }

    #[test]
    fn forced_cells_converge_without_backtracking() {
        let (sudoku, solved) = solved_classic_grid();
        let mut grid = solved.clone();

        // one cleared cell per row, column, and block, so every empty cell
        // has exactly one candidate at every step
        let cleared = [
            Point::new(0, 0),
            Point::new(3, 1),
            Point::new(6, 2),
            Point::new(1, 3),
            Point::new(4, 4),
            Point::new(7, 5),
            Point::new(2, 6),
            Point::new(5, 7),
            Point::new(8, 8)
        ];

        for &point in &cleared {
            grid.clear_cell_at(point).unwrap();
        }

        let solution = BacktrackingSolver.solve(&sudoku, &grid);

        assert_eq!(Ok(&solved), solution.solution());
        assert_eq!(cleared.len() as u64, solution.iterations());

        let solution = ForkJoinSolver::new().solve(&sudoku, &grid);

        assert_eq!(Ok(&solved), solution.solution());
    }

    #[test]
    fn empty_prime_grid_is_solved() {
        let sudoku = Sudoku::new(Dimension::new(3, 3), 1u8..=3,
            &SquareRootScopeFactory).unwrap();
        let grid = sudoku.empty_grid();
        let solution = BacktrackingSolver.solve(&sudoku, &grid);

        assert!(sudoku.is_solved(solution.solution().unwrap()));
    }

    fn solved_super_grid() -> (Sudoku<char>, Grid<char>) {
        let sudoku = Sudoku::super_sized();
        let mut grid = sudoku.empty_grid();

        // rows are rotations of a..p; shifting by four within a band and by
        // one across bands satisfies every row, column, and 4x4 block
        for y in 0..16 {
            let shift = y % 4 * 4 + y / 4;

            for x in 0..16 {
                let value = (b'a' + ((x + shift) % 16) as u8) as char;
                grid.set_cell_at(Point::new(x, y), value).unwrap();
            }
        }

        (sudoku, grid)
    }

    #[test]
    fn fork_join_completes_super_sized_puzzle() {
        let (sudoku, solved) = solved_super_grid();

        assert!(sudoku.is_solved(&solved));

        let mut grid = solved.clone();

        for i in 0..16 {
            grid.clear_cell_at(Point::new(i, i)).unwrap();
        }

        let solution = ForkJoinSolver::new().solve(&sudoku, &grid);

        assert_eq!(Ok(&solved), solution.solution());
    }

    struct FixedForkDepth(usize);

    impl ForkDepthPolicy for FixedForkDepth {
        fn fork_depth(&self, _size: Dimension) -> usize {
            self.0
        }
    }

    #[test]
    fn fork_join_with_zero_fork_depth_degrades_to_sequential() {
        let solver = ForkJoinSolver::with_policy(FixedForkDepth(0));
        assert_solves(&solver, PUZZLE);
    }

    #[test]
    fn square_root_fork_depth_law() {
        let policy = SquareRootForkDepth;

        assert_eq!(1, policy.fork_depth(Dimension::new(1, 1)));
        assert_eq!(1, policy.fork_depth(Dimension::new(2, 2)));
        assert_eq!(2, policy.fork_depth(Dimension::new(4, 4)));
        assert_eq!(3, policy.fork_depth(Dimension::new(9, 9)));
        assert_eq!(4, policy.fork_depth(Dimension::new(16, 16)));
        assert_eq!(5, policy.fork_depth(Dimension::new(25, 25)));
    }

    #[test]
    fn failed_solution_accessors() {
        let (sudoku, grid) = grid_with_row_duplicate();
        let solution = BacktrackingSolver.solve(&sudoku, &grid);

        assert!(!solution.is_solved());
        assert!(solution.solution().is_err());
        assert_eq!(Err(Unsolvable::Conflict(Point::new(8, 0))),
            solution.into_solution());
    }

    #[test]
    fn solution_display() {
        let (sudoku, grid) = solved_classic_grid();
        let solution = BacktrackingSolver.solve(&sudoku, &grid);

        assert_eq!(format!("{}", grid), format!("{}", solution));

        let (sudoku, grid) = grid_with_row_duplicate();
        let solution = BacktrackingSolver.solve(&sudoku, &grid);

        assert_eq!("unsolvable: conflict at (8, 0)", format!("{}", solution));

        let (sudoku, grid) = uncompletable_grid();
        let solution = BacktrackingSolver.solve(&sudoku, &grid);

        assert_eq!("unsolvable: search exhausted", format!("{}", solution));
    }
}
