use criterion::{criterion_group, criterion_main, Criterion};

use sudoku_scopes::{Grid, Sudoku};
use sudoku_scopes::parser::{GridParser, SymbolParser};
use sudoku_scopes::solver::{BacktrackingSolver, ForkJoinSolver, Solver};

// Explanation of benchmark classes:
//
// backtracking: the single-threaded BacktrackingSolver, which explores the
//               search tree in a fixed, deterministic order.
// fork-join: the ForkJoinSolver with the default square-root fork depth,
//            which races independent branches on the rayon thread pool.

const PUZZLES: &[&str] = &[
    "?????64?9\
     ?3?2???1?\
     ??6?7????\
     ?7???2??5\
     ?4?????2?\
     9??6???3?\
     ????9?1??\
     ?9???3?7?\
     3?54?????",
    "????81???\
     ??2??78??\
     ?53???17?\
     37???????\
     6???????3\
     ???????24\
     ?69???23?\
     ??59??4??\
     ???65????"
];

fn parse_puzzles(sudoku: &Sudoku<u8>) -> Vec<Grid<u8>> {
    let parser = SymbolParser::decimal();

    PUZZLES.iter()
        .map(|puzzle| {
            let mut grid = sudoku.empty_grid();
            parser.populate(&mut grid, puzzle).unwrap();
            grid
        })
        .collect()
}

fn solve_puzzles(sudoku: &Sudoku<u8>, grids: &[Grid<u8>],
        solver: &impl Solver) {
    for grid in grids {
        let solution = solver.solve(sudoku, grid);
        assert!(solution.is_solved());
    }
}

fn benchmark_solver(c: &mut Criterion, id: &str, solver: impl Solver) {
    let sudoku = Sudoku::classic();
    let grids = parse_puzzles(&sudoku);

    c.bench_function(id,
        |b| b.iter(|| solve_puzzles(&sudoku, &grids, &solver)));
}

fn benchmark_backtracking(c: &mut Criterion) {
    benchmark_solver(c, "backtracking", BacktrackingSolver)
}

fn benchmark_fork_join(c: &mut Criterion) {
    benchmark_solver(c, "fork-join", ForkJoinSolver::new())
}

criterion_group!(all,
    benchmark_backtracking,
    benchmark_fork_join
);

criterion_main!(all);
