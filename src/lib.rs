//! Solver for the dense linear assignment problem.
//!
//! Given an N×N matrix of non-negative costs, finds a one-to-one mapping of rows to columns with
//! the minimal (or maximal) total cost using the Hungarian method with shortest augmenting paths.
//!
//! ```
//! let costs = vec![vec![4., 1., 3.], vec![2., 0., 5.], vec![3., 2., 2.]];
//! let assignment = dense_linear_assignment::solve(&costs).unwrap();
//! assert_eq!(assignment.columns(), &[1, 0, 2]);
//! assert_eq!(assignment.cost(), 5.);
//! ```
//!
//! For repeated solves reuse a [`HungarianSolver`] session and its [`AssignmentSolution`]
//! buffer, which keeps all working storage allocated between problems.
pub mod error;
pub mod hungarian;
pub mod solution;
pub mod solver;

pub use crate::error::InvalidInputError;
pub use crate::hungarian::HungarianSolver;
pub use crate::solution::{Assignment, AssignmentSolution, UnsignedInt};
pub use crate::solver::AssignmentSolver;

use num_traits::AsPrimitive;
use tracing::debug;

/// Finds the assignment of rows to columns with minimal total cost.
///
/// Element `i` of the result is the column assigned to row `i`. Ties between equally cheap
/// columns go to the lowest column index, so the result is deterministic.
pub fn solve<R, C>(costs: &[R]) -> Result<Assignment, InvalidInputError>
where
    R: AsRef<[C]>,
    C: AsPrimitive<f64>,
{
    solve_with(costs, false)
}

/// Finds the assignment of rows to columns with maximal total cost.
pub fn solve_max<R, C>(costs: &[R]) -> Result<Assignment, InvalidInputError>
where
    R: AsRef<[C]>,
    C: AsPrimitive<f64>,
{
    solve_with(costs, true)
}

fn solve_with<R, C>(costs: &[R], maximize: bool) -> Result<Assignment, InvalidInputError>
where
    R: AsRef<[C]>,
    C: AsPrimitive<f64>,
{
    let size = costs.len();
    if size == 0 {
        debug!("empty cost matrix, nothing to assign");
        return Ok(Assignment::empty());
    }
    let (mut solver, mut solution) = HungarianSolver::<usize>::new(size);
    solver.init(size)?;
    solver.extend_from_rows(costs)?;
    solver.solve(&mut solution, maximize)?;
    // a successful solve matches every row
    debug_assert_eq!(solution.num_unassigned(), 0);
    Ok(Assignment::new(solution.row_to_column, solution.objective))
}

#[cfg(test)]
mod tests {
    use super::{solve, solve_max, AssignmentSolver, HungarianSolver, InvalidInputError};
    use rand::distributions::{Distribution, Uniform};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::time::Instant;
    use test_env_log::test;
    use tracing::debug;

    fn random_costs(seed: u64, size: usize, max_value: f64) -> Vec<Vec<f64>> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let between = Uniform::from(0.0..max_value);
        (0..size)
            .map(|_| (&between).sample_iter(&mut rng).take(size).collect())
            .collect()
    }

    fn total_cost(costs: &[Vec<f64>], columns: &[usize]) -> f64 {
        columns.iter().enumerate().map(|(i, j)| costs[i][*j]).sum()
    }

    #[test]
    fn test_empty_matrix() -> anyhow::Result<()> {
        let costs: Vec<Vec<f64>> = Vec::new();
        let assignment = solve(&costs)?;
        assert!(assignment.is_empty());
        assert_eq!(assignment.cost(), 0.);
        Ok(())
    }

    #[test]
    fn test_single_entry() -> anyhow::Result<()> {
        let assignment = solve(&[[7.5]])?;
        assert_eq!(assignment.columns(), &[0]);
        assert_eq!(assignment.cost(), 7.5);
        Ok(())
    }

    #[test]
    fn test_all_zero() -> anyhow::Result<()> {
        let costs = vec![vec![0_u8; 6]; 6];
        let assignment = solve(&costs)?;
        assert_eq!(assignment.cost(), 0.);
        // lowest index tie-breaking keeps every row on the diagonal
        assert_eq!(assignment.columns(), &[0, 1, 2, 3, 4, 5]);
        Ok(())
    }

    #[test]
    fn test_single_expensive_corner() -> anyhow::Result<()> {
        let costs = [[0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 1]];
        let assignment = solve(&costs)?;
        assert_eq!(assignment.cost(), 0.);
        assert_ne!(assignment.column_of(3), Some(3));
        assert_eq!(assignment.columns(), &[3, 1, 2, 0]);
        Ok(())
    }

    #[test]
    fn test_expensive_block() -> anyhow::Result<()> {
        // rows 2-4 are free only in columns 0-1, so one of them has to pay
        let costs = [
            [0, 0, 0, 0, 0],
            [0, 0, 0, 0, 0],
            [0, 0, 1, 1, 1],
            [0, 0, 1, 1, 1],
            [0, 0, 1, 1, 1],
        ];
        let assignment = solve(&costs)?;
        assert_eq!(assignment.cost(), 1.);
        let in_block = assignment
            .pairs()
            .filter(|(i, j)| *i >= 2 && *j >= 2)
            .count();
        assert_eq!(in_block, 1);

        let assignment = solve_max(&costs)?;
        assert_eq!(assignment.cost(), 3.);
        Ok(())
    }

    #[test]
    fn test_result_is_permutation() -> anyhow::Result<()> {
        for size in [2, 17, 64].iter() {
            let costs = random_costs(*size as u64, *size, 1000.);
            let assignment = solve(&costs)?;
            assert_eq!(assignment.len(), *size);
            let (mut solver, mut solution) = HungarianSolver::<u32>::new(*size);
            solver.init(*size as u32)?;
            solver.extend_from_rows(&costs)?;
            solver.solve(&mut solution, false)?;
            let session_columns: Vec<usize> =
                solution.row_to_column.iter().map(|j| *j as usize).collect();
            assert_eq!(assignment.columns(), session_columns.as_slice());
            assert_eq!(assignment.cost(), solution.objective);
            let mut columns = assignment.columns().to_vec();
            columns.sort_unstable();
            assert_eq!(columns, (0..*size).collect::<Vec<_>>());
            assert!((total_cost(&costs, assignment.columns()) - assignment.cost()).abs() < 1e-9);
        }
        Ok(())
    }

    #[test]
    fn test_repeated_solve_is_identical() -> anyhow::Result<()> {
        let costs = random_costs(3, 30, 5.);
        let first = solve(&costs)?;
        let second = solve(&costs)?;
        assert_eq!(first, second);
        Ok(())
    }

    #[test]
    fn test_cost_change_monotonicity() -> anyhow::Result<()> {
        let mut costs: Vec<Vec<f64>> = random_costs(5, 12, 100.)
            .into_iter()
            .map(|row| row.into_iter().map(f64::floor).collect())
            .collect();
        let optimum = solve(&costs)?;
        let (i, j) = (0..12)
            .flat_map(|i| (0..12).map(move |j| (i, j)))
            .find(|(i, j)| optimum.column_of(*i) != Some(*j))
            .unwrap();

        costs[i][j] += 50.;
        let increased = solve(&costs)?;
        assert!(increased.cost() >= optimum.cost());
        // the optimal assignment stays feasible and did not use the entry
        assert_eq!(increased.cost(), optimum.cost());

        costs[i][j] = 0.;
        let decreased = solve(&costs)?;
        assert!(decreased.cost() <= optimum.cost());
        Ok(())
    }

    #[test]
    fn test_invalid_input() {
        assert_eq!(
            solve(&[vec![0., 1.], vec![2.]]),
            Err(InvalidInputError::RowLength {
                row: 1,
                len: 1,
                expected: 2
            })
        );
        assert_eq!(
            solve(&[vec![0., 1., 2.], vec![2., 3., 4.]]),
            Err(InvalidInputError::RowLength {
                row: 0,
                len: 3,
                expected: 2
            })
        );
        assert_eq!(
            solve(&[[0, -4], [1, 1]]),
            Err(InvalidInputError::NegativeEntry {
                row: 0,
                column: 1,
                value: -4.
            })
        );
        let err = solve(&[[0., 1.], [f64::INFINITY, 1.]]).unwrap_err();
        assert_eq!(err.position(), Some((1, 0)));
    }

    #[test]
    fn test_large_matrix_scales() -> anyhow::Result<()> {
        let size = 300;
        let costs = random_costs(42, size, (size * size) as f64);
        let start = Instant::now();
        let assignment = solve(&costs)?;
        let elapsed = start.elapsed();
        debug!("{}x{} solved in {:?}", size, size, elapsed);
        assert_eq!(assignment.len(), size);
        // loose regression guard, not a timing assertion
        assert!(elapsed.as_secs() < 60);
        Ok(())
    }

    /// Too slow for a debug build; run with `cargo test --release -- --ignored`.
    /// The `dense_uniform` group of `cargo bench` times the same size.
    #[test]
    #[ignore]
    fn test_thousand_by_thousand() -> anyhow::Result<()> {
        let size = 1000;
        let costs = random_costs(1000, size, (size * size) as f64);
        let start = Instant::now();
        let assignment = solve(&costs)?;
        debug!("{}x{} solved in {:?}", size, size, start.elapsed());
        assert_eq!(assignment.len(), size);
        Ok(())
    }
}
