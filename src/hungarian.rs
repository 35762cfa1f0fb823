use crate::error::InvalidInputError;
use crate::solution::{AssignmentSolution, UnsignedInt};
use crate::solver::AssignmentSolver;
use num_iter;
use tracing::{debug, trace};

/// Hungarian (Kuhn-Munkres) solver for dense square cost matrices.
///
/// Rows are matched one at a time by a Dijkstra-like search for the shortest augmenting path
/// over reduced costs `cost[i][j] - row_potentials[i] - column_potentials[j]`. Potentials are
/// shifted whenever the search runs out of tight edges, so every reduced cost stays non-negative
/// and each row search costs O(N²), O(N³) in total.
///
/// All working storage is owned by the solver and reused between solves.
#[derive(Clone)]
pub struct HungarianSolver<I: UnsignedInt> {
    size: I,
    // row-major N×N costs
    costs: Vec<f64>,

    row_potentials: Vec<f64>,
    column_potentials: Vec<f64>,

    // per-row search state
    // minimal reduced cost from the alternating tree to each column
    slack: Vec<f64>,
    // tree row achieving the slack, frozen into the predecessor once the column is visited
    slack_rows: Vec<I>,
    visited_columns: Vec<bool>,
    visited_list: Vec<I>,
    tree_rows: Vec<I>,

    /// number of column selections made by the last solve
    pub nits: u32,
    /// number of potential shifts made by the last solve
    pub ndual_updates: u32,
}

impl<I: UnsignedInt> AssignmentSolver<I> for HungarianSolver<I> {
    fn new(row_capacity: usize) -> (Self, AssignmentSolution<I>) {
        (
            Self {
                size: I::zero(),
                costs: Vec::with_capacity(row_capacity * row_capacity),
                row_potentials: Vec::with_capacity(row_capacity),
                column_potentials: Vec::with_capacity(row_capacity),
                slack: Vec::with_capacity(row_capacity),
                slack_rows: Vec::with_capacity(row_capacity),
                visited_columns: Vec::with_capacity(row_capacity),
                visited_list: Vec::with_capacity(row_capacity),
                tree_rows: Vec::with_capacity(row_capacity),
                nits: 0,
                ndual_updates: 0,
            },
            AssignmentSolution::<I>::new(row_capacity),
        )
    }

    fn size(&self) -> I {
        self.size
    }
    fn size_mut(&mut self) -> &mut I {
        &mut self.size
    }
    fn costs(&self) -> &Vec<f64> {
        &self.costs
    }
    fn costs_mut(&mut self) -> &mut Vec<f64> {
        &mut self.costs
    }

    fn solve(
        &mut self,
        solution: &mut AssignmentSolution<I>,
        maximize: bool,
    ) -> Result<(), InvalidInputError> {
        self.validate_input()?;
        let (offset, sign) = self.orientation(maximize);
        self.init_solve(solution, offset, sign);

        for r in num_iter::range(I::zero(), self.size) {
            self.augment_row(solution, r, offset, sign);
        }

        solution.row_potentials.extend_from_slice(&self.row_potentials);
        solution.column_potentials.extend_from_slice(&self.column_potentials);
        solution.objective = self.get_objective(solution);
        debug!(
            "solved {}x{}: objective {}, nits {}, dual updates {}",
            self.size, self.size, solution.objective, self.nits, self.ndual_updates
        );
        trace!("row_to_column: {:?}", solution.row_to_column);
        Ok(())
    }
}

impl<I: UnsignedInt> HungarianSolver<I> {
    /// Resets the working storage and seeds row potentials with the row minima.
    ///
    /// Row minima only tighten the initial dual bound. Zero potentials would be equally correct
    /// and cost more dual updates.
    fn init_solve(&mut self, solution: &mut AssignmentSolution<I>, offset: f64, sign: f64) {
        let n: usize = self.size.as_();
        solution.reset(n);
        self.nits = 0;
        self.ndual_updates = 0;

        self.row_potentials.clear();
        if n > 0 {
            let row_potentials = self.costs.chunks_exact(n).map(|row| {
                row.iter()
                    .fold(f64::INFINITY, |acc, c| acc.min(offset + sign * c))
            });
            self.row_potentials.extend(row_potentials);
        }
        self.column_potentials.clear();
        self.column_potentials.resize(n, 0.);

        self.slack.clear();
        self.slack.resize(n, f64::INFINITY);
        self.slack_rows.clear();
        self.slack_rows.resize(n, I::max_value());
        self.visited_columns.clear();
        self.visited_columns.resize(n, false);
        self.visited_list.clear();
        self.tree_rows.clear();
        trace!("initial row potentials {:?}", self.row_potentials);
    }

    /// Extends the matching by row `r`, which is unassigned on entry.
    fn augment_row(&mut self, solution: &mut AssignmentSolution<I>, r: I, offset: f64, sign: f64) {
        let n: usize = self.size.as_();

        // reset search state left by the previous row
        for j_i in self.visited_list.drain(..) {
            let j: usize = j_i.as_();
            self.visited_columns[j] = false;
        }
        self.slack.iter_mut().for_each(|s_ref| *s_ref = f64::INFINITY);
        self.tree_rows.clear();
        self.tree_rows.push(r);

        let mut i_i = r;
        let free_column = loop {
            self.nits += 1;
            let i: usize = i_i.as_();
            let row = &self.costs[i * n..(i + 1) * n];
            let u_i = self.row_potentials[i];

            // relax slacks from the row just added to the tree and pick the column to visit
            let mut delta = f64::INFINITY;
            let mut j_min = usize::MAX;
            for j in 0..n {
                if self.visited_columns[j] {
                    continue;
                }
                let reduced = offset + sign * row[j] - u_i - self.column_potentials[j];
                if reduced < self.slack[j] {
                    self.slack[j] = reduced;
                    self.slack_rows[j] = i_i;
                }
                // strict comparison breaks ties by the lowest column index
                if self.slack[j] < delta {
                    delta = self.slack[j];
                    j_min = j;
                }
            }
            debug_assert!(j_min < n, "an unmatched row always has an unvisited column");

            if delta > 0. {
                self.shift_potentials(delta);
            }

            self.visited_columns[j_min] = true;
            let j_min_i = I::from_usize(j_min).unwrap_or_else(I::max_value);
            self.visited_list.push(j_min_i);

            let matched_row = solution.column_to_row[j_min];
            if matched_row == I::max_value() {
                break j_min;
            }
            trace!("column {} is taken by row {}, growing the tree", j_min, matched_row);
            self.tree_rows.push(matched_row);
            i_i = matched_row;
        };

        self.flip_path(solution, r, free_column);
        trace!("row {} matched, row_to_column {:?}", r, solution.row_to_column);
    }

    /// Moves `delta` from the slack of unvisited columns into the potentials.
    ///
    /// Edges inside the tree keep their reduced cost, edges leaving it lose `delta`, so at least
    /// one of them becomes tight and no reduced cost goes negative.
    fn shift_potentials(&mut self, delta: f64) {
        self.ndual_updates += 1;
        for t in self.tree_rows.iter() {
            let t_usize: usize = t.as_();
            self.row_potentials[t_usize] += delta;
        }
        for (j, visited) in self.visited_columns.iter().enumerate() {
            if *visited {
                self.column_potentials[j] -= delta;
            } else {
                self.slack[j] -= delta;
            }
        }
        trace!("dual update by {}", delta);
    }

    /// Flips matched and unmatched edges along the predecessor chain ending in `free_column`.
    fn flip_path(&self, solution: &mut AssignmentSolution<I>, r: I, free_column: usize) {
        let mut j = free_column;
        loop {
            let i_i = self.slack_rows[j];
            let i: usize = i_i.as_();
            let next_j = solution.row_to_column[i];
            let j_i = I::from_usize(j).unwrap_or_else(I::max_value);
            solution.row_to_column[i] = j_i;
            solution.column_to_row[j] = i_i;
            if i_i == r {
                break;
            }
            let next_j_usize: usize = next_j.as_();
            j = next_j_usize;
        }
    }

    pub fn row_potentials(&self) -> &[f64] {
        &self.row_potentials
    }

    pub fn column_potentials(&self) -> &[f64] {
        &self.column_potentials
    }

    /// Checks that `solution` is certified optimal by its potentials.
    ///
    /// Every reduced cost must be non-negative and every matched edge tight, both up to the
    /// floating point toleration of the largest cost.
    pub fn dual_feasible(&self, solution: &AssignmentSolution<I>, maximize: bool) -> bool {
        let n: usize = self.size.as_();
        if solution.num_unassigned() > 0
            || solution.row_potentials.len() != n
            || solution.column_potentials.len() != n
        {
            return false;
        }
        let (offset, sign) = self.orientation(maximize);
        let c_max = self.costs.iter().fold(0_f64, |acc, x| acc.max(*x));
        let toleration = self.get_toleration(c_max);

        for (i, row) in self.costs.chunks_exact(n.max(1)).enumerate() {
            let u_i = solution.row_potentials[i];
            let matched: usize = solution.row_to_column[i].as_();
            for (j, c) in row.iter().enumerate() {
                let reduced = offset + sign * c - u_i - solution.column_potentials[j];
                if reduced < -toleration {
                    trace!("negative reduced cost {} at ({}, {})", reduced, i, j);
                    return false;
                }
                if j == matched && reduced > toleration {
                    trace!("matched edge ({}, {}) is not tight: {}", i, j, reduced);
                    return false;
                }
            }
        }
        true
    }
}
