use crate::error::{validate_row, InvalidInputError};
use crate::solution::{AssignmentSolution, UnsignedInt};
use num_iter;
use num_traits::AsPrimitive;
use tracing::trace;

/// Dense N×N cost storage shared by assignment solvers.
///
/// Costs are kept row-major and are filled row by row with [`AssignmentSolver::add_row`] after
/// [`AssignmentSolver::init`]. Each row is validated as it arrives, so a solve never starts on a
/// matrix with negative, non-finite or missing entries.
pub trait AssignmentSolver<I: UnsignedInt>: Sized {
    fn new(row_capacity: usize) -> (Self, AssignmentSolution<I>);

    fn size(&self) -> I;
    fn size_mut(&mut self) -> &mut I;
    fn costs(&self) -> &Vec<f64>;
    fn costs_mut(&mut self) -> &mut Vec<f64>;

    /// Solves the problem currently stored and writes the result into `solution`.
    ///
    /// With `maximize` the total cost is maximized instead of minimized.
    fn solve(
        &mut self,
        solution: &mut AssignmentSolution<I>,
        maximize: bool,
    ) -> Result<(), InvalidInputError>;

    /// Resets the storage for a `size`×`size` problem.
    fn init(&mut self, size: I) -> Result<(), InvalidInputError> {
        let size_usize: usize = size.as_();
        // MAX value is reserved as the unassigned marker
        if size == I::max_value() {
            return Err(InvalidInputError::SizeOverflow { size: size_usize });
        }
        *self.size_mut() = size;
        let costs = self.costs_mut();
        costs.clear();
        costs.reserve(size_usize * size_usize);
        Ok(())
    }

    #[inline]
    fn num_rows(&self) -> usize {
        let size: usize = self.size().as_();
        if size == 0 {
            0
        } else {
            self.costs().len() / size
        }
    }

    #[inline]
    fn num_of_entries(&self) -> usize {
        self.costs().len()
    }

    /// Appends the next row of the matrix.
    ///
    /// A rejected row leaves the storage as it was before the call.
    fn add_row<C: AsPrimitive<f64>>(&mut self, values: &[C]) -> Result<(), InvalidInputError> {
        let size: usize = self.size().as_();
        let row = self.num_rows();
        if row >= size {
            return Err(InvalidInputError::RowCount {
                rows: row + 1,
                expected: size,
            });
        }
        let start = self.costs().len();
        let costs = self.costs_mut();
        costs.extend(values.iter().map(|v| v.as_()));
        if let Err(err) = validate_row(row, &costs[start..], size) {
            costs.truncate(start);
            return Err(err);
        }
        Ok(())
    }

    #[inline]
    fn extend_from_rows<R, C>(&mut self, rows: &[R]) -> Result<(), InvalidInputError>
    where
        R: AsRef<[C]>,
        C: AsPrimitive<f64>,
    {
        for row in rows {
            self.add_row(row.as_ref())?;
        }
        Ok(())
    }

    /// Checks that every row of the matrix has been supplied.
    fn validate_input(&self) -> Result<(), InvalidInputError> {
        let size: usize = self.size().as_();
        let rows = self.num_rows();
        if rows != size {
            return Err(InvalidInputError::RowCount {
                rows,
                expected: size,
            });
        }
        debug_assert_eq!(self.num_of_entries(), size * size);
        Ok(())
    }

    #[inline]
    fn cost(&self, row: usize, column: usize) -> f64 {
        let size: usize = self.size().as_();
        self.costs()[row * size + column]
    }

    /// Returns `(offset, sign)` such that `offset + sign * cost` is the cost to minimize.
    ///
    /// Maximization reflects the costs around the largest entry so oriented costs stay
    /// non-negative.
    fn orientation(&self, maximize: bool) -> (f64, f64) {
        if maximize {
            let c_max = self.costs().iter().fold(0_f64, |acc, x| acc.max(*x));
            trace!("maximizing, reflecting costs around {}", c_max);
            (c_max, -1.)
        } else {
            (0., 1.)
        }
    }

    /// Returns current objective value of assignments in terms of the original costs.
    fn get_objective(&self, solution: &AssignmentSolution<I>) -> f64 {
        let mut obj = 0.;
        for i in num_iter::range(I::zero(), self.size()) {
            let i_usize: usize = i.as_();
            let j = solution.row_to_column[i_usize];
            if j == I::max_value() {
                // skip any unassigned
                continue;
            }
            let j_usize: usize = j.as_();
            obj += self.cost(i_usize, j_usize);
        }
        obj
    }

    /// Absolute tolerance for comparisons of costs of magnitude up to `max_abs_cost`.
    fn get_toleration(&self, max_abs_cost: f64) -> f64 {
        // Roughly one unit in the last place of the largest cost, times the length of an
        // augmenting path along which rounding errors accumulate.
        let size: f64 = self.size().as_();
        let exponent = (max_abs_cost + 1.).log2().ceil() as i32 - f64::MANTISSA_DIGITS as i32;
        let ulp = 2_f64.powi(exponent);
        ulp * (size + 1.) * 4.
    }
}
