use num_traits::{AsPrimitive, FromPrimitive, NumAssign, PrimInt, Unsigned};
use std::fmt::{Debug, Display};

pub trait UnsignedInt:
    PrimInt
    + Unsigned
    + Display
    + Debug
    + AsPrimitive<usize>
    + AsPrimitive<f64>
    + FromPrimitive
    + NumAssign
{
}

impl<I> UnsignedInt for I where
    I: PrimInt
        + Unsigned
        + Display
        + Debug
        + AsPrimitive<usize>
        + AsPrimitive<f64>
        + FromPrimitive
        + NumAssign
{
}

///
/// Solution of the linear assignment problem
///
#[derive(Debug, Clone)]
pub struct AssignmentSolution<I>
where
    I: UnsignedInt,
{
    /// index i gives the column, j, assigned to row i
    ///
    /// Unassigned rows are marked by MAX value of the integer type (u32::MAX for u32)
    pub row_to_column: Vec<I>,
    /// index j gives the row, i, assigned to column j
    ///
    /// Unassigned columns are marked by MAX value of the integer type (u32::MAX for u32)
    pub column_to_row: Vec<I>,
    /// final row potentials (dual variables) of the oriented costs
    pub row_potentials: Vec<f64>,
    /// final column potentials (dual variables) of the oriented costs
    pub column_potentials: Vec<f64>,
    /// total cost of the assignment in terms of the original costs
    pub objective: f64,
}

impl<I> AssignmentSolution<I>
where
    I: UnsignedInt,
{
    pub fn new(row_capacity: usize) -> AssignmentSolution<I> {
        AssignmentSolution::<I> {
            row_to_column: Vec::with_capacity(row_capacity),
            column_to_row: Vec::with_capacity(row_capacity),
            row_potentials: Vec::with_capacity(row_capacity),
            column_potentials: Vec::with_capacity(row_capacity),
            objective: f64::NAN,
        }
    }

    pub(crate) fn reset(&mut self, size: usize) {
        self.row_to_column.clear();
        self.row_to_column.resize(size, I::max_value());
        self.column_to_row.clear();
        self.column_to_row.resize(size, I::max_value());
        self.row_potentials.clear();
        self.column_potentials.clear();
        self.objective = f64::NAN;
    }

    /// Number of rows without a column.
    pub fn num_unassigned(&self) -> usize {
        self.row_to_column
            .iter()
            .filter(|j| **j == I::max_value())
            .count()
    }

    /// Sum of all potentials. Equals the optimal cost of the oriented problem.
    pub fn dual_objective(&self) -> f64 {
        self.row_potentials.iter().sum::<f64>() + self.column_potentials.iter().sum::<f64>()
    }

    /// Immutable snapshot of a complete solution, `None` while some row is unassigned.
    pub fn to_assignment(&self) -> Option<Assignment> {
        if self.num_unassigned() > 0 {
            return None;
        }
        Some(Assignment {
            columns: self
                .row_to_column
                .iter()
                .map(|j| {
                    let j_usize: usize = j.as_();
                    j_usize
                })
                .collect(),
            cost: self.objective,
        })
    }
}

/// Complete row to column assignment returned by [`crate::solve`].
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    columns: Vec<usize>,
    cost: f64,
}

impl Assignment {
    pub(crate) fn empty() -> Self {
        Assignment::new(Vec::new(), 0.)
    }

    pub(crate) fn new(columns: Vec<usize>, cost: f64) -> Self {
        Assignment { columns, cost }
    }

    /// Element `i` is the column assigned to row `i`.
    pub fn columns(&self) -> &[usize] {
        &self.columns
    }

    /// Total cost of the assignment.
    pub fn cost(&self) -> f64 {
        self.cost
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn column_of(&self, row: usize) -> Option<usize> {
        self.columns.get(row).copied()
    }

    /// Inverse lookup, linear in the number of rows.
    pub fn row_of(&self, column: usize) -> Option<usize> {
        self.columns.iter().position(|j| *j == column)
    }

    /// `(row, column)` pairs in row order.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.columns.iter().copied().enumerate()
    }

    pub fn into_columns(self) -> Vec<usize> {
        self.columns
    }
}
