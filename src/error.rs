use thiserror::Error;

/// Rejection of a cost matrix during ingestion.
///
/// Raised before any algorithmic work starts. Every variant is permanent for the given input:
/// the matrix has to be fixed by the caller, there is no partial result.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidInputError {
    #[error("cost matrix is not square: row {row} has {len} entries, expected {expected}")]
    RowLength {
        row: usize,
        len: usize,
        expected: usize,
    },
    #[error("cost matrix is not square: {rows} rows for {expected} columns")]
    RowCount { rows: usize, expected: usize },
    #[error("negative cost {value} at row {row}, column {column}")]
    NegativeEntry { row: usize, column: usize, value: f64 },
    #[error("non-finite cost {value} at row {row}, column {column}")]
    NonFiniteEntry { row: usize, column: usize, value: f64 },
    #[error("matrix size {size} does not fit the index type")]
    SizeOverflow { size: usize },
}

impl InvalidInputError {
    /// `(row, column)` of the offending entry, if the reason points at one.
    pub fn position(&self) -> Option<(usize, usize)> {
        match *self {
            InvalidInputError::NegativeEntry { row, column, .. }
            | InvalidInputError::NonFiniteEntry { row, column, .. } => Some((row, column)),
            _ => None,
        }
    }
}

/// Checks a single row of an N×N matrix.
pub(crate) fn validate_row(row: usize, values: &[f64], size: usize) -> Result<(), InvalidInputError> {
    if values.len() != size {
        return Err(InvalidInputError::RowLength {
            row,
            len: values.len(),
            expected: size,
        });
    }
    for (column, &value) in values.iter().enumerate() {
        // NaN compares false with everything, so finiteness goes first
        if !value.is_finite() {
            return Err(InvalidInputError::NonFiniteEntry { row, column, value });
        }
        if value < 0. {
            return Err(InvalidInputError::NegativeEntry { row, column, value });
        }
    }
    Ok(())
}
