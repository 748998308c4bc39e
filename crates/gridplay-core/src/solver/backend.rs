use faer::{prelude::*, solvers::PartialPivLu, Mat};
use thiserror::Error;

/// Pivots smaller than this in magnitude mark the system as singular.
pub const PIVOT_TOLERANCE: f64 = 1e-12;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LinearSystemError {
    #[error("singular matrix: pivot {pivot:e} in column {column}")]
    Singular { column: usize, pivot: f64 },

    #[error("solution component {index} is not finite")]
    NonFinite { index: usize },

    #[error("rhs length ({rhs}) does not match matrix dimension {rows}")]
    DimensionMismatch { rows: usize, rhs: usize },

    #[error("matrix must be square: row {row} has {len} entries")]
    NotSquare { row: usize, len: usize },
}

impl LinearSystemError {
    /// True for the conditions that mean "no unique solution" rather than bad input.
    pub fn is_singular(&self) -> bool {
        matches!(
            self,
            LinearSystemError::Singular { .. } | LinearSystemError::NonFinite { .. }
        )
    }
}

/// Trait for solving dense linear systems (Ax = b).
pub trait LinearSystemBackend: Send + Sync {
    fn solve(&self, matrix: &[Vec<f64>], rhs: &[f64]) -> Result<Vec<f64>, LinearSystemError>;
}

fn check_shape(matrix: &[Vec<f64>], rhs: &[f64]) -> Result<(), LinearSystemError> {
    let n = matrix.len();
    if rhs.len() != n {
        return Err(LinearSystemError::DimensionMismatch {
            rows: n,
            rhs: rhs.len(),
        });
    }
    if let Some((row, values)) = matrix.iter().enumerate().find(|(_, r)| r.len() != n) {
        return Err(LinearSystemError::NotSquare {
            row,
            len: values.len(),
        });
    }
    Ok(())
}

/// Gauss–Jordan elimination with partial pivoting on the augmented matrix `[A | b]`.
///
/// Every pivot row is normalized and its column cleared from all other rows, so the
/// last augmented column holds the solution directly (no back substitution).
#[derive(Debug, Clone, Default)]
pub struct GaussSolver;

impl LinearSystemBackend for GaussSolver {
    fn solve(&self, matrix: &[Vec<f64>], rhs: &[f64]) -> Result<Vec<f64>, LinearSystemError> {
        check_shape(matrix, rhs)?;
        let n = matrix.len();
        if n == 0 {
            return Ok(Vec::new());
        }

        let mut aug: Vec<Vec<f64>> = matrix
            .iter()
            .zip(rhs)
            .map(|(row, &b)| {
                let mut augmented = Vec::with_capacity(n + 1);
                augmented.extend_from_slice(row);
                augmented.push(b);
                augmented
            })
            .collect();

        for col in 0..n {
            let mut pivot = col;
            for row in col + 1..n {
                if aug[row][col].abs() > aug[pivot][col].abs() {
                    pivot = row;
                }
            }
            let diag = aug[pivot][col];
            if diag.abs() < PIVOT_TOLERANCE {
                return Err(LinearSystemError::Singular { column: col, pivot: diag });
            }
            aug.swap(col, pivot);

            for value in aug[col][col..].iter_mut() {
                *value /= diag;
            }

            let pivot_segment = aug[col][col..].to_vec();
            for (row, values) in aug.iter_mut().enumerate() {
                if row == col {
                    continue;
                }
                let factor = values[col];
                if factor == 0.0 {
                    continue;
                }
                for (target, &p) in values[col..].iter_mut().zip(pivot_segment.iter()) {
                    *target -= factor * p;
                }
            }
        }

        Ok(aug.into_iter().map(|row| row[n]).collect())
    }
}

/// Dense partial-pivot LU from `faer`.
///
/// `faer` does not report rank deficiency itself. The pivots sit on the diagonal of
/// the L factor and are held to the same [`PIVOT_TOLERANCE`] as [`GaussSolver`]; a
/// non-finite solution component is still surfaced as [`LinearSystemError::NonFinite`].
#[derive(Debug, Clone, Default)]
pub struct FaerSolver;

impl LinearSystemBackend for FaerSolver {
    fn solve(&self, matrix: &[Vec<f64>], rhs: &[f64]) -> Result<Vec<f64>, LinearSystemError> {
        check_shape(matrix, rhs)?;
        let n = matrix.len();
        if n == 0 {
            return Ok(Vec::new());
        }

        let mat = Mat::from_fn(n, n, |i, j| matrix[i][j]);
        let rhs_mat = Mat::from_fn(n, 1, |i, _| rhs[i]);
        let lu = PartialPivLu::new(mat.as_ref());

        let lower = lu.compute_l();
        for column in 0..n {
            let pivot = lower.read(column, column);
            if pivot.abs() < PIVOT_TOLERANCE {
                return Err(LinearSystemError::Singular { column, pivot });
            }
        }

        let sol = lu.solve(&rhs_mat);

        let mut solution = Vec::with_capacity(n);
        for i in 0..n {
            let value = sol.read(i, 0);
            if !value.is_finite() {
                return Err(LinearSystemError::NonFinite { index: i });
            }
            solution.push(value);
        }
        Ok(solution)
    }
}
