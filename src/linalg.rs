//! Dense matrix kernel.
//!
//! Leaf module with no knowledge of the powder domain. Implements the
//! handful of operations the closed-form steady-state solver needs:
//! multiply, subtract, scalar scale, identity, and inversion via
//! Gauss-Jordan elimination with partial pivoting.
//!
//! # Precision
//!
//! The elimination performs no stabilization beyond partial pivoting
//! (no scaling, no iterative refinement). This is intentional: the
//! solver operates on well-conditioned 5x5 matrices of the form
//! `I - (1-alpha)*P` with `P` stochastic, and the kernel reproduces
//! the reference algorithm's precision characteristics exactly. It is
//! not a general-purpose solver.

use serde::{Deserialize, Serialize};

use crate::error::{PowderError, PowderResult};

/// Pivot magnitude below which elimination reports a singular matrix.
pub const PIVOT_THRESHOLD: f64 = 1e-10;

/// Dense row-major matrix of `f64`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    /// Create a matrix filled with zeros.
    #[must_use]
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Create an `n` x `n` identity matrix.
    #[must_use]
    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            m.data[i * n + i] = 1.0;
        }
        m
    }

    /// Create a matrix from nested row slices.
    ///
    /// # Errors
    ///
    /// Returns [`PowderError::InvalidInput`] if the rows are empty or
    /// ragged.
    pub fn from_rows(rows: &[&[f64]]) -> PowderResult<Self> {
        let n_rows = rows.len();
        let n_cols = rows.first().map_or(0, |r| r.len());
        if n_rows == 0 || n_cols == 0 {
            return Err(PowderError::invalid_input("matrix must be non-empty"));
        }
        let mut data = Vec::with_capacity(n_rows * n_cols);
        for row in rows {
            if row.len() != n_cols {
                return Err(PowderError::invalid_input(
                    "matrix rows must all have the same length",
                ));
            }
            data.extend_from_slice(row);
        }
        Ok(Self {
            rows: n_rows,
            cols: n_cols,
            data,
        })
    }

    /// Create a 1 x `n` row vector.
    #[must_use]
    pub fn row_vector(values: &[f64]) -> Self {
        Self {
            rows: 1,
            cols: values.len(),
            data: values.to_vec(),
        }
    }

    /// Number of rows.
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    #[must_use]
    pub const fn cols(&self) -> usize {
        self.cols
    }

    /// Element at `(i, j)`.
    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.cols + j]
    }

    /// Row `i` as a slice.
    #[must_use]
    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    /// Matrix product `self * other`.
    ///
    /// # Errors
    ///
    /// Returns [`PowderError::ShapeMismatch`] if
    /// `self.cols() != other.rows()`.
    pub fn multiply(&self, other: &Self) -> PowderResult<Self> {
        if self.cols != other.rows {
            return Err(self.shape_mismatch("multiply", other));
        }
        let mut out = Self::zeros(self.rows, other.cols);
        for i in 0..self.rows {
            for k in 0..self.cols {
                let a_ik = self.get(i, k);
                for j in 0..other.cols {
                    out.data[i * other.cols + j] += a_ik * other.get(k, j);
                }
            }
        }
        Ok(out)
    }

    /// Element-wise difference `self - other`.
    ///
    /// # Errors
    ///
    /// Returns [`PowderError::ShapeMismatch`] if the shapes differ.
    pub fn subtract(&self, other: &Self) -> PowderResult<Self> {
        if self.rows != other.rows || self.cols != other.cols {
            return Err(self.shape_mismatch("subtract", other));
        }
        let data = self
            .data
            .iter()
            .zip(other.data.iter())
            .map(|(a, b)| a - b)
            .collect();
        Ok(Self {
            rows: self.rows,
            cols: self.cols,
            data,
        })
    }

    /// Element-wise scalar multiple `k * self`.
    #[must_use]
    pub fn scale(&self, k: f64) -> Self {
        Self {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(|v| k * v).collect(),
        }
    }

    /// Inverse via Gauss-Jordan elimination with partial pivoting.
    ///
    /// Eliminates on the augmented matrix `[A | I]`; after forward and
    /// backward passes the right half is the inverse. At each step the
    /// row with the largest absolute value in the pivot column among
    /// the remaining rows is swapped into pivot position.
    ///
    /// # Errors
    ///
    /// Returns [`PowderError::ShapeMismatch`] if the matrix is not
    /// square, and [`PowderError::SingularMatrix`] if any selected
    /// pivot magnitude falls below [`PIVOT_THRESHOLD`].
    pub fn invert(&self) -> PowderResult<Self> {
        if self.rows != self.cols {
            return Err(self.shape_mismatch("invert", self));
        }
        let n = self.rows;
        let width = 2 * n;

        // Augmented matrix [A | I], one Vec per row so swaps are cheap.
        let mut aug: Vec<Vec<f64>> = (0..n)
            .map(|i| {
                let mut row = Vec::with_capacity(width);
                row.extend_from_slice(self.row(i));
                row.extend((0..n).map(|j| if i == j { 1.0 } else { 0.0 }));
                row
            })
            .collect();

        for i in 0..n {
            // Partial pivoting: largest |value| in column i among rows i..n.
            let mut max_row = i;
            for k in (i + 1)..n {
                if aug[k][i].abs() > aug[max_row][i].abs() {
                    max_row = k;
                }
            }
            aug.swap(i, max_row);

            let pivot = aug[i][i];
            if pivot.abs() < PIVOT_THRESHOLD {
                return Err(PowderError::SingularMatrix {
                    pivot: pivot.abs(),
                    column: i,
                });
            }

            for j in 0..width {
                aug[i][j] /= pivot;
            }

            // Eliminate column i from every other row.
            for k in 0..n {
                if k == i {
                    continue;
                }
                let factor = aug[k][i];
                if factor == 0.0 {
                    continue;
                }
                for j in 0..width {
                    aug[k][j] -= factor * aug[i][j];
                }
            }
        }

        let mut data = Vec::with_capacity(n * n);
        for row in &aug {
            data.extend_from_slice(&row[n..]);
        }
        Ok(Self {
            rows: n,
            cols: n,
            data,
        })
    }

    fn shape_mismatch(&self, op: &'static str, other: &Self) -> PowderError {
        PowderError::ShapeMismatch {
            op,
            left_rows: self.rows,
            left_cols: self.cols,
            right_rows: other.rows,
            right_cols: other.cols,
        }
    }
}
