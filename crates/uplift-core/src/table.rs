//! Contingency tables: the validated matrix input for categorical tests.

use nalgebra::DMatrix;

use crate::constants::HALDANE_CORRECTION;
use crate::error::{AnalysisError, AnalysisResult};

/// A validated R×C table of non-negative counts.
///
/// Constructed once and never mutated: corrections that touch cell values
/// (Haldane smoothing) return a new table. Backed by a dense `nalgebra`
/// matrix in row-major construction order.
#[derive(Debug, Clone, PartialEq)]
pub struct ContingencyTable {
    cells: DMatrix<f64>,
}

impl ContingencyTable {
    /// Build a table from row slices.
    ///
    /// Requires at least 2 rows and 2 columns, rectangular shape, and
    /// finite non-negative entries.
    pub fn from_rows(rows: &[&[f64]]) -> AnalysisResult<Self> {
        if rows.len() < 2 {
            return Err(AnalysisError::invalid(
                "table",
                format!("needs at least 2 rows, got {}", rows.len()),
            ));
        }
        let ncols = rows[0].len();
        if ncols < 2 {
            return Err(AnalysisError::invalid(
                "table",
                format!("needs at least 2 columns, got {ncols}"),
            ));
        }
        for (i, row) in rows.iter().enumerate() {
            if row.len() != ncols {
                return Err(AnalysisError::invalid(
                    "table",
                    format!(
                        "ragged shape: row 0 has {ncols} columns, row {i} has {}",
                        row.len()
                    ),
                ));
            }
            for &x in row.iter() {
                if !x.is_finite() || x < 0.0 {
                    return Err(AnalysisError::invalid(
                        "table",
                        format!("cells must be finite and non-negative, got {x} in row {i}"),
                    ));
                }
            }
        }

        let flat: Vec<f64> = rows.iter().flat_map(|r| r.iter().copied()).collect();
        Ok(Self {
            cells: DMatrix::from_row_slice(rows.len(), ncols, &flat),
        })
    }

    /// Build a 2×2 table from the four counts `[[a, b], [c, d]]`.
    pub fn from_counts(a: u64, b: u64, c: u64, d: u64) -> Self {
        Self {
            cells: DMatrix::from_row_slice(2, 2, &[a as f64, b as f64, c as f64, d as f64]),
        }
    }

    /// Number of rows.
    pub fn nrows(&self) -> usize {
        self.cells.nrows()
    }

    /// Number of columns.
    pub fn ncols(&self) -> usize {
        self.cells.ncols()
    }

    /// Cell value at (row, col).
    pub fn cell(&self, row: usize, col: usize) -> f64 {
        self.cells[(row, col)]
    }

    /// Sum of row `i`.
    pub fn row_total(&self, i: usize) -> f64 {
        (0..self.ncols()).map(|j| self.cells[(i, j)]).sum()
    }

    /// Sum of column `j`.
    pub fn col_total(&self, j: usize) -> f64 {
        (0..self.nrows()).map(|i| self.cells[(i, j)]).sum()
    }

    /// Grand total over all cells.
    pub fn total(&self) -> f64 {
        self.cells.iter().sum()
    }

    /// Whether this is a 2×2 table.
    pub fn is_two_by_two(&self) -> bool {
        self.nrows() == 2 && self.ncols() == 2
    }

    /// Expected counts under independence, derived from the marginals:
    /// `E[i][j] = row_i · col_j / total`.
    pub fn expected(&self) -> DMatrix<f64> {
        let total = self.total();
        let row_totals: Vec<f64> = (0..self.nrows()).map(|i| self.row_total(i)).collect();
        let col_totals: Vec<f64> = (0..self.ncols()).map(|j| self.col_total(j)).collect();

        DMatrix::from_fn(self.nrows(), self.ncols(), |i, j| {
            row_totals[i] * col_totals[j] / total
        })
    }

    /// A new table with the Haldane-Anscombe correction (0.5 added to
    /// every cell). The original is untouched.
    pub fn haldane_smoothed(&self) -> Self {
        Self {
            cells: self.cells.map(|x| x + HALDANE_CORRECTION),
        }
    }

    /// The four cells of a 2×2 table as `(a, b, c, d)`, row-major.
    ///
    /// Errors on any other shape.
    pub fn counts_2x2(&self) -> AnalysisResult<(f64, f64, f64, f64)> {
        if !self.is_two_by_two() {
            return Err(AnalysisError::invalid(
                "table",
                format!("must be 2x2, got {}x{}", self.nrows(), self.ncols()),
            ));
        }
        Ok((
            self.cells[(0, 0)],
            self.cells[(0, 1)],
            self.cells[(1, 0)],
            self.cells[(1, 1)],
        ))
    }

    /// Row-major iteration over cell values.
    pub fn iter_rows(&self) -> impl Iterator<Item = Vec<f64>> + '_ {
        (0..self.nrows()).map(move |i| (0..self.ncols()).map(|j| self.cells[(i, j)]).collect())
    }
}
