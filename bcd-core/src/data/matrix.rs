//! Sparse, column-major design matrix (spec §3/§6). Loading it from disk
//! is out of scope; this type only describes the in-memory shape the
//! kernels read.

/// Column-major sparse matrix in CSC-like layout: `offsets[j]..offsets[j+1]`
/// indexes into `indices`/`values` for column `j`. When `binary` is true
/// every stored entry has implicit value `1.0` and `values` is empty.
#[derive(Clone, Debug)]
pub struct SparseMatrix {
    rows: usize,
    cols: usize,
    binary: bool,
    offsets: Vec<usize>,
    indices: Vec<u32>,
    values: Vec<f64>,
}

impl SparseMatrix {
    pub fn new(
        rows: usize,
        offsets: Vec<usize>,
        indices: Vec<u32>,
        values: Vec<f64>,
        binary: bool,
    ) -> Self {
        let cols = offsets.len().saturating_sub(1);
        debug_assert_eq!(*offsets.last().unwrap_or(&0), indices.len());
        debug_assert!(binary || values.len() == indices.len());
        for &row in &indices {
            debug_assert!((row as usize) < rows, "row index out of bounds");
        }
        Self {
            rows,
            cols,
            binary,
            offsets,
            indices,
            values,
        }
    }

    /// Build a binary matrix (every stored entry implicitly 1.0) from a
    /// column-major list of row indices.
    pub fn from_binary_columns(rows: usize, columns: Vec<Vec<u32>>) -> Self {
        let mut offsets = Vec::with_capacity(columns.len() + 1);
        let mut indices = Vec::new();
        offsets.push(0);
        for col in columns {
            indices.extend(col);
            offsets.push(indices.len());
        }
        Self::new(rows, offsets, indices, Vec::new(), true)
    }

    /// Build a value-carrying matrix from parallel (row, value) columns.
    pub fn from_value_columns(rows: usize, columns: Vec<Vec<(u32, f64)>>) -> Self {
        let mut offsets = Vec::with_capacity(columns.len() + 1);
        let mut indices = Vec::new();
        let mut values = Vec::new();
        offsets.push(0);
        for col in columns {
            for (row, value) in col {
                indices.push(row);
                values.push(value);
            }
            offsets.push(indices.len());
        }
        Self::new(rows, offsets, indices, values, false)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn binary(&self) -> bool {
        self.binary
    }

    /// Nonzero row indices of column `j`.
    pub fn col_indices(&self, j: usize) -> &[u32] {
        &self.indices[self.offsets[j]..self.offsets[j + 1]]
    }

    /// Nonzero values of column `j`, or `None` for a binary matrix.
    pub fn col_values(&self, j: usize) -> Option<&[f64]> {
        if self.binary {
            None
        } else {
            Some(&self.values[self.offsets[j]..self.offsets[j + 1]])
        }
    }
}
