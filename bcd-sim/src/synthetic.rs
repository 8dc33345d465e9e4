//! Synthetic sparse binary dataset generator (spec §1: "loading a design
//! matrix from disk is out of scope"; this stands in for a real loader so
//! the driver has something to run block coordinate descent over).

use bcd_core::data::SparseMatrix;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub struct Dataset {
    pub matrix: SparseMatrix,
    pub y: Vec<f64>,
    pub nnz: usize,
}

impl Dataset {
    /// Generate `num_features` binary columns over `num_instances` rows.
    /// A handful of "signal" features are biased to correlate with the
    /// label so block coordinate descent has something non-trivial to
    /// shrink toward (spec §8 S2 "shrinkage activates").
    pub fn generate(num_features: usize, num_instances: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let num_signal = (num_features / 8).clamp(1, num_features);

        let mut columns: Vec<Vec<u32>> = Vec::with_capacity(num_features);
        let y: Vec<f64> = (0..num_instances)
            .map(|_| if rng.random_bool(0.5) { 1.0 } else { -1.0 })
            .collect();

        let mut nnz = 0usize;
        for j in 0..num_features {
            let density = if j < num_signal { 0.35 } else { 0.08 };
            let mut col = Vec::new();
            for (i, &label) in y.iter().enumerate() {
                let present = if j < num_signal {
                    // Biased toward rows matching the label's sign, with noise.
                    let p: f64 = if label > 0.0 { density + 0.15 } else { density - 0.05 };
                    rng.random_bool(p.clamp(0.01, 0.95))
                } else {
                    rng.random_bool(density)
                };
                if present {
                    col.push(i as u32);
                }
            }
            nnz += col.len();
            columns.push(col);
        }

        let matrix = SparseMatrix::from_binary_columns(num_instances, columns);
        Self { matrix, y, nnz }
    }

    /// `dual_i = exp(y_i * x_iᵀw)` at `w = 0` is `1` for every row.
    pub fn initial_dual(&self) -> Vec<f64> {
        vec![1.0; self.y.len()]
    }
}
