//! Gradient kernel (spec §4.4): per-coordinate gradient `G` and diagonal
//! curvature upper bound `U` over one block's column range.

use crate::data::{ActiveSet, SparseMatrix};

use super::pool::KernelPool;
use super::INACTIVE;

/// Curvature terms are clamped to this value (spec §4.4 edge case:
/// `tau*(1-tau)` bound).
const CURVATURE_CAP: f64 = 0.25;

/// Compute `(G, U)` over `col_range` (global column/coordinate indices
/// into `matrix`, `active`, and `delta`, all full-channel-length).
///
/// Inactive coordinates (`!active.test(k)`) are skipped and both outputs
/// set to [`INACTIVE`] (spec §4.4 edge case, §7 NaN sentinel contract).
/// Small ranges run single-threaded — partitioning overhead would
/// dominate below 64 columns (spec §4.4 Design Notes).
pub fn compute_gradients(
    pool: &KernelPool,
    matrix: &SparseMatrix,
    col_range: std::ops::Range<usize>,
    y: &[f64],
    dual: &[f64],
    active: &ActiveSet,
    delta: &[f64],
) -> (Vec<f64>, Vec<f64>) {
    let n = col_range.len();
    let mut g = vec![0.0; n];
    let mut u = vec![0.0; n];

    let run = |range: std::ops::Range<usize>, g: &mut [f64], u: &mut [f64]| {
        for local in range {
            let k = col_range.start + local;
            if !active.test(k) {
                g[local] = INACTIVE;
                u[local] = INACTIVE;
                continue;
            }
            let rows = matrix.col_indices(k);
            let values = matrix.col_values(k);
            let d = if matrix.binary() {
                delta[k].exp()
            } else {
                delta[k]
            };
            let mut gj = 0.0f64;
            let mut uj = 0.0f64;
            for (o, &i) in rows.iter().enumerate() {
                let i = i as usize;
                let tau = 1.0 / (1.0 + dual[i]);
                match values {
                    None => {
                        gj -= y[i] * tau;
                        uj += (tau * (1.0 - tau) * d).min(CURVATURE_CAP);
                    }
                    Some(values) => {
                        let v = values[o];
                        gj -= y[i] * tau * v;
                        uj += (tau * (1.0 - tau) * (v.abs() * d).exp()).min(CURVATURE_CAP) * v * v;
                    }
                }
            }
            g[local] = gj;
            u[local] = uj;
        }
    };

    if n < 64 {
        run(0..n, &mut g, &mut u);
        return (g, u);
    }

    // SAFETY: `KernelPool::parallel_for` partitions `0..n` into disjoint,
    // non-overlapping ranges, so each chunk's slice aliases no other
    // chunk's.
    let g_ptr = g.as_mut_ptr() as usize;
    let u_ptr = u.as_mut_ptr() as usize;
    pool.parallel_for(n, |range| {
        let g_slice = unsafe { std::slice::from_raw_parts_mut((g_ptr as *mut f64).add(range.start), range.len()) };
        let u_slice = unsafe { std::slice::from_raw_parts_mut((u_ptr as *mut f64).add(range.start), range.len()) };
        run(range.start..range.end, g_slice, u_slice);
    });
    (g, u)
}
