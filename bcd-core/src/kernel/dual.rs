//! Dual update kernel (spec §4.5): phase 1 reconciles the worker's mirror
//! of `w` against the server's pulled values and recomputes `Δ`; phase 2
//! multiplicatively updates the per-row dual variable `d_i = exp(y_i ·
//! x_iᵀw)`, partitioned by row range.

use crate::data::{new_delta, SparseMatrix, WorkerMirror};

use super::pool::KernelPool;

/// Phase 1 (spec §4.5a): fold a pulled segment of new weights into the
/// worker's mirror, returning the per-coordinate `δw` phase 2 propagates.
/// `nw[i].is_nan()` marks a coordinate the server inactivated — clear it
/// locally and contribute zero delta (spec §7 NaN contract).
pub fn reconcile_weights(mirror: &mut WorkerMirror, last_seen_w: &mut [f64], col_range: std::ops::Range<usize>, new_w: &[f64]) -> Vec<f64> {
    debug_assert_eq!(new_w.len(), col_range.len());
    let mut delta_w = vec![0.0; new_w.len()];
    for (i, &nw) in new_w.iter().enumerate() {
        let j = col_range.start + i;
        if nw.is_nan() {
            mirror.active.clear(j);
            last_seen_w[j] = 0.0;
            delta_w[i] = 0.0;
            continue;
        }
        let dw = nw - last_seen_w[j];
        delta_w[i] = dw;
        mirror.delta[j] = new_delta(mirror.delta[j], dw);
        last_seen_w[j] = nw;
    }
    delta_w
}

/// Phase 2 (spec §4.5b): `d_i *= exp(y_i · Δw)` (or `exp(y_i · Δw · x_ij)`
/// for non-binary columns) for every row `i` the touched columns cover,
/// partitioned across rows so each thread owns a disjoint slice of `dual`.
pub fn update_dual(pool: &KernelPool, matrix: &SparseMatrix, y: &[f64], dual: &mut [f64], active: &crate::data::ActiveSet, col_range: std::ops::Range<usize>, delta_w: &[f64]) {
    debug_assert_eq!(delta_w.len(), col_range.len());
    let rows = dual.len();
    let dual_ptr = dual.as_mut_ptr() as usize;
    // SAFETY: `KernelPool::parallel_for` partitions `0..rows` into
    // disjoint, non-overlapping ranges, so each chunk's slice aliases no
    // other chunk's (mirrors `gradient::compute_gradients`).
    pool.parallel_for(rows, |row_range| {
        let dual_slice = unsafe { std::slice::from_raw_parts_mut((dual_ptr as *mut f64).add(row_range.start), row_range.len()) };
        for (j, &wd) in delta_w.iter().enumerate() {
            let k = col_range.start + j;
            if wd == 0.0 || !active.test(k) {
                continue;
            }
            let col_rows = matrix.col_indices(k);
            let col_values = matrix.col_values(k);
            for (o, &i) in col_rows.iter().enumerate() {
                let i = i as usize;
                if !row_range.contains(&i) {
                    continue;
                }
                let factor = match col_values {
                    None => (y[i] * wd).exp(),
                    Some(values) => (y[i] * wd * values[o]).exp(),
                };
                dual_slice[i - row_range.start] *= factor;
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{ActiveSet, KeyRange};

    #[test]
    fn reconcile_marks_nan_inactive_and_zeroes_delta() {
        let mut mirror = WorkerMirror::new(0, KeyRange::new(0, 2), 1.0);
        let mut last_seen = vec![0.0; 2];
        let dw = reconcile_weights(&mut mirror, &mut last_seen, 0..2, &[f64::NAN, 0.5]);
        assert!(!mirror.active.test(0));
        assert_eq!(dw[0], 0.0);
        assert_eq!(dw[1], 0.5);
        assert_eq!(last_seen[1], 0.5);
    }

    #[test]
    fn reconcile_computes_delta_and_new_delta() {
        let mut mirror = WorkerMirror::new(0, KeyRange::new(0, 1), 1.0);
        let mut last_seen = vec![0.2];
        let dw = reconcile_weights(&mut mirror, &mut last_seen, 0..1, &[1.0]);
        assert!((dw[0] - 0.8).abs() < 1e-12);
        assert_eq!(mirror.delta[0], new_delta(1.0, 0.8));
    }

    #[test]
    fn update_dual_multiplies_touched_rows_only() {
        let m = SparseMatrix::from_binary_columns(3, vec![vec![0, 1]]);
        let y = [1.0, -1.0, 1.0];
        let mut dual = [1.0, 1.0, 1.0];
        let active = ActiveSet::all_true(1);
        let pool = KernelPool::new(2);
        update_dual(&pool, &m, &y, &mut dual, &active, 0..1, &[0.5]);
        assert!((dual[0] - (0.5f64).exp()).abs() < 1e-9);
        assert!((dual[1] - (-0.5f64).exp()).abs() < 1e-9);
        assert_eq!(dual[2], 1.0);
    }
}
