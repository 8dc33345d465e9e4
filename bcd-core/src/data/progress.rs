//! Per-iteration progress record and the merge rule (spec §4.7).

use std::time::Duration;

/// One role's contribution to an iteration's progress record. Workers and
/// servers report disjoint fields; `Progress::merge` folds them together.
#[derive(Clone, Copy, Debug, Default)]
pub struct PartialProgress {
    /// Worker: `Σ log(1 + 1/d_i)`. Server: `λ · Σ|w|`.
    pub objv: f64,
    pub busy_time: Duration,
    pub nnz_w: u64,
    pub violation: f64,
    pub nnz_active_set: u64,
}

/// The merged record for one iteration (spec §3 `Progress`).
#[derive(Clone, Copy, Debug, Default)]
pub struct Progress {
    pub objv: f64,
    pub nnz_w: u64,
    pub violation: f64,
    pub nnz_active_set: u64,
    pub busy_time: Duration,
}

impl Progress {
    /// Merge every worker's and server's `PartialProgress` into one
    /// record: objectives, nnz, violation, and active-set counts all sum
    /// across servers; busy time sums across workers (spec §4.7).
    pub fn merge<'a>(parts: impl IntoIterator<Item = &'a PartialProgress>) -> Self {
        let mut out = Progress::default();
        for p in parts {
            out.objv += p.objv;
            out.nnz_w += p.nnz_w;
            out.violation += p.violation;
            out.nnz_active_set += p.nnz_active_set;
            out.busy_time += p.busy_time;
        }
        out
    }

    /// `relative_objv(iter) = |objv(iter) - objv(iter-1)| / objv(iter-1)`,
    /// `0` for the first iteration (spec §4.7).
    pub fn relative_objv(history: &[Progress], iter: usize) -> f64 {
        if iter == 0 {
            return 0.0;
        }
        let prev = history[iter - 1].objv;
        if prev == 0.0 {
            return 0.0;
        }
        (history[iter].objv - prev).abs() / prev
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_sums_every_field_across_parts() {
        let worker = PartialProgress {
            objv: 1.0,
            busy_time: Duration::from_millis(5),
            ..Default::default()
        };
        let server_a = PartialProgress {
            objv: 0.5,
            nnz_w: 3,
            violation: 0.2,
            nnz_active_set: 10,
            ..Default::default()
        };
        let server_b = PartialProgress {
            objv: 0.25,
            nnz_w: 2,
            violation: 0.5,
            nnz_active_set: 7,
            ..Default::default()
        };
        let merged = Progress::merge([&worker, &server_a, &server_b]);
        assert_eq!(merged.objv, 1.75);
        assert_eq!(merged.nnz_w, 5);
        assert_eq!(merged.violation, 0.7);
        assert_eq!(merged.nnz_active_set, 17);
        assert_eq!(merged.busy_time, Duration::from_millis(5));
    }

    #[test]
    fn relative_objv_is_zero_at_iteration_zero() {
        let hist = [Progress {
            objv: 10.0,
            ..Default::default()
        }];
        assert_eq!(Progress::relative_objv(&hist, 0), 0.0);
    }

    #[test]
    fn relative_objv_computes_ratio() {
        let hist = [
            Progress {
                objv: 10.0,
                ..Default::default()
            },
            Progress {
                objv: 9.0,
                ..Default::default()
            },
        ];
        assert!((Progress::relative_objv(&hist, 1) - 0.1).abs() < 1e-12);
    }
}
