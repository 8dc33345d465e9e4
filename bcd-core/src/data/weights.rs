//! Weight (`w`), trust-region radius (`Δ`) and active-set storage (spec §3).
//!
//! Two views of the same three quantities exist, matching the original's
//! single `delta_`/`active_set_`/`w_` fields meaning different things
//! depending on which role a process plays:
//!
//! - [`ChannelSegment`]: the **server**'s authoritative slice of one
//!   channel — only the key-range that server owns.
//! - [`WorkerMirror`]: the **worker**'s full-length mirror of `Δ` and the
//!   active set for one channel, kept in sync via `updateDual` (spec §4.5)
//!   and consulted by the gradient kernel (spec §4.4).

use super::active_set::ActiveSet;
use super::{ChannelId, Key, KeyRange};

/// `newDelta(d) = max(2|d|, Δ[k]/2)` — spec §4.6/I3, shared by both the
/// server's weight-update kernel and the worker's dual-update kernel.
#[inline]
pub fn new_delta(prev: f64, step: f64) -> f64 {
    (2.0 * step.abs()).max(prev * 0.5)
}

/// One server's authoritative slice of channel `channel`'s weight vector.
#[derive(Clone, Debug)]
pub struct ChannelSegment {
    pub channel: ChannelId,
    /// The global key-range this segment covers; local position `i`
    /// corresponds to global key `range.start + i`.
    pub range: KeyRange,
    pub w: Vec<f64>,
    pub delta: Vec<f64>,
    pub active: ActiveSet,
    /// KKTθ installed for the current iteration (spec §4.1c, §4.3): the
    /// scheduler attaches a fresh value only to a iteration's first block,
    /// so the server must keep applying the last-installed value to every
    /// later block in that iteration, matching the original's persistent
    /// `KKT_filter_threshold_` member (`block_cd_l1lr.cc:103-106,324`).
    pub installed_kkt_theta: f64,
}

impl ChannelSegment {
    pub fn new(channel: ChannelId, range: KeyRange, delta_init: f64) -> Self {
        let n = range.len();
        Self {
            channel,
            range,
            w: vec![0.0; n],
            delta: vec![delta_init; n],
            active: ActiveSet::all_true(n),
            installed_kkt_theta: f64::INFINITY,
        }
    }

    #[inline]
    pub fn local_of(&self, global_key: Key) -> usize {
        (global_key - self.range.start) as usize
    }

    /// Intersection of this segment's ownership with a requested global
    /// key-range (spec §6 `find(channel, global_range) -> local_seg`).
    pub fn find(&self, requested: KeyRange) -> Option<KeyRange> {
        let overlap = self.range.intersect(&requested);
        if overlap.is_empty() {
            None
        } else {
            Some(overlap)
        }
    }

    /// #nonzero `w` entries in this segment (NaN/inactive coordinates and
    /// exact zero both count as not-nonzero, per the original's
    /// `evaluateProgress`).
    pub fn nnz(&self) -> usize {
        self.w.iter().filter(|w| **w != 0.0 && !w.is_nan()).count()
    }

    pub fn l1_norm(&self) -> f64 {
        self.w.iter().filter(|w| !w.is_nan()).map(|w| w.abs()).sum()
    }
}

/// A worker's full-length mirror of `Δ` and the active set for one
/// channel (spec §4.4, §4.5). Workers never hold the authoritative `w`;
/// they only reconcile it transiently during `updateDual`. The last
/// weight value observed per coordinate — needed to compute `δw` on the
/// next pull (spec §4.5 phase 1) — lives alongside this mirror in
/// `WorkerState`, not on it, since it is addressed by global column
/// index rather than the mirror's own local range.
#[derive(Clone, Debug)]
pub struct WorkerMirror {
    pub channel: ChannelId,
    pub range: KeyRange,
    pub delta: Vec<f64>,
    pub active: ActiveSet,
}

impl WorkerMirror {
    pub fn new(channel: ChannelId, range: KeyRange, delta_init: f64) -> Self {
        let n = range.len();
        Self {
            channel,
            range,
            delta: vec![delta_init; n],
            active: ActiveSet::all_true(n),
        }
    }

    #[inline]
    pub fn local_of(&self, global_key: Key) -> usize {
        (global_key - self.range.start) as usize
    }
}
