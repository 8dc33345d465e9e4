//! Logical time (spec §4.2, §5, Design Notes §9). A monotonic counter per
//! role pool; `UPDATE_MODEL` reserves three consecutive timestamps.

/// A role pool's monotonically increasing logical clock.
pub type LogicalTime = u64;

/// Per-block logical-time stride: one block reserves PUSH, server FINISH,
/// and PULL timestamps (spec §4.2, §5, GLOSSARY).
pub const KPACE: LogicalTime = 3;

/// The three timestamps one `UPDATE_MODEL` block round reserves, named
/// explicitly instead of scattering `time + 1` / `time + 2` arithmetic
/// across handlers (Design Notes §9: "keep the three-phase PUSH/UPDATE/PULL
/// reservation as an explicit contract").
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BlockRound {
    pub t_push: LogicalTime,
    pub t_finish: LogicalTime,
    pub t_pull: LogicalTime,
}

impl BlockRound {
    /// Build the three reserved timestamps from a task's base time `T`
    /// (spec §4.2: "message carrying logical time T, multiplied by a fixed
    /// pace factor kPace=3").
    pub fn from_task_time(task_time: LogicalTime) -> Self {
        let base = task_time * KPACE;
        Self {
            t_push: base,
            t_finish: base + 1,
            t_pull: base + 2,
        }
    }
}
