//! Scheduler task shapes and the `TaskPool` contract (spec §4.1, §6).

use crate::data::{ChannelId, KeyRange};

use super::time::LogicalTime;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TaskKind {
    UpdateModel,
    EvaluateProgress,
}

/// The command payload carried by an `UPDATE_MODEL` task (spec §4.1c,
/// §6 "Wire payloads").
#[derive(Clone, Copy, Debug)]
pub struct BlockCmd {
    pub key_range: KeyRange,
    pub channel: ChannelId,
    pub feature_group: u32,
    /// Attached only to the first task emitted in an iteration.
    pub kkt_theta: Option<f64>,
    /// Set only alongside `kkt_theta` when the scheduler's `reset_filter`
    /// flag is set (spec §4.1c).
    pub kkt_filter_reset: bool,
}

#[derive(Clone, Copy, Debug)]
pub struct Task {
    pub kind: TaskKind,
    pub wait_time: LogicalTime,
    pub block: Option<BlockCmd>,
}

impl Task {
    pub fn update_model(wait_time: LogicalTime, block: BlockCmd) -> Self {
        Self {
            kind: TaskKind::UpdateModel,
            wait_time,
            block: Some(block),
        }
    }

    pub fn evaluate_progress(wait_time: LogicalTime) -> Self {
        Self {
            kind: TaskKind::EvaluateProgress,
            wait_time,
            block: None,
        }
    }
}

/// Scheduler collaborator contract (spec §6). A task may begin once every
/// earlier task with `time <= wait_time` has finished (spec §5, bounded
/// staleness).
pub trait TaskPool: Send + Sync {
    fn time(&self) -> LogicalTime;

    /// Submit a task, returning the logical time assigned to it.
    fn submit(&self, task: Task) -> LogicalTime;

    /// Submit a task and invoke `on_complete` once every peer has
    /// finished it (used for `EVALUATE_PROGRESS`, spec §4.1d).
    fn submit_and_wait(&self, task: Task, on_complete: Box<dyn FnOnce() + Send>) -> LogicalTime;

    /// Mark an incoming task (one this pool received from a peer) as
    /// finished at `time` (spec §4.2 step 7).
    fn finish_incoming_task(&self, time: LogicalTime);
}
