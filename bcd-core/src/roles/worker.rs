//! Worker `UPDATE_MODEL` handler (spec §4.2): compute gradients, push
//! them to servers, then pull the updated weights back and fold them
//! into the local dual variable.

use std::time::{Duration, Instant};

use crate::data::{ChannelId, KeyRange, SparseMatrix, WorkerMirror};
use crate::kernel::{compute_gradients, update_dual, KernelPool};
use crate::kernel::dual::reconcile_weights;
use crate::protocol::message::Message;
use crate::protocol::{BlockRound, LogicalTime, ParameterStore, PullMsg, PushMsg, TaskPool};

/// Everything one worker owns that outlives a single block (spec §5:
/// guarded in the original by a single mutex across kernel phases; here
/// the caller is expected to hold the equivalent exclusive access for
/// the duration of one call).
pub struct WorkerState {
    pub mirror: WorkerMirror,
    pub last_seen_w: Vec<f64>,
    pub dual: Vec<f64>,
    pub busy_time: Duration,
}

impl WorkerState {
    pub fn new(channel: ChannelId, range: KeyRange, delta_init: f64, dual_init: Vec<f64>) -> Self {
        let n = range.len();
        Self {
            mirror: WorkerMirror::new(channel, range, delta_init),
            last_seen_w: vec![0.0; n],
            dual: dual_init,
            busy_time: Duration::ZERO,
        }
    }
}

/// Process one `UPDATE_MODEL` block (spec §4.2 steps 1-7). `sender` and
/// `task_time` identify the originating scheduler task for the final
/// `finish_incoming_task` acknowledgement (spec §4.2 step 7, "the
/// scheduler treats UPDATE_MODEL as complete only after step 7").
///
/// `between_push_and_pull` runs after the PUSH lands and before the PULL
/// is issued — in a real deployment this gap is filled by the server
/// processing the push asynchronously (spec §4.3 steps 1-4); a
/// single-process driver instead calls the server handler here directly.
pub fn handle_update_model(
    kernel_pool: &KernelPool,
    matrix: &SparseMatrix,
    y: &[f64],
    state: &mut WorkerState,
    store: &dyn ParameterStore,
    scheduler_pool: &dyn TaskPool,
    sender: u32,
    task_time: LogicalTime,
    global_range: KeyRange,
    reset: bool,
    between_push_and_pull: impl FnOnce(),
) {
    if reset {
        state.mirror.active.fill_true();
    }

    let round = BlockRound::from_task_time(task_time);
    let local = store
        .find(state.mirror.channel, global_range)
        .expect("scheduler must only route blocks this worker's channel covers");
    let col_start = state.mirror.local_of(local.start);
    let col_range = col_start..col_start + local.len();

    let start = Instant::now();
    let (g, u) = compute_gradients(
        kernel_pool,
        matrix,
        col_range.clone(),
        y,
        &state.dual,
        &state.mirror.active,
        &state.mirror.delta,
    );
    state.busy_time += start.elapsed();

    let push = PushMsg {
        envelope: Message::new(sender, round.t_push, local),
        channel: state.mirror.channel,
        values: interleave_gu(&g, &u),
    };
    let assigned = store.push(push);
    debug_assert_eq!(assigned, round.t_push, "transport must assign the reserved PUSH timestamp");

    between_push_and_pull();

    let pull = PullMsg {
        envelope: Message::new(sender, round.t_pull, local),
        channel: state.mirror.channel,
    };
    let assigned = store.pull(pull);
    debug_assert_eq!(assigned, round.t_pull, "transport must assign the reserved PULL timestamp");

    let received = store.received(round.t_pull);
    debug_assert_eq!(received.len(), 1, "expected exactly one server's pulled segment (spec §7)");
    let new_w = &received[0].values;

    let start = Instant::now();
    let delta_w = reconcile_weights(&mut state.mirror, &mut state.last_seen_w, col_range.clone(), new_w);
    update_dual(kernel_pool, matrix, y, &mut state.dual, &state.mirror.active, col_range, &delta_w);
    state.busy_time += start.elapsed();

    scheduler_pool.finish_incoming_task(task_time);
}

/// Interleave `(g, u)` into one values array for the PUSH (spec §4.3
/// step 2: "two parallel arrays aggregated across workers"); the
/// reference store de-interleaves on receipt.
fn interleave_gu(g: &[f64], u: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(g.len() + u.len());
    out.extend_from_slice(g);
    out.extend_from_slice(u);
    out
}
