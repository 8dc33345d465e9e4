//! Server `UPDATE_MODEL` handler (spec §4.3): wait for the aggregated
//! worker contribution, apply the weight-update kernel, then release
//! workers' pulls.

use crate::data::{ChannelSegment, KeyRange};
use crate::protocol::{BlockRound, LogicalTime, ParameterStore};
use crate::kernel::update_weight;

use super::WORKER_GROUP;

/// Process one `UPDATE_MODEL` block on the server that owns `segment`.
/// Returns `false` without side effects if `global_range` does not
/// intersect this server's key-range (spec §4.3 "return immediately").
pub fn handle_update_model(
    segment: &mut ChannelSegment,
    store: &dyn ParameterStore,
    eta: f64,
    lambda: f64,
    kkt_theta: Option<f64>,
    reset: bool,
    violation: &mut f64,
    global_range: KeyRange,
    task_time: LogicalTime,
) -> bool {
    if segment.find(global_range).is_none() {
        return false;
    }
    if let Some(theta) = kkt_theta {
        segment.installed_kkt_theta = theta;
        *violation = 0.0;
    }
    if reset {
        segment.active.fill_true();
    }

    let round = BlockRound::from_task_time(task_time);
    store.wait(WORKER_GROUP, round.t_push);

    let received = store.received(round.t_push);
    debug_assert_eq!(received.len(), 1, "parameter store must pre-aggregate worker contributions (spec §4.3 step 1)");
    let values = &received[0].values;
    debug_assert_eq!(values.len() % 2, 0);
    let (g, u) = values.split_at(values.len() / 2);
    debug_assert_eq!(g.len(), segment.w.len());

    let installed_kkt_theta = segment.installed_kkt_theta;
    let vio = update_weight(segment, g, u, eta, lambda, installed_kkt_theta);
    *violation = violation.max(vio);

    store.finish(WORKER_GROUP, round.t_finish);
    true
}
