//! Scheduler loop (spec §4.1): emits `UPDATE_MODEL` for every block in
//! order, then a blocking `EVALUATE_PROGRESS`, and evolves the KKT
//! threshold and the reset-filter state from the merged progress.

use crate::config::Config;
use crate::data::{BlockOrder, PartialProgress, Progress};
use crate::protocol::{BlockCmd, LogicalTime, Task, TaskPool};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StopReason {
    /// Two consecutive iterations satisfied `rel <= epsilon`, the second
    /// run with the active-set filter reset (spec §8 property 8).
    Converged,
    MaxPasses,
}

/// Run the full scheduler loop (spec §4.1 steps 1-3).
///
/// `dispatch_update_model` is invoked synchronously right after each
/// `UPDATE_MODEL` task is submitted; a real transport would instead route
/// the task to remote worker/server processes asynchronously, but a
/// single-process driver (`crate::sim`) can simply run the full
/// worker+server pipeline for that block inline before the scheduler
/// moves on (it must still call `finish_incoming_task` itself).
///
/// `collect_progress` is invoked once per iteration immediately after the
/// blocking `EVALUATE_PROGRESS` task completes; it stands in for the
/// "completion callback merges all peer progress" step and must return
/// every worker's and server's [`PartialProgress`] for that iteration.
pub fn run_iteration(
    config: &Config,
    pool: &dyn TaskPool,
    order: &mut BlockOrder,
    rng: &mut rand_xoshiro::Xoshiro256PlusPlus,
    mut dispatch_update_model: impl FnMut(LogicalTime, &BlockCmd),
    mut collect_progress: impl FnMut(u32) -> Vec<PartialProgress>,
) -> (Vec<Progress>, StopReason) {
    let mut kkt_theta = f64::INFINITY;
    let mut reset_filter = false;
    let mut history: Vec<Progress> = Vec::new();
    let tau = config.max_block_delay;

    for iter in 0..config.max_pass_of_data {
        let mut time = pool.time();
        let iteration_order = order.iteration_order(iter, config.random_feature_block_order, rng);

        for (i, &block_idx) in iteration_order.iter().enumerate() {
            let block = order.blocks()[block_idx];
            let wait_time = if iter == 0 && i < order.prior_len() {
                time
            } else {
                time.saturating_sub(tau)
            };
            let (theta, filter_reset) = if i == 0 {
                (Some(kkt_theta), reset_filter)
            } else {
                (None, false)
            };
            let cmd = BlockCmd {
                key_range: block.key_range,
                channel: block.channel,
                feature_group: block.feature_group,
                kkt_theta: theta,
                kkt_filter_reset: filter_reset,
            };
            time = pool.submit(Task::update_model(wait_time, cmd));
            dispatch_update_model(time, &cmd);
        }

        let progress_wait = time.saturating_sub(tau);
        let iter_for_callback = iter;
        pool.submit_and_wait(Task::evaluate_progress(progress_wait), Box::new(move || {}));
        let parts = collect_progress(iter_for_callback);
        let merged = Progress::merge(parts.iter());
        history.push(merged);

        let rel = Progress::relative_objv(&history, iter as usize);
        kkt_theta = merged.violation / config.num_train_instances.max(1) as f64
            * config.kkt_filter_threshold_ratio;

        if rel > 0.0 && rel <= config.epsilon {
            if reset_filter {
                return (history, StopReason::Converged);
            }
            reset_filter = true;
        } else {
            reset_filter = false;
        }
    }

    (history, StopReason::MaxPasses)
}
