//! S2 (spec §8): same layout as S1 but both nonzero rows share the
//! positive label, so the KKT condition at zero is violated and the
//! weight should move strictly off zero, respecting the trust region.

use bcd_core::data::{ChannelSegment, KeyRange, SparseMatrix};
use bcd_core::kernel::KernelPool;
use bcd_core::protocol::{BlockCmd, ParameterStore, Task, TaskPool};
use bcd_core::roles::{server_handle_update_model, worker_handle_update_model, WorkerState};
use bcd_core::sim::{SimParameterStore, SimTaskPool};

#[allow(clippy::too_many_arguments)]
fn run_block(
    kernel_pool: &KernelPool,
    matrix: &SparseMatrix,
    y: &[f64],
    state: &mut WorkerState,
    store: &SimParameterStore,
    task_pool: &SimTaskPool,
    channel: u32,
    range: KeyRange,
    eta: f64,
    lambda: f64,
    kkt_theta: Option<f64>,
    reset: bool,
    violation: &mut f64,
) {
    let cmd = BlockCmd {
        key_range: range,
        channel,
        feature_group: 0,
        kkt_theta,
        kkt_filter_reset: reset,
    };
    let assigned = task_pool.submit(Task::update_model(0, cmd));
    worker_handle_update_model(kernel_pool, matrix, y, state, store, task_pool, 0, assigned, range, reset, || {
        store.with_segment_mut(channel, |segment| {
            server_handle_update_model(segment, store, eta, lambda, kkt_theta, reset, violation, range, assigned);
        });
    });
}

#[test]
fn weight_moves_off_zero_within_trust_region() {
    let channel = 0u32;
    let range = KeyRange::new(0, 1);
    // m=4, y=[+1,+1,+1,-1], single binary column nonzero at rows {0,2}
    // (both labelled +1): g+ < 0 at w=0, so the KKT condition is violated.
    let matrix = SparseMatrix::from_binary_columns(4, vec![vec![0, 2]]);
    let y = [1.0, 1.0, 1.0, -1.0];
    let lambda = 0.1;
    let eta = 1.0;
    let delta_init = 1.0;

    let kernel_pool = KernelPool::new(1);
    let store = SimParameterStore::new(range);
    store.insert_segment(ChannelSegment::new(channel, range, delta_init));
    let task_pool = SimTaskPool::new();
    let mut state = WorkerState::new(channel, range, delta_init, vec![1.0; 4]);
    let mut violation = 0.0;

    run_block(&kernel_pool, &matrix, &y, &mut state, &store, &task_pool, channel, range, eta, lambda, None, false, &mut violation);

    let w = store.value(channel)[0];
    assert!(w > 0.0, "expected w[0] to move strictly positive, got {w}");
    assert!(violation > 0.0);
    // I4 / spec §8 property 4: the applied step never exceeds the prior
    // trust region, and the region at least doubles the applied step.
    let applied_step = w; // w started at 0
    assert!(applied_step <= delta_init + 1e-12);
    let delta_after = store.with_segment_mut(channel, |segment| segment.delta[0]).unwrap();
    assert!(delta_after >= 2.0 * applied_step - 1e-12);
}
