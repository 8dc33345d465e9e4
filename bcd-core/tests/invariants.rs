//! Properties from spec §8 that aren't tied to one specific end-to-end
//! scenario: gradient-aggregation commutativity (property 7), the
//! inactive-sentinel round-trip leaving the dual untouched (property 1),
//! active-set monotonicity under a fixed filter (property 2), and the
//! scheduler's max-passes stop path (property 8).

use std::cell::{Cell, RefCell};

use bcd_core::data::{Block, BlockOrder, ChannelSegment, KeyRange, PartialProgress, SparseMatrix};
use bcd_core::kernel::dual::reconcile_weights;
use bcd_core::kernel::{update_dual, update_weight, KernelPool};
use bcd_core::protocol::message::Message;
use bcd_core::protocol::{ParameterStore, PullMsg, PushMsg};
use bcd_core::roles::{self, StopReason, WorkerState};
use bcd_core::sim::{SimParameterStore, SimTaskPool};
use bcd_core::Config;

#[test]
fn gradient_push_aggregation_is_commutative() {
    let range = KeyRange::new(0, 2);
    let build = |order: [(u32, Vec<f64>); 2]| {
        let store = SimParameterStore::new(range);
        store.insert_segment(ChannelSegment::new(0, range, 1.0));
        for (sender, values) in order {
            store.push(PushMsg {
                envelope: Message::new(sender, 9, range),
                channel: 0,
                values,
            });
        }
        store.received(9)
    };

    let forward = build([(0, vec![1.0, 2.0]), (1, vec![10.0, 20.0])]);
    let backward = build([(1, vec![10.0, 20.0]), (0, vec![1.0, 2.0])]);

    assert_eq!(forward.len(), 1);
    assert_eq!(backward.len(), 1);
    assert_eq!(forward[0].values, backward[0].values);
}

#[test]
fn pull_after_push_does_not_disturb_the_aggregated_push_bucket() {
    // Sanity check that push/pull land in separate mailbox buckets keyed
    // by their own reserved timestamps, so aggregation order is the only
    // thing property 7 needs to hold over.
    let range = KeyRange::new(0, 1);
    let store = SimParameterStore::new(range);
    store.insert_segment(ChannelSegment::new(0, range, 1.0));
    store.push(PushMsg {
        envelope: Message::new(0, 3, range),
        channel: 0,
        values: vec![5.0],
    });
    store.pull(PullMsg {
        envelope: Message::new(0, 5, range),
        channel: 0,
    });
    assert_eq!(store.received(3)[0].values, vec![5.0]);
}

#[test]
fn inactivated_coordinate_leaves_dual_untouched_for_its_rows() {
    // Coordinate 0 covers rows {0, 1}; coordinate 1 (untouched here)
    // would cover row 2. The server sends NaN for coordinate 0.
    let mut mirror = bcd_core::data::WorkerMirror::new(0, KeyRange::new(0, 2), 1.0);
    let mut last_seen_w = vec![0.3, 0.0];
    let delta_w = reconcile_weights(&mut mirror, &mut last_seen_w, 0..2, &[f64::NAN, 0.4]);
    assert!(!mirror.active.test(0));
    assert_eq!(last_seen_w[0], 0.0);

    let matrix = SparseMatrix::from_binary_columns(3, vec![vec![0, 1], vec![2]]);
    let y = [1.0, -1.0, 1.0];
    let mut dual = [2.0, 3.0, 5.0];
    let pool = KernelPool::new(1);
    update_dual(&pool, &matrix, &y, &mut dual, &mirror.active, 0..2, &delta_w);

    // Rows 0 and 1 (owned only by the inactivated coordinate) must be
    // bit-for-bit unchanged; row 2 (owned by the untouched, active
    // coordinate with nonzero delta_w) does change.
    assert_eq!(dual[0], 2.0);
    assert_eq!(dual[1], 3.0);
    assert!((dual[2] - 5.0 * (1.0f64 * 0.4).exp()).abs() < 1e-12);
}

#[test]
fn active_set_is_non_increasing_across_blocks_with_no_reset() {
    let mut seg = ChannelSegment::new(0, KeyRange::new(0, 2), 1.0);
    let mut violation = 0.0;
    // First block: a tight filter clears coordinate 0 (zero gradient,
    // zero curvature, kkt_theta below lambda).
    let before = seg.active.count();
    update_weight(&mut seg, &[0.0, -5.0], &[0.0, 1.0], 1.0, 0.1, 0.01);
    let after_first = seg.active.count();
    assert!(after_first <= before);
    assert!(!seg.active.test(0));

    // Second block, same (no reset) filter: coordinate 0 is fed the
    // inactive sentinel by the gradient kernel in real use; here we pass
    // NaN directly to mimic that and confirm the count cannot grow back.
    update_weight(&mut seg, &[f64::NAN, -5.0], &[f64::NAN, 1.0], 1.0, 0.1, 0.01);
    let after_second = seg.active.count();
    assert!(after_second <= after_first);
}

#[test]
fn scheduler_runs_to_max_passes_when_epsilon_is_unreachable() {
    let config = Config {
        lambda: 0.1,
        eta: 1.0,
        max_pass_of_data: 3,
        max_block_delay: 0,
        epsilon: 0.0, // rel > 0.0 && rel <= 0.0 can never hold: never converges.
        num_train_instances: 4,
        ..Config::default()
    };
    config.validate().expect("constructed config must be valid");

    let channel = 0u32;
    let range = KeyRange::new(0, 2);
    let kernel_pool = KernelPool::new(1);
    let store = SimParameterStore::new(range);
    store.insert_segment(ChannelSegment::new(channel, range, config.delta_init_value));
    let task_pool = SimTaskPool::new();

    let matrix = SparseMatrix::from_binary_columns(4, vec![vec![0, 2], vec![1, 3]]);
    let y = [1.0, -1.0, 1.0, -1.0];

    let worker_state = RefCell::new(WorkerState::new(channel, range, config.delta_init_value, vec![1.0; 4]));
    let violation_accum = Cell::new(0.0f64);

    let mut order = BlockOrder::new(
        vec![Block {
            feature_group: 0,
            channel,
            key_range: range,
        }],
        Vec::new(),
    );
    let mut rng = BlockOrder::rng_from_seed(1);

    let (history, stop_reason) = roles::run_iteration(
        &config,
        &task_pool,
        &mut order,
        &mut rng,
        |assigned_time, cmd| {
            let mut violation = violation_accum.get();
            let mut state = worker_state.borrow_mut();
            roles::worker_handle_update_model(
                &kernel_pool,
                &matrix,
                &y,
                &mut state,
                &store,
                &task_pool,
                0,
                assigned_time,
                cmd.key_range,
                cmd.kkt_filter_reset,
                || {
                    store.with_segment_mut(channel, |segment| {
                        roles::server_handle_update_model(
                            segment,
                            &store,
                            config.eta,
                            config.lambda,
                            cmd.kkt_theta,
                            cmd.kkt_filter_reset,
                            &mut violation,
                            cmd.key_range,
                            assigned_time,
                        );
                    });
                },
            );
            drop(state);
            violation_accum.set(violation);
        },
        |_iter| {
            let worker = worker_state.borrow();
            let worker_objv: f64 = worker.dual.iter().map(|d| (1.0 + 1.0 / d).ln()).sum();
            let weights = store.value(channel);
            let nnz_w = weights.iter().filter(|w| **w != 0.0 && !w.is_nan()).count() as u64;
            let objv = weights.iter().filter(|w| !w.is_nan()).map(|w| w.abs()).sum::<f64>();
            vec![
                PartialProgress {
                    objv: worker_objv,
                    busy_time: worker.busy_time,
                    ..Default::default()
                },
                PartialProgress {
                    objv,
                    nnz_w,
                    violation: violation_accum.get(),
                    ..Default::default()
                },
            ]
        },
    );

    assert_eq!(stop_reason, StopReason::MaxPasses);
    assert_eq!(history.len(), config.max_pass_of_data as usize);
}
