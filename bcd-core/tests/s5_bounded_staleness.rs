//! S5 / spec §8 property 5 (bounded staleness): a task's `wait_time`
//! gates admission until every earlier timestamp has finished. This
//! exercises `SimTaskPool` directly with a real blocked thread, since
//! that is where the staleness bound is enforced (spec §5).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use bcd_core::data::KeyRange;
use bcd_core::protocol::{BlockCmd, Task, TaskPool};
use bcd_core::sim::SimTaskPool;

fn cmd() -> BlockCmd {
    BlockCmd {
        key_range: KeyRange::new(0, 1),
        channel: 0,
        feature_group: 0,
        kkt_theta: None,
        kkt_filter_reset: false,
    }
}

#[test]
fn submit_blocks_until_its_staleness_bound_is_satisfied() {
    let pool = Arc::new(SimTaskPool::new());

    // Reserve timestamps 0, 1, 2 without finishing any of them yet.
    let t0 = pool.submit(Task::update_model(0, cmd()));
    let t1 = pool.submit(Task::update_model(t0, cmd()));
    let t2 = pool.submit(Task::update_model(t1, cmd()));
    assert_eq!((t0, t1, t2), (0, 1, 2));

    let admitted = Arc::new(AtomicBool::new(false));
    let pool_bg = Arc::clone(&pool);
    let admitted_bg = Arc::clone(&admitted);
    let waiter = thread::spawn(move || {
        // wait_time = t2: may begin only once 0..=2 have all finished.
        let assigned = pool_bg.submit(Task::update_model(t2, cmd()));
        admitted_bg.store(true, Ordering::SeqCst);
        assigned
    });

    thread::sleep(Duration::from_millis(100));
    assert!(!admitted.load(Ordering::SeqCst), "submit must not return before its staleness bound is satisfied");

    pool.finish_incoming_task(t0);
    pool.finish_incoming_task(t1);
    thread::sleep(Duration::from_millis(100));
    assert!(!admitted.load(Ordering::SeqCst), "one still-outstanding dependency must keep gating admission");

    pool.finish_incoming_task(t2);
    let assigned = waiter.join().unwrap();
    assert_eq!(assigned, 3);
    assert!(admitted.load(Ordering::SeqCst));
}

#[test]
fn zero_wait_time_admits_immediately_regardless_of_outstanding_work() {
    let pool = SimTaskPool::new();
    let t0 = pool.submit(Task::update_model(0, cmd()));
    // Never finished -- a wait_time of 0 must not gate on it.
    let t1 = pool.submit(Task::update_model(0, cmd()));
    assert_eq!((t0, t1), (0, 1));
}
