//! In-process `TaskPool`: a monotonic counter plus a finished-task set,
//! admission-gated by each task's `wait_time` (spec §5 bounded staleness).

use std::collections::HashSet;
use std::sync::{Condvar, Mutex};

use crate::protocol::{LogicalTime, Task, TaskKind, TaskPool};

struct Inner {
    next_time: LogicalTime,
    finished: HashSet<LogicalTime>,
}

pub struct SimTaskPool {
    inner: Mutex<Inner>,
    cv: Condvar,
}

impl SimTaskPool {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                next_time: 0,
                finished: HashSet::new(),
            }),
            cv: Condvar::new(),
        }
    }

    /// Block until every task timestamped `<= wait_time` has finished
    /// (spec §5: "a task ... may begin once every earlier task with time
    /// <= wait_time has finished").
    fn admit(&self, wait_time: LogicalTime) {
        let mut guard = self.inner.lock().unwrap();
        while !(0..=wait_time).all(|t| guard.finished.contains(&t)) && wait_time > 0 {
            guard = self.cv.wait(guard).unwrap();
        }
    }
}

impl Default for SimTaskPool {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskPool for SimTaskPool {
    fn time(&self) -> LogicalTime {
        self.inner.lock().unwrap().next_time
    }

    fn submit(&self, task: Task) -> LogicalTime {
        self.admit(task.wait_time);
        let mut guard = self.inner.lock().unwrap();
        let assigned = guard.next_time;
        guard.next_time += 1;
        assigned
    }

    fn submit_and_wait(&self, task: Task, on_complete: Box<dyn FnOnce() + Send>) -> LogicalTime {
        debug_assert_eq!(task.kind, TaskKind::EvaluateProgress);
        let assigned = self.submit(task);
        // Single-process sim: by the time submit() returns, every earlier
        // task has already run synchronously, so the round is complete.
        self.finish_incoming_task(assigned);
        on_complete();
        assigned
    }

    fn finish_incoming_task(&self, time: LogicalTime) {
        let mut guard = self.inner.lock().unwrap();
        guard.finished.insert(time);
        drop(guard);
        self.cv.notify_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::KeyRange;
    use crate::protocol::BlockCmd;

    fn dummy_cmd() -> BlockCmd {
        BlockCmd {
            key_range: KeyRange::new(0, 1),
            channel: 0,
            feature_group: 0,
            kkt_theta: None,
            kkt_filter_reset: false,
        }
    }

    #[test]
    fn submit_assigns_increasing_times() {
        let pool = SimTaskPool::new();
        let t0 = pool.submit(Task::update_model(0, dummy_cmd()));
        let t1 = pool.submit(Task::update_model(t0, dummy_cmd()));
        assert!(t1 > t0);
    }

    #[test]
    fn zero_wait_time_never_blocks() {
        let pool = SimTaskPool::new();
        let t0 = pool.submit(Task::update_model(0, dummy_cmd()));
        assert_eq!(t0, 0);
    }
}
