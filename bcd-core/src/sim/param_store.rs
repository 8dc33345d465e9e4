//! In-process `ParameterStore`: one authoritative [`ChannelSegment`] per
//! channel behind a mutex, with a time-keyed mailbox standing in for the
//! wire (spec §6, §9.3).
//!
//! Segments and the mailbox sit behind separate mutexes rather than one
//! shared lock: the server-side handler runs through
//! [`SimParameterStore::with_segment_mut`] while holding the segments
//! lock, and from inside that closure it still calls back into
//! `wait`/`received`/`finish`, which only ever touch the mailbox.
//! `std::sync::Mutex` is not reentrant, so sharing one lock across both
//! would deadlock the single-process driver on every block.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::data::{ChannelId, ChannelSegment, KeyRange};
use crate::protocol::{LogicalTime, ParameterStore, PullMsg, PushMsg, Received};

/// A reference parameter store authoritative over `my_range` for every
/// channel registered with it.
pub struct SimParameterStore {
    segments: Mutex<HashMap<ChannelId, ChannelSegment>>,
    mailbox: Mutex<HashMap<LogicalTime, Vec<Received>>>,
    my_range: KeyRange,
}

impl SimParameterStore {
    pub fn new(my_range: KeyRange) -> Self {
        Self {
            segments: Mutex::new(HashMap::new()),
            mailbox: Mutex::new(HashMap::new()),
            my_range,
        }
    }

    /// Register a channel's authoritative segment (test/setup helper; a
    /// real store would populate this from a partitioning scheme).
    pub fn insert_segment(&self, segment: ChannelSegment) {
        self.segments.lock().unwrap().insert(segment.channel, segment);
    }

    /// Run `f` against the live segment for `channel` (used by the
    /// server-side handler, which needs `&mut ChannelSegment` rather than
    /// a value-typed view through the trait). `f` may freely call back
    /// into this store's `wait`/`received`/`finish`/`push`/`pull` — those
    /// only ever touch the mailbox lock, never this one.
    pub fn with_segment_mut<R>(&self, channel: ChannelId, f: impl FnOnce(&mut ChannelSegment) -> R) -> Option<R> {
        let mut guard = self.segments.lock().unwrap();
        guard.get_mut(&channel).map(f)
    }
}

impl ParameterStore for SimParameterStore {
    fn find(&self, channel: ChannelId, global_range: KeyRange) -> Option<KeyRange> {
        let guard = self.segments.lock().unwrap();
        guard.get(&channel).and_then(|seg| seg.find(global_range))
    }

    fn push(&self, msg: PushMsg) -> LogicalTime {
        let time = msg.envelope.time;
        let mut guard = self.mailbox.lock().unwrap();
        let bucket = guard.entry(time).or_default();
        match bucket.first_mut() {
            Some(existing) => {
                debug_assert_eq!(existing.values.len(), msg.values.len(), "push size mismatch at time {time} (spec §7 invariant-violation)");
                for (a, b) in existing.values.iter_mut().zip(&msg.values) {
                    *a += b;
                }
            }
            None => bucket.push(Received { seg_pos: 0, values: msg.values }),
        }
        drop(guard);
        msg.envelope.finish();
        time
    }

    fn pull(&self, msg: PullMsg) -> LogicalTime {
        let time = msg.envelope.time;
        let values = {
            let guard = self.segments.lock().unwrap();
            let seg = guard
                .get(&msg.channel)
                .expect("pull for unregistered channel (spec §7 invariant-violation)");
            let start = seg.local_of(msg.envelope.key_range.start);
            seg.w[start..start + msg.envelope.key_range.len()].to_vec()
        };
        self.mailbox.lock().unwrap().entry(time).or_default().push(Received { seg_pos: 0, values });
        msg.envelope.finish();
        time
    }

    fn wait(&self, _group: u32, time: LogicalTime) {
        debug_assert!(
            self.mailbox.lock().unwrap().contains_key(&time),
            "wait({time}) called before any contribution arrived — sim runner ordering bug"
        );
    }

    fn finish(&self, _group: u32, _time: LogicalTime) {}

    fn received(&self, time: LogicalTime) -> Vec<Received> {
        self.mailbox.lock().unwrap().remove(&time).unwrap_or_default()
    }

    fn value(&self, channel: ChannelId) -> Vec<f64> {
        self.segments.lock().unwrap().get(&channel).map(|s| s.w.clone()).unwrap_or_default()
    }

    fn key(&self, channel: ChannelId) -> KeyRange {
        self.segments.lock().unwrap().get(&channel).map(|s| s.range).unwrap_or(self.my_range)
    }

    fn my_key_range(&self) -> KeyRange {
        self.my_range
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pushes_to_the_same_time_sum() {
        let store = SimParameterStore::new(KeyRange::new(0, 4));
        store.insert_segment(ChannelSegment::new(0, KeyRange::new(0, 4), 1.0));
        let msg_a = PushMsg {
            envelope: crate::protocol::message::Message::new(1, 5, KeyRange::new(0, 2)),
            channel: 0,
            values: vec![1.0, 2.0],
        };
        let msg_b = PushMsg {
            envelope: crate::protocol::message::Message::new(2, 5, KeyRange::new(0, 2)),
            channel: 0,
            values: vec![10.0, 20.0],
        };
        store.push(msg_a);
        store.push(msg_b);
        let received = store.received(5);
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].values, vec![11.0, 22.0]);
    }

    #[test]
    fn pull_reads_current_segment_slice() {
        let store = SimParameterStore::new(KeyRange::new(0, 4));
        let mut seg = ChannelSegment::new(0, KeyRange::new(0, 4), 1.0);
        seg.w[1] = 9.0;
        store.insert_segment(seg);
        let msg = PullMsg {
            envelope: crate::protocol::message::Message::new(1, 7, KeyRange::new(1, 3)),
            channel: 0,
        };
        store.pull(msg);
        let received = store.received(7);
        assert_eq!(received[0].values, vec![9.0, 0.0]);
    }
}
