//! `ParameterStore` contract: the weight-channel manager collaborator
//! (spec §6). `crate::sim` provides one in-process implementation; a real
//! deployment backs this with a transport to remote servers.

use crate::data::{ChannelId, KeyRange};

use super::message::{PullMsg, PushMsg};
use super::time::LogicalTime;

/// One received contribution: `seg_pos` is the local offset within the
/// caller's segment the values start at (spec §7 "mismatched seg_pos" is
/// an invariant-violation, not a recoverable condition).
pub struct Received {
    pub seg_pos: usize,
    pub values: Vec<f64>,
}

pub trait ParameterStore: Send + Sync {
    /// Intersect `global_range` with the local key map of `channel`,
    /// returning the local column-range (`seg_pos`) to operate on (spec
    /// §6 `find`, §4.2 step 3).
    fn find(&self, channel: ChannelId, global_range: KeyRange) -> Option<KeyRange>;

    fn push(&self, msg: PushMsg) -> LogicalTime;

    fn pull(&self, msg: PullMsg) -> LogicalTime;

    /// Block until every expected push/pull in `group` tagged with `time`
    /// has arrived (spec §4.2/§4.3 synchronization points).
    fn wait(&self, group: u32, time: LogicalTime);

    /// Mark `group`'s work for `time` complete, releasing any waiter
    /// blocked in `wait` (spec §6 `finish(group, time+1)`).
    fn finish(&self, group: u32, time: LogicalTime);

    /// Drain everything received for `time`, one entry per sender
    /// (spec §6 `received(time)`).
    fn received(&self, time: LogicalTime) -> Vec<Received>;

    fn value(&self, channel: ChannelId) -> Vec<f64>;

    fn key(&self, channel: ChannelId) -> KeyRange;

    /// The key-range this store instance is authoritative for (spec §6
    /// `myKeyRange()`).
    fn my_key_range(&self) -> KeyRange;
}
