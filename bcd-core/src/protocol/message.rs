//! Wire message shapes exchanged with a `ParameterStore` (spec §6
//! "Messaging"). Framing and transport are out of scope (spec §1); these
//! are the fields a real transport must carry.

use crate::data::{ChannelId, KeyRange};

use super::time::LogicalTime;

/// A completion callback a transport invokes once a message has been
/// fully processed by its recipient.
pub type FinHandle = Box<dyn FnOnce() + Send>;

/// Common envelope fields carried by every message (spec §6). Keys are
/// addressed as a contiguous [`KeyRange`] throughout this crate rather
/// than an arbitrary list, since every block the scheduler ever emits is
/// itself a contiguous range (spec §3 `BlockOrder`).
pub struct Message {
    pub sender: u32,
    pub time: LogicalTime,
    pub key_range: KeyRange,
    pub fin_handle: Option<FinHandle>,
}

impl Message {
    pub fn new(sender: u32, time: LogicalTime, key_range: KeyRange) -> Self {
        Self {
            sender,
            time,
            key_range,
            fin_handle: None,
        }
    }

    pub fn finish(self) {
        if let Some(fin) = self.fin_handle {
            fin();
        }
    }
}

/// A worker's push of freshly computed values for one channel
/// (spec §4.2 step 3, §4.5 step producing `d_delta`/gradients).
pub struct PushMsg {
    pub envelope: Message,
    pub channel: ChannelId,
    pub values: Vec<f64>,
}

/// A pull request for the current value of a channel over a key-range
/// (spec §4.2 step 1 and step 6).
pub struct PullMsg {
    pub envelope: Message,
    pub channel: ChannelId,
}
