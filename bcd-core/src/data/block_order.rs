//! Block layout and the scheduler's permutation over it (spec §3
//! `BlockOrder`, §4.1 steps a-b).

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_xoshiro::Xoshiro256PlusPlus;

use super::{ChannelId, KeyRange};

/// One schedulable unit: a feature-group id (used for display/telemetry
/// only), the weight channel it maps to, and the global key-range it
/// covers.
#[derive(Clone, Copy, Debug)]
pub struct Block {
    pub feature_group: u32,
    pub channel: ChannelId,
    pub key_range: KeyRange,
}

/// A permutation of `{0..B-1}` plus an optional densest-blocks-first
/// prefix used only on the first iteration (spec §3, §4.1b).
#[derive(Clone, Debug)]
pub struct BlockOrder {
    blocks: Vec<Block>,
    /// Indices into `blocks`, prepended to iteration 0's order only.
    prior_order: Vec<usize>,
    order: Vec<usize>,
}

impl BlockOrder {
    pub fn new(blocks: Vec<Block>, prior_order: Vec<usize>) -> Self {
        let order: Vec<usize> = (0..blocks.len()).collect();
        Self {
            blocks,
            prior_order,
            order,
        }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn prior_len(&self) -> usize {
        self.prior_order.len()
    }

    /// The order for one iteration: optionally reshuffled, with the prior
    /// prefix prepended only when `iter == 0` (spec §4.1a-b).
    pub fn iteration_order(&mut self, iter: u32, random: bool, rng: &mut Xoshiro256PlusPlus) -> Vec<usize> {
        if random {
            self.order.shuffle(rng);
        }
        if iter == 0 && !self.prior_order.is_empty() {
            let mut out = Vec::with_capacity(self.prior_order.len() + self.order.len());
            out.extend_from_slice(&self.prior_order);
            out.extend_from_slice(&self.order);
            out
        } else {
            self.order.clone()
        }
    }

    pub fn rng_from_seed(seed: u64) -> Xoshiro256PlusPlus {
        Xoshiro256PlusPlus::seed_from_u64(seed)
    }
}
