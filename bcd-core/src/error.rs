//! Error taxonomy (spec §7): configuration-fatal vs. invariant-violation.
//!
//! Kernels themselves never return errors — they assert (spec §7) — so
//! there is no `KernelError`. Both variants here are meant to abort a run;
//! neither is retried by this crate.

use thiserror::Error;

/// Rejected at construction time, before any block is ever dispatched.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum ConfigError {
    #[error("only the logistic loss is supported by this solver")]
    UnsupportedLoss,
    #[error("only the L1 penalty is supported by this solver")]
    UnsupportedPenalty,
    #[error("num_threads must be at least 1")]
    InvalidThreadCount,
    #[error("max_pass_of_data must be at least 1")]
    InvalidMaxPasses,
}

/// A protocol/programming-error condition (spec §7): fatal, never a
/// transient condition to retry.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("server received {got} contributions for block at time {time}, expected {expected}")]
    WrongContributionCount {
        time: u64,
        expected: usize,
        got: usize,
    },
    #[error("segment position mismatch: expected {expected:?}, got {got:?}")]
    SegPosMismatch {
        expected: std::ops::Range<usize>,
        got: std::ops::Range<usize>,
    },
    #[error("no worker contribution for channel {channel} at time {time}")]
    MissingContribution { channel: u32, time: u64 },
    #[error("logical time moved backwards for {role}: {prev} -> {next}")]
    TimeNotMonotonic {
        role: &'static str,
        prev: u64,
        next: u64,
    },
    #[error("received a push for an unknown channel {0}")]
    UnknownChannel(u32),
}
