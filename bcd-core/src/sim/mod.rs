//! Reference, in-process `TaskPool`/`ParameterStore` implementation (spec
//! §6, SPEC_FULL.md §9.3) so `crate::roles` can run end to end without a
//! real cluster transport. Intended for tests and the `bcd-sim` binary,
//! not as a deployable parameter server.
//!
//! Simplifications relative to a real transport, recorded here rather
//! than scattered as inline caveats:
//! - A single process plays every worker and every server; there is no
//!   network, so `push`/`pull`/`wait`/`finish` all execute synchronously
//!   on the caller's thread instead of blocking on messages in flight.
//! - `ParameterStore::push` sums contributions landing on the same
//!   logical time into one bucket, standing in for the real store's
//!   per-key commutative aggregation (spec §8 property 7).

pub mod param_store;
pub mod task_pool;

pub use param_store::SimParameterStore;
pub use task_pool::SimTaskPool;
