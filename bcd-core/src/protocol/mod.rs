//! Logical time, task/message shapes, and the `TaskPool` / `ParameterStore`
//! contracts (spec §6 "External Interfaces"). RPC transport and message
//! framing are out of scope (spec §1); these are the named contracts a
//! real transport implements. `crate::sim` provides one in-process
//! reference implementation.

pub mod message;
pub mod store;
pub mod task;
pub mod time;

pub use message::{Message, PullMsg, PushMsg};
pub use store::{ParameterStore, Received};
pub use task::{BlockCmd, Task, TaskKind, TaskPool};
pub use time::{BlockRound, LogicalTime, KPACE};
