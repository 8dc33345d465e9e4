//! The scheduler loop (spec §4.1) and the worker/server `UPDATE_MODEL`
//! handlers (spec §4.2, §4.3) that drive the kernels through the
//! `TaskPool`/`ParameterStore` contracts.

pub mod scheduler;
pub mod server;
pub mod worker;

pub use scheduler::{run_iteration, StopReason};
pub use server::handle_update_model as server_handle_update_model;
pub use worker::{handle_update_model as worker_handle_update_model, WorkerState};

/// Group id workers contribute gradients under (spec §4.3 `wait(group, time)`).
pub const WORKER_GROUP: u32 = 0;
/// Group id the scheduler uses to submit blocking progress evaluation.
pub const SCHEDULER_GROUP: u32 = 1;
