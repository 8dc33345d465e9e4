//! Single-process reference driver for `bcd-core`: generates a synthetic
//! dataset, then runs block coordinate descent to convergence over one
//! in-process worker and one in-process server sharing a channel.

mod synthetic;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

use bcd_core::data::{Block, BlockOrder, ChannelSegment, KeyRange, PartialProgress};
use bcd_core::kernel::KernelPool;
use bcd_core::protocol::ParameterStore;
use bcd_core::roles::{self, StopReason, WorkerState};
use bcd_core::sim::{SimParameterStore, SimTaskPool};
use bcd_core::Config;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of sparse features (weight coordinates).
    #[arg(long, default_value_t = 64)]
    num_features: usize,

    /// Number of training instances (rows).
    #[arg(long, default_value_t = 512)]
    num_instances: usize,

    /// Number of contiguous feature blocks the scheduler iterates over.
    #[arg(long, default_value_t = 8)]
    num_blocks: usize,

    /// L1 penalty coefficient.
    #[arg(long, default_value_t = 0.1)]
    lambda: f64,

    /// Learning-rate scale applied to the curvature term.
    #[arg(long, default_value_t = 1.0)]
    eta: f64,

    /// Maximum number of full passes over the block order.
    #[arg(long, default_value_t = 20)]
    max_passes: u32,

    /// Bounded staleness (tau); 0 forces strict in-order execution.
    #[arg(long, default_value_t = 0)]
    tau: u64,

    /// Relative-objective convergence threshold.
    #[arg(long, default_value_t = 1e-4)]
    epsilon: f64,

    /// Thread-pool size used by the numerical kernels.
    #[arg(long, default_value_t = 4)]
    num_threads: usize,

    /// RNG seed for both the dataset and the (optional) block shuffle.
    #[arg(long, default_value_t = 7)]
    seed: u64,

    /// Shuffle block order every iteration instead of a fixed pass order.
    #[arg(long)]
    random_feature_block_order: bool,

    /// Load solver hyperparameters (spec §6) from a TOML file instead of
    /// the flags above; `--num-threads`/`--num-instances` still come from
    /// the CLI either way, since they also size the synthetic dataset.
    #[arg(long)]
    config: Option<std::path::PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading config file {}", path.display()))?;
            toml::from_str(&text).with_context(|| format!("parsing config file {}", path.display()))?
        }
        None => Config {
            lambda: args.lambda,
            eta: args.eta,
            max_pass_of_data: args.max_passes,
            max_block_delay: args.tau,
            epsilon: args.epsilon,
            random_feature_block_order: args.random_feature_block_order,
            ..Config::default()
        },
    };
    // Tied to this driver's own runtime/dataset setup, not the solver's
    // hyperparameters, so the CLI always wins over a loaded config file.
    config.num_threads = args.num_threads;
    config.num_train_instances = args.num_instances;
    config.validate()?;

    let dataset = synthetic::Dataset::generate(args.num_features, args.num_instances, args.seed);
    log::info!(
        "generated synthetic dataset: {} instances x {} features, {} nonzeros",
        dataset.matrix.rows(),
        dataset.matrix.cols(),
        dataset.nnz
    );

    let channel = 0;
    let full_range = KeyRange::new(0, args.num_features as u64);
    let kernel_pool = KernelPool::new(args.num_threads);
    let store = SimParameterStore::new(full_range);
    store.insert_segment(ChannelSegment::new(channel, full_range, config.delta_init_value));
    let task_pool = SimTaskPool::new();

    let worker_state = std::cell::RefCell::new(WorkerState::new(
        channel,
        full_range,
        config.delta_init_value,
        dataset.initial_dual(),
    ));
    let violation_accum = std::cell::Cell::new(0.0f64);

    let num_blocks = args.num_blocks.max(1).min(args.num_features.max(1));
    let blocks = even_blocks(args.num_features, num_blocks, channel);
    let mut order = BlockOrder::new(blocks, Vec::new());
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(args.seed);

    let matrix = Arc::new(dataset.matrix);
    let y = Arc::new(dataset.y);

    let (history, stop_reason) = roles::run_iteration(
        &config,
        &task_pool,
        &mut order,
        &mut rng,
        |assigned_time, cmd| {
            let mut violation = violation_accum.get();
            let mut state = worker_state.borrow_mut();
            worker_role_dispatch(
                &kernel_pool,
                &matrix,
                &y,
                &mut state,
                &store,
                &task_pool,
                &config,
                &mut violation,
                assigned_time,
                cmd,
            );
            drop(state);
            violation_accum.set(violation);
        },
        |_iter| collect_progress(&worker_state.borrow(), &store, channel, violation_accum.get()),
    );

    for (iter, progress) in history.iter().enumerate() {
        log::info!(
            "iter {iter}: objv={:.6} nnz_w={} violation={:.3e} active={}",
            progress.objv,
            progress.nnz_w,
            progress.violation,
            progress.nnz_active_set
        );
    }
    match stop_reason {
        StopReason::Converged => log::info!("converged"),
        StopReason::MaxPasses => log::info!("reached maximal {} data passes", config.max_pass_of_data),
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn worker_role_dispatch(
    kernel_pool: &KernelPool,
    matrix: &bcd_core::data::SparseMatrix,
    y: &[f64],
    worker_state: &mut WorkerState,
    store: &SimParameterStore,
    task_pool: &SimTaskPool,
    config: &Config,
    violation_accum: &mut f64,
    assigned_time: bcd_core::protocol::LogicalTime,
    cmd: &bcd_core::protocol::BlockCmd,
) {
    let channel = cmd.channel;
    let kkt_theta = cmd.kkt_theta;
    let reset = cmd.kkt_filter_reset;
    let range = cmd.key_range;
    let config_eta = config.eta;
    let config_lambda = config.lambda;

    roles::worker_handle_update_model(
        kernel_pool,
        matrix,
        y,
        worker_state,
        store,
        task_pool,
        0,
        assigned_time,
        range,
        reset,
        || {
            store.with_segment_mut(channel, |segment| {
                roles::server_handle_update_model(
                    segment,
                    store,
                    config_eta,
                    config_lambda,
                    kkt_theta,
                    reset,
                    violation_accum,
                    range,
                    assigned_time,
                );
            });
        },
    );
}

fn collect_progress(worker: &WorkerState, store: &SimParameterStore, channel: u32, violation: f64) -> Vec<PartialProgress> {
    let worker_objv: f64 = worker.dual.iter().map(|d| (1.0 + 1.0 / d).ln()).sum();
    let weights = store.value(channel);
    let nnz_w = weights.iter().filter(|w| **w != 0.0 && !w.is_nan()).count() as u64;
    let objv = weights.iter().filter(|w| !w.is_nan()).map(|w| w.abs()).sum::<f64>();
    let nnz_active_set = store.with_segment_mut(channel, |segment| segment.active.count() as u64).unwrap_or(0);
    vec![
        PartialProgress {
            objv: worker_objv,
            busy_time: worker.busy_time,
            ..Default::default()
        },
        PartialProgress {
            objv,
            nnz_w,
            violation,
            nnz_active_set,
            ..Default::default()
        },
    ]
}

fn even_blocks(num_features: usize, num_blocks: usize, channel: u32) -> Vec<Block> {
    let chunk = num_features.div_ceil(num_blocks);
    (0..num_blocks)
        .filter_map(|i| {
            let start = i * chunk;
            let end = (start + chunk).min(num_features);
            if start >= end {
                return None;
            }
            Some(Block {
                feature_group: i as u32,
                channel,
                key_range: KeyRange::new(start as u64, end as u64),
            })
        })
        .collect()
}
