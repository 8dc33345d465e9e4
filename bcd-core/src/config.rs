//! Recognized configuration options (spec §6) and fail-fast validation.
//!
//! Mirrors the teacher's preference for a single immutable configuration
//! object handed to the roles at construction instead of ambient globals:
//! thread-pool size lives here as a field, not a `static`/env-var lookup.

use serde::Deserialize;

use crate::error::ConfigError;

/// Loss function. The core only ever implements `Logit`; the field exists
/// so a malformed config is rejected with a specific error instead of
/// silently assuming logistic loss.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum LossType {
    #[default]
    Logit,
}

/// Regularization penalty. Only `L1` is implemented.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum PenaltyType {
    #[default]
    L1,
}

/// All options named in spec §6 "Configuration".
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    pub loss_type: LossType,
    pub penalty_type: PenaltyType,
    /// `penalty.lambda` — L1 coefficient.
    pub lambda: f64,
    /// `learning_rate.eta`.
    pub eta: f64,
    /// `block_solver.max_pass_of_data`.
    pub max_pass_of_data: u32,
    /// `block_solver.max_block_delay` (τ).
    pub max_block_delay: u64,
    /// `block_solver.epsilon`.
    pub epsilon: f64,
    /// `block_solver.random_feature_block_order`.
    pub random_feature_block_order: bool,
    /// `bcd_l1lr.delta_init_value` (δ₀).
    pub delta_init_value: f64,
    /// `bcd_l1lr.kkt_filter_threshold_ratio`.
    pub kkt_filter_threshold_ratio: f64,
    /// Thread-pool size used by the numerical kernels.
    pub num_threads: usize,
    /// `m` in `KKTθ = violation / m · ratio` (spec §4.1e) — the training
    /// set's instance count. Not a wire option in spec §6; derived from
    /// the loaded dataset and carried here so the scheduler stays a pure
    /// function of `Config` (Design Notes §9 "no process-wide mutable
    /// singletons").
    pub num_train_instances: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            loss_type: LossType::Logit,
            penalty_type: PenaltyType::L1,
            lambda: 0.1,
            eta: 1.0,
            max_pass_of_data: 20,
            max_block_delay: 0,
            epsilon: 1e-4,
            random_feature_block_order: false,
            delta_init_value: 1.0,
            kkt_filter_threshold_ratio: 1.0,
            num_threads: 1,
            num_train_instances: 1,
        }
    }
}

impl Config {
    /// Configuration-fatal checks from spec §7. Call once at construction;
    /// everything downstream assumes a validated config.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.loss_type != LossType::Logit {
            return Err(ConfigError::UnsupportedLoss);
        }
        if self.penalty_type != PenaltyType::L1 {
            return Err(ConfigError::UnsupportedPenalty);
        }
        if self.num_threads == 0 {
            return Err(ConfigError::InvalidThreadCount);
        }
        if self.max_pass_of_data == 0 {
            return Err(ConfigError::InvalidMaxPasses);
        }
        Ok(())
    }
}
