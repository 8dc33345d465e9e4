//! The three numerical kernels (spec §4.4-§4.6) and the thread pool they
//! partition work across (spec §5 "Concurrency & Resource Model").
//!
//! Kernels return no errors: malformed input is a programming error and
//! is asserted against, never propagated (spec §7).

pub mod dual;
pub mod gradient;
pub mod pool;
pub mod weight;

pub use dual::update_dual;
pub use gradient::compute_gradients;
pub use pool::KernelPool;
pub use weight::update_weight;

/// `kInactiveValue` (spec §3, §4.4, §7): the in-band NaN sentinel meaning
/// "coordinate inactivated", not a numerical error.
pub const INACTIVE: f64 = f64::NAN;

#[inline]
pub fn is_inactive(value: f64) -> bool {
    value.is_nan()
}
