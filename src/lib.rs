//! Lazy boundary-interval arithmetic over real numbers.
//!
//! A number is represented by a shrinking interval of exact decimal
//! approximations that is narrowed on demand; arithmetic and comparison are
//! interval arithmetic composed lazily over shared operand graphs. Nothing is
//! computed until bounds, an approximation, or a comparison is requested, and
//! no more digits are produced than the requested precision needs.

#![warn(
    clippy::shadow_reuse,
    clippy::shadow_same,
    clippy::shadow_unrelated,
    clippy::dbg_macro,
    clippy::expect_used,
    clippy::panic,
    clippy::print_stderr,
    clippy::print_stdout,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used
)]

mod bounds;
mod decimal;
mod error;
mod node;
mod ops;
mod precision;
mod real;
mod refinement;

pub use bounds::Bounds;
pub use decimal::{Decimal, Exponent, Rounding, RADIX};
pub use error::RealError;
pub use node::{DigitGenerator, GeneratedDigits};
pub use ops::Comparison;
pub use precision::{
    default_max_iterations, default_precision, set_default_max_iterations, set_default_precision,
    with_precision_override, PrecisionConfig, DEFAULT_MAX_REFINEMENT_ITERATIONS, DEFAULT_PRECISION,
};
pub use real::{Approximation, Real};
