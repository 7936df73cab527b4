//! Interval-arithmetic kernels and the lock-step comparison.
//!
//! Each kernel combines two operand intervals at a working precision into a
//! sound interval for the result. Addition and subtraction are exact in
//! decimal; multiplication sweeps the four endpoint products; division picks
//! directed roundings per endpoint and refuses divisors whose interval
//! touches zero.

use std::cmp::Ordering;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::bounds::Bounds;
use crate::decimal::{Decimal, Rounding};
use crate::error::RealError;
use crate::node::RealNode;
use crate::precision::PrecisionConfig;
use crate::refinement::refine;

/// Outcome of comparing two real numbers at a precision.
///
/// `Indeterminate` is a real answer, not a failure: the two values agree to
/// the precision the evaluation was allowed to reach, so no order can be
/// asserted. It is never coerced to `Equal`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Comparison {
    Less,
    Equal,
    Greater,
    Indeterminate,
}

impl Comparison {
    /// Maps a decided comparison to an ordering; `Indeterminate` has none.
    pub fn as_ordering(&self) -> Option<Ordering> {
        match self {
            Self::Less => Some(Ordering::Less),
            Self::Equal => Some(Ordering::Equal),
            Self::Greater => Some(Ordering::Greater),
            Self::Indeterminate => None,
        }
    }
}

/// `[a.lo + b.lo, a.hi + b.hi]`
pub(crate) fn add_bounds(a: &Bounds, b: &Bounds) -> Result<Bounds, RealError> {
    Bounds::new_checked(a.lower().add(b.lower()), a.upper().add(b.upper()))
}

/// `[a.lo - b.hi, a.hi - b.lo]`
pub(crate) fn sub_bounds(a: &Bounds, b: &Bounds) -> Result<Bounds, RealError> {
    Bounds::new_checked(a.lower().sub(b.upper()), a.upper().sub(b.lower()))
}

/// `[-a.hi, -a.lo]`
pub(crate) fn neg_bounds(a: &Bounds) -> Result<Bounds, RealError> {
    Bounds::new_checked(a.upper().neg(), a.lower().neg())
}

/// Min/max over the four endpoint products. The sweep is sign-agnostic, so
/// intervals that straddle zero need no special casing.
pub(crate) fn mul_bounds(a: &Bounds, b: &Bounds) -> Result<Bounds, RealError> {
    let candidates = [
        a.lower().mul(b.lower()),
        a.lower().mul(b.upper()),
        a.upper().mul(b.lower()),
        a.upper().mul(b.upper()),
    ];

    let mut min = candidates[0].clone();
    let mut max = candidates[0].clone();
    for candidate in candidates.iter().skip(1) {
        if candidate < &min {
            min = candidate.clone();
        }
        if candidate > &max {
            max = candidate.clone();
        }
    }

    Bounds::new_checked(min, max)
}

/// Min over the floor-rounded endpoint quotients, max over the ceil-rounded
/// ones, at `precision` fractional digits. The caller must have excluded
/// zero from the divisor interval.
pub(crate) fn div_bounds(a: &Bounds, b: &Bounds, precision: u32) -> Result<Bounds, RealError> {
    let pairs = [
        (a.lower(), b.lower()),
        (a.lower(), b.upper()),
        (a.upper(), b.lower()),
        (a.upper(), b.upper()),
    ];

    let mut min: Option<Decimal> = None;
    let mut max: Option<Decimal> = None;
    for (numerator, divisor) in pairs {
        let floor = numerator.div_to_precision(divisor, precision, Rounding::Floor)?;
        let ceil = numerator.div_to_precision(divisor, precision, Rounding::Ceil)?;
        min = Some(match min {
            Some(current) if current <= floor => current,
            _ => floor,
        });
        max = Some(match max {
            Some(current) if current >= ceil => current,
            _ => ceil,
        });
    }

    match (min, max) {
        (Some(lower), Some(upper)) => Bounds::new_checked(lower, upper),
        _ => Err(RealError::InvalidBoundsOrder),
    }
}

/// Decides the order of two numbers by narrowing both in lock-step.
///
/// Each round refines both operands one precision step further. The loop ends
/// as soon as the intervals are provably disjoint (strict order), when both
/// have collapsed to the same exact point (`Equal`), or when the iteration
/// ceiling runs out (`Indeterminate`).
pub(crate) fn compare_nodes(
    a: &Arc<RealNode>,
    b: &Arc<RealNode>,
    precision: u32,
    config: &PrecisionConfig,
) -> Result<Comparison, RealError> {
    if Arc::ptr_eq(a, b) {
        // same node, same value
        return Ok(Comparison::Equal);
    }

    let step = precision.max(1);
    let mut working = step;
    for round in 0..config.max_iterations {
        let ours = refine(a, working, config)?;
        let theirs = refine(b, working, config)?;

        if ours.strictly_below(&theirs) {
            return Ok(Comparison::Less);
        }
        if theirs.strictly_below(&ours) {
            return Ok(Comparison::Greater);
        }
        if ours.is_point() && theirs.is_point() {
            // overlapping points are one point
            return Ok(Comparison::Equal);
        }

        trace!(round, working, "comparison still overlapping");
        working = working.saturating_add(step);
    }

    debug!(
        precision,
        max_iterations = config.max_iterations,
        "comparison undecided at the iteration ceiling"
    );
    Ok(Comparison::Indeterminate)
}
