//! The expansion engine: narrowing a node's boundary pair to a precision.
//!
//! Control flows top-down: a request for bounds at precision `p` dispatches
//! on the node kind. Explicit and algorithmic numbers materialize exactly the
//! digits the precision needs and pad the unknown tail with its worst case.
//! Composite numbers refine their operands at a growing working precision
//! and recombine until the result interval fits, so laziness composes: a sum
//! of two generated numbers is itself just a node whose refinement demands
//! refinement of both addends.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::bounds::Bounds;
use crate::decimal::{Decimal, Exponent};
use crate::error::RealError;
use crate::node::{
    AlgorithmicDigits, Composite, CompositeExpr, ExplicitDigits, Memo, RealNode,
};
use crate::ops;
use crate::precision::PrecisionConfig;

/// Narrows `node`'s boundary pair until it resolves to `precision` fractional
/// digits, or fails with one of the refinement errors.
pub(crate) fn refine(
    node: &Arc<RealNode>,
    precision: u32,
    config: &PrecisionConfig,
) -> Result<Bounds, RealError> {
    match node.as_ref() {
        RealNode::Explicit(explicit) => explicit_bounds(explicit, precision),
        RealNode::Algorithmic(algorithmic) => algorithmic_bounds(algorithmic, precision),
        RealNode::Composite(composite) => composite_bounds(composite, precision, config),
    }
}

/// Digits needed to cover `precision` fractional places of a number whose
/// leading digit has weight `10^exponent`.
fn digits_needed(exponent: Exponent, precision: u32) -> usize {
    let needed = exponent
        .saturating_add(i64::from(precision))
        .saturating_add(1);
    usize::try_from(needed.max(0)).unwrap_or(usize::MAX)
}

/// Builds bounds from a known magnitude prefix, padding the unknown tail with
/// its worst case: all zeros for the endpoint nearer zero, all nines (one ulp)
/// for the one further out. An exact prefix collapses to a point.
fn padded_bounds(
    prefix: &[u8],
    exponent: Exponent,
    negative: bool,
    exact: bool,
    precision: u32,
) -> Result<Bounds, RealError> {
    let magnitude = Decimal::new(prefix.to_vec(), exponent, false)?;
    if exact {
        let value = if negative { magnitude.neg() } else { magnitude };
        return Ok(Bounds::point(value));
    }
    let padded = magnitude.add(&Decimal::ulp(precision));
    if negative {
        Bounds::new_checked(padded.neg(), magnitude.neg())
    } else {
        Bounds::new_checked(magnitude, padded)
    }
}

fn explicit_bounds(explicit: &ExplicitDigits, precision: u32) -> Result<Bounds, RealError> {
    if explicit.digits.iter().all(|&digit| digit == 0) {
        return Ok(Bounds::point(Decimal::zero()));
    }

    let needed = digits_needed(explicit.exponent, precision);
    let (prefix, exact) = if explicit.periodic {
        let prefix: Vec<u8> = explicit
            .digits
            .iter()
            .copied()
            .cycle()
            .take(needed)
            .collect();
        (prefix, false)
    } else if needed >= explicit.digits.len() {
        (explicit.digits.clone(), true)
    } else {
        let tail_is_zero = explicit.digits[needed..].iter().all(|&digit| digit == 0);
        (explicit.digits[..needed].to_vec(), tail_is_zero)
    };

    padded_bounds(
        &prefix,
        explicit.exponent,
        explicit.negative,
        exact,
        precision,
    )
}

fn algorithmic_bounds(
    algorithmic: &AlgorithmicDigits,
    precision: u32,
) -> Result<Bounds, RealError> {
    if let Some(bounds) = memo_at_least(&algorithmic.state.read().memo, precision) {
        return Ok(bounds);
    }

    let needed = digits_needed(algorithmic.exponent, precision);
    let (digits, complete) = algorithmic.known_digits(needed)?;
    let prefix_len = needed.min(digits.len());
    let exact = complete && digits[prefix_len..].iter().all(|&digit| digit == 0);
    let bounds = padded_bounds(
        &digits[..prefix_len],
        algorithmic.exponent,
        algorithmic.negative,
        exact,
        precision,
    )?;

    store_memo(&mut algorithmic.state.write().memo, precision, bounds)
}

fn composite_bounds(
    composite: &Composite,
    precision: u32,
    config: &PrecisionConfig,
) -> Result<Bounds, RealError> {
    if let Some(bounds) = memo_at_least(&composite.memo.read(), precision) {
        return Ok(bounds);
    }

    // TODO: derive the next working precision from the observed interval
    // width instead of doubling blindly; doubling overshoots for operands
    // with large magnitudes.
    let mut working = precision.saturating_add(2);
    let mut divisor_straddled = false;
    for attempt in 0..config.max_iterations {
        match combine(&composite.expr, working, config)? {
            Some(bounds) if bounds.resolved_to(precision) => {
                trace!(precision, working, width = %bounds.width(), "interval resolved");
                return store_memo(&mut composite.memo.write(), precision, bounds);
            }
            Some(bounds) => {
                divisor_straddled = false;
                trace!(
                    attempt,
                    precision,
                    working,
                    width = %bounds.width(),
                    "interval still too wide"
                );
            }
            None => {
                divisor_straddled = true;
                trace!(attempt, working, "divisor interval still straddles zero");
            }
        }
        working = working.saturating_mul(2);
    }

    debug!(
        precision,
        max_iterations = config.max_iterations,
        "refinement ceiling reached"
    );
    if divisor_straddled {
        Err(RealError::DivisorStraddlesZero)
    } else {
        Err(RealError::NonConvergence {
            max_iterations: config.max_iterations,
        })
    }
}

/// Combines operand bounds at the working precision. Returns `None` when a
/// divisor interval still straddles zero but might stop doing so once the
/// operand is refined further.
fn combine(
    expr: &CompositeExpr,
    working: u32,
    config: &PrecisionConfig,
) -> Result<Option<Bounds>, RealError> {
    match expr {
        CompositeExpr::Add(left, right) => {
            let bounds = ops::add_bounds(
                &refine(left, working, config)?,
                &refine(right, working, config)?,
            )?;
            Ok(Some(bounds))
        }
        CompositeExpr::Sub(left, right) => {
            let bounds = ops::sub_bounds(
                &refine(left, working, config)?,
                &refine(right, working, config)?,
            )?;
            Ok(Some(bounds))
        }
        CompositeExpr::Mul(left, right) => {
            let bounds = ops::mul_bounds(
                &refine(left, working, config)?,
                &refine(right, working, config)?,
            )?;
            Ok(Some(bounds))
        }
        CompositeExpr::Div(left, right) => {
            let numerator = refine(left, working, config)?;
            let divisor = refine(right, working, config)?;
            if divisor.contains_zero() {
                if divisor.is_point() {
                    // exactly zero; no amount of refinement will move it
                    return Err(RealError::DivisorStraddlesZero);
                }
                return Ok(None);
            }
            Ok(Some(ops::div_bounds(&numerator, &divisor, working)?))
        }
        CompositeExpr::Neg(inner) => {
            Ok(Some(ops::neg_bounds(&refine(inner, working, config)?)?))
        }
    }
}

/// Returns the memoized bounds if they were computed at this precision or a
/// deeper one. Refinement is monotone, so a deeper result is always valid for
/// a shallower request.
fn memo_at_least(memo: &Option<Memo>, precision: u32) -> Option<Bounds> {
    memo.as_ref()
        .filter(|entry| entry.precision >= precision)
        .map(|entry| entry.bounds.clone())
}

/// Records freshly computed bounds, rejecting any recomputation that would
/// widen what is already known.
fn store_memo(
    slot: &mut Option<Memo>,
    precision: u32,
    bounds: Bounds,
) -> Result<Bounds, RealError> {
    if let Some(existing) = slot.as_ref() {
        if existing.precision >= precision {
            return Ok(existing.bounds.clone());
        }
        if !bounds.is_within(&existing.bounds) {
            return Err(RealError::BoundsWidened);
        }
    }
    *slot = Some(Memo {
        precision,
        bounds: bounds.clone(),
    });
    Ok(bounds)
}
