//! The public lazy real number type.
//!
//! A `Real` wraps a shared representation node. Construction and the
//! arithmetic operators are cheap and never refine anything; digits are only
//! produced when bounds, an approximation, or a comparison is demanded.

use std::fmt;
use std::sync::Arc;

use crate::bounds::Bounds;
use crate::decimal::{Decimal, Exponent, Rounding, RADIX};
use crate::error::RealError;
use crate::node::{
    AlgorithmicDigits, Composite, CompositeExpr, DigitGenerator, ExplicitDigits, RealNode,
};
use crate::ops::{self, Comparison};
use crate::precision::PrecisionConfig;
use crate::refinement::refine;

/// A real number evaluated lazily through a shrinking boundary interval.
///
/// Cloning is cheap and shares the underlying representation, so a number
/// used as an operand of several expressions keeps a single digit cache.
///
/// `Real` deliberately implements neither `PartialOrd` nor `PartialEq`:
/// ordering two lazily evaluated numbers can be indeterminate at any finite
/// precision, and that outcome must reach the caller instead of being coerced
/// into a boolean. Use [`Real::compare`].
#[derive(Clone)]
pub struct Real {
    node: Arc<RealNode>,
}

/// A one-sided approximation of a number at some precision.
///
/// `value` never exceeds the true value; `exact` marks whether the interval
/// had collapsed, i.e. whether `value` *is* the number.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Approximation {
    pub value: Decimal,
    pub exact: bool,
}

impl fmt::Display for Approximation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl Real {
    fn from_node(node: RealNode) -> Self {
        Self {
            node: Arc::new(node),
        }
    }

    fn composite(expr: CompositeExpr) -> Self {
        Self::from_node(RealNode::Composite(Composite::new(expr)))
    }

    /// Creates a number from a fixed digit list.
    ///
    /// The value is `(sum of digits[i] * 10^-i) * 10^exponent`, negated when
    /// `negative` is set; digits `[1, 4, 1, 4]` with exponent 0 denote 1.414.
    pub fn from_digits(
        digits: Vec<u8>,
        exponent: Exponent,
        negative: bool,
    ) -> Result<Self, RealError> {
        validate_digits(&digits)?;
        Ok(Self::from_node(RealNode::Explicit(ExplicitDigits {
            digits,
            exponent,
            negative,
            periodic: false,
        })))
    }

    /// Creates a number whose digit list repeats forever, e.g. digits `[3]`
    /// with exponent -1 denote 0.333... = 1/3.
    pub fn from_periodic_digits(
        digits: Vec<u8>,
        exponent: Exponent,
        negative: bool,
    ) -> Result<Self, RealError> {
        if digits.is_empty() {
            return Err(RealError::InsufficientDigits {
                needed: 1,
                available: 0,
            });
        }
        validate_digits(&digits)?;
        Ok(Self::from_node(RealNode::Explicit(ExplicitDigits {
            digits,
            exponent,
            negative,
            periodic: true,
        })))
    }

    /// Creates a number backed by an on-demand digit generator producing the
    /// digits of its magnitude.
    pub fn from_generator<G>(generator: G, exponent: Exponent, negative: bool) -> Self
    where
        G: DigitGenerator + 'static,
    {
        Self::from_node(RealNode::Algorithmic(AlgorithmicDigits::new(
            Box::new(generator),
            exponent,
            negative,
        )))
    }

    /// Creates a number denoting an integer exactly.
    pub fn from_int(value: i64) -> Self {
        let decimal = Decimal::from_int(value);
        Self::from_node(RealNode::Explicit(ExplicitDigits {
            digits: decimal.digits().to_vec(),
            exponent: decimal.exponent(),
            negative: value < 0,
            periodic: false,
        }))
    }

    /// The number zero.
    pub fn zero() -> Self {
        Self::from_int(0)
    }

    /// Returns bounds resolved to `precision` fractional digits, using the
    /// configured defaults for the iteration ceiling.
    pub fn bounds_at(&self, precision: u32) -> Result<Bounds, RealError> {
        self.bounds_at_with(precision, &PrecisionConfig::snapshot())
    }

    /// Returns bounds resolved to the default (or overridden) precision.
    pub fn bounds(&self) -> Result<Bounds, RealError> {
        let config = PrecisionConfig::snapshot();
        self.bounds_at_with(config.precision, &config)
    }

    /// Returns bounds resolved to `precision` under an explicit config.
    pub fn bounds_at_with(
        &self,
        precision: u32,
        config: &PrecisionConfig,
    ) -> Result<Bounds, RealError> {
        refine(&self.node, precision, config)
    }

    /// Returns a sound approximation at `precision`: the lower endpoint
    /// rounded down to `precision` digits, tagged exact when the interval has
    /// collapsed to a single value.
    pub fn approximate_at(&self, precision: u32) -> Result<Approximation, RealError> {
        self.approximate_at_with(precision, &PrecisionConfig::snapshot())
    }

    /// Returns a sound approximation at the default (or overridden) precision.
    pub fn approximate(&self) -> Result<Approximation, RealError> {
        let config = PrecisionConfig::snapshot();
        self.approximate_at_with(config.precision, &config)
    }

    /// Returns a sound approximation at `precision` under an explicit config.
    pub fn approximate_at_with(
        &self,
        precision: u32,
        config: &PrecisionConfig,
    ) -> Result<Approximation, RealError> {
        let bounds = self.bounds_at_with(precision, config)?;
        if bounds.is_point() {
            return Ok(Approximation {
                value: bounds.lower().clone(),
                exact: true,
            });
        }
        Ok(Approximation {
            value: bounds.lower().rounded_to(precision, Rounding::Floor),
            exact: false,
        })
    }

    /// Compares two numbers at `precision` using the configured defaults.
    pub fn compare_at(&self, other: &Self, precision: u32) -> Result<Comparison, RealError> {
        self.compare_at_with(other, precision, &PrecisionConfig::snapshot())
    }

    /// Compares two numbers at the default (or overridden) precision.
    pub fn compare(&self, other: &Self) -> Result<Comparison, RealError> {
        let config = PrecisionConfig::snapshot();
        self.compare_at_with(other, config.precision, &config)
    }

    /// Compares two numbers at `precision` under an explicit config.
    pub fn compare_at_with(
        &self,
        other: &Self,
        precision: u32,
        config: &PrecisionConfig,
    ) -> Result<Comparison, RealError> {
        ops::compare_nodes(&self.node, &other.node, precision, config)
    }
}

fn validate_digits(digits: &[u8]) -> Result<(), RealError> {
    match digits.iter().find(|&&digit| digit >= RADIX) {
        Some(&digit) => Err(RealError::InvalidDigit { digit }),
        None => Ok(()),
    }
}

impl From<i64> for Real {
    fn from(value: i64) -> Self {
        Real::from_int(value)
    }
}

impl std::ops::Add for Real {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::composite(CompositeExpr::Add(self.node, rhs.node))
    }
}

impl std::ops::Sub for Real {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::composite(CompositeExpr::Sub(self.node, rhs.node))
    }
}

impl std::ops::Mul for Real {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Self::composite(CompositeExpr::Mul(self.node, rhs.node))
    }
}

impl std::ops::Div for Real {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        Self::composite(CompositeExpr::Div(self.node, rhs.node))
    }
}

impl std::ops::Neg for Real {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self::composite(CompositeExpr::Neg(self.node))
    }
}
