//! The representation behind a lazy real number.
//!
//! A number is one of three node kinds: an explicit digit list, an
//! algorithmic digit generator, or a composite expression over shared operand
//! nodes. The defining data of a node is immutable; only the private caches
//! mutate, and they only ever narrow.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::bounds::Bounds;
use crate::decimal::{Exponent, RADIX};
use crate::error::RealError;

/// One batch of generated digits plus a termination flag.
///
/// `complete` distinguishes a finite expansion (every remaining digit is
/// zero) from one that continues past the returned prefix.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedDigits {
    pub digits: Vec<u8>,
    pub complete: bool,
}

impl GeneratedDigits {
    /// A continuing prefix of an infinite expansion.
    pub fn partial(digits: Vec<u8>) -> Self {
        Self {
            digits,
            complete: false,
        }
    }

    /// A finite expansion: the returned digits are all there is.
    pub fn finished(digits: Vec<u8>) -> Self {
        Self {
            digits,
            complete: true,
        }
    }
}

/// A digit-generating capability: asked for `count` digits of a number's
/// magnitude, it returns at least that many (or terminates).
///
/// Generators must be consistent: a later call may never contradict a prefix
/// returned earlier. Any closure `Fn(usize) -> GeneratedDigits` qualifies, so
/// algorithmic numbers stay cheap to construct.
pub trait DigitGenerator: Send + Sync {
    fn generate(&self, count: usize) -> GeneratedDigits;
}

impl<F> DigitGenerator for F
where
    F: Fn(usize) -> GeneratedDigits + Send + Sync,
{
    fn generate(&self, count: usize) -> GeneratedDigits {
        self(count)
    }
}

/// Last bounds computed for a node and the precision they were computed at.
#[derive(Clone, Debug)]
pub(crate) struct Memo {
    pub precision: u32,
    pub bounds: Bounds,
}

/// Fixed digit list, possibly periodic. Immutable after construction.
pub(crate) struct ExplicitDigits {
    pub digits: Vec<u8>,
    pub exponent: Exponent,
    pub negative: bool,
    pub periodic: bool,
}

/// Mutable private state of an algorithmic number: the digits fetched so far,
/// whether the generator terminated, whether it has been caught lying, and
/// the last bounds computed from the cache.
pub(crate) struct GeneratorState {
    pub digits: Vec<u8>,
    pub complete: bool,
    pub poisoned: bool,
    pub memo: Option<Memo>,
}

/// On-demand digit source with its cache.
pub(crate) struct AlgorithmicDigits {
    pub generator: Box<dyn DigitGenerator>,
    pub exponent: Exponent,
    pub negative: bool,
    pub state: RwLock<GeneratorState>,
}

impl AlgorithmicDigits {
    pub(crate) fn new(
        generator: Box<dyn DigitGenerator>,
        exponent: Exponent,
        negative: bool,
    ) -> Self {
        Self {
            generator,
            exponent,
            negative,
            state: RwLock::new(GeneratorState {
                digits: Vec::new(),
                complete: false,
                poisoned: false,
                memo: None,
            }),
        }
    }

    /// Returns at least `count` cached digits (or all of them if the
    /// expansion terminated sooner), invoking the generator when the cache is
    /// short. A generator that contradicts its own earlier output poisons the
    /// cache permanently.
    pub(crate) fn known_digits(&self, count: usize) -> Result<(Vec<u8>, bool), RealError> {
        let mut state = self.state.write();
        if state.poisoned {
            return Err(RealError::GeneratorInconsistency);
        }
        if !state.complete && state.digits.len() < count {
            let output = self.generator.generate(count);
            if let Some(&digit) = output.digits.iter().find(|&&digit| digit >= RADIX) {
                state.poisoned = true;
                return Err(RealError::InvalidDigit { digit });
            }
            let known = state.digits.len();
            if output.digits.len() < known || output.digits[..known] != state.digits[..] {
                state.poisoned = true;
                return Err(RealError::GeneratorInconsistency);
            }
            if !output.complete && output.digits.len() < count {
                return Err(RealError::InsufficientDigits {
                    needed: count,
                    available: output.digits.len(),
                });
            }
            state.digits = output.digits;
            state.complete = output.complete;
        }
        Ok((state.digits.clone(), state.complete))
    }
}

/// A composite expression: an operator over shared operand nodes.
///
/// Operands are `Arc`-shared because the same number may appear in several
/// expressions at once; sharing keeps one cache per operand.
pub(crate) enum CompositeExpr {
    Add(Arc<RealNode>, Arc<RealNode>),
    Sub(Arc<RealNode>, Arc<RealNode>),
    Mul(Arc<RealNode>, Arc<RealNode>),
    Div(Arc<RealNode>, Arc<RealNode>),
    Neg(Arc<RealNode>),
}

pub(crate) struct Composite {
    pub expr: CompositeExpr,
    pub memo: RwLock<Option<Memo>>,
}

impl Composite {
    pub(crate) fn new(expr: CompositeExpr) -> Self {
        Self {
            expr,
            memo: RwLock::new(None),
        }
    }
}

/// The closed set of representations a real number can have.
pub(crate) enum RealNode {
    Explicit(ExplicitDigits),
    Algorithmic(AlgorithmicDigits),
    Composite(Composite),
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::panic)]

    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn counting_generator(
        digits: Vec<u8>,
        complete: bool,
        calls: Arc<AtomicUsize>,
    ) -> impl DigitGenerator {
        move |_count: usize| {
            calls.fetch_add(1, Ordering::Relaxed);
            GeneratedDigits {
                digits: digits.clone(),
                complete,
            }
        }
    }

    #[test]
    fn closures_implement_the_generator_capability() {
        let generator = |count: usize| GeneratedDigits::partial(vec![3; count]);
        let output = generator.generate(4);
        assert_eq!(output.digits, vec![3, 3, 3, 3]);
        assert!(!output.complete);
    }

    #[test]
    fn known_digits_caches_completed_expansions() {
        let calls = Arc::new(AtomicUsize::new(0));
        let algorithmic = AlgorithmicDigits::new(
            Box::new(counting_generator(vec![1, 5], true, Arc::clone(&calls))),
            0,
            false,
        );

        let (digits, complete) = algorithmic
            .known_digits(6)
            .expect("generation should succeed");
        assert_eq!(digits, vec![1, 5]);
        assert!(complete);

        let (digits, complete) = algorithmic
            .known_digits(12)
            .expect("generation should succeed");
        assert_eq!(digits, vec![1, 5]);
        assert!(complete);
        assert_eq!(calls.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn known_digits_rejects_prefix_contradiction_and_poisons() {
        let algorithmic = AlgorithmicDigits::new(
            Box::new(|count: usize| {
                if count <= 3 {
                    GeneratedDigits::partial(vec![1, 2, 3])
                } else {
                    GeneratedDigits::partial(vec![1, 9, 9, 9, 9, 9])
                }
            }),
            0,
            false,
        );

        let (digits, _) = algorithmic
            .known_digits(3)
            .expect("first generation should succeed");
        assert_eq!(digits, vec![1, 2, 3]);

        assert_eq!(
            algorithmic.known_digits(6),
            Err(RealError::GeneratorInconsistency)
        );
        // the cache stays poisoned even for requests it could once serve
        assert_eq!(
            algorithmic.known_digits(2),
            Err(RealError::GeneratorInconsistency)
        );
    }

    #[test]
    fn known_digits_reports_short_incomplete_output() {
        let algorithmic = AlgorithmicDigits::new(
            Box::new(|_count: usize| GeneratedDigits::partial(vec![4, 2])),
            0,
            false,
        );

        assert_eq!(
            algorithmic.known_digits(5),
            Err(RealError::InsufficientDigits {
                needed: 5,
                available: 2
            })
        );
    }

    #[test]
    fn known_digits_rejects_out_of_radix_output() {
        let algorithmic = AlgorithmicDigits::new(
            Box::new(|count: usize| GeneratedDigits::partial(vec![11; count])),
            0,
            false,
        );

        assert_eq!(
            algorithmic.known_digits(2),
            Err(RealError::InvalidDigit { digit: 11 })
        );
    }
}
