//! Process-wide precision defaults and per-evaluation snapshots.
//!
//! The defaults are read-mostly configuration: set them once at startup, then
//! every evaluation takes an immutable [`PrecisionConfig`] snapshot so a single
//! refinement chain never observes a precision change mid-computation. A
//! scoped override lets one top-level request demand a different precision
//! without touching the process-wide state.

use std::cell::Cell;

use parking_lot::RwLock;

/// Default number of fractional digits an evaluation resolves to.
pub const DEFAULT_PRECISION: u32 = 10;

#[cfg(debug_assertions)]
pub const DEFAULT_MAX_REFINEMENT_ITERATIONS: usize = 64;
#[cfg(not(debug_assertions))]
pub const DEFAULT_MAX_REFINEMENT_ITERATIONS: usize = 4096;

struct Defaults {
    precision: u32,
    max_iterations: usize,
}

static DEFAULTS: RwLock<Defaults> = RwLock::new(Defaults {
    precision: DEFAULT_PRECISION,
    max_iterations: DEFAULT_MAX_REFINEMENT_ITERATIONS,
});

thread_local! {
    static PRECISION_OVERRIDE: Cell<Option<u32>> = const { Cell::new(None) };
}

/// Immutable precision settings for one evaluation.
///
/// Snapshotting at the top of a request keeps every recursive refinement and
/// operand evaluation triggered by that request on one consistent setting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PrecisionConfig {
    /// Fractional digits the evaluation must resolve to.
    pub precision: u32,
    /// Ceiling on refinement rounds before reporting non-convergence.
    pub max_iterations: usize,
}

impl PrecisionConfig {
    /// Builds a config from explicit values.
    pub fn new(precision: u32, max_iterations: usize) -> Self {
        Self {
            precision,
            max_iterations,
        }
    }

    /// Captures the current defaults, honoring any active scoped override.
    pub fn snapshot() -> Self {
        let defaults = DEFAULTS.read();
        let precision = PRECISION_OVERRIDE
            .with(Cell::get)
            .unwrap_or(defaults.precision);
        Self {
            precision,
            max_iterations: defaults.max_iterations,
        }
    }
}

impl Default for PrecisionConfig {
    fn default() -> Self {
        Self::snapshot()
    }
}

/// Sets the process-wide default precision.
pub fn set_default_precision(precision: u32) {
    DEFAULTS.write().precision = precision;
}

/// Returns the process-wide default precision.
pub fn default_precision() -> u32 {
    DEFAULTS.read().precision
}

/// Sets the process-wide refinement iteration ceiling.
pub fn set_default_max_iterations(max_iterations: usize) {
    DEFAULTS.write().max_iterations = max_iterations;
}

/// Returns the process-wide refinement iteration ceiling.
pub fn default_max_iterations() -> usize {
    DEFAULTS.read().max_iterations
}

/// Runs `body` with the default precision overridden on the current thread.
///
/// The override flows into every evaluation started inside `body` (each takes
/// its snapshot on entry) and is restored afterwards, even on panic, so the
/// next independent request sees the process-wide default again.
pub fn with_precision_override<R>(precision: u32, body: impl FnOnce() -> R) -> R {
    struct Restore(Option<u32>);

    impl Drop for Restore {
        fn drop(&mut self) {
            PRECISION_OVERRIDE.with(|slot| slot.set(self.0));
        }
    }

    let previous = PRECISION_OVERRIDE.with(|slot| slot.replace(Some(precision)));
    let _restore = Restore(previous);
    body()
}
