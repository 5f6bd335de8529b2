//! Determinism testing utilities.
//!
//! Provides a harness for verifying that the engine produces identical
//! reports given identical inputs.
//!
//! # Testing Strategy
//!
//! A build order must always schedule the same way. Sources of
//! non-determinism include:
//!
//! - **Floating-point math**: Different CPUs can produce different results.
//!   We use fixed-point arithmetic via [`build_core::math::Fixed`] throughout.
//!
//! - **HashMap iteration order**: Rust's default hasher is randomized.
//!   The engine only iterates vectors in insertion order.
//!
//! # Test Levels
//!
//! 1. **Repeated runs**: The same build scheduled N times hashes the same
//! 2. **Parallel runs**: N threads scheduling the same build all match
//! 3. **Property tests**: Random build orders still schedule deterministically

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use build_core::prelude::*;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical reports.
    pub is_deterministic: bool,
    /// Report hashes from each run.
    pub hashes: Vec<u64>,
}

impl DeterminismResult {
    fn new(hashes: Vec<u64>) -> Self {
        Self {
            is_deterministic: hashes.windows(2).all(|w| w[0] == w[1]),
            hashes,
        }
    }

    /// Get all unique hashes (should be 1 for a deterministic engine).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that every run matched, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Scheduling is non-deterministic!\n\
                 Runs: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Hash a report through its `bincode` encoding.
///
/// # Panics
///
/// Panics if the report can not be encoded.
#[must_use]
pub fn report_hash(report: &BuildReport) -> u64 {
    let bytes = bincode::serialize(report).unwrap_or_else(|err| panic!("report encoding failed: {err}"));
    compute_hash(&bytes)
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Schedule the same build `runs` times and compare the reports.
///
/// # Example
///
/// ```ignore
/// use build_test_utils::determinism::verify_determinism;
/// use build_test_utils::fixtures::{protoss_opening, standard_catalog};
///
/// let catalog = standard_catalog();
/// let order = protoss_opening(&catalog);
/// verify_determinism(5, &catalog, &order).assert_deterministic();
/// ```
///
/// # Panics
///
/// Panics if the build can not be scheduled.
#[must_use]
pub fn verify_determinism(runs: usize, catalog: &Catalog, order: &BuildOrder) -> DeterminismResult {
    let hashes = (0..runs)
        .map(|_| {
            let report = order
                .run(catalog, EconomyRules::default())
                .unwrap_or_else(|err| panic!("build failed: {err}"));
            report_hash(&report)
        })
        .collect();
    DeterminismResult::new(hashes)
}

/// Schedule the same build on `threads` scoped threads at once.
///
/// Catches state that leaks between runs through anything shared.
///
/// # Panics
///
/// Panics if the build can not be scheduled or a thread panics.
#[must_use]
pub fn run_parallel(threads: usize, catalog: &Catalog, order: &BuildOrder) -> DeterminismResult {
    let hashes = thread::scope(|s| {
        let handles: Vec<_> = (0..threads)
            .map(|_| {
                s.spawn(|| {
                    let report = order
                        .run(catalog, EconomyRules::default())
                        .unwrap_or_else(|err| panic!("build failed: {err}"));
                    report_hash(&report)
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().unwrap_or_else(|_| panic!("scheduling thread panicked")))
            .collect()
    });
    DeterminismResult::new(hashes)
}

/// Verify a report survives a RON round trip unchanged.
#[must_use]
pub fn verify_ron_round_trip(report: &BuildReport) -> bool {
    let Ok(text) = ron::to_string(report) else {
        return false;
    };
    ron::from_str::<BuildReport>(&text).is_ok_and(|restored| &restored == report)
}

/// Proptest strategies for engine inputs.
///
/// These strategies generate random but reproducible inputs for
/// property-based testing.
pub mod strategies {
    use build_core::prelude::*;
    use proptest::prelude::*;

    /// Time in whole seconds within the first ten minutes.
    pub fn arb_seconds() -> impl Strategy<Value = Fixed> {
        (0i32..600).prop_map(Fixed::from_num)
    }

    /// Time with a fractional part, within the first ten minutes.
    pub fn arb_time() -> impl Strategy<Value = Fixed> {
        (0i64..600 * 1024).prop_map(|n| Fixed::from_num(n) / Fixed::from_num(1024))
    }

    /// A worker layout change taking at most three workers off minerals.
    pub fn arb_worker_change() -> impl Strategy<Value = MutationKind> {
        prop_oneof![
            (-3i32..=3).prop_map(|minerals| MutationKind::Workers { minerals, gas: 0 }),
            (0i32..=5).prop_map(MutationKind::Mules),
        ]
    }

    /// Number of auto workers to let the build squeeze before a pylon.
    pub fn arb_pylon_supply() -> impl Strategy<Value = i32> {
        7i32..=10
    }
}
