// SPDX-License-Identifier: AGPL-3.0-or-later
//! Validation framework for CPU-baseline comparison.
//!
//! Used by validation binaries (`validate_stats_gpu`) to compare GPU
//! results against sequential CPU baselines. Each check prints a
//! formatted pass/fail line with the actual value, the expected
//! baseline, and the tolerance applied.
//!
//! Every validation binary follows the same contract:
//! - Explicit pass/fail per check with human-readable output
//! - Exit code 0 = all passed, 1 = at least one failed, 2 = skipped
//!
//! Prefer the [`Validator`] struct over bare [`check`] calls — it
//! tracks pass/fail counts automatically and avoids manual bookkeeping.

// ── Standalone helpers (for one-off use) ──────────────────────

/// Compare `actual` against `expected` within absolute `tolerance`.
///
/// Prints a formatted `[OK]` or `[FAIL]` line and returns whether
/// the check passed. Tolerance of `0.0` requires exact match.
///
/// ```
/// use streamgauge::validation::check;
///
/// assert!(check("mean(uniform)", 0.5, 0.5, 1e-12));
/// assert!(!check("deliberate fail", 2.0, 1.0, 0.5));
/// ```
#[must_use]
pub fn check(label: &str, actual: f64, expected: f64, tolerance: f64) -> bool {
    let pass = (actual - expected).abs() <= tolerance;
    let tag = if pass { "OK" } else { "FAIL" };
    println!("  [{tag}]  {label}: {actual:.6} (expected {expected:.6}, tol {tolerance:.6})");
    pass
}

/// Compare `actual` against `expected` within a relative tolerance.
///
/// Used for f32 sum reductions whose drift scales with magnitude. The
/// comparison scale is `expected.abs().max(1.0)`, so for |expected| ≤ 1
/// the tolerance degenerates to an absolute bound of `rel_tolerance`
/// instead of collapsing toward zero.
#[must_use]
pub fn check_relative(label: &str, actual: f64, expected: f64, rel_tolerance: f64) -> bool {
    let scale = expected.abs().max(1.0);
    let pass = (actual - expected).abs() <= rel_tolerance * scale;
    let tag = if pass { "OK" } else { "FAIL" };
    println!("  [{tag}]  {label}: {actual:.6} (expected {expected:.6}, rel tol {rel_tolerance:e})");
    pass
}

/// Compare an exact count — no floating-point conversion needed.
///
/// ```
/// use streamgauge::validation::check_count;
///
/// assert!(check_count("record count", 42, 42));
/// assert!(!check_count("mismatched", 10, 20));
/// ```
#[must_use]
pub fn check_count(label: &str, actual: usize, expected: usize) -> bool {
    let pass = actual == expected;
    let tag = if pass { "OK" } else { "FAIL" };
    println!("  [{tag}]  {label}: {actual} (expected {expected})");
    pass
}

/// Print summary and return whether all checks passed.
///
/// Separates logic from exit behavior for testability.
#[must_use]
pub fn print_result(name: &str, passed: u32, total: u32) -> bool {
    println!("\n═══════════════════════════════════════════════════════════");
    println!("  {name}: {passed}/{total} checks passed");
    if passed == total {
        println!("  RESULT: PASS");
    } else {
        println!("  RESULT: FAIL ({} checks failed)", total - passed);
    }
    println!("═══════════════════════════════════════════════════════════");
    passed == total
}

/// Exit with code 2 indicating the test was skipped (no GPU available).
pub fn exit_skipped(reason: &str) -> ! {
    println!("  SKIP: {reason}");
    println!("  (exit 2 = skipped, not a failure)");
    std::process::exit(2)
}

// ── Validator: structured check accumulator ───────────────────

/// Accumulated validation state, removing manual pass/fail bookkeeping.
///
/// ```
/// use streamgauge::validation::Validator;
///
/// let mut v = Validator::new("doc-test");
/// v.check("pi", std::f64::consts::PI, 3.14159, 1e-4);
/// v.check_count("records", 10, 10);
/// let (passed, total) = v.counts();
/// assert_eq!((passed, total), (2, 2));
/// ```
pub struct Validator {
    name: String,
    passed: u32,
    total: u32,
}

impl Validator {
    /// Create a new validator for the given binary name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        println!("═══════════════════════════════════════════════════════════");
        println!("  {name}");
        println!("═══════════════════════════════════════════════════════════\n");
        Self {
            name,
            passed: 0,
            total: 0,
        }
    }

    /// Print a section header (no check counted).
    pub fn section(&self, label: &str) {
        println!("\n{label}");
    }

    /// Check an f64 value against expected within absolute tolerance.
    pub fn check(&mut self, label: &str, actual: f64, expected: f64, tolerance: f64) {
        self.total += 1;
        if check(label, actual, expected, tolerance) {
            self.passed += 1;
        }
    }

    /// Check an f64 value against expected within relative tolerance.
    pub fn check_relative(&mut self, label: &str, actual: f64, expected: f64, rel: f64) {
        self.total += 1;
        if check_relative(label, actual, expected, rel) {
            self.passed += 1;
        }
    }

    /// Check an exact count (`usize`) — no floating-point conversion.
    pub fn check_count(&mut self, label: &str, actual: usize, expected: usize) {
        self.total += 1;
        if check_count(label, actual, expected) {
            self.passed += 1;
        }
    }

    /// Retrieve current (passed, total) for external logic.
    #[must_use]
    pub const fn counts(&self) -> (u32, u32) {
        (self.passed, self.total)
    }

    /// Print summary and exit with 0 (pass) or 1 (fail).
    pub fn finish(self) -> ! {
        let ok = print_result(&self.name, self.passed, self.total);
        std::process::exit(i32::from(!ok))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_exact_match() {
        assert!(check("exact", 42.0, 42.0, 0.0));
    }

    #[test]
    fn check_within_tolerance() {
        assert!(check("close", 42.001, 42.0, 0.01));
    }

    #[test]
    fn check_outside_tolerance() {
        assert!(!check("far", 50.0, 42.0, 1.0));
    }

    #[test]
    fn check_relative_scales_with_magnitude() {
        assert!(check_relative("big sum", 1_000_010.0, 1_000_000.0, 1e-4));
        assert!(!check_relative("too far", 1_200_000.0, 1_000_000.0, 1e-4));
    }

    #[test]
    fn check_relative_near_zero_uses_absolute() {
        assert!(check_relative("zero", 1e-7, 0.0, 1e-5));
    }

    #[test]
    fn validator_counts() {
        let mut v = Validator::new("unit-test");
        v.check("pass", 1.0, 1.0, 0.0);
        v.check("fail", 2.0, 1.0, 0.0);
        v.check_count("count", 5, 5);
        assert_eq!(v.counts(), (2, 3));
    }
}
