// SPDX-License-Identifier: AGPL-3.0-or-later
//! Per-phase timing capture for GPU pipeline runs.
//!
//! Each GPU phase records wall-clock upload / execute / download
//! durations into a [`TimingReport`]. Timing is instrumentation wrapped
//! around the phases, never interleaved with the algorithm logic, so
//! callers that don't care simply discard the report. Table rendering
//! is hand-rolled — no serde dependency.

use std::time::Duration;

/// Wall-clock durations for one GPU phase.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhaseTiming {
    /// Host-to-device buffer creation and writes.
    pub upload: Duration,
    /// Dispatch submission through queue drain.
    pub execute: Duration,
    /// Device-to-host staging readback.
    pub download: Duration,
}

impl PhaseTiming {
    /// Total wall-clock time for the phase.
    #[must_use]
    pub fn total(&self) -> Duration {
        self.upload + self.execute + self.download
    }
}

/// Ordered collection of named phase timings for one pipeline run.
#[derive(Debug, Default)]
pub struct TimingReport {
    phases: Vec<(String, PhaseTiming)>,
}

impl TimingReport {
    /// Create an empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed phase.
    pub fn record(&mut self, name: impl Into<String>, timing: PhaseTiming) {
        self.phases.push((name.into(), timing));
    }

    /// Recorded phases in execution order.
    #[must_use]
    pub fn phases(&self) -> &[(String, PhaseTiming)] {
        &self.phases
    }

    /// Print a human-readable timing table.
    pub fn print_table(&self) {
        if self.phases.is_empty() {
            return;
        }
        println!("\n┌──────────────────────────────┬──────────┬──────────┬──────────┬──────────┐");
        println!(
            "│ {:<28} │ {:>8} │ {:>8} │ {:>8} │ {:>8} │",
            "Phase", "up [ms]", "exec[ms]", "down[ms]", "tot [ms]"
        );
        println!("├──────────────────────────────┼──────────┼──────────┼──────────┼──────────┤");
        let mut total = Duration::ZERO;
        for (name, t) in &self.phases {
            println!(
                "│ {:<28} │ {:>8.3} │ {:>8.3} │ {:>8.3} │ {:>8.3} │",
                name,
                ms(t.upload),
                ms(t.execute),
                ms(t.download),
                ms(t.total()),
            );
            total += t.total();
        }
        println!("└──────────────────────────────┴──────────┴──────────┴──────────┴──────────┘");
        println!("  Total GPU pipeline time: {:.3} ms", ms(total));
    }
}

fn ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1e3
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_preserves_order() {
        let mut report = TimingReport::new();
        report.record("sum reduce", PhaseTiming::default());
        report.record("bitonic sort", PhaseTiming::default());
        let names: Vec<&str> = report.phases().iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["sum reduce", "bitonic sort"]);
    }

    #[test]
    fn total_sums_segments() {
        let t = PhaseTiming {
            upload: Duration::from_millis(1),
            execute: Duration::from_millis(2),
            download: Duration::from_millis(3),
        };
        assert_eq!(t.total(), Duration::from_millis(6));
    }
}
