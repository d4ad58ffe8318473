//! Per-call phase timing.
//!
//! Each `cluster` call owns a [`PerfTiming`] sink; phases append one entry
//! each via [`ScopedTimer`] guards. The sink is single-threaded and imposes
//! no nesting semantics.

use std::time::Instant;

/// One named phase duration.
#[derive(Debug, Clone, PartialEq)]
pub struct PerfTimingEntry {
    pub label: String,
    pub duration_ms: f64,
}

/// Ordered list of phase timings for a single clustering run.
#[derive(Debug, Clone, Default)]
pub struct PerfTiming {
    entries: Vec<PerfTimingEntry>,
}

impl PerfTiming {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, label: impl Into<String>, duration_ms: f64) {
        self.entries.push(PerfTimingEntry {
            label: label.into(),
            duration_ms,
        });
    }

    pub fn entries(&self) -> &[PerfTimingEntry] {
        &self.entries
    }

    /// Duration of the first entry with the given label, if present.
    pub fn get(&self, label: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|e| e.label == label)
            .map(|e| e.duration_ms)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Simple stopwatch for spans that cannot be expressed as a scope.
pub struct Timer(Instant);

impl Timer {
    #[inline]
    pub fn start() -> Self {
        Self(Instant::now())
    }

    #[inline]
    pub fn elapsed_ms(&self) -> f64 {
        self.0.elapsed().as_secs_f64() * 1000.0
    }
}

/// Appends one entry to the sink when dropped.
pub struct ScopedTimer<'a> {
    label: &'static str,
    sink: &'a mut PerfTiming,
    start: Instant,
}

impl<'a> ScopedTimer<'a> {
    pub fn new(label: &'static str, sink: &'a mut PerfTiming) -> Self {
        Self {
            label,
            sink,
            start: Instant::now(),
        }
    }
}

impl Drop for ScopedTimer<'_> {
    fn drop(&mut self) {
        let ms = self.start.elapsed().as_secs_f64() * 1000.0;
        self.sink.add(self.label, ms);
    }
}
