// telemetry.rs — Running per-strategy frame timing statistics.
//
// One `Telemetry` record exists per filter strategy. The CPU strategies feed
// it wall-clock measurements; the GPU strategy feeds it the kernel's
// queued→end interval taken from device event timestamps. Records never mix:
// switching the active strategy mid-session leaves all three untouched, and
// a playback loop resets all three so the numbers describe the current pass.

use std::fmt;

use crate::filter::FilterStrategy;

/// Running current/min/max/sum statistics over frame times in milliseconds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Telemetry {
    current_ms: f64,
    min_ms: f64,
    max_ms: f64,
    sum_ms: f64,
    frames: u64,
}

impl Telemetry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one frame's elapsed time.
    pub fn update(&mut self, elapsed_ms: f64) {
        if self.frames == 0 {
            self.min_ms = elapsed_ms;
            self.max_ms = elapsed_ms;
        } else {
            self.min_ms = self.min_ms.min(elapsed_ms);
            self.max_ms = self.max_ms.max(elapsed_ms);
        }
        self.current_ms = elapsed_ms;
        self.sum_ms += elapsed_ms;
        self.frames += 1;
    }

    /// Forget everything recorded so far.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Number of frames recorded since construction or the last reset.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Most recent frame time; `None` before the first update.
    pub fn current_ms(&self) -> Option<f64> {
        (self.frames > 0).then_some(self.current_ms)
    }

    pub fn min_ms(&self) -> Option<f64> {
        (self.frames > 0).then_some(self.min_ms)
    }

    pub fn max_ms(&self) -> Option<f64> {
        (self.frames > 0).then_some(self.max_ms)
    }

    /// `sum / frames`; `None` while no frame has been recorded.
    pub fn average_ms(&self) -> Option<f64> {
        (self.frames > 0).then(|| self.sum_ms / self.frames as f64)
    }
}

impl fmt::Display for Telemetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.min_ms(), self.max_ms(), self.average_ms(), self.current_ms()) {
            (Some(min), Some(max), Some(avg), Some(now)) => write!(
                f,
                "Min: {min:.2}, Max: {max:.2}, Avg: {avg:.2}, Now: {now:.2}  (ms/frame)"
            ),
            _ => write!(f, "no frames recorded"),
        }
    }
}

/// Independent telemetry records for every filter strategy.
#[derive(Debug, Clone, Default)]
pub struct StrategyTelemetry {
    naive: Telemetry,
    separable: Telemetry,
    gpu: Telemetry,
}

impl StrategyTelemetry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, strategy: FilterStrategy) -> &Telemetry {
        match strategy {
            FilterStrategy::Naive => &self.naive,
            FilterStrategy::Separable => &self.separable,
            FilterStrategy::Gpu => &self.gpu,
        }
    }

    pub fn get_mut(&mut self, strategy: FilterStrategy) -> &mut Telemetry {
        match strategy {
            FilterStrategy::Naive => &mut self.naive,
            FilterStrategy::Separable => &mut self.separable,
            FilterStrategy::Gpu => &mut self.gpu,
        }
    }

    /// Reset all three records (playback looped).
    pub fn reset_all(&mut self) {
        for strategy in FilterStrategy::ALL {
            self.get_mut(strategy).reset();
        }
    }

    /// One status line, e.g. `[CPU] Min: 1.00, Max: ...`.
    pub fn report(&self, strategy: FilterStrategy) -> String {
        format!("[{}] {}", strategy.label(), self.get(strategy))
    }
}
