// filter.rs — The three edge-filter strategies and the CPU dispatch.
//
// Strategy   Kernel                               Timing source
// ─────────  ───────────────────────────────────  ─────────────────────────
// Naive      gradient::sobel_magnitude_naive      wall clock (Instant)
// Separable  gradient::sobel_magnitude_separable  wall clock (Instant)
// Gpu        kernels/sobel.cl via gpu::GpuSession device event timestamps
//
// Only the two CPU strategies are applied here. The GPU strategy goes
// through `GpuSession::transform`, which feeds its own telemetry record.

use std::fmt;
use std::time::Instant;

use crate::gradient::{sobel_magnitude_naive, sobel_magnitude_separable};
use crate::image::Image;
use crate::telemetry::Telemetry;

/// Which implementation filters the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterStrategy {
    /// Single-threaded 3×3 pixel loop.
    Naive,
    /// Separable gradient passes (the "vectorised library" path).
    Separable,
    /// Compute-device kernel.
    Gpu,
}

impl FilterStrategy {
    pub const ALL: [FilterStrategy; 3] = [
        FilterStrategy::Naive,
        FilterStrategy::Separable,
        FilterStrategy::Gpu,
    ];

    /// Short label used in telemetry reports.
    pub fn label(self) -> &'static str {
        match self {
            FilterStrategy::Naive => "CPU",
            FilterStrategy::Separable => "Separable",
            FilterStrategy::Gpu => "GPU",
        }
    }

    pub fn is_cpu(self) -> bool {
        !matches!(self, FilterStrategy::Gpu)
    }
}

impl fmt::Display for FilterStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Filter `frame` in place with a CPU strategy, recording the kernel's
/// wall-clock time in `telemetry`.
///
/// Returns the elapsed milliseconds, or `None` (frame untouched, nothing
/// recorded) when asked for `FilterStrategy::Gpu`.
pub fn apply_cpu(
    strategy: FilterStrategy,
    frame: &mut Image<u8>,
    telemetry: &mut Telemetry,
) -> Option<f64> {
    let start = Instant::now();
    let filtered = match strategy {
        FilterStrategy::Naive => sobel_magnitude_naive(frame),
        FilterStrategy::Separable => sobel_magnitude_separable(frame),
        FilterStrategy::Gpu => return None,
    };
    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
    telemetry.update(elapsed_ms);
    *frame = filtered;
    Some(elapsed_ms)
}
