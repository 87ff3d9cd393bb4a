// gpu/dispatch.rs — Work geometry and event-timestamp profiling.
//
// GEOMETRY:
// The horizontal global size is rounded up to the kernel's preferred
// work-group multiple `g`; the work-group is one row of `g` items:
//
//   global = [ align_to(width, g), height ]
//   local  = [ g, 1 ]
//
// Items with x >= width are padding and the kernel returns early for
// them. The vertical size needs no rounding because local[1] == 1.
//
// PROFILING:
// The queue is created with profiling enabled, so every event carries
// QUEUED / SUBMIT / START / END device timestamps in nanoseconds. The
// frame time recorded in telemetry is END - QUEUED of the kernel event
// (queueing latency included); START - END alone is also reported.

use std::fmt;

use crate::gpu::api::EventTimes;

/// Round `value` up to the next multiple of `alignment`.
///
///   align_to(1920, 64) = 1920
///   align_to(1000, 64) = 1024
///   align_to(1, 64)    = 64
#[inline]
pub fn align_to(value: usize, alignment: usize) -> usize {
    (value + alignment - 1) / alignment * alignment
}

/// 2D NDRange for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchGeometry {
    pub global: [usize; 2],
    pub local: [usize; 2],
}

impl DispatchGeometry {
    /// Geometry for a `width×height` frame.
    ///
    /// A `multiple` of 0 is treated as 1.
    pub fn new(width: usize, height: usize, multiple: usize) -> Self {
        let g = multiple.max(1);
        Self {
            global: [align_to(width, g), height],
            local: [g, 1],
        }
    }

    /// Total work-items launched, padding included.
    pub fn work_items(&self) -> usize {
        self.global[0] * self.global[1]
    }
}

impl fmt::Display for DispatchGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "global {}x{}, local {}x{}",
            self.global[0], self.global[1], self.local[0], self.local[1]
        )
    }
}

const NS_PER_MS: f64 = 1e-6;

/// Kernel time: END - QUEUED, converted to milliseconds.
#[inline]
pub fn kernel_elapsed_ms(times: &EventTimes) -> f64 {
    times.end.saturating_sub(times.queued) as f64 * NS_PER_MS
}

/// Timing of one dispatched frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KernelTiming {
    /// Kernel END - QUEUED in ms. This is what telemetry records.
    pub elapsed_ms: f64,
    /// Kernel END - START in ms (execution only).
    pub execution_ms: f64,
}

impl KernelTiming {
    pub fn from_event_times(times: &EventTimes) -> Self {
        Self {
            elapsed_ms: kernel_elapsed_ms(times),
            execution_ms: times.end.saturating_sub(times.start) as f64 * NS_PER_MS,
        }
    }
}
