// edgecl: per-frame Sobel edge filtering on CPU and on an OpenCL device
//
// CPU kernels (naive and separable) live in the flat modules next to this
// file; the compute-device path lives under `gpu`. The clamped CPU kernel in
// `gradient` is the pixel-exact reference the device kernel is checked
// against.

pub mod image;
pub mod convolution;
pub mod gradient;
pub mod telemetry;
pub mod filter;
pub mod gpu;

pub use filter::FilterStrategy;
pub use image::Image;
pub use telemetry::{StrategyTelemetry, Telemetry};
