// gpu/error.rs — Error kinds for the compute-device path.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::gpu::status::{status_name, ClStatus};

/// Result type for compute-device operations.
pub type Result<T> = std::result::Result<T, GpuError>;

/// Errors reported by session construction and frame dispatch.
#[derive(Error, Debug)]
pub enum GpuError {
    /// No compute platform is installed.
    #[error("no compute platform available")]
    NoPlatformAvailable,

    /// The selected platform exposes no GPU-class device.
    #[error("no GPU device available on the selected platform")]
    NoDeviceAvailable,

    /// A compute-API call returned a failing status.
    #[error("{operation}: {name} ({code})")]
    ComputeApi {
        operation: &'static str,
        code: ClStatus,
        name: &'static str,
    },

    /// The kernel program failed to compile. `log` holds the per-device
    /// build output verbatim.
    #[error("kernel build failed:\n{log}")]
    KernelBuildFailure { log: String },

    /// A frame did not match the session's fixed dimensions.
    #[error("frame size mismatch: expected {expected} bytes, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("invalid frame dimensions {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    /// The kernel source file could not be read.
    #[error("can not open kernel source {}", path.display())]
    KernelSource {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Construction-time failures share the error type.
pub type ComputeSetupError = GpuError;

impl GpuError {
    pub(crate) fn compute_api(operation: &'static str, code: ClStatus) -> Self {
        GpuError::ComputeApi {
            operation,
            code,
            name: status_name(code),
        }
    }

    /// The numeric status behind a `ComputeApi` error.
    pub fn status_code(&self) -> Option<ClStatus> {
        match self {
            GpuError::ComputeApi { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Whether this error can only come out of session construction.
    pub fn is_setup_error(&self) -> bool {
        matches!(
            self,
            GpuError::NoPlatformAvailable
                | GpuError::NoDeviceAvailable
                | GpuError::KernelBuildFailure { .. }
                | GpuError::InvalidDimensions { .. }
                | GpuError::KernelSource { .. }
        )
    }

    /// Whether the host simply has no usable compute device.
    pub fn is_device_absent(&self) -> bool {
        matches!(
            self,
            GpuError::NoPlatformAvailable | GpuError::NoDeviceAvailable
        )
    }
}
