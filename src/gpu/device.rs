// gpu/device.rs — Compute device selection.
//
// Policy: first platform, first GPU-class device on it. No scoring, no
// preference for discrete over integrated. Every enumerated device is
// logged so a wrong pick is visible in the trace.

use std::fmt;

use tracing::{debug, info, warn};

use crate::gpu::api::ComputeApi;
use crate::gpu::error::{GpuError, Result};
use crate::gpu::status::{check, CL_DEVICE_NOT_FOUND, CL_PLATFORM_NOT_FOUND_KHR};

/// Human-readable description of the selected device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub name: String,
    /// Number of platforms that were installed.
    pub platform_count: usize,
    /// Number of GPU devices on the selected platform.
    pub device_count: usize,
}

impl fmt::Display for DeviceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (platform 0 of {}, device 0 of {})",
            self.name, self.platform_count, self.device_count
        )
    }
}

/// The chosen device handle together with its description.
pub struct SelectedDevice<A: ComputeApi> {
    pub device: A::Device,
    pub info: DeviceInfo,
}

impl<A: ComputeApi> fmt::Debug for SelectedDevice<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectedDevice")
            .field("device", &self.device)
            .field("info", &self.info)
            .finish()
    }
}

/// Pick the first GPU-class device of the first platform.
///
/// Errors:
/// - `NoPlatformAvailable` when no platform is installed
/// - `NoDeviceAvailable` when the first platform has no GPU device
/// - `ComputeApi` for any other failing status
///
/// When the device name can't be queried the handle is released again
/// before the error is returned.
pub fn select_device<A: ComputeApi>(api: &A) -> Result<SelectedDevice<A>> {
    let platforms = match api.platforms() {
        Err(CL_PLATFORM_NOT_FOUND_KHR) => return Err(GpuError::NoPlatformAvailable),
        raw => check("clGetPlatformIDs", raw)?,
    };
    let platform = *platforms.first().ok_or(GpuError::NoPlatformAvailable)?;

    let devices = match api.gpu_devices(platform) {
        Err(CL_DEVICE_NOT_FOUND) => return Err(GpuError::NoDeviceAvailable),
        raw => check("clGetDeviceIDs", raw)?,
    };
    let device = *devices.first().ok_or(GpuError::NoDeviceAvailable)?;

    let name = match check("clGetDeviceInfo", api.device_name(device)) {
        Ok(name) => name,
        Err(err) => {
            if let Err(release) = check("clReleaseDevice", api.release_device(device)) {
                warn!(error = %release, "failed to release device after name query");
            }
            return Err(err);
        }
    };

    debug!(index = 0, name = %name, "enumerated GPU device");
    for (i, &candidate) in devices.iter().enumerate().skip(1) {
        match api.device_name(candidate) {
            Ok(other) => debug!(index = i, name = %other, "enumerated GPU device"),
            Err(code) => debug!(index = i, code, "enumerated GPU device (name unavailable)"),
        }
    }

    let info = DeviceInfo {
        name,
        platform_count: platforms.len(),
        device_count: devices.len(),
    };
    info!(device = %info, "selected compute device");
    Ok(SelectedDevice { device, info })
}
