// gpu/mod.rs — Compute-device acceleration layer.
//
// The device-side Sobel runs through a C-style status-code compute API
// (OpenCL). Everything above the raw calls is backend-agnostic:
//
//   GpuSession ──► ComputeApi (trait) ──► OpenClApi   (feature "opencl")
//       │                              └─► EmulatedApi (host, always built)
//       │
//       ├─ status::check*   every raw status becomes a GpuError here
//       ├─ device           first platform, first GPU-class device
//       └─ dispatch         work geometry + event-timestamp profiling
//
// The CPU kernel `gradient::sobel_magnitude_clamped` remains the
// authoritative reference: the device kernel is validated against it
// pixel-for-pixel.
//
// Per frame:
//
//   host frame ─write─► input image ─sobel─► output image ─read─► host frame
//                 │                    │                    │
//            writeEvent ──────► kernelEvent ──────► readEvent ─► wait

pub mod api;
pub mod device;
pub mod dispatch;
pub mod emulated;
pub mod error;
pub mod session;
pub mod status;

#[cfg(feature = "opencl")]
pub mod opencl;

pub use api::{ComputeApi, EventTimes, ImageAccess};
pub use device::{select_device, DeviceInfo, SelectedDevice};
pub use dispatch::{align_to, DispatchGeometry, KernelTiming};
pub use emulated::{ApiCall, Command, CommandKind, EmuHandle, EmulatedApi, EmulatedConfig, ResourceKind};
pub use error::{ComputeSetupError, GpuError, Result};
pub use session::{GpuSession, GpuSessionConfig, SOBEL_KERNEL_SOURCE};
pub use status::{check, check_build, check_status, status_name, ClStatus};

#[cfg(feature = "opencl")]
pub use opencl::OpenClApi;
