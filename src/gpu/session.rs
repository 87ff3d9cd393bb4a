// gpu/session.rs — Compute session lifecycle and per-frame kernel dispatch.
//
// A `GpuSession` owns every device resource the Sobel pipeline needs for
// frames of one fixed size:
//
//   device ─► context ─► profiling queue ─► program (built) ─► input image
//                                                           ─► output image
//                                                           ─► kernel(in, out)
//
// LIFECYCLE:
//   construct   acquire in the order above; on any failure everything
//               acquired so far is released before the error is returned
//   transform   any number of frames
//   destroy     release in the fixed order below, exactly once
//
//   output image → input image → kernel → program → queue → context → device
//
// Every release is attempted even when an earlier one fails. `destroy`
// reports the first failure; dropping a session without calling it runs
// the same teardown and logs failures instead.
//
// DISPATCH:
// Three commands per frame, chained by events on an in-order queue:
//
//   write(frame → input)        wait: []
//   sobel(input → output)       wait: [write]
//   read(output → frame)        wait: [kernel]
//   wait_for_events([read])
//
// The kernel event's END - QUEUED is the frame time fed to telemetry. All
// three events are released after the frame, whether it succeeded or not.

use std::borrow::Cow;
use std::fmt;
use std::fs;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::gpu::api::{ComputeApi, ImageAccess};
use crate::gpu::device::{select_device, DeviceInfo};
use crate::gpu::dispatch::{DispatchGeometry, KernelTiming};
use crate::gpu::error::{GpuError, Result};
use crate::gpu::status::{check, check_build, ApiResult};
use crate::image::Image;
use crate::telemetry::Telemetry;

/// The Sobel kernel shipped with the crate.
pub const SOBEL_KERNEL_SOURCE: &str = include_str!("kernels/sobel.cl");

/// Default kernel entry point.
pub const SOBEL_KERNEL_ENTRY: &str = "sobel";

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Session parameters. Frame dimensions are fixed for the session's life.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GpuSessionConfig {
    pub width: usize,
    pub height: usize,
    /// OpenCL C source of the program.
    pub kernel_source: Cow<'static, str>,
    /// Name of the `__kernel` function inside `kernel_source`.
    pub kernel_entry: Cow<'static, str>,
    /// Passed verbatim to the program build.
    pub build_options: String,
}

impl GpuSessionConfig {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            kernel_source: Cow::Borrowed(SOBEL_KERNEL_SOURCE),
            kernel_entry: Cow::Borrowed(SOBEL_KERNEL_ENTRY),
            build_options: String::new(),
        }
    }

    pub fn with_kernel_source(mut self, source: impl Into<Cow<'static, str>>) -> Self {
        self.kernel_source = source.into();
        self
    }

    pub fn with_kernel_entry(mut self, entry: impl Into<Cow<'static, str>>) -> Self {
        self.kernel_entry = entry.into();
        self
    }

    pub fn with_build_options(mut self, options: impl Into<String>) -> Self {
        self.build_options = options.into();
        self
    }

    /// Replace the kernel source with the contents of `path`.
    pub fn load_kernel_file(mut self, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| GpuError::KernelSource {
            path: path.to_path_buf(),
            source,
        })?;
        self.kernel_source = Cow::Owned(source);
        Ok(self)
    }

    /// Bytes in one frame.
    pub fn frame_len(&self) -> usize {
        self.width * self.height
    }
}

// ---------------------------------------------------------------------------
// Resource bookkeeping
// ---------------------------------------------------------------------------

/// Resources acquired so far. Construction fills the slots in acquisition
/// order; teardown empties them in release order.
struct Staged<A: ComputeApi> {
    device: Option<A::Device>,
    context: Option<A::Context>,
    queue: Option<A::Queue>,
    program: Option<A::Program>,
    input: Option<A::Image>,
    output: Option<A::Image>,
    kernel: Option<A::Kernel>,
}

impl<A: ComputeApi> Staged<A> {
    fn new(device: A::Device) -> Self {
        Self {
            device: Some(device),
            context: None,
            queue: None,
            program: None,
            input: None,
            output: None,
            kernel: None,
        }
    }

    /// Release every held resource in teardown order. Returns all failures,
    /// first one first.
    fn release(&mut self, api: &A) -> Vec<GpuError> {
        let mut failures = Vec::new();
        let mut record = |operation: &'static str, raw: ApiResult<()>| {
            if let Err(err) = check(operation, raw) {
                warn!(error = %err, "release failed during teardown");
                failures.push(err);
            }
        };

        if let Some(image) = self.output.take() {
            record("clReleaseMemObject", api.release_image(image));
        }
        if let Some(image) = self.input.take() {
            record("clReleaseMemObject", api.release_image(image));
        }
        if let Some(kernel) = self.kernel.take() {
            record("clReleaseKernel", api.release_kernel(kernel));
        }
        if let Some(program) = self.program.take() {
            record("clReleaseProgram", api.release_program(program));
        }
        if let Some(queue) = self.queue.take() {
            record("clReleaseCommandQueue", api.release_queue(queue));
        }
        if let Some(context) = self.context.take() {
            record("clReleaseContext", api.release_context(context));
        }
        if let Some(device) = self.device.take() {
            record("clReleaseDevice", api.release_device(device));
        }
        failures
    }
}

/// Handles of a fully constructed session.
struct Handles<A: ComputeApi> {
    device: A::Device,
    context: A::Context,
    queue: A::Queue,
    program: A::Program,
    input: A::Image,
    output: A::Image,
    kernel: A::Kernel,
}

impl<A: ComputeApi> Handles<A> {
    fn staged(&self) -> Staged<A> {
        Staged {
            device: Some(self.device),
            context: Some(self.context),
            queue: Some(self.queue),
            program: Some(self.program),
            input: Some(self.input),
            output: Some(self.output),
            kernel: Some(self.kernel),
        }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// An initialized compute session for `width×height` u8 frames.
pub struct GpuSession<A: ComputeApi> {
    api: A,
    config: GpuSessionConfig,
    device_info: DeviceInfo,
    handles: Handles<A>,
    work_group_multiple: usize,
    geometry: DispatchGeometry,
    telemetry: Telemetry,
    released: bool,
}

impl<A: ComputeApi> GpuSession<A> {
    /// Session with the built-in Sobel kernel.
    pub fn new(api: A, width: usize, height: usize) -> Result<Self> {
        Self::with_config(api, GpuSessionConfig::new(width, height))
    }

    pub fn with_config(api: A, config: GpuSessionConfig) -> Result<Self> {
        if config.width == 0 || config.height == 0 {
            return Err(GpuError::InvalidDimensions {
                width: config.width,
                height: config.height,
            });
        }

        let selected = select_device(&api)?;
        let mut staged = Staged::new(selected.device);
        let acquired = Self::acquire(&api, &config, selected.device, &mut staged);
        let (handles, multiple) = match acquired {
            Ok(done) => done,
            Err(err) => {
                warn!(error = %err, "session construction failed, releasing partial resources");
                staged.release(&api);
                return Err(err);
            }
        };

        let geometry = DispatchGeometry::new(config.width, config.height, multiple);
        info!(
            device = %selected.info,
            width = config.width,
            height = config.height,
            work_group_multiple = multiple,
            geometry = %geometry,
            "compute session ready"
        );

        Ok(Self {
            api,
            config,
            device_info: selected.info,
            handles,
            work_group_multiple: multiple,
            geometry,
            telemetry: Telemetry::new(),
            released: false,
        })
    }

    fn acquire(
        api: &A,
        config: &GpuSessionConfig,
        device: A::Device,
        staged: &mut Staged<A>,
    ) -> Result<(Handles<A>, usize)> {
        let context = check("clCreateContext", api.create_context(device))?;
        staged.context = Some(context);

        let queue = check(
            "clCreateCommandQueue",
            api.create_profiling_queue(context, device),
        )?;
        staged.queue = Some(queue);

        let program = check(
            "clCreateProgramWithSource",
            api.create_program(context, &config.kernel_source),
        )?;
        staged.program = Some(program);
        check_build(
            "clBuildProgram",
            api.build_program(program, &[device], &config.build_options),
            &[device],
            |d| api.build_log(program, d),
        )?;

        let (w, h) = (config.width, config.height);
        let input = check(
            "clCreateImage",
            api.create_image(context, ImageAccess::ReadOnly, w, h),
        )?;
        staged.input = Some(input);
        let output = check(
            "clCreateImage",
            api.create_image(context, ImageAccess::WriteOnly, w, h),
        )?;
        staged.output = Some(output);

        let kernel = check("clCreateKernel", api.create_kernel(program, &config.kernel_entry))?;
        staged.kernel = Some(kernel);
        check("clSetKernelArg", api.set_image_arg(kernel, 0, input))?;
        check("clSetKernelArg", api.set_image_arg(kernel, 1, output))?;

        let multiple = check(
            "clGetKernelWorkGroupInfo",
            api.preferred_work_group_multiple(kernel, device),
        )?
        .max(1);

        let handles = Handles {
            device,
            context,
            queue,
            program,
            input,
            output,
            kernel,
        };
        Ok((handles, multiple))
    }

    // -----------------------------------------------------------------------
    // Dispatch
    // -----------------------------------------------------------------------

    /// Run the kernel over `frame` in place.
    ///
    /// `frame` must hold exactly `width * height` bytes, or
    /// `DimensionMismatch` is returned without touching the device. On
    /// success the kernel time is recorded in [`telemetry`](Self::telemetry).
    pub fn transform(&mut self, frame: &mut [u8]) -> Result<KernelTiming> {
        let expected = self.frame_len();
        if frame.len() != expected {
            return Err(GpuError::DimensionMismatch {
                expected,
                actual: frame.len(),
            });
        }

        let mut events = Vec::with_capacity(3);
        let result = self.dispatch(frame, &mut events);

        // A failed event release doesn't invalidate a frame that was already read back.
        for event in events {
            if let Err(err) = check("clReleaseEvent", self.api.release_event(event)) {
                warn!(error = %err, "failed to release frame event");
            }
        }

        let timing = result?;
        self.telemetry.update(timing.elapsed_ms);
        debug!(
            elapsed_ms = timing.elapsed_ms,
            execution_ms = timing.execution_ms,
            "frame dispatched"
        );
        Ok(timing)
    }

    /// [`transform`](Self::transform) for an `Image<u8>` of the session's
    /// dimensions.
    pub fn transform_image(&mut self, image: &mut Image<u8>) -> Result<KernelTiming> {
        if image.width() != self.config.width || image.height() != self.config.height {
            return Err(GpuError::DimensionMismatch {
                expected: self.frame_len(),
                actual: image.len(),
            });
        }
        self.transform(image.as_mut_slice())
    }

    /// Enqueue write → kernel → read and wait. Every event created is pushed
    /// onto `events` so the caller can release them on any path.
    fn dispatch(&self, frame: &mut [u8], events: &mut Vec<A::Event>) -> Result<KernelTiming> {
        let api = &self.api;
        let h = &self.handles;
        let (width, height) = (self.config.width, self.config.height);

        let write = check(
            "clEnqueueWriteImage",
            api.enqueue_write_image(h.queue, h.input, width, height, frame, &[]),
        )?;
        events.push(write);

        let kernel = check(
            "clEnqueueNDRangeKernel",
            api.enqueue_kernel(
                h.queue,
                h.kernel,
                self.geometry.global,
                self.geometry.local,
                &[write],
            ),
        )?;
        events.push(kernel);

        let read = check(
            "clEnqueueReadImage",
            api.enqueue_read_image(h.queue, h.output, width, height, frame, &[kernel]),
        )?;
        events.push(read);

        check("clWaitForEvents", api.wait_for_events(&[read]))?;
        let times = check("clGetEventProfilingInfo", api.profiling_times(kernel))?;
        Ok(KernelTiming::from_event_times(&times))
    }

    // -----------------------------------------------------------------------
    // Teardown
    // -----------------------------------------------------------------------

    /// Release every device resource. All releases are attempted; the first
    /// failure is returned.
    pub fn destroy(mut self) -> Result<()> {
        let mut failures = self.teardown();
        if failures.is_empty() {
            Ok(())
        } else {
            Err(failures.remove(0))
        }
    }

    fn teardown(&mut self) -> Vec<GpuError> {
        if self.released {
            return Vec::new();
        }
        self.released = true;
        let failures = self.handles.staged().release(&self.api);
        info!(
            device = %self.device_info.name,
            frames = self.telemetry.frames(),
            failures = failures.len(),
            "compute session released"
        );
        failures
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn width(&self) -> usize {
        self.config.width
    }

    pub fn height(&self) -> usize {
        self.config.height
    }

    pub fn frame_len(&self) -> usize {
        self.config.frame_len()
    }

    pub fn device(&self) -> &DeviceInfo {
        &self.device_info
    }

    /// Cached `CL_KERNEL_PREFERRED_WORK_GROUP_SIZE_MULTIPLE` (at least 1).
    pub fn work_group_multiple(&self) -> usize {
        self.work_group_multiple
    }

    pub fn geometry(&self) -> DispatchGeometry {
        self.geometry
    }

    /// Kernel times of every frame dispatched so far.
    pub fn telemetry(&self) -> &Telemetry {
        &self.telemetry
    }

    pub fn telemetry_mut(&mut self) -> &mut Telemetry {
        &mut self.telemetry
    }

    pub fn config(&self) -> &GpuSessionConfig {
        &self.config
    }

    pub fn api(&self) -> &A {
        &self.api
    }
}

impl<A: ComputeApi> Drop for GpuSession<A> {
    fn drop(&mut self) {
        for err in self.teardown() {
            warn!(error = %err, "compute session dropped with a failed release");
        }
    }
}

impl<A: ComputeApi> fmt::Debug for GpuSession<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GpuSession")
            .field("device", &self.device_info.name)
            .field("width", &self.config.width)
            .field("height", &self.config.height)
            .field("geometry", &self.geometry)
            .field("frames", &self.telemetry.frames())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = GpuSessionConfig::new(640, 480);
        assert_eq!(config.frame_len(), 640 * 480);
        assert_eq!(config.kernel_entry, "sobel");
        assert!(config.kernel_source.contains("__kernel void sobel"));
        assert!(config.build_options.is_empty());
    }

    #[test]
    fn test_config_builders() {
        let config = GpuSessionConfig::new(4, 4)
            .with_kernel_source("__kernel void edge() {}")
            .with_kernel_entry("edge")
            .with_build_options("-cl-fast-relaxed-math");
        assert_eq!(config.kernel_entry, "edge");
        assert_eq!(config.build_options, "-cl-fast-relaxed-math");
    }

    #[test]
    fn test_load_kernel_file_missing() {
        let err = GpuSessionConfig::new(4, 4)
            .load_kernel_file("/nonexistent/Sobel.cl")
            .unwrap_err();
        assert!(matches!(err, GpuError::KernelSource { .. }));
        assert!(err.is_setup_error());
    }

    #[test]
    fn test_load_kernel_file() {
        let path = std::env::temp_dir().join("edgecl_session_test_kernel.cl");
        fs::write(&path, SOBEL_KERNEL_SOURCE).unwrap();
        let config = GpuSessionConfig::new(4, 4).load_kernel_file(&path).unwrap();
        assert!(matches!(config.kernel_source, Cow::Owned(_)));
        assert_eq!(config.kernel_source, SOBEL_KERNEL_SOURCE);
        let _ = fs::remove_file(&path);
    }
}
