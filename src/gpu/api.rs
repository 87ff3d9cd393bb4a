// gpu/api.rs — The compute-API seam.
//
// `ComputeApi` mirrors the handful of C-style OpenCL entry points the
// pipeline needs, one method per call, each returning the raw status as
// `Err(ClStatus)`. It performs no checking of its own: turning a status into a
// `GpuError` is `gpu::status`'s job, and ordering/cleanup is the session's.
//
// Handles are plain `Copy` values, like the `cl_*` pointers they stand for.
// Owning them (and releasing each exactly once) is the caller's
// responsibility.

use std::fmt::Debug;

use crate::gpu::status::ApiResult;

/// Device-side access mode of a 2D image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageAccess {
    /// The kernel only reads the image (`CL_MEM_READ_ONLY`).
    ReadOnly,
    /// The kernel only writes the image (`CL_MEM_WRITE_ONLY`).
    WriteOnly,
}

/// Device timestamps of one command, in nanoseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventTimes {
    pub queued: u64,
    pub submit: u64,
    pub start: u64,
    pub end: u64,
}

/// Raw compute API.
///
/// All images are 2D, single-channel, unsigned 8-bit (`CL_R` /
/// `CL_UNSIGNED_INT8`) and tightly packed.
pub trait ComputeApi {
    type Platform: Copy + Debug;
    type Device: Copy + Debug;
    type Context: Copy + Debug;
    type Queue: Copy + Debug;
    type Program: Copy + Debug;
    type Kernel: Copy + Debug;
    type Image: Copy + Debug;
    type Event: Copy + Debug;

    // --- discovery -------------------------------------------------------

    fn platforms(&self) -> ApiResult<Vec<Self::Platform>>;

    /// GPU-class devices of `platform`.
    fn gpu_devices(&self, platform: Self::Platform) -> ApiResult<Vec<Self::Device>>;

    fn device_name(&self, device: Self::Device) -> ApiResult<String>;

    // --- setup -----------------------------------------------------------

    fn create_context(&self, device: Self::Device) -> ApiResult<Self::Context>;

    /// In-order command queue with profiling enabled.
    fn create_profiling_queue(
        &self,
        context: Self::Context,
        device: Self::Device,
    ) -> ApiResult<Self::Queue>;

    fn create_program(&self, context: Self::Context, source: &str) -> ApiResult<Self::Program>;

    fn build_program(
        &self,
        program: Self::Program,
        devices: &[Self::Device],
        options: &str,
    ) -> ApiResult<()>;

    fn build_log(&self, program: Self::Program, device: Self::Device) -> ApiResult<String>;

    fn create_image(
        &self,
        context: Self::Context,
        access: ImageAccess,
        width: usize,
        height: usize,
    ) -> ApiResult<Self::Image>;

    fn create_kernel(&self, program: Self::Program, entry: &str) -> ApiResult<Self::Kernel>;

    fn set_image_arg(&self, kernel: Self::Kernel, index: u32, image: Self::Image)
        -> ApiResult<()>;

    /// `CL_KERNEL_PREFERRED_WORK_GROUP_SIZE_MULTIPLE`.
    fn preferred_work_group_multiple(
        &self,
        kernel: Self::Kernel,
        device: Self::Device,
    ) -> ApiResult<usize>;

    // --- per frame -------------------------------------------------------

    /// Copy `data` into the full `width×height` region of `image`.
    fn enqueue_write_image(
        &self,
        queue: Self::Queue,
        image: Self::Image,
        width: usize,
        height: usize,
        data: &[u8],
        wait: &[Self::Event],
    ) -> ApiResult<Self::Event>;

    /// 2D NDRange launch.
    fn enqueue_kernel(
        &self,
        queue: Self::Queue,
        kernel: Self::Kernel,
        global: [usize; 2],
        local: [usize; 2],
        wait: &[Self::Event],
    ) -> ApiResult<Self::Event>;

    /// Copy the full `width×height` region of `image` into `data`.
    fn enqueue_read_image(
        &self,
        queue: Self::Queue,
        image: Self::Image,
        width: usize,
        height: usize,
        data: &mut [u8],
        wait: &[Self::Event],
    ) -> ApiResult<Self::Event>;

    fn wait_for_events(&self, events: &[Self::Event]) -> ApiResult<()>;

    fn profiling_times(&self, event: Self::Event) -> ApiResult<EventTimes>;

    // --- release ---------------------------------------------------------

    fn release_event(&self, event: Self::Event) -> ApiResult<()>;
    fn release_image(&self, image: Self::Image) -> ApiResult<()>;
    fn release_kernel(&self, kernel: Self::Kernel) -> ApiResult<()>;
    fn release_program(&self, program: Self::Program) -> ApiResult<()>;
    fn release_queue(&self, queue: Self::Queue) -> ApiResult<()>;
    fn release_context(&self, context: Self::Context) -> ApiResult<()>;
    fn release_device(&self, device: Self::Device) -> ApiResult<()>;
}
